//! Cursor position, scan-line range, and blink timing.

use platform::Clock;

/// Blink interval, in microseconds.
pub const BLINK_INTERVAL_US: u32 = 250_000;

/// Cursor position, shape, and blink phase.
///
/// Shape is a scan-line range `[start_line..=end_line]` within the active
/// glyph cell, set via `SET_CURSOR_MODE(top, bot)`. The cursor is hidden
/// iff `top == 0x20 && bot == 0x00`; any other pair is a visible range,
/// including a full-height block (`0..=font_h-1`) or an underline
/// (`font_h-2..=font_h-1`).
#[derive(Debug, Clone, Copy)]
pub struct CursorState {
    row: u16,
    col: u16,
    prev_row: u16,
    prev_col: u16,
    hidden: bool,
    start_line: u8,
    end_line: u8,
    visible_phase: bool,
    last_toggle_us: u32,
}

impl CursorState {
    /// A cursor parked at the origin, blinking, as a full-height block.
    pub const fn new() -> Self {
        Self {
            row: 0,
            col: 0,
            prev_row: 0,
            prev_col: 0,
            hidden: false,
            start_line: 0,
            end_line: 15,
            visible_phase: true,
            last_toggle_us: 0,
        }
    }

    /// Current (row, col).
    pub const fn position(&self) -> (u16, u16) {
        (self.row, self.col)
    }

    /// Position as of the previous tick, for detecting cursor movement.
    pub const fn prev_position(&self) -> (u16, u16) {
        (self.prev_row, self.prev_col)
    }

    /// Move the cursor, clamping to the mode's geometry.
    pub fn set_position(&mut self, row: u16, col: u16, rows: u16, cols: u16) {
        self.row = if rows == 0 { 0 } else { row.min(rows - 1) };
        self.col = if cols == 0 { 0 } else { col.min(cols - 1) };
    }

    /// Scan-line range to invert when the cursor is drawn on.
    pub const fn scan_line_range(&self) -> (u8, u8) {
        (self.start_line, self.end_line)
    }

    /// Set the shape from the raw `SET_CURSOR_MODE` argument pair. Resets
    /// blink phase to visible so a mode change is never masked by an
    /// already-elapsed blink-off phase.
    pub fn set_shape(&mut self, top: u8, bot: u8) {
        self.hidden = top == 0x20 && bot == 0x00;
        self.start_line = top;
        self.end_line = bot;
        self.visible_phase = true;
    }

    /// Whether the cursor should currently be drawn.
    pub fn is_visible(&self) -> bool {
        !self.hidden && self.visible_phase
    }

    /// Whether `SET_CURSOR_MODE` hid the cursor outright.
    pub const fn is_shape_hidden(&self) -> bool {
        self.hidden
    }

    /// Advance blink phase against the clock. Returns `true` if the
    /// visibility just changed or the cursor moved since the last tick, so
    /// the caller knows to re-render the affected cell(s).
    pub fn tick(&mut self, clock: &impl Clock) -> bool {
        let moved = (self.row, self.col) != (self.prev_row, self.prev_col);
        let now = clock.now_us();
        if now.wrapping_sub(self.last_toggle_us) < BLINK_INTERVAL_US && !moved {
            return false;
        }
        if moved {
            // Force off at the vacated cell; don't consume the blink phase.
            self.prev_row = self.row;
            self.prev_col = self.col;
            return true;
        }
        self.last_toggle_us = now;
        self.visible_phase = !self.visible_phase;
        self.prev_row = self.row;
        self.prev_col = self.col;
        true
    }
}

impl Default for CursorState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeClock(core::cell::Cell<u32>);

    impl Clock for FakeClock {
        fn now_us(&self) -> u32 {
            self.0.get()
        }
    }

    #[test]
    fn position_clamps_to_geometry() {
        let mut c = CursorState::new();
        c.set_position(100, 200, 25, 80);
        assert_eq!(c.position(), (24, 79));
    }

    #[test]
    fn hidden_shape_is_never_visible() {
        let mut c = CursorState::new();
        c.set_shape(0x20, 0x00);
        assert!(!c.is_visible());
        assert!(c.is_shape_hidden());
    }

    #[test]
    fn underline_shape_is_visible_with_its_range() {
        let mut c = CursorState::new();
        c.set_shape(14, 15);
        assert!(c.is_visible());
        assert_eq!(c.scan_line_range(), (14, 15));
    }

    #[test]
    fn blink_toggles_after_interval() {
        let mut c = CursorState::new();
        let clock = FakeClock(core::cell::Cell::new(0));
        assert!(!c.tick(&clock));
        clock.0.set(BLINK_INTERVAL_US);
        assert!(c.tick(&clock));
        assert!(!c.is_visible());
    }

    #[test]
    fn shape_change_resets_to_visible() {
        let mut c = CursorState::new();
        c.visible_phase = false;
        c.set_shape(0, 15);
        assert!(c.is_visible());
    }

    #[test]
    fn moving_forces_a_retick_without_consuming_blink_phase() {
        let mut c = CursorState::new();
        let clock = FakeClock(core::cell::Cell::new(0));
        c.set_position(1, 1, 25, 80);
        assert!(c.tick(&clock));
        assert!(c.is_visible());
    }
}
