//! The display engine: mode/page/cursor state machine, shadow text grid,
//! and the linear frame buffer it mirrors into.

use platform::{Clock, DebugLevel, DebugSink, Mailbox};
use platform::mailbox::{FrameBufferHandle, FrameBufferSpec, MailboxError};

use crate::attribute::{attribute_to_colors, fill_color, GlyphTransform};
use crate::cursor::CursorState;
use crate::font::glyph_row;
use crate::mode::{ModeDescriptor, ModeKind, MODE_TABLE};
use crate::opcode::Opcode;
use crate::palette::{CGA_PALETTE_BGR, TRANSPARENT};
use transport::{CommandFrame, QueuedCommand};

/// Number of cells in the shadow text grid — the largest mode's page
/// count times its row/column geometry.
pub const SHADOW_CELLS: usize = 10_240;

/// Default attribute byte `CLEAR_SCREEN` installs: normal-intensity in
/// every attribute convention this engine supports.
const DEFAULT_ATTR: u8 = 0x07;

/// Lifecycle state of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No `SET_MODE` has completed yet; only `SET_MODE` is accepted.
    Uninit,
    /// A mode is active and the frame buffer is allocated.
    Ready,
}

/// Errors the engine can report while processing a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// A command other than `SET_MODE` arrived before any mode was set.
    NotReady,
    /// `SET_MODE` named an index outside the mode table, or a rejected mode.
    InvalidMode(u8),
    /// `SET_PAGE` named a page beyond the active mode's page count.
    InvalidPage(u8),
    /// A row/column/x/y argument fell outside the active mode's geometry.
    OutOfBounds,
    /// The 6-bit opcode field didn't name a known operation.
    UnknownOpcode(u8),
    /// The mailbox rejected an allocation or page flip.
    Hardware(MailboxError),
}

impl From<MailboxError> for EngineError {
    fn from(e: MailboxError) -> Self {
        Self::Hardware(e)
    }
}

impl core::fmt::Display for EngineError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotReady => write!(f, "command issued before SET_MODE"),
            Self::InvalidMode(m) => write!(f, "invalid or unsupported mode {m}"),
            Self::InvalidPage(p) => write!(f, "invalid page {p}"),
            Self::OutOfBounds => write!(f, "argument outside active mode geometry"),
            Self::UnknownOpcode(op) => write!(f, "unknown opcode {op}"),
            Self::Hardware(e) => write!(f, "mailbox error: {e}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EngineError {}

/// Reply bytes produced by a command, sent back over the byte link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// No reply.
    None,
    /// One reply byte (`GET_PIX`).
    One(u8),
    /// Two reply bytes, attribute then character (`GET_CHR`).
    Two(u8, u8),
}

fn pack_cell(ch: u8, attr: u8) -> u16 {
    (u16::from(attr) << 8) | u16::from(ch)
}

fn unpack_cell(cell: u16) -> (u8, u8) {
    ((cell & 0xFF) as u8, (cell >> 8) as u8)
}

/// Mode/page/cursor state machine plus the shadow text grid it mirrors
/// into a mailbox-allocated linear frame buffer.
pub struct DisplayEngine<M> {
    mailbox: M,
    state: EngineState,
    mode_index: usize,
    page: u8,
    cursor: CursorState,
    last_attr: u8,
    /// Palette selector (0 or 1) used by the low-res 4-color graphics modes.
    palette_select: u8,
    shadow: [u16; SHADOW_CELLS],
    fb: Option<FrameBufferHandle>,
}

impl<M: Mailbox> DisplayEngine<M> {
    /// An uninitialized engine wrapping the given mailbox.
    pub fn new(mailbox: M) -> Self {
        Self {
            mailbox,
            state: EngineState::Uninit,
            mode_index: 0,
            page: 0,
            cursor: CursorState::new(),
            last_attr: 0x07,
            palette_select: 0,
            shadow: [pack_cell(b' ', 0x07); SHADOW_CELLS],
            fb: None,
        }
    }

    /// The active mode descriptor. Only meaningful once `state` is `Ready`.
    pub fn mode(&self) -> &ModeDescriptor {
        &MODE_TABLE[self.mode_index]
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Current cursor state, for rendering or inspection.
    pub fn cursor(&self) -> &CursorState {
        &self.cursor
    }

    /// Advance the cursor blink phase; re-renders the cursor cell if the
    /// phase just flipped, or the vacated and occupied cells if it moved.
    pub fn tick_cursor(&mut self, clock: &impl Clock) {
        if self.state != EngineState::Ready || !matches!(self.mode().kind, ModeKind::Text) {
            return;
        }
        let vacated = self.cursor.prev_position();
        if self.cursor.tick(clock) {
            let page = self.page;
            let (row, col) = self.cursor.position();
            if vacated != (row, col) {
                self.render_cell(page, vacated.0, vacated.1);
            }
            self.render_cell(page, row, col);
        }
    }

    /// Dispatch one queued command, returning any reply bytes.
    pub fn handle(
        &mut self,
        cmd: &QueuedCommand,
        sink: &impl DebugSink,
    ) -> Result<Reply, EngineError> {
        let frame: &CommandFrame = &cmd.frame;
        let op = Opcode::try_from(frame.opcode);

        if self.state == EngineState::Uninit && !matches!(op, Ok(Opcode::SetMode)) {
            return Err(EngineError::NotReady);
        }

        match op {
            Ok(Opcode::SetMode) => self.set_mode(frame.args[0]).map(|()| Reply::None),
            Ok(Opcode::SetPage) => self.set_page(frame.args[0]).map(|()| Reply::None),
            Ok(Opcode::SetCursorPos) => self
                .set_cursor_pos(frame.args[2] as u16, frame.args[3] as u16)
                .map(|()| Reply::None),
            Ok(Opcode::SetCursorMode) => self
                .set_cursor_mode(frame.args[0], frame.args[1])
                .map(|()| Reply::None),
            Ok(Opcode::PutChrAttr) => self.put_chr_attr(
                frame.args[0],
                frame.args[3] as u16,
                frame.args[2] as u16,
                frame.args[1],
                frame.args[5],
            ),
            Ok(Opcode::PutChr) => self.put_chr(
                frame.args[0],
                frame.args[3] as u16,
                frame.args[2] as u16,
                frame.args[1],
            ),
            Ok(Opcode::GetChr) => {
                self.get_chr(frame.args[0], frame.args[3] as u16, frame.args[2] as u16)
            }
            Ok(Opcode::ScrollUp) => self.scroll(true, &frame.args).map(|()| Reply::None),
            Ok(Opcode::ScrollDown) => self.scroll(false, &frame.args).map(|()| Reply::None),
            Ok(Opcode::PutPix) => self.put_pix(
                frame.args[0],
                u16::from(frame.args[2]) | (u16::from(frame.args[3]) << 8),
                u16::from(frame.args[4]) | (u16::from(frame.args[5]) << 8),
                frame.args[1],
            ),
            Ok(Opcode::GetPix) => self.get_pix(
                frame.args[0],
                u16::from(frame.args[2]) | (u16::from(frame.args[3]) << 8),
                u16::from(frame.args[4]) | (u16::from(frame.args[5]) << 8),
            ),
            Ok(Opcode::Palette) => {
                self.select_palette(frame.args[0]).map(|()| Reply::None)
            }
            Ok(Opcode::ClearScreen) => self.clear_screen(frame.args[0]).map(|()| Reply::None),
            Err(_) => {
                sink.log(DebugLevel::Err, "engine: unknown opcode");
                Err(EngineError::UnknownOpcode(frame.opcode))
            }
        }
    }

    fn set_mode(&mut self, raw: u8) -> Result<(), EngineError> {
        let idx = raw as usize;
        let desc = MODE_TABLE.get(idx).ok_or(EngineError::InvalidMode(raw))?;
        if matches!(desc.kind, ModeKind::Unsupported) || matches!(desc.font, crate::mode::Font::F9x14) {
            return Err(EngineError::InvalidMode(raw));
        }

        let spec = FrameBufferSpec {
            xres: desc.xres(),
            yres_phys: desc.yres_phys(),
            yres_virt: desc.yres_phys() * u32::from(desc.pages),
            depth: 8,
        };
        let handle = self.mailbox.allocate(spec, &CGA_PALETTE_BGR)?;

        self.mode_index = idx;
        self.page = 0;
        self.cursor = CursorState::new();
        self.last_attr = 0x07;
        self.palette_select = 0;
        self.fb = Some(handle);
        self.state = EngineState::Ready;

        let blank = pack_cell(b' ', 0x07);
        let mut i = 0usize;
        while i < self.mode().shadow_cells() {
            if let Some(cell) = self.shadow.get_mut(i) {
                *cell = blank;
            }
            i += 1;
        }
        let pages = self.mode().pages;
        let mut p = 0u8;
        while p < pages {
            self.clear_page(p);
            p += 1;
        }
        Ok(())
    }

    fn require_ready(&self) -> Result<(), EngineError> {
        if self.state == EngineState::Ready {
            Ok(())
        } else {
            Err(EngineError::NotReady)
        }
    }

    fn set_page(&mut self, page: u8) -> Result<(), EngineError> {
        self.require_ready()?;
        if page >= self.mode().pages {
            return Err(EngineError::InvalidPage(page));
        }
        self.page = page;
        self.mailbox
            .set_page_offset(u32::from(page) * self.mode().yres_phys())?;
        Ok(())
    }

    fn set_cursor_pos(&mut self, row: u16, col: u16) -> Result<(), EngineError> {
        self.require_ready()?;
        let (rows, cols) = (self.mode().rows, self.mode().cols);
        let page = self.page;
        let prev = self.cursor.position();
        self.cursor.set_position(row, col, rows, cols);
        self.render_cell(page, prev.0, prev.1);
        let now = self.cursor.position();
        self.render_cell(page, now.0, now.1);
        Ok(())
    }

    fn set_cursor_mode(&mut self, top: u8, bot: u8) -> Result<(), EngineError> {
        self.require_ready()?;
        self.cursor.set_shape(top, bot);
        let page = self.page;
        let (row, col) = self.cursor.position();
        self.render_cell(page, row, col);
        Ok(())
    }

    fn cell_index(&self, page: u8, row: u16, col: u16) -> Option<usize> {
        let mode = self.mode();
        if row >= mode.rows || col >= mode.cols || page >= mode.pages {
            return None;
        }
        let per_page = (mode.rows as usize) * (mode.cols as usize);
        Some((page as usize) * per_page + (row as usize) * (mode.cols as usize) + (col as usize))
    }

    fn put_chr_attr(
        &mut self,
        page: u8,
        row: u16,
        col: u16,
        ch: u8,
        attr: u8,
    ) -> Result<Reply, EngineError> {
        self.require_ready()?;
        let idx = self.cell_index(page, row, col).ok_or(EngineError::OutOfBounds)?;
        if let Some(cell) = self.shadow.get_mut(idx) {
            *cell = pack_cell(ch, attr);
        }
        self.last_attr = attr;
        self.render_cell(page, row, col);
        Ok(Reply::None)
    }

    fn put_chr(&mut self, page: u8, row: u16, col: u16, ch: u8) -> Result<Reply, EngineError> {
        let attr = self.last_attr;
        self.put_chr_attr(page, row, col, ch, attr)
    }

    fn get_chr(&mut self, page: u8, row: u16, col: u16) -> Result<Reply, EngineError> {
        self.require_ready()?;
        let idx = self.cell_index(page, row, col).ok_or(EngineError::OutOfBounds)?;
        let cell = self.shadow.get(idx).copied().unwrap_or_default();
        let (ch, attr) = unpack_cell(cell);
        Ok(Reply::Two(attr, ch))
    }

    fn render_cell(&mut self, page: u8, row: u16, col: u16) {
        let Some(idx) = self.cell_index(page, row, col) else {
            return;
        };
        let Some(cell) = self.shadow.get(idx).copied() else {
            return;
        };
        let (ch, attr) = unpack_cell(cell);
        let mode = *self.mode();
        let cursor_lines = {
            let (crow, ccol) = self.cursor.position();
            (page == self.page && self.cursor.is_visible() && crow == row && ccol == col)
                .then(|| self.cursor.scan_line_range())
        };
        let (fg, bg, transform) = attribute_to_colors(&mode, attr);
        self.blit_glyph(&mode, page, row, col, ch, fg, bg, transform, cursor_lines);
    }

    #[allow(clippy::too_many_arguments)]
    fn blit_glyph(
        &mut self,
        mode: &ModeDescriptor,
        page: u8,
        row: u16,
        col: u16,
        ch: u8,
        fg: u8,
        bg: u8,
        transform: GlyphTransform,
        cursor_lines: Option<(u8, u8)>,
    ) {
        let (_, gh) = mode.font_dims();
        let pitch = self.fb.map_or(mode.xres(), |h| h.pitch);
        let x0 = u32::from(col) * 8;
        let y0 = u32::from(row) * u32::from(gh);
        let fb = self.mailbox.framebuffer_mut();

        let mut gy: u16 = 0;
        while gy < gh {
            let mut bits = glyph_row(ch, gh, gy);
            if transform == GlyphTransform::Invert {
                bits = !bits;
            }
            if transform == GlyphTransform::ForceUnderlineRow && gy == gh.saturating_sub(2) {
                bits = 0xFF;
            }
            if let Some((start, end)) = cursor_lines {
                let line = gy as u8;
                if line >= start && line <= end {
                    bits = !bits;
                }
            }
            let y = y0 + u32::from(gy);
            let row_base = (u32::from(page) * mode.yres_phys() + y) * pitch + x0;
            let mut bit = 0u8;
            while bit < 8 {
                let set = (bits >> (7 - bit)) & 1 == 1;
                let color = if set { fg } else { bg };
                if color != TRANSPARENT {
                    let idx = (row_base + u32::from(bit)) as usize;
                    if let Some(px) = fb.get_mut(idx) {
                        *px = color;
                    }
                }
                bit += 1;
            }
            gy += 1;
        }
    }

    fn scroll(&mut self, up: bool, args: &[u8; 6]) -> Result<(), EngineError> {
        self.require_ready()?;
        let count = u16::from(args[0]);
        let (tl_col, tl_row, br_col, br_row, attr) = (
            u16::from(args[1]),
            u16::from(args[2]),
            u16::from(args[3]),
            u16::from(args[4]),
            args[5],
        );
        let mode = *self.mode();
        if tl_col > br_col || tl_row > br_row || br_col >= mode.cols || br_row >= mode.rows {
            return Err(EngineError::OutOfBounds);
        }
        let page = self.page;
        let window_height = br_row - tl_row + 1;

        // The pixel plane is the only place graphics-mode content lives —
        // the shadow grid below mirrors it for text glyphs only — so every
        // scroll moves the scan-line band the window covers, the same way
        // it moves shadow rows.
        let (_, gh) = mode.font_dims();
        let px0 = u32::from(tl_col) * 8;
        let px1 = (u32::from(br_col) + 1) * 8;
        let py0 = u32::from(tl_row) * u32::from(gh);
        let py1 = (u32::from(br_row) + 1) * u32::from(gh);
        let fill = fill_color(&mode, attr);

        if count == 0 || count >= window_height {
            self.fill_pixel_band(page, &mode, px0, px1, py0, py1, fill);
            let mut r = tl_row;
            while r <= br_row {
                self.fill_row(page, r, tl_col, br_col, attr);
                r += 1;
            }
        } else if up {
            let shift = u32::from(count) * u32::from(gh);
            self.scroll_pixel_band(page, &mode, px0, px1, py0 + shift, py0, py1 - py0 - shift);
            self.fill_pixel_band(page, &mode, px0, px1, py1 - shift, py1, fill);

            let mut r = tl_row;
            while r + count <= br_row {
                self.copy_row(page, r + count, r, tl_col, br_col);
                r += 1;
            }
            let mut r = br_row + 1 - count;
            while r <= br_row {
                self.fill_row(page, r, tl_col, br_col, attr);
                r += 1;
            }
        } else {
            let shift = u32::from(count) * u32::from(gh);
            self.scroll_pixel_band(page, &mode, px0, px1, py0, py0 + shift, py1 - py0 - shift);
            self.fill_pixel_band(page, &mode, px0, px1, py0, py0 + shift, fill);

            let mut r = br_row;
            while r >= tl_row + count {
                self.copy_row(page, r - count, r, tl_col, br_col);
                r -= 1;
            }
            let mut r = tl_row;
            while r < tl_row + count {
                self.fill_row(page, r, tl_col, br_col, attr);
                r += 1;
            }
        }

        let mut r = tl_row;
        while r <= br_row {
            let mut c = tl_col;
            while c <= br_col {
                self.render_cell(page, r, c);
                c += 1;
            }
            r += 1;
        }
        Ok(())
    }

    /// Move `rows` scan lines of the `[x0, x1)` band from `src_y0` to
    /// `dst_y0` within one page's pixel plane — a `memmove`, not a
    /// `memcpy`: when the source and destination bands overlap, the copy
    /// direction is chosen so no row is overwritten before it's read.
    #[allow(clippy::too_many_arguments)]
    fn scroll_pixel_band(
        &mut self,
        page: u8,
        mode: &ModeDescriptor,
        x0: u32,
        x1: u32,
        src_y0: u32,
        dst_y0: u32,
        rows: u32,
    ) {
        if rows == 0 || src_y0 == dst_y0 {
            return;
        }
        let pitch = self.fb.map_or(mode.xres(), |h| h.pitch);
        let page_base = u32::from(page) * mode.yres_phys() * pitch;
        let width = (x1 - x0) as usize;
        let fb = self.mailbox.framebuffer_mut();
        let mut i = 0u32;
        while i < rows {
            let row = if dst_y0 < src_y0 { i } else { rows - 1 - i };
            let src = (page_base + (src_y0 + row) * pitch + x0) as usize;
            let dst = (page_base + (dst_y0 + row) * pitch + x0) as usize;
            if src != dst && src + width <= fb.len() && dst + width <= fb.len() {
                fb.copy_within(src..src + width, dst);
            }
            i += 1;
        }
    }

    /// Fill scan lines `[y0, y1)` of the `[x0, x1)` band with `color`
    /// within one page's pixel plane.
    #[allow(clippy::too_many_arguments)]
    fn fill_pixel_band(
        &mut self,
        page: u8,
        mode: &ModeDescriptor,
        x0: u32,
        x1: u32,
        y0: u32,
        y1: u32,
        color: u8,
    ) {
        if y1 <= y0 {
            return;
        }
        let pitch = self.fb.map_or(mode.xres(), |h| h.pitch);
        let page_base = u32::from(page) * mode.yres_phys() * pitch;
        let width = (x1 - x0) as usize;
        let fb = self.mailbox.framebuffer_mut();
        let mut y = y0;
        while y < y1 {
            let base = (page_base + y * pitch + x0) as usize;
            if let Some(slice) = fb.get_mut(base..base.saturating_add(width)) {
                slice.fill(color);
            }
            y += 1;
        }
    }

    fn copy_row(&mut self, page: u8, src: u16, dst: u16, tl_col: u16, br_col: u16) {
        let mut c = tl_col;
        while c <= br_col {
            if let (Some(s), Some(d)) = (self.cell_index(page, src, c), self.cell_index(page, dst, c)) {
                let v = self.shadow.get(s).copied().unwrap_or_default();
                if let Some(cell) = self.shadow.get_mut(d) {
                    *cell = v;
                }
            }
            c += 1;
        }
    }

    fn fill_row(&mut self, page: u8, row: u16, tl_col: u16, br_col: u16, attr: u8) {
        let mut c = tl_col;
        while c <= br_col {
            if let Some(idx) = self.cell_index(page, row, c) {
                if let Some(cell) = self.shadow.get_mut(idx) {
                    *cell = pack_cell(b' ', attr);
                }
            }
            c += 1;
        }
    }

    fn put_pix(&mut self, page: u8, x: u16, y: u16, color: u8) -> Result<Reply, EngineError> {
        self.require_ready()?;
        let mode = *self.mode();
        if page >= mode.pages || u32::from(x) >= mode.xres() || u32::from(y) >= mode.yres_phys() {
            return Err(EngineError::OutOfBounds);
        }
        let xor = color & 0x80 != 0;
        let c = color & 0x7F;
        let plain = if mode.mono {
            if c != 0 { 15 } else { 0 }
        } else if matches!(self.mode_index, 4 | 5) {
            if c != 0 {
                ((u16::from(c) << 1) + u16::from(self.palette_select)) as u8 & 0x07
            } else {
                0
            }
        } else {
            c & 0x07
        };
        let pitch = self.fb.map_or(mode.xres(), |h| h.pitch);
        let idx = ((u32::from(page) * mode.yres_phys() + u32::from(y)) * pitch + u32::from(x)) as usize;
        if let Some(px) = self.mailbox.framebuffer_mut().get_mut(idx) {
            *px = if xor { *px ^ plain } else { plain };
        }
        Ok(Reply::None)
    }

    fn get_pix(&mut self, page: u8, x: u16, y: u16) -> Result<Reply, EngineError> {
        self.require_ready()?;
        let mode = *self.mode();
        if page >= mode.pages || u32::from(x) >= mode.xres() || u32::from(y) >= mode.yres_phys() {
            return Err(EngineError::OutOfBounds);
        }
        let pitch = self.fb.map_or(mode.xres(), |h| h.pitch);
        let idx = ((u32::from(page) * mode.yres_phys() + u32::from(y)) * pitch + u32::from(x)) as usize;
        let color = self.mailbox.framebuffer_mut().get(idx).copied().unwrap_or(0);
        Ok(Reply::One(color))
    }

    fn select_palette(&mut self, selector: u8) -> Result<(), EngineError> {
        self.require_ready()?;
        self.palette_select = selector & 1;
        Ok(())
    }

    fn clear_screen(&mut self, page: u8) -> Result<(), EngineError> {
        self.require_ready()?;
        if page >= self.mode().pages {
            return Err(EngineError::InvalidPage(page));
        }
        self.clear_page(page);
        if page == self.page {
            let (rows, cols) = (self.mode().rows, self.mode().cols);
            self.cursor.set_position(0, 0, rows, cols);
        }
        Ok(())
    }

    /// Fill one page's pixel plane with black and, in text modes, its
    /// shadow grid with spaces at [`DEFAULT_ATTR`].
    fn clear_page(&mut self, page: u8) {
        let mode = *self.mode();
        match mode.kind {
            ModeKind::Text => {
                let last_col = mode.cols.saturating_sub(1);
                let mut r = 0u16;
                while r < mode.rows {
                    self.fill_row(page, r, 0, last_col, DEFAULT_ATTR);
                    r += 1;
                }
                let mut r = 0u16;
                while r < mode.rows {
                    let mut c = 0u16;
                    while c < mode.cols {
                        self.render_cell(page, r, c);
                        c += 1;
                    }
                    r += 1;
                }
            }
            ModeKind::Graphics => {
                let pitch = self.fb.map_or(mode.xres(), |h| h.pitch);
                let base = (u32::from(page) * mode.yres_phys() * pitch) as usize;
                let len = (mode.yres_phys() * pitch) as usize;
                let color = fill_color(&mode, 0);
                let fb = self.mailbox.framebuffer_mut();
                if let Some(slice) = fb.get_mut(base..base.saturating_add(len)) {
                    slice.fill(color);
                }
            }
            ModeKind::Unsupported => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::NullSink;
    use transport::{QueueSelector, QueuedCommand};

    struct VecMailbox {
        buf: Vec<u8>,
        pitch: u32,
        page_offset: u32,
    }

    impl VecMailbox {
        fn new() -> Self {
            Self { buf: Vec::new(), pitch: 0, page_offset: 0 }
        }
    }

    impl Mailbox for VecMailbox {
        fn allocate(
            &mut self,
            spec: FrameBufferSpec,
            _palette_bgr: &[[u8; 3]; 16],
        ) -> Result<FrameBufferHandle, MailboxError> {
            self.pitch = spec.xres;
            self.buf = vec![0u8; (spec.xres * spec.yres_virt) as usize];
            Ok(FrameBufferHandle { pitch: self.pitch, size: self.buf.len() as u32 })
        }

        fn set_page_offset(&mut self, y_offset: u32) -> Result<(), MailboxError> {
            self.page_offset = y_offset;
            Ok(())
        }

        fn framebuffer_mut(&mut self) -> &mut [u8] {
            &mut self.buf
        }
    }

    fn cmd(opcode: u8, args: [u8; 6]) -> QueuedCommand {
        QueuedCommand { queue: QueueSelector::Vga, frame: CommandFrame { opcode, args } }
    }

    fn ready_engine() -> DisplayEngine<VecMailbox> {
        let mut engine = DisplayEngine::new(VecMailbox::new());
        engine.handle(&cmd(0, [3, 0, 0, 0, 0, 0]), &NullSink).unwrap();
        engine
    }

    #[test]
    fn set_mode_rejects_out_of_range_index() {
        let mut engine = DisplayEngine::new(VecMailbox::new());
        let err = engine.handle(&cmd(0, [200, 0, 0, 0, 0, 0]), &NullSink).unwrap_err();
        assert_eq!(err, EngineError::InvalidMode(200));
    }

    #[test]
    fn set_mode_rejects_unsupported_mode() {
        let mut engine = DisplayEngine::new(VecMailbox::new());
        let err = engine.handle(&cmd(0, [8, 0, 0, 0, 0, 0]), &NullSink).unwrap_err();
        assert_eq!(err, EngineError::InvalidMode(8));
    }

    #[test]
    fn set_page_rejects_page_beyond_mode_pages() {
        let mut engine = ready_engine();
        let err = engine.handle(&cmd(1, [9, 0, 0, 0, 0, 0]), &NullSink).unwrap_err();
        assert_eq!(err, EngineError::InvalidPage(9));
    }

    #[test]
    fn set_cursor_pos_clamps_to_geometry() {
        let mut engine = ready_engine();
        engine.handle(&cmd(2, [0, 0, 200, 200, 0, 0]), &NullSink).unwrap();
        let (row, col) = engine.cursor().position();
        assert!(row < engine.mode().rows);
        assert!(col < engine.mode().cols);
    }

    #[test]
    fn set_cursor_mode_hides_cursor() {
        let mut engine = ready_engine();
        engine.handle(&cmd(3, [0x20, 0x00, 0, 0, 0, 0]), &NullSink).unwrap();
        assert!(!engine.cursor().is_visible());
    }

    #[test]
    fn put_chr_then_get_chr_round_trips() {
        let mut engine = ready_engine();
        // PUT_CHR_ATTR: page=0, char='Q', col=0, row=0, attr=0x17
        engine.handle(&cmd(4, [0, b'Q', 0, 0, 0, 0x17]), &NullSink).unwrap();
        let reply = engine.handle(&cmd(6, [0, 0, 0, 0, 0, 0]), &NullSink).unwrap();
        assert_eq!(reply, Reply::Two(0x17, b'Q'));
    }

    #[test]
    fn put_chr_preserves_last_attribute() {
        let mut engine = ready_engine();
        engine.handle(&cmd(4, [0, b'Q', 0, 0, 0, 0x17]), &NullSink).unwrap();
        // PUT_CHR: page=0, char='R', col=1, row=0
        engine.handle(&cmd(5, [0, b'R', 1, 0, 0, 0]), &NullSink).unwrap();
        let reply = engine.handle(&cmd(6, [0, 0, 1, 0, 0, 0]), &NullSink).unwrap();
        assert_eq!(reply, Reply::Two(0x17, b'R'));
    }

    #[test]
    fn get_chr_out_of_bounds_is_rejected() {
        let mut engine = ready_engine();
        let err = engine.handle(&cmd(6, [255, 255, 0, 0, 0, 0]), &NullSink).unwrap_err();
        assert_eq!(err, EngineError::OutOfBounds);
    }

    #[test]
    fn scroll_up_rejects_inverted_window() {
        let mut engine = ready_engine();
        // count=5, tl_col=2, tl_row=7, br_col=0 (< tl_col): invalid window
        let err = engine.handle(&cmd(7, [5, 2, 7, 0, 0, 0]), &NullSink).unwrap_err();
        assert_eq!(err, EngineError::OutOfBounds);
    }

    #[test]
    fn put_pix_and_get_pix_round_trip_on_mono_graphics() {
        let mut engine = DisplayEngine::new(VecMailbox::new());
        engine.handle(&cmd(0, [6, 0, 0, 0, 0, 0]), &NullSink).unwrap();
        // PUT_PIX: page=0, color=1, x=1, y=1
        engine.handle(&cmd(9, [0, 1, 1, 0, 1, 0]), &NullSink).unwrap();
        let reply = engine.handle(&cmd(10, [0, 0, 1, 0, 1, 0]), &NullSink).unwrap();
        assert_eq!(reply, Reply::One(15));
    }

    #[test]
    fn put_pix_rejects_out_of_plane_coordinates() {
        let mut engine = ready_engine();
        let big = 5000u16.to_le_bytes();
        let err = engine
            .handle(&cmd(9, [0, 3, big[0], big[1], 0, 0]), &NullSink)
            .unwrap_err();
        assert_eq!(err, EngineError::OutOfBounds);
    }

    #[test]
    fn palette_opcode_stores_selector_and_shifts_low_res_color() {
        let mut engine = DisplayEngine::new(VecMailbox::new());
        engine.handle(&cmd(0, [4, 0, 0, 0, 0, 0]), &NullSink).unwrap();
        engine.handle(&cmd(11, [1, 0, 0, 0, 0, 0]), &NullSink).unwrap();
        // PUT_PIX: page=0, color=2, x=2, y=2
        engine.handle(&cmd(9, [0, 2, 2, 0, 2, 0]), &NullSink).unwrap();
        let reply = engine.handle(&cmd(10, [0, 0, 2, 0, 2, 0]), &NullSink).unwrap();
        // ((2 << 1) + palette 1) & 0x07 == 5
        assert_eq!(reply, Reply::One(5));
    }

    #[test]
    fn clear_screen_then_clear_screen_is_idempotent() {
        let mut engine = ready_engine();
        engine.handle(&cmd(4, [0, b'Z', 0, 0, 0, 0x07]), &NullSink).unwrap();
        engine.handle(&cmd(12, [0, 0, 0, 0, 0, 0]), &NullSink).unwrap();
        let first = *engine.mode();
        engine.handle(&cmd(12, [0, 0, 0, 0, 0, 0]), &NullSink).unwrap();
        assert_eq!(engine.cursor().position(), (0, 0));
        assert_eq!(*engine.mode(), first);
    }

    #[test]
    fn unknown_opcode_is_rejected() {
        let mut engine = ready_engine();
        let err = engine.handle(&cmd(63, [0, 0, 0, 0, 0, 0]), &NullSink).unwrap_err();
        assert_eq!(err, EngineError::UnknownOpcode(63));
    }
}
