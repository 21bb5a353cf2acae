//! End-to-end coverage of mode switching, glyph rendering, scrolling, and
//! pixel round-trips against an in-memory mailbox double.

use display_engine::{DisplayEngine, EngineState, Reply};
use platform::mailbox::{FrameBufferHandle, FrameBufferSpec, MailboxError};
use platform::{Mailbox, NullSink};
use transport::{CommandFrame, QueueSelector, QueuedCommand};

struct VecMailbox {
    buf: Vec<u8>,
    pitch: u32,
    palette: [[u8; 3]; 16],
    page_offset: u32,
}

impl VecMailbox {
    fn new() -> Self {
        Self {
            buf: Vec::new(),
            pitch: 0,
            palette: [[0; 3]; 16],
            page_offset: 0,
        }
    }
}

impl Mailbox for VecMailbox {
    fn allocate(
        &mut self,
        spec: FrameBufferSpec,
        palette_bgr: &[[u8; 3]; 16],
    ) -> Result<FrameBufferHandle, MailboxError> {
        self.pitch = spec.xres;
        self.palette = *palette_bgr;
        let size = spec.xres * spec.yres_virt;
        self.buf = vec![0u8; size as usize];
        Ok(FrameBufferHandle { pitch: self.pitch, size })
    }

    fn set_page_offset(&mut self, y_offset: u32) -> Result<(), MailboxError> {
        self.page_offset = y_offset;
        Ok(())
    }

    fn framebuffer_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }
}

fn frame(opcode: u8, args: [u8; 6]) -> QueuedCommand {
    QueuedCommand {
        queue: QueueSelector::Vga,
        frame: CommandFrame { opcode, args },
    }
}

#[test]
fn commands_before_set_mode_are_rejected() {
    let mut engine = DisplayEngine::new(VecMailbox::new());
    let sink = NullSink;
    let result = engine.handle(&frame(4, [0, b'X', 0, 0, 0, 0x07]), &sink);
    assert!(result.is_err());
    assert_eq!(engine.state(), EngineState::Uninit);
}

#[test]
fn set_mode_then_put_char_renders_expected_pixels() {
    let mut engine = DisplayEngine::new(VecMailbox::new());
    let sink = NullSink;

    engine.handle(&frame(0, [3, 0, 0, 0, 0, 0]), &sink).unwrap();
    assert_eq!(engine.state(), EngineState::Ready);

    // PUT_CHR_ATTR: page=0, char='A', col=0, row=0, attr=0x07
    engine
        .handle(&frame(4, [0, b'A', 0, 0, 0, 0x07]), &sink)
        .unwrap();

    let reply = engine.handle(&frame(6, [0, 0, 0, 0, 0, 0]), &sink).unwrap();
    assert_eq!(reply, Reply::Two(0x07, b'A'));
}

#[test]
fn get_pix_reflects_put_pix() {
    let mut engine = DisplayEngine::new(VecMailbox::new());
    let sink = NullSink;
    // Mode 6 is graphics but not one of the palette-indexed low-res modes,
    // so the plain color passes through masked to 3 bits.
    engine.handle(&frame(0, [6, 0, 0, 0, 0, 0]), &sink).unwrap();

    let x = 10u16.to_le_bytes();
    let y = 20u16.to_le_bytes();
    // PUT_PIX: page=0, color=3, x=10, y=20
    engine
        .handle(&frame(9, [0, 3, x[0], x[1], y[0], y[1]]), &sink)
        .unwrap();
    let reply = engine
        .handle(&frame(10, [0, 0, x[0], x[1], y[0], y[1]]), &sink)
        .unwrap();
    assert_eq!(reply, Reply::One(3));
}

#[test]
fn xor_pixel_restores_prior_value_when_reapplied() {
    let mut engine = DisplayEngine::new(VecMailbox::new());
    let sink = NullSink;
    engine.handle(&frame(0, [4, 0, 0, 0, 0, 0]), &sink).unwrap();

    let x = 10u16.to_le_bytes();
    let y = 10u16.to_le_bytes();
    let before = engine
        .handle(&frame(10, [0, 0, x[0], x[1], y[0], y[1]]), &sink)
        .unwrap();

    engine
        .handle(&frame(9, [0, 0x03, x[0], x[1], y[0], y[1]]), &sink)
        .unwrap();
    engine
        .handle(&frame(9, [0, 0x83, x[0], x[1], y[0], y[1]]), &sink)
        .unwrap();

    let after = engine
        .handle(&frame(10, [0, 0, x[0], x[1], y[0], y[1]]), &sink)
        .unwrap();
    assert_eq!(before, after);
}

#[test]
fn clear_screen_resets_every_cell_to_space() {
    let mut engine = DisplayEngine::new(VecMailbox::new());
    let sink = NullSink;
    engine.handle(&frame(0, [3, 0, 0, 0, 0, 0]), &sink).unwrap();
    // PUT_CHR_ATTR: page=0, char='Z', col=1, row=1, attr=0x07
    engine
        .handle(&frame(4, [0, b'Z', 1, 1, 0, 0x07]), &sink)
        .unwrap();
    engine.handle(&frame(12, [0, 0, 0, 0, 0, 0]), &sink).unwrap();
    let reply = engine.handle(&frame(6, [0, 0, 1, 1, 0, 0]), &sink).unwrap();
    assert_eq!(reply, Reply::Two(0x07, b' '));
}

#[test]
fn scroll_up_vacates_bottom_row_with_fill_attribute() {
    let mut engine = DisplayEngine::new(VecMailbox::new());
    let sink = NullSink;
    engine.handle(&frame(0, [3, 0, 0, 0, 0, 0]), &sink).unwrap();
    // PUT_CHR_ATTR: page=0, char='X', col=0, row=0, attr=0x07
    engine
        .handle(&frame(4, [0, b'X', 0, 0, 0, 0x07]), &sink)
        .unwrap();
    // PUT_CHR_ATTR: page=0, char='Y', col=0, row=1, attr=0x07
    engine
        .handle(&frame(4, [0, b'Y', 0, 1, 0, 0x07]), &sink)
        .unwrap();

    // SCROLL_UP: count=1, window covers cols 0..=79, rows 0..=1, fill=0x07
    engine.handle(&frame(7, [1, 0, 0, 79, 1, 0x07]), &sink).unwrap();

    let reply = engine.handle(&frame(6, [0, 0, 0, 0, 0, 0]), &sink).unwrap();
    assert_eq!(reply, Reply::Two(0x07, b'Y'));
    let reply = engine.handle(&frame(6, [0, 0, 0, 1, 0, 0]), &sink).unwrap();
    assert_eq!(reply, Reply::Two(0x07, b' '));
}

#[test]
fn invalid_mode_is_rejected() {
    let mut engine = DisplayEngine::new(VecMailbox::new());
    let sink = NullSink;
    assert!(engine.handle(&frame(0, [8, 0, 0, 0, 0, 0]), &sink).is_err());
    assert_eq!(engine.state(), EngineState::Uninit);
}
