//! Test doubles for the four platform traits, used by this crate's
//! integration tests and available to downstream crates under `std`.

#![cfg(any(test, feature = "std"))]

use std::cell::RefCell;
use std::collections::VecDeque;

use platform::mailbox::{FrameBufferHandle, FrameBufferSpec, MailboxError};
use platform::{ByteLink, Clock, DebugLevel, DebugSink, Mailbox, OutputPin};
use std::convert::Infallible;

/// An [`OutputPin`] that records the last state it was driven to.
#[derive(Debug, Default)]
pub struct RecordingPin {
    high: bool,
}

impl embedded_hal::digital::ErrorType for RecordingPin {
    type Error = Infallible;
}

impl OutputPin for RecordingPin {
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high = true;
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = false;
        Ok(())
    }
}

impl RecordingPin {
    /// Current driven state.
    pub fn is_high(&self) -> bool {
        self.high
    }
}

/// An in-memory, queue-backed [`ByteLink`]: bytes pushed with
/// [`VecByteLink::inject`] are what `try_recv` yields; bytes sent through
/// `send` accumulate in [`VecByteLink::sent`].
pub struct VecByteLink {
    inbound: VecDeque<u8>,
    sent: Vec<u8>,
    rts_pin: RecordingPin,
    led: RecordingPin,
}

impl VecByteLink {
    /// An empty link with no pending bytes.
    pub fn new() -> Self {
        Self {
            inbound: VecDeque::new(),
            sent: Vec::new(),
            rts_pin: RecordingPin::default(),
            led: RecordingPin::default(),
        }
    }

    /// Queue bytes to be returned by subsequent `try_recv` calls.
    pub fn inject(&mut self, bytes: &[u8]) {
        self.inbound.extend(bytes.iter().copied());
    }

    /// Bytes sent so far, in order.
    pub fn sent(&self) -> &[u8] {
        &self.sent
    }

    /// Whether RTS was left asserted (driven low) after the last operation.
    pub fn rts_is_asserted(&self) -> bool {
        !self.rts_pin.is_high()
    }
}

impl Default for VecByteLink {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteLink for VecByteLink {
    type PinError = core::convert::Infallible;
    type Rts = RecordingPin;
    type ActivityLed = RecordingPin;

    fn try_recv(&mut self) -> Option<u8> {
        self.inbound.pop_front()
    }

    fn send(&mut self, byte: u8) {
        self.sent.push(byte);
    }

    fn rts(&mut self) -> &mut Self::Rts {
        &mut self.rts_pin
    }

    fn activity_led(&mut self) -> &mut Self::ActivityLed {
        &mut self.led
    }
}

/// A [`Clock`] whose reading is set directly by the test.
#[derive(Debug, Default)]
pub struct FakeClock {
    now: RefCell<u32>,
}

impl FakeClock {
    /// A clock starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock by the given number of microseconds.
    pub fn advance(&self, us: u32) {
        *self.now.borrow_mut() = self.now.borrow().wrapping_add(us);
    }
}

impl Clock for FakeClock {
    fn now_us(&self) -> u32 {
        *self.now.borrow()
    }
}

/// An in-memory [`Mailbox`]: allocates a `Vec<u8>` sized to the requested
/// geometry and records the installed palette and page offset.
pub struct FakeMailbox {
    buf: Vec<u8>,
    pitch: u32,
    palette: [[u8; 3]; 16],
    page_offset: u32,
    allocations: u32,
}

impl FakeMailbox {
    /// A mailbox with no allocation yet.
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            pitch: 0,
            palette: [[0; 3]; 16],
            page_offset: 0,
            allocations: 0,
        }
    }

    /// Number of times `allocate` has been called.
    pub fn allocation_count(&self) -> u32 {
        self.allocations
    }

    /// The palette installed by the most recent `allocate` call.
    pub fn installed_palette(&self) -> &[[u8; 3]; 16] {
        &self.palette
    }
}

impl Default for FakeMailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Mailbox for FakeMailbox {
    fn allocate(
        &mut self,
        spec: FrameBufferSpec,
        palette_bgr: &[[u8; 3]; 16],
    ) -> Result<FrameBufferHandle, MailboxError> {
        if spec.xres == 0 || spec.yres_virt == 0 {
            return Err(MailboxError::InvalidGeometry);
        }
        self.pitch = spec.xres;
        self.palette = *palette_bgr;
        let size = spec.xres * spec.yres_virt;
        self.buf = vec![0u8; size as usize];
        self.allocations += 1;
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

/// A [`DebugSink`] that appends every accepted message to a `Vec`, for
/// assertions on what the engine logged.
#[derive(Default)]
pub struct CollectingSink {
    messages: RefCell<Vec<(DebugLevel, String)>>,
}

impl CollectingSink {
    /// A sink at `Verbose` level, so everything is collected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages collected so far.
    pub fn messages(&self) -> Vec<(DebugLevel, String)> {
        self.messages.borrow().clone()
    }
}

impl DebugSink for CollectingSink {
    fn level(&self) -> DebugLevel {
        DebugLevel::Verbose
    }

    fn log(&self, level: DebugLevel, message: &str) {
        if self.is_enabled(level) {
            self.messages.borrow_mut().push((level, message.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_byte_link_replays_injected_bytes() {
        let mut link = VecByteLink::new();
        link.inject(&[1, 2, 3]);
        assert_eq!(link.try_recv(), Some(1));
        assert_eq!(link.try_recv(), Some(2));
        assert_eq!(link.try_recv(), Some(3));
        assert_eq!(link.try_recv(), None);
    }

    #[test]
    fn fake_clock_advances() {
        let clock = FakeClock::new();
        assert_eq!(clock.now_us(), 0);
        clock.advance(100);
        assert_eq!(clock.now_us(), 100);
    }

    #[test]
    fn fake_mailbox_rejects_empty_geometry() {
        let mut mb = FakeMailbox::new();
        let spec = FrameBufferSpec { xres: 0, yres_phys: 0, yres_virt: 0, depth: 8 };
        assert!(mb.allocate(spec, &[[0; 3]; 16]).is_err());
    }

    #[test]
    fn collecting_sink_gathers_messages() {
        let sink = CollectingSink::new();
        sink.log(DebugLevel::Info, "hello");
        assert_eq!(sink.messages().len(), 1);
    }
}
