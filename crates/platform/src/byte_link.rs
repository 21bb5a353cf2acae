//! Serial byte stream abstraction.
//!
//! The real collaborator is an interrupt-driven UART: an ISR appends
//! received bytes to a ring buffer, and `try_recv` drains it. That ISR is
//! out of scope for this crate — [`ByteLink`] only states the interface the
//! transport layer polls against, plus the two single-bit outputs (RTS,
//! activity LED) the original firmware toggles around the receive loop.

use embedded_hal::digital::{self, OutputPin};

/// A non-blocking byte stream to/from the host, plus its two control outputs.
///
/// `try_recv` must never block: the transport layer's `poll()` loop relies
/// on it returning `None` promptly once the receive ring is drained, so it
/// can deassert RTS and return control to the main loop.
pub trait ByteLink {
    /// Error type for the control outputs.
    type PinError: digital::Error;
    /// RTS output pin type.
    type Rts: OutputPin<Error = Self::PinError>;
    /// Activity LED output pin type.
    type ActivityLed: OutputPin<Error = Self::PinError>;

    /// Pop one received byte, if any are buffered.
    fn try_recv(&mut self) -> Option<u8>;

    /// Transmit one byte. Implementations may buffer internally; this trait
    /// makes no guarantee about when the byte physically leaves the wire.
    fn send(&mut self, byte: u8);

    /// Transmit a run of bytes in order.
    fn send_all(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.send(b);
        }
    }

    /// Access to the RTS output.
    fn rts(&mut self) -> &mut Self::Rts;

    /// Access to the activity LED output.
    fn activity_led(&mut self) -> &mut Self::ActivityLed;
}
