//! SLIP-style byte-stuffed packet reassembler.
//!
//! A frame is any run of bytes delimited by [`END`]. Inside a frame, [`ESC`]
//! introduces a one-byte escape. Back-to-back `END` bytes collapse (an
//! empty buffer at `END` is a no-op, letting the host resynchronize), and a
//! frame that is not exactly [`FRAME_LEN`] bytes when `END` arrives is
//! dropped as malformed.
//!
//! An escape byte following [`ESC`] that is neither [`ESC_END`] nor
//! [`ESC_ESC`] is stored literally — this is implementation-defined
//! behavior preserved from the original firmware, not a deliberate protocol
//! extension.

use crate::wire::{CommandFrame, QueuedCommand, FRAME_LEN};
use crate::dispatcher::Dispatcher;
use platform::byte_link::ByteLink;
use platform::debug::{DebugLevel, DebugSink};

/// Frame delimiter.
pub const END: u8 = 0xC0;
/// Escape introducer.
pub const ESC: u8 = 0xDB;
/// Escaped representation of [`END`].
pub const ESC_END: u8 = 0xDC;
/// Escaped representation of [`ESC`].
pub const ESC_ESC: u8 = 0xDD;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReassemblerState {
    Idle,
    InFrame,
    EscPending,
    OverflowRecovery,
}

/// Errors the reassembler can report for a single input byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReassemblerError {
    /// `END` arrived with a buffer length other than `0` or [`FRAME_LEN`].
    MalformedFrame,
    /// A ninth byte arrived before `END` was seen.
    Overflow,
}

/// The packet reassembler's own state: a working buffer plus the state tag.
pub struct Reassembler {
    state: ReassemblerState,
    buf: [u8; FRAME_LEN],
    len: usize,
}

impl Default for Reassembler {
    fn default() -> Self {
        Self::new()
    }
}

impl Reassembler {
    /// Construct a reassembler in the idle state.
    pub const fn new() -> Self {
        Self {
            state: ReassemblerState::Idle,
            buf: [0; FRAME_LEN],
            len: 0,
        }
    }

    fn reset(&mut self) {
        self.state = ReassemblerState::Idle;
        self.len = 0;
    }

    /// Feed one raw byte into the state machine.
    ///
    /// Returns `Ok(Some(frame))` when this byte completed a valid frame,
    /// `Ok(None)` when more bytes are needed, or `Err` when the byte caused
    /// the in-progress frame to be dropped (already logged via `sink`).
    pub fn feed(
        &mut self,
        byte: u8,
        sink: &impl DebugSink,
    ) -> Result<Option<[u8; FRAME_LEN]>, ReassemblerError> {
        if self.state == ReassemblerState::OverflowRecovery {
            if byte == END {
                self.reset();
            }
            return Ok(None);
        }

        if byte == END {
            if self.len == 0 {
                return Ok(None);
            }
            let result = if self.len == FRAME_LEN {
                let mut out = [0u8; FRAME_LEN];
                out.copy_from_slice(&self.buf);
                Ok(Some(out))
            } else {
                sink.log(DebugLevel::Err, "slip: malformed frame, wrong length");
                Err(ReassemblerError::MalformedFrame)
            };
            self.reset();
            return result;
        }

        if byte == ESC && self.state != ReassemblerState::EscPending {
            self.state = ReassemblerState::EscPending;
            return Ok(None);
        }

        let decoded = if self.state == ReassemblerState::EscPending {
            match byte {
                ESC_END => END,
                ESC_ESC => ESC,
                other => other,
            }
        } else {
            byte
        };

        if self.len == FRAME_LEN {
            self.state = ReassemblerState::OverflowRecovery;
            self.len = 0;
            sink.log(DebugLevel::Err, "slip: buffer overflow, frame dropped");
            return Err(ReassemblerError::Overflow);
        }

        self.buf[self.len] = decoded;
        self.len += 1;
        self.state = ReassemblerState::InFrame;
        Ok(None)
    }

    /// Drain `link` until one frame has been reassembled and enqueued, or
    /// the link reports no more bytes ready. RTS is driven low for the
    /// duration of this call and high on return — the flow-control contract
    /// toward the host.
    ///
    /// Returns the number of frames produced (0 or 1).
    pub fn poll<L: ByteLink>(
        &mut self,
        link: &mut L,
        dispatcher: &mut Dispatcher,
        sink: &impl DebugSink,
    ) -> usize {
        let _ = link.rts().set_low();
        let mut produced = 0usize;
        while let Some(byte) = link.try_recv() {
            match self.feed(byte, sink) {
                Ok(Some(raw)) => {
                    let (queue, frame) = CommandFrame::decode(&raw);
                    if dispatcher.enqueue(QueuedCommand { queue, frame }).is_err() {
                        sink.log(DebugLevel::Err, "dispatcher: queue full, command dropped");
                    }
                    produced += 1;
                    break;
                }
                Ok(None) => continue,
                Err(_) => continue,
            }
        }
        let _ = link.rts().set_high();
        produced
    }
}
