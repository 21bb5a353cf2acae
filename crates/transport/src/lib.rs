//! Serial command transport: SLIP-style packet reassembly and a bounded
//! FIFO dispatcher feeding the display engine and system queue.
//!
//! ```text
//! host bytes -> Reassembler::poll -> Dispatcher::enqueue
//!                                         |
//!                    main loop <- Dispatcher::dequeue
//! ```

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dispatcher;
pub mod slip;
pub mod wire;

pub use dispatcher::{Dispatcher, DispatcherError, CMD_Q_LEN};
pub use slip::{Reassembler, ReassemblerError, END, ESC, ESC_END, ESC_ESC};
pub use wire::{CommandFrame, QueueSelector, QueuedCommand, FRAME_LEN};
