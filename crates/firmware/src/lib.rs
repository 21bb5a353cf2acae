//! Ties the transport and display-engine crates into the main loop that
//! drives the emulated VGA/MDA display adapter.
//!
//! # Architecture
//!
//! ```text
//! ByteLink (UART)  --poll-->  Reassembler  --enqueue-->  Dispatcher
//!                                                              |
//!                                                        dequeue per tick
//!                                                              v
//!                                                        DisplayEngine
//!                                                              |
//!                                                     Mailbox framebuffer
//! ```
//!
//! # Features
//!
//! - `hardware` — build against real embedded collaborators (`defmt`, a
//!   `critical-section` executor). No concrete hardware driver ships here;
//!   wiring real UART/GPIO/mailbox peripherals to silicon is left to the
//!   board-bringup crate that depends on this one.
//! - `std` — enable [`mocks`] and standard-library-backed test doubles.

#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod boot;
pub mod emulator;
pub mod mocks;

pub use boot::{run_boot, BootError, BOOT_MODE};
pub use emulator::{MainLoop, MainLoopOutcome};
