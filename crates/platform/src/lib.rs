//! Hardware Abstraction Layer for the VGA/MDA display adapter emulator.
//!
//! This crate defines trait-based seams for every collaborator that lives
//! outside the emulator's own logic: the serial byte stream, the monotonic
//! clock, the frame-buffer-allocating mailbox, the RTS/activity-LED GPIO
//! outputs, and the debug log sink. None of them are implemented against
//! real silicon here — `firmware::mocks` carries the `std`-only test
//! doubles this workspace's own test suite runs against.
//!
//! # Architecture
//!
//! ```text
//! transport / display-engine (the emulator core)
//!         ↓ (trait bounds, no dyn dispatch)
//! platform (this crate — ByteLink, Clock, Mailbox, DebugSink, gpio)
//!         ↓
//! real hardware driver or test mock (out of scope for this crate)
//! ```
//!
//! # Features
//!
//! - `std`: enables the `tracing`-backed [`DebugSink`] used by desktop/test builds.
//! - `hardware` / `defmt`: enables the `defmt`-backed [`DebugSink`] used on target.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod byte_link;
pub mod clock;
pub mod debug;
pub mod gpio;
pub mod mailbox;

pub use byte_link::ByteLink;
pub use clock::Clock;
pub use debug::{DebugLevel, DebugSink, NullSink};
#[cfg(feature = "defmt")]
pub use debug::DefmtSink;
#[cfg(feature = "std")]
pub use debug::TracingSink;
pub use gpio::{Output, OutputPin, Pin, PinState, PushPull};
pub use mailbox::{FrameBufferSpec, Mailbox, MailboxError};
