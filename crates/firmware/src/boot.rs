//! Boot sequencing: bring the display engine from power-on to its initial
//! mode before the main loop starts accepting commands.
//!
//! Initializing the actual UART, GPIO, system timer, and mailbox peripherals
//! is out of scope (see crate docs) — this module only sequences the steps
//! that are expressible against the `platform` traits once those
//! collaborators exist.

use display_engine::DisplayEngine;
use platform::{DebugLevel, DebugSink, Mailbox};
use transport::{CommandFrame, QueueSelector, QueuedCommand};

/// The mode the engine boots into, matching the original firmware's default
/// 80x25 16-color text mode.
pub const BOOT_MODE: u8 = 3;

/// Errors that can abort the boot sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootError {
    /// The initial `SET_MODE` command was rejected.
    ModeSetupFailed,
}

impl core::fmt::Display for BootError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ModeSetupFailed => write!(f, "boot: initial SET_MODE failed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BootError {}

/// Drive the engine through its one-time boot sequence: install
/// [`BOOT_MODE`] and log the milestone.
///
/// Returns an error rather than looping forever on failure — the caller
/// decides what "stuck at boot" means for its target (retry, halt, reset).
pub fn run_boot<M: Mailbox>(
    engine: &mut DisplayEngine<M>,
    sink: &impl DebugSink,
) -> Result<(), BootError> {
    sink.log(DebugLevel::Info, "boot: installing initial mode");
    let cmd = QueuedCommand {
        queue: QueueSelector::Vga,
        frame: CommandFrame {
            opcode: 0, // SET_MODE
            args: [BOOT_MODE, 0, 0, 0, 0, 0],
        },
    };
    engine
        .handle(&cmd, sink)
        .map_err(|_| BootError::ModeSetupFailed)?;
    sink.log(DebugLevel::Info, "boot: ready");
    Ok(())
}
