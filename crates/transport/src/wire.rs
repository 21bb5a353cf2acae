//! Wire-level command frame layout.

/// Decoded frame length: opcode byte plus six argument bytes.
pub const FRAME_LEN: usize = 7;

/// Destination queue, encoded in the top two bits of the wire opcode byte.
///
/// The source additionally names a fourth constant, `OTHER2`, but the 2-bit
/// wire field cannot reach it once [`QueueSelector::System`] and
/// [`QueueSelector::Abort`] occupy values 2 and 3 — it is documented dead
/// code in the original and has no reachable variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QueueSelector {
    /// Routed to the display engine.
    Vga,
    /// Reserved, no-op in the main loop.
    Other1,
    /// System commands (currently only `ECHO`).
    System,
    /// Requests main-loop shutdown.
    Abort,
}

impl QueueSelector {
    /// Decode the 2-bit selector field (already shifted down to bits `1:0`).
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::Vga,
            1 => Self::Other1,
            2 => Self::System,
            _ => Self::Abort,
        }
    }
}

/// A reassembled command: a one-byte opcode plus six argument bytes.
///
/// Argument byte meaning is opcode-dependent; see the display engine's
/// opcode table for the per-opcode layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandFrame {
    /// The 6-bit opcode (top two bits of the wire byte already stripped).
    pub opcode: u8,
    /// The six argument bytes, in wire order.
    pub args: [u8; 6],
}

impl CommandFrame {
    /// Split a 7-byte decoded frame into its queue selector and command.
    pub fn decode(raw: &[u8; FRAME_LEN]) -> (QueueSelector, Self) {
        let queue = QueueSelector::from_bits(raw[0] >> 6);
        let opcode = raw[0] & 0x3F;
        let mut args = [0u8; 6];
        args.copy_from_slice(&raw[1..FRAME_LEN]);
        (queue, Self { opcode, args })
    }
}

/// A command frame tagged with the queue it was routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuedCommand {
    /// Destination queue.
    pub queue: QueueSelector,
    /// The decoded command.
    pub frame: CommandFrame,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_selector_decodes_all_reachable_values() {
        assert_eq!(QueueSelector::from_bits(0), QueueSelector::Vga);
        assert_eq!(QueueSelector::from_bits(1), QueueSelector::Other1);
        assert_eq!(QueueSelector::from_bits(2), QueueSelector::System);
        assert_eq!(QueueSelector::from_bits(3), QueueSelector::Abort);
    }

    #[test]
    fn decode_splits_opcode_and_queue() {
        let raw = [0xC0u8, 1, 2, 3, 4, 5, 6];
        let (queue, frame) = CommandFrame::decode(&raw);
        assert_eq!(queue, QueueSelector::Abort);
        assert_eq!(frame.opcode, 0);
        assert_eq!(frame.args, [1, 2, 3, 4, 5, 6]);
    }
}
