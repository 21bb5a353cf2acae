//! Display engine opcode table.

/// A decoded display-engine opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Opcode {
    /// Select a mode from [`crate::mode::MODE_TABLE`].
    SetMode,
    /// Select the active display page.
    SetPage,
    /// Move the text cursor.
    SetCursorPos,
    /// Change cursor shape.
    SetCursorMode,
    /// Write a character and attribute byte, advancing the cursor.
    PutChrAttr,
    /// Write a character, reusing the last attribute byte.
    PutChr,
    /// Read back a character and attribute byte.
    GetChr,
    /// Scroll a window of text rows upward.
    ScrollUp,
    /// Scroll a window of text rows downward.
    ScrollDown,
    /// Plot one pixel.
    PutPix,
    /// Read back one pixel.
    GetPix,
    /// Reinstall the palette.
    Palette,
    /// Clear a rectangular window.
    ClearScreen,
}

/// Raised when a 6-bit opcode field doesn't name a known operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownOpcode(pub u8);

impl TryFrom<u8> for Opcode {
    type Error = UnknownOpcode;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Self::SetMode),
            1 => Ok(Self::SetPage),
            2 => Ok(Self::SetCursorPos),
            3 => Ok(Self::SetCursorMode),
            4 => Ok(Self::PutChrAttr),
            5 => Ok(Self::PutChr),
            6 => Ok(Self::GetChr),
            7 => Ok(Self::ScrollUp),
            8 => Ok(Self::ScrollDown),
            9 => Ok(Self::PutPix),
            10 => Ok(Self::GetPix),
            11 => Ok(Self::Palette),
            12 => Ok(Self::ClearScreen),
            other => Err(UnknownOpcode(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_known_opcode() {
        let known = [
            Opcode::SetMode,
            Opcode::SetPage,
            Opcode::SetCursorPos,
            Opcode::SetCursorMode,
            Opcode::PutChrAttr,
            Opcode::PutChr,
            Opcode::GetChr,
            Opcode::ScrollUp,
            Opcode::ScrollDown,
            Opcode::PutPix,
            Opcode::GetPix,
            Opcode::Palette,
            Opcode::ClearScreen,
        ];
        for (i, op) in known.iter().enumerate() {
            assert_eq!(Opcode::try_from(i as u8).unwrap(), *op);
        }
    }

    #[test]
    fn rejects_out_of_range_opcode() {
        assert_eq!(Opcode::try_from(63), Err(UnknownOpcode(63)));
    }
}
