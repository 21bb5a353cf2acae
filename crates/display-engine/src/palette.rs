//! The fixed 16-entry CGA palette and monochrome color slots.

/// Sentinel background color meaning "don't plot this pixel" — used when
/// blitting glyphs over graphics-mode content.
pub const TRANSPARENT: u8 = 255;

/// The 16-color CGA palette, in BGR byte order (as installed via the
/// mailbox at `SET_MODE` time).
pub const CGA_PALETTE_BGR: [[u8; 3]; 16] = [
    [0x00, 0x00, 0x00], // 0  black
    [0xAA, 0x00, 0x00], // 1  blue
    [0x00, 0xAA, 0x00], // 2  green
    [0xAA, 0xAA, 0x00], // 3  cyan
    [0x00, 0x00, 0xAA], // 4  red
    [0xAA, 0x00, 0xAA], // 5  magenta
    [0x00, 0x55, 0xAA], // 6  brown
    [0xAA, 0xAA, 0xAA], // 7  light gray
    [0x55, 0x55, 0x55], // 8  dark gray
    [0xFF, 0x55, 0x55], // 9  light blue
    [0x55, 0xFF, 0x55], // 10 light green
    [0xFF, 0xFF, 0x55], // 11 light cyan
    [0x55, 0x55, 0xFF], // 12 light red
    [0xFF, 0x55, 0xFF], // 13 light magenta
    [0x55, 0xFF, 0xFF], // 14 yellow
    [0xFF, 0xFF, 0xFF], // 15 white
];

/// Monochrome text background palette index.
pub const MONO_BG_TXT: u8 = 0;
/// Monochrome text normal-intensity foreground palette index.
pub const MONO_FG_TXT: u8 = 7;
/// Monochrome text high-intensity foreground palette index.
pub const MONO_HFG_TXT: u8 = 15;
