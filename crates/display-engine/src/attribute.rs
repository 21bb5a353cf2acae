//! Attribute-to-color derivation.
//!
//! The original firmware repeats the same mode-family branching at every
//! call site that needs foreground/background colors from an attribute
//! byte (`fb_put_char`, `fb_clear_fbuffer_window`, `fb_scroll_fbuffer`).
//! Factored here into two pure functions so the blitter and the
//! scroll/clear fill logic share one source of truth.

use crate::mode::{ModeDescriptor, ModeKind};
use crate::palette::{MONO_BG_TXT, MONO_FG_TXT, MONO_HFG_TXT, TRANSPARENT};

/// Monochrome text attribute byte, decoded into its discrete meanings.
///
/// Mono modes don't use the attribute byte as an (fg, bg) nibble pair the
/// way color modes do — it selects one of a small fixed set of rendering
/// styles, matching the original MDA attribute convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonoAttr {
    /// Normal intensity, no decoration.
    Normal,
    /// Normal intensity, underlined.
    Underline,
    /// High intensity.
    HighIntensity,
    /// High intensity, underlined.
    HighIntensityUnderline,
    /// Foreground/background swapped.
    Inverse,
    /// Foreground equals background — invisible.
    Hidden,
}

impl MonoAttr {
    /// Decode a raw attribute byte into its mono-mode meaning.
    pub const fn from_byte(byte: u8) -> Self {
        match byte {
            0x00 => Self::Hidden,
            0x01 => Self::Underline,
            0x09 => Self::HighIntensity,
            0x0F => Self::HighIntensityUnderline,
            0x70 => Self::Inverse,
            _ => Self::Normal,
        }
    }
}

/// How the glyph blitter should transform the raw glyph row before
/// plotting, beyond the plain (fg, bg) substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphTransform {
    /// No transform.
    None,
    /// Bitwise-invert the glyph row (mono inverse video).
    Invert,
    /// Force the underline scan line (second-to-last glyph row) fully set.
    ForceUnderlineRow,
}

/// Derive (foreground, background, transform) for rendering one glyph.
pub fn attribute_to_colors(mode: &ModeDescriptor, attr: u8) -> (u8, u8, GlyphTransform) {
    match mode.kind {
        ModeKind::Text if mode.mono => match MonoAttr::from_byte(attr) {
            MonoAttr::Hidden => (MONO_BG_TXT, MONO_BG_TXT, GlyphTransform::None),
            MonoAttr::Inverse => (MONO_FG_TXT, MONO_BG_TXT, GlyphTransform::Invert),
            MonoAttr::Underline => (MONO_FG_TXT, MONO_BG_TXT, GlyphTransform::ForceUnderlineRow),
            MonoAttr::HighIntensity => (MONO_HFG_TXT, MONO_BG_TXT, GlyphTransform::None),
            MonoAttr::HighIntensityUnderline => {
                (MONO_HFG_TXT, MONO_BG_TXT, GlyphTransform::ForceUnderlineRow)
            }
            MonoAttr::Normal => (MONO_FG_TXT, MONO_BG_TXT, GlyphTransform::None),
        },
        ModeKind::Text => (attr & 0x0F, (attr >> 4) & 0x0F, GlyphTransform::None),
        ModeKind::Graphics if mode.mono => {
            let fg = if attr != 0 { 15 } else { 0 };
            (fg, TRANSPARENT, GlyphTransform::None)
        }
        ModeKind::Graphics => (attr, TRANSPARENT, GlyphTransform::None),
        ModeKind::Unsupported => (0, 0, GlyphTransform::None),
    }
}

/// Derive the single fill color used to clear or scroll-vacate an area.
pub fn fill_color(mode: &ModeDescriptor, attr: u8) -> u8 {
    match mode.kind {
        ModeKind::Text if mode.mono => match MonoAttr::from_byte(attr) {
            MonoAttr::Inverse => MONO_FG_TXT,
            _ => MONO_BG_TXT,
        },
        ModeKind::Text => (attr >> 4) & 0x0F,
        ModeKind::Graphics => attr,
        ModeKind::Unsupported => 0,
    }
}
