//! Mode/page/font state machine, shadow text grid, and opcode dispatch for
//! the VGA/MDA display adapter emulator.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod attribute;
pub mod cursor;
pub mod engine;
pub mod font;
pub mod mode;
pub mod opcode;
pub mod palette;

pub use attribute::{attribute_to_colors, fill_color, GlyphTransform, MonoAttr};
pub use cursor::{CursorState, BLINK_INTERVAL_US};
pub use engine::{DisplayEngine, EngineError, EngineState, Reply, SHADOW_CELLS};
pub use mode::{Font, ModeDescriptor, ModeKind, MODE_COUNT, MODE_TABLE};
pub use opcode::{Opcode, UnknownOpcode};
pub use palette::{CGA_PALETTE_BGR, MONO_BG_TXT, MONO_FG_TXT, MONO_HFG_TXT, TRANSPARENT};
