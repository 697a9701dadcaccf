#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::too_many_lines,
    clippy::cast_lossless,
    clippy::cast_precision_loss,
    clippy::must_use_candidate,
    clippy::struct_excessive_bools,
    clippy::return_self_not_must_use,
    clippy::field_reassign_with_default,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]
//! Render engine for a code minimap: a shrunken, colored overview of a
//! whole document drawn beside the editor, with live overlays and a
//! draggable viewport thumb.

mod error;
pub use error::*;

mod color;
pub use color::*;

mod geometry;
pub use geometry::*;

mod config;
pub use config::*;

mod bitmap;
pub use bitmap::*;

mod dirty_lock;
pub use dirty_lock::*;

mod executor;
pub use executor::*;

pub mod fold_layout;
pub mod glyph_weights;
pub mod host;

mod scroll_state;
pub use scroll_state::*;

mod minimap;
pub use minimap::*;

pub mod overlay;

mod scrollbar;
pub use scrollbar::*;

mod panel;
pub use panel::*;
