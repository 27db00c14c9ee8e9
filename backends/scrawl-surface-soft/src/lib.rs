//! Software drawing backend for scrawl
//!
//! Implements the core's [`scrawl_core::traits::Surface`] seam with a
//! plain in-memory RGBA8 buffer, and its
//! [`scrawl_core::traits::AssetProvider`] seam with procedural cursor and
//! spray images. Good for headless rendering, tests, and as a reference
//! for windowed backends.

mod assets;
mod surface;

pub use assets::{SoftAssets, CURSOR_NAMES};
pub use surface::SoftSurface;
