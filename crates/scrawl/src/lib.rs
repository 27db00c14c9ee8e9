//! Scrawl - handwritten text animation
//!
//! Text with inline style markup goes in; a stroke-by-stroke handwriting
//! animation comes out, replayed with the timing the strokes were recorded
//! at. The pipeline lives in [`scrawl_core`]; this crate bundles it with
//! the stroke-font loader and the software drawing backend behind feature
//! flags, so hosts that bring their own surface can turn those off.
//!
//! # Feature Flags
//!
//! - `strokedb`: JSON stroke-font loading from disk
//! - `surface-soft`: pure-Rust in-memory surface and builtin assets
//!
//! # Example
//!
//! ```ignore
//! use scrawl::prelude::*;
//!
//! let store = StrokeFontDb::new("fonts/").load_store("cursive", None)?;
//! let writer = Handwriter::new(store);
//! let mut surface = SoftSurface::new(800, 600);
//! let mut playback = writer.write_text(&mut surface, "\\red{hi}", &WriteOptions::default())?;
//! ```

pub use scrawl_core::{
    animate, driver, error, layout, markup, registry, smooth, store, style, traits, Bitmap, Color,
    CursorSpec, Handwriter, NibParams, Playback, Point, Rect, Result, ScrawlError, SprayParams,
    StepContext, StrokePath, StrokeSample, StrokeStore, Tick, WriteOptions, RECORDED_PT_SIZE,
};

#[cfg(feature = "strokedb")]
pub use scrawl_strokedb as strokedb;

#[cfg(feature = "surface-soft")]
pub use scrawl_surface_soft as surface_soft;

/// Common imports for typical usage
pub mod prelude {
    pub use scrawl_core::{
        driver::{Handwriter, Playback, StepContext, Tick},
        error::{Result, ScrawlError},
        traits::{AssetProvider, EquationRasterizer, InputSource, Surface},
        Color, CursorSpec, Point, Rect, StrokeStore, WriteOptions,
    };

    #[cfg(feature = "strokedb")]
    pub use scrawl_strokedb::StrokeFontDb;

    #[cfg(feature = "surface-soft")]
    pub use scrawl_surface_soft::{SoftAssets, SoftSurface};
}
