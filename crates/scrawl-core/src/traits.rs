//! The seams between the playback core and its collaborators
//!
//! The core never touches pixels, windows or typesetting toolchains
//! directly. Four traits define what it needs:
//!
//! - [`Surface`] - where the ink goes
//! - [`InputSource`] - where quit/key events come from
//! - [`EquationRasterizer`] - who turns equation source into a bitmap
//! - [`AssetProvider`] - who supplies cursor and spray images
//!
//! All of them are object-safe; hosts hand them to
//! [`crate::driver::StepContext`] per frame.

use crate::error::EquationError;
use crate::{Bitmap, Color, Point, Rect, SprayParams};

/// A drawing target.
///
/// Every mutating call returns the bounding rectangle it modified, so a
/// display compositor can limit its updates to the damaged area.
pub trait Surface {
    /// Surface dimensions in pixels, `(width, height)`.
    fn size(&self) -> (u32, u32);

    /// Fill a rectangle with one colour.
    fn fill(&mut self, color: Color, rect: Rect) -> Rect;

    /// Draw a straight line of the given width.
    fn draw_line(&mut self, from: Point, to: Point, color: Color, width: u32) -> Rect;

    /// Fill a convex polygon.
    fn draw_polygon(&mut self, points: &[Point], color: Color) -> Rect;

    /// Alpha-blend `image` into `dest`. When `dest` differs from the
    /// image's size the backend scales to fit.
    fn blit(&mut self, image: &Bitmap, dest: Rect) -> Rect;

    /// Copy out the pixels under `rect`, clipped to the surface.
    fn save_region(&self, rect: Rect) -> Bitmap;

    /// Write back pixels previously taken with [`Surface::save_region`].
    /// Unlike [`Surface::blit`] this overwrites rather than blends.
    fn restore_region(&mut self, image: &Bitmap, rect: Rect) -> Rect;

    /// The whole surface as a rectangle at the origin.
    fn bounds(&self) -> Rect {
        let (w, h) = self.size();
        Rect::new(0, 0, w, h)
    }
}

/// Something the user did that playback cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserEvent {
    KeyPressed,
    Escaped,
    WindowClosed,
}

/// Polled event source.
///
/// Used by the `\w` wait directive and by per-step quit detection. A poll
/// drains at most one event; return `None` when nothing happened.
pub trait InputSource {
    fn poll(&mut self) -> Option<UserEvent>;
}

/// An input source that never reports anything.
///
/// Fine for headless rendering, but note that a `\w` directive will wait
/// forever against it unless the playback runs in instant mode.
pub struct NullInput;

impl InputSource for NullInput {
    fn poll(&mut self) -> Option<UserEvent> {
        None
    }
}

/// Turns typeset-equation source into a bitmap.
///
/// Implementations typically shell out to an external toolchain; failure
/// is expected and soft. The driver logs and skips equations it cannot
/// render rather than aborting the animation.
pub trait EquationRasterizer {
    /// Identify yourself in logs and warnings.
    fn name(&self) -> &'static str;

    fn rasterize(
        &self,
        source: &str,
        pt_size: f32,
        foreground: Color,
        background: Color,
    ) -> std::result::Result<Bitmap, EquationError>;
}

/// The rasterizer you get when you don't have one.
///
/// Every equation fails with `RenderUnavailable`, which the driver turns
/// into a warning and a skipped equation.
pub struct NoEquationSupport;

impl EquationRasterizer for NoEquationSupport {
    fn name(&self) -> &'static str {
        "none"
    }

    fn rasterize(
        &self,
        _source: &str,
        _pt_size: f32,
        _foreground: Color,
        _background: Color,
    ) -> std::result::Result<Bitmap, EquationError> {
        Err(EquationError::RenderUnavailable(
            "no equation rasterizer configured".into(),
        ))
    }
}

/// Supplies the images playback can be configured with: builtin cursors
/// by name and a customized spray-brush stamp.
pub trait AssetProvider {
    /// A builtin cursor image, or `None` when the name is unknown.
    fn cursor(&self, name: &str) -> Option<Bitmap>;

    /// A spray stamp honouring width, colour, aspect ratio and angle.
    fn spray_stamp(&self, params: &SprayParams) -> Option<Bitmap>;
}
