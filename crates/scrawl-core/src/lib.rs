//! Scrawl Core: from marked-up text to animated ink
//!
//! Text enters as a string with inline style directives, and leaves as a
//! stroke-by-stroke handwriting animation on a drawing surface. This crate
//! holds the whole pipeline:
//!
//! 1. **Extraction** - equation and symbol payloads leave the text stream
//! 2. **Parsing** - style braces resolve into per-character style scopes
//! 3. **Lookup** - each character finds its recorded pen strokes
//! 4. **Layout** - line breaking, tabs, hyphenation, underlines
//! 5. **Animation** - strokes replay segment by segment with recorded timing
//!
//! The last stage is cooperative: [`driver::Playback`] is a resumable state
//! machine the host steps once per frame. Nothing here spawns threads or
//! blocks; every delay is a deadline checked at the next poll.
//!
//! ## A minimal host loop
//!
//! ```ignore
//! use scrawl_core::{driver::{Handwriter, StepContext, Tick}, WriteOptions};
//!
//! let writer = Handwriter::new(store);
//! let mut playback = writer.write_text(&mut surface, "\\bold{hi}", &WriteOptions::default())?;
//! loop {
//!     match playback.step(&mut StepContext {
//!         surface: &mut surface,
//!         input: &mut input,
//!         equations: &scrawl_core::traits::NoEquationSupport,
//!     }) {
//!         Tick::Finished | Tick::UserQuit => break,
//!         _ => host.present_frame(),
//!     }
//! }
//! ```
//!
//! The collaborators the pipeline draws through live in [`traits`]: a
//! [`traits::Surface`] for pixels, an [`traits::InputSource`] for quit/key
//! polling, an [`traits::EquationRasterizer`] for typeset equations and an
//! [`traits::AssetProvider`] for cursor and spray images.

pub mod animate;
pub mod driver;
pub mod error;
pub mod layout;
pub mod markup;
pub mod registry;
pub mod smooth;
pub mod store;
pub mod style;
pub mod traits;

pub use driver::{Handwriter, Playback, StepContext, Tick};
pub use error::{Result, ScrawlError};
pub use store::StrokeStore;

/// Point size the stroke recorder saved paths at. Display scale for a
/// playback is `pt_size / RECORDED_PT_SIZE`.
pub const RECORDED_PT_SIZE: f32 = 20.0;

/// A 2D position in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl std::ops::Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f32> for Point {
    type Output = Point;
    fn mul(self, rhs: f32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// An axis-aligned rectangle in surface coordinates.
///
/// Mutating [`traits::Surface`] operations report the rectangle they
/// touched so a compositor can do minimal redraws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> i32 {
        self.x + self.w as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h as i32
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Smallest rectangle covering both `self` and `other`.
    pub fn union(&self, other: Rect) -> Rect {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return *self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let r = self.right().max(other.right());
        let b = self.bottom().max(other.bottom());
        Rect::new(x, y, (r - x) as u32, (b - y) as u32)
    }

    /// Overlap with `other`, or an empty rect when disjoint.
    pub fn intersect(&self, other: Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let r = self.right().min(other.right());
        let b = self.bottom().min(other.bottom());
        if r <= x || b <= y {
            return Rect::default();
        }
        Rect::new(x, y, (r - x) as u32, (b - y) as u32)
    }

    /// Shrink (negative) or grow (positive) around the centre.
    pub fn inflate(&self, amount: i32) -> Rect {
        let w = (self.w as i32 + 2 * amount).max(0) as u32;
        let h = (self.h as i32 + 2 * amount).max(0) as u32;
        Rect::new(self.x - amount, self.y - amount, w, h)
    }
}

/// Simple RGBA colour that works everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
}

/// Raw RGBA8 pixel data, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Bitmap {
    /// A fully transparent bitmap of the given dimensions.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width * height * 4) as usize],
        }
    }

    /// A bitmap filled with one colour.
    pub fn solid(width: u32, height: u32, color: Color) -> Self {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..width * height {
            data.extend_from_slice(&[color.r, color.g, color.b, color.a]);
        }
        Self {
            width,
            height,
            data,
        }
    }
}

/// One timestamped point of a recorded pen motion, relative to the
/// character's local origin at [`RECORDED_PT_SIZE`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeSample {
    pub pos: Point,
    /// Milliseconds since the start of the path. Non-decreasing.
    pub time_ms: u32,
}

/// One continuous pen motion with no pen lift. A character usually maps to
/// several of these.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StrokePath {
    pub samples: Vec<StrokeSample>,
}

impl StrokePath {
    pub fn new(samples: Vec<StrokeSample>) -> Self {
        Self { samples }
    }

    /// Extent of the path in recorded units, `(width, height)`.
    pub fn extent(&self) -> (f32, f32) {
        let mut min_x = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_y = f32::NEG_INFINITY;
        for s in &self.samples {
            min_x = min_x.min(s.pos.x);
            max_x = max_x.max(s.pos.x);
            min_y = min_y.min(s.pos.y);
            max_y = max_y.max(s.pos.y);
        }
        if self.samples.is_empty() {
            (0.0, 0.0)
        } else {
            (max_x - min_x, max_y - min_y)
        }
    }
}

/// Calligraphy-nib emulation: strokes become angled parallelograms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NibParams {
    /// Nib width in pixels.
    pub width: f32,
    /// Nib angle in degrees, clockwise from horizontal.
    pub angle_deg: f32,
}

/// Spray-brush emulation: strokes become runs of stamped texture images.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SprayParams {
    /// Stamp width in pixels.
    pub width: u32,
    /// Stamp colour; the alpha channel is honoured.
    pub color: Color,
    /// Width:height ratio of the stamp, e.g. 2.0 halves the height.
    pub aspect_ratio: f32,
    /// Stamp rotation in degrees; only visible when aspect ratio != 1.
    pub angle_deg: f32,
}

/// What to show at the pen position while animating.
///
/// Resolved once when a playback starts, never re-dispatched per frame.
#[derive(Debug, Clone, Default)]
pub enum CursorSpec {
    /// No cursor overlay.
    #[default]
    None,
    /// One of the asset provider's builtin cursor images, by name.
    Named(String),
    /// A caller-supplied image. Ink flows from its top-left corner.
    Image(Bitmap),
}

/// Everything one `write_text` call can configure.
///
/// Defaults are documented per field and live here, not in any global
/// settings table.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Bounding rect for the written text, relative to the surface.
    /// `None` centres a rect on the surface with a 50 px gap all around.
    pub text_rect: Option<Rect>,
    /// Base ink colour. Default white.
    pub color: Color,
    /// Base stroke width in pixels. Default 1.
    pub line_width: f32,
    /// Smoothing level 0-9; maps to a moving-average window of 0-36
    /// samples. Default 0 (off).
    pub smooth_level: u8,
    /// Calligraphy nib; `None` draws plain lines.
    pub nib: Option<NibParams>,
    /// Spray brush; `None` draws plain lines. A configured nib wins over
    /// spray when both are set.
    pub spray: Option<SprayParams>,
    /// Nominal text size in points. Default 30.
    pub pt_size: f32,
    /// Extra horizontal gap after each character, in recorded units.
    /// Default 0.
    pub char_spacing: f32,
    /// Width of a space, in recorded units. Default 9.
    pub word_spacing: f32,
    /// Distance between lines in pixels. `None` uses `1.5 * pt_size`.
    pub line_spacing: Option<f32>,
    /// Playback speed; 1.0 replays at recording speed. Default 5.
    pub speed: f32,
    /// Run the whole animation without delays or a cursor, finishing in
    /// one step unless an overflowing line break surfaces first. Default
    /// false.
    pub instant: bool,
    /// Cursor overlay at the pen position. Default none.
    pub cursor: CursorSpec,
    /// Scale factor applied to the cursor image. Default 1.
    pub cursor_scale: f32,
    /// Number of tab stops across the text box. Default 6.
    pub num_tabs: u32,
    /// Break words at the right margin with a crude hyphen instead of
    /// measuring ahead. Default false.
    pub hyphenation: bool,
    /// Fill the whole surface with this colour before writing.
    pub surface_bg: Option<Color>,
    /// Border drawn around the whole surface: (colour, width).
    pub surface_border: Option<(Color, u32)>,
    /// Fill the text rect with this colour before writing. Also used as
    /// the background handed to the equation rasterizer (falling back to
    /// opaque black when unset).
    pub text_rect_bg: Option<Color>,
    /// Border drawn around the text rect: (colour, width).
    pub text_rect_border: Option<(Color, u32)>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            text_rect: None,
            color: Color::WHITE,
            line_width: 1.0,
            smooth_level: 0,
            nib: None,
            spray: None,
            pt_size: 30.0,
            char_spacing: 0.0,
            word_spacing: 9.0,
            line_spacing: None,
            speed: 5.0,
            instant: false,
            cursor: CursorSpec::None,
            cursor_scale: 1.0,
            num_tabs: 6,
            hyphenation: false,
            surface_bg: None,
            surface_border: None,
            text_rect_bg: None,
            text_rect_border: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_union_and_intersect() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        assert_eq!(a.union(b), Rect::new(0, 0, 15, 15));
        assert_eq!(a.intersect(b), Rect::new(5, 5, 5, 5));
        assert!(a.intersect(Rect::new(20, 20, 5, 5)).is_empty());
    }

    #[test]
    fn rect_union_with_empty() {
        let a = Rect::new(3, 4, 5, 6);
        assert_eq!(a.union(Rect::default()), a);
        assert_eq!(Rect::default().union(a), a);
    }

    #[test]
    fn path_extent() {
        let path = StrokePath::new(vec![
            StrokeSample {
                pos: Point::new(1.0, 2.0),
                time_ms: 0,
            },
            StrokeSample {
                pos: Point::new(4.0, 8.0),
                time_ms: 10,
            },
        ]);
        assert_eq!(path.extent(), (3.0, 6.0));
        assert_eq!(StrokePath::default().extent(), (0.0, 0.0));
    }
}
