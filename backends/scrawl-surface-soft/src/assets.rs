//! Builtin cursor images and spray-brush stamps
//!
//! All assets are generated procedurally so the crate ships no binary
//! blobs. Cursor images are small RGBA sprites with the pen tip at the
//! top-left pixel, matching where ink flows from during animation.

use scrawl_core::traits::AssetProvider;
use scrawl_core::{Bitmap, Color, SprayParams};

const CURSOR_SIZE: u32 = 16;

/// Names accepted by [`SoftAssets::cursor`].
pub const CURSOR_NAMES: [&str; 8] = [
    "pencil",
    "crosshair",
    "circle",
    "square",
    "arrow",
    "quill_dark",
    "quill_light",
    "spray_can",
];

/// Procedural asset provider for the software backend.
#[derive(Default)]
pub struct SoftAssets;

impl SoftAssets {
    pub fn new() -> Self {
        Self
    }
}

impl AssetProvider for SoftAssets {
    fn cursor(&self, name: &str) -> Option<Bitmap> {
        let grey = Color::rgb(160, 160, 160);
        match name {
            "pencil" => Some(diagonal_shaft(Color::rgb(220, 180, 60), 2)),
            "crosshair" => Some(crosshair(grey)),
            "circle" => Some(ring(grey)),
            "square" => Some(square_outline(grey)),
            "arrow" => Some(arrow(grey)),
            "quill_dark" => Some(diagonal_shaft(Color::rgb(60, 60, 70), 3)),
            "quill_light" => Some(diagonal_shaft(Color::rgb(230, 230, 240), 3)),
            "spray_can" => Some(spray_can()),
            _ => None,
        }
    }

    fn spray_stamp(&self, params: &SprayParams) -> Option<Bitmap> {
        let w = params.width.max(1);
        let aspect = params.aspect_ratio.max(0.01);
        let h = ((w as f32 / aspect) as u32).max(1);
        // the stamp canvas is square so rotation never clips
        let side = w.max(h);
        let mut stamp = Bitmap::blank(side, side);
        let (sin, cos) = params.angle_deg.to_radians().sin_cos();
        let cx = side as f32 / 2.0;
        let cy = side as f32 / 2.0;
        for y in 0..side {
            for x in 0..side {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                // rotate the sample back into the unrotated ellipse
                let ex = (dx * cos + dy * sin) / (w as f32 / 2.0);
                let ey = (-dx * sin + dy * cos) / (h as f32 / 2.0);
                let r = (ex * ex + ey * ey).sqrt();
                if r < 1.0 {
                    // soft radial falloff toward the rim
                    let alpha = (params.color.a as f32 * (1.0 - r)) as u8;
                    put(
                        &mut stamp,
                        x as i32,
                        y as i32,
                        Color::rgba(params.color.r, params.color.g, params.color.b, alpha),
                    );
                }
            }
        }
        Some(stamp)
    }
}

fn put(bitmap: &mut Bitmap, x: i32, y: i32, color: Color) {
    if x < 0 || y < 0 || x >= bitmap.width as i32 || y >= bitmap.height as i32 {
        return;
    }
    let i = ((y as u32 * bitmap.width + x as u32) * 4) as usize;
    bitmap.data[i..i + 4].copy_from_slice(&[color.r, color.g, color.b, color.a]);
}

/// A pen-like shaft from the top-left tip toward the bottom-right.
fn diagonal_shaft(color: Color, thickness: i32) -> Bitmap {
    let mut b = Bitmap::blank(CURSOR_SIZE, CURSOR_SIZE);
    for i in 0..CURSOR_SIZE as i32 {
        for t in 0..thickness {
            put(&mut b, i + t, i, color);
            put(&mut b, i, i + t, color);
        }
    }
    b
}

fn crosshair(color: Color) -> Bitmap {
    let mut b = Bitmap::blank(CURSOR_SIZE, CURSOR_SIZE);
    let mid = CURSOR_SIZE as i32 / 2;
    for i in 0..CURSOR_SIZE as i32 {
        put(&mut b, i, mid, color);
        put(&mut b, mid, i, color);
    }
    b
}

fn ring(color: Color) -> Bitmap {
    let mut b = Bitmap::blank(CURSOR_SIZE, CURSOR_SIZE);
    let c = CURSOR_SIZE as f32 / 2.0;
    let radius = c - 1.0;
    for y in 0..CURSOR_SIZE as i32 {
        for x in 0..CURSOR_SIZE as i32 {
            let d = ((x as f32 + 0.5 - c).powi(2) + (y as f32 + 0.5 - c).powi(2)).sqrt();
            if (d - radius).abs() < 1.0 {
                put(&mut b, x, y, color);
            }
        }
    }
    b
}

fn square_outline(color: Color) -> Bitmap {
    let mut b = Bitmap::blank(CURSOR_SIZE, CURSOR_SIZE);
    let max = CURSOR_SIZE as i32 - 1;
    for i in 0..=max {
        put(&mut b, i, 0, color);
        put(&mut b, i, max, color);
        put(&mut b, 0, i, color);
        put(&mut b, max, i, color);
    }
    b
}

/// A filled triangle pointing at the top-left tip.
fn arrow(color: Color) -> Bitmap {
    let mut b = Bitmap::blank(CURSOR_SIZE, CURSOR_SIZE);
    for y in 0..CURSOR_SIZE as i32 {
        for x in 0..CURSOR_SIZE as i32 {
            if x + y <= CURSOR_SIZE as i32 && x >= y / 2 && y >= x / 2 {
                put(&mut b, x, y, color);
            }
        }
    }
    b
}

fn spray_can() -> Bitmap {
    let mut b = Bitmap::blank(CURSOR_SIZE, CURSOR_SIZE);
    let body = Color::rgb(120, 140, 160);
    let cap = Color::rgb(200, 60, 60);
    for y in 5..CURSOR_SIZE as i32 {
        for x in 4..12 {
            put(&mut b, x, y, body);
        }
    }
    for y in 0..4 {
        for x in 6..10 {
            put(&mut b, x, y, cap);
        }
    }
    b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_builtin_name_resolves() {
        let assets = SoftAssets::new();
        for name in CURSOR_NAMES {
            let cursor = assets.cursor(name).unwrap();
            assert_eq!(cursor.width, CURSOR_SIZE);
            assert!(cursor.data.iter().any(|&b| b != 0), "{name} is empty");
        }
        assert!(assets.cursor("nonexistent").is_none());
    }

    #[test]
    fn spray_stamp_is_dense_in_the_middle() {
        let assets = SoftAssets::new();
        let stamp = assets
            .spray_stamp(&SprayParams {
                width: 11,
                color: Color::rgba(255, 0, 0, 255),
                aspect_ratio: 1.0,
                angle_deg: 0.0,
            })
            .unwrap();
        let centre = ((5 * stamp.width + 5) * 4) as usize;
        let corner = 3usize;
        assert!(stamp.data[centre + 3] > 200);
        assert_eq!(stamp.data[corner], 0);
    }

    #[test]
    fn aspect_ratio_squashes_the_stamp() {
        let assets = SoftAssets::new();
        let stamp = assets
            .spray_stamp(&SprayParams {
                width: 20,
                color: Color::rgba(0, 255, 0, 255),
                aspect_ratio: 2.0,
                angle_deg: 0.0,
            })
            .unwrap();
        // canvas is square, but only the middle band carries ink
        let top_mid = ((stamp.width + stamp.width / 2) * 4 + 3) as usize;
        let centre = ((stamp.width / 2 * stamp.width + stamp.width / 2) * 4 + 3) as usize;
        assert_eq!(stamp.data[top_mid], 0);
        assert!(stamp.data[centre] > 0);
    }
}
