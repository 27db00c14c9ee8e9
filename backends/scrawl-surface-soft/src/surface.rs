//! A CPU-side RGBA8 canvas implementing the core drawing seam
//!
//! Everything is plain pixel pushing: squares stamped along a DDA walk for
//! lines, a scanline fill for convex polygons, nearest-neighbour sampling
//! for scaled blits. No GPU, no external rasterizer, deterministic output,
//! which is exactly what the tests and the headless CLI want.

use std::io::{self, Write};

use scrawl_core::traits::Surface;
use scrawl_core::{Bitmap, Color, Point, Rect};

/// An owned width x height RGBA8 pixel buffer.
pub struct SoftSurface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl SoftSurface {
    /// An opaque black surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_background(width, height, Color::BLACK)
    }

    pub fn with_background(width: u32, height: u32, color: Color) -> Self {
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

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 bytes, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        let i = ((y as u32 * self.width + x as u32) * 4) as usize;
        Some(Color::rgba(
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ))
    }

    pub fn to_bitmap(&self) -> Bitmap {
        Bitmap {
            width: self.width,
            height: self.height,
            data: self.data.clone(),
        }
    }

    /// Write the surface as a binary PPM image (alpha is dropped).
    pub fn write_ppm<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "P6\n{} {}\n255", self.width, self.height)?;
        for px in self.data.chunks_exact(4) {
            out.write_all(&px[..3])?;
        }
        Ok(())
    }

    fn clip(&self, rect: Rect) -> Rect {
        rect.intersect(Rect::new(0, 0, self.width, self.height))
    }

    /// Source-over blend of one pixel. Fully opaque sources overwrite.
    fn blend_pixel(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 || color.a == 0 {
            return;
        }
        let i = ((y as u32 * self.width + x as u32) * 4) as usize;
        if color.a == 255 {
            self.data[i..i + 4].copy_from_slice(&[color.r, color.g, color.b, 255]);
            return;
        }
        let a = color.a as u32;
        let inv = 255 - a;
        for (c, src) in [color.r, color.g, color.b].into_iter().enumerate() {
            let dst = self.data[i + c] as u32;
            self.data[i + c] = ((src as u32 * a + dst * inv) / 255) as u8;
        }
        let dst_a = self.data[i + 3] as u32;
        self.data[i + 3] = (a + dst_a * inv / 255) as u8;
    }

    /// Stamp a width x width square centred on a point.
    fn stamp(&mut self, cx: i32, cy: i32, color: Color, width: u32) {
        let half = width as i32 / 2;
        for dy in -half..=(width as i32 - 1 - half) {
            for dx in -half..=(width as i32 - 1 - half) {
                self.blend_pixel(cx + dx, cy + dy, color);
            }
        }
    }
}

impl Surface for SoftSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn fill(&mut self, color: Color, rect: Rect) -> Rect {
        let clipped = self.clip(rect);
        for y in clipped.y..clipped.bottom() {
            for x in clipped.x..clipped.right() {
                self.blend_pixel(x, y, color);
            }
        }
        clipped
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Color, width: u32) -> Rect {
        let width = width.max(1);
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as u32;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let x = (from.x + dx * t).round() as i32;
            let y = (from.y + dy * t).round() as i32;
            self.stamp(x, y, color, width);
        }
        let pad = width as i32;
        let min_x = from.x.min(to.x) as i32 - pad;
        let min_y = from.y.min(to.y) as i32 - pad;
        let w = (dx.abs() as i32 + 2 * pad) as u32;
        let h = (dy.abs() as i32 + 2 * pad) as u32;
        self.clip(Rect::new(min_x, min_y, w, h))
    }

    fn draw_polygon(&mut self, points: &[Point], color: Color) -> Rect {
        if points.len() < 3 {
            return Rect::default();
        }
        let min_y = points.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        let max_y = points.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
        let min_x = points.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
        let max_x = points.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);

        // convex scanline fill: each row spans the min..max edge crossings
        for y in min_y.floor() as i32..=max_y.ceil() as i32 {
            let yc = y as f32 + 0.5;
            let mut span_min = f32::INFINITY;
            let mut span_max = f32::NEG_INFINITY;
            for (i, a) in points.iter().enumerate() {
                let b = points[(i + 1) % points.len()];
                if (a.y <= yc) == (b.y <= yc) {
                    continue;
                }
                let t = (yc - a.y) / (b.y - a.y);
                let x = a.x + (b.x - a.x) * t;
                span_min = span_min.min(x);
                span_max = span_max.max(x);
            }
            if span_min <= span_max {
                for x in span_min.round() as i32..=span_max.round() as i32 {
                    self.blend_pixel(x, y, color);
                }
            }
        }
        self.clip(Rect::new(
            min_x.floor() as i32,
            min_y.floor() as i32,
            (max_x - min_x).ceil() as u32 + 1,
            (max_y - min_y).ceil() as u32 + 1,
        ))
    }

    fn blit(&mut self, image: &Bitmap, dest: Rect) -> Rect {
        if image.width == 0 || image.height == 0 || dest.is_empty() {
            return Rect::default();
        }
        let clipped = self.clip(dest);
        for y in clipped.y..clipped.bottom() {
            for x in clipped.x..clipped.right() {
                // nearest-neighbour back-mapping into the source image
                let sx = ((x - dest.x) as u32 * image.width / dest.w).min(image.width - 1);
                let sy = ((y - dest.y) as u32 * image.height / dest.h).min(image.height - 1);
                let i = ((sy * image.width + sx) * 4) as usize;
                let color = Color::rgba(
                    image.data[i],
                    image.data[i + 1],
                    image.data[i + 2],
                    image.data[i + 3],
                );
                self.blend_pixel(x, y, color);
            }
        }
        clipped
    }

    fn save_region(&self, rect: Rect) -> Bitmap {
        let clipped = self.clip(rect);
        let mut out = Bitmap::blank(clipped.w.max(1), clipped.h.max(1));
        for y in clipped.y..clipped.bottom() {
            let src = ((y as u32 * self.width + clipped.x as u32) * 4) as usize;
            let dst = (((y - clipped.y) as u32 * clipped.w) * 4) as usize;
            let len = (clipped.w * 4) as usize;
            out.data[dst..dst + len].copy_from_slice(&self.data[src..src + len]);
        }
        out
    }

    fn restore_region(&mut self, image: &Bitmap, rect: Rect) -> Rect {
        let clipped = self.clip(rect);
        let w = clipped.w.min(image.width);
        for y in 0..clipped.h.min(image.height) {
            let src = ((y * image.width) * 4) as usize;
            let dst = (((clipped.y as u32 + y) * self.width + clipped.x as u32) * 4) as usize;
            let len = (w * 4) as usize;
            self.data[dst..dst + len].copy_from_slice(&image.data[src..src + len]);
        }
        clipped
    }
}
