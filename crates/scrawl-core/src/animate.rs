//! Segment-by-segment stroke replay
//!
//! A [`StrokeAnimation`] replays one character's recorded paths onto a
//! surface, honouring the recorded timing. It is a resumable state machine:
//! each [`StrokeAnimation::step`] paints at most one segment, and delays
//! between samples are deadlines checked on the next call, so the host's
//! frame loop stays in control the whole time.
//!
//! Ink can be laid down three ways: plain lines, an angled calligraphy-nib
//! parallelogram per segment, or a run of spray-brush stamps along the
//! segment. A cursor image can ride along at the pen position, drawn with a
//! save/blit/restore cycle so it never leaves ink behind.

use std::time::{Duration, Instant};

use crate::smooth::StreamSmoother;
use crate::traits::Surface;
use crate::{Bitmap, Color, NibParams, Point, Rect, StrokePath};

/// What one call to [`StrokeAnimation::step`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrokeStep {
    /// A segment (and possibly the cursor) was drawn; the rect is the
    /// damaged area.
    Painted(Rect),
    /// The next sample's deadline has not arrived yet.
    Waiting,
    /// All paths are replayed and the cursor is cleaned up. `x_max` is the
    /// rightmost x the pen reached, for the caller's advance computation.
    Finished { x_max: f32 },
}

/// How ink is laid down for each segment.
#[derive(Debug, Clone)]
pub enum Brush {
    Plain,
    Nib(NibParams),
    /// Pre-rendered stamp image, blitted repeatedly along each segment.
    Spray(Bitmap),
}

/// Everything fixed for the lifetime of one character's animation.
#[derive(Debug, Clone)]
pub struct AnimationParams {
    /// Surface position of the character's local origin.
    pub origin: Point,
    /// Recorded-units to pixels factor.
    pub scale: f32,
    pub color: Color,
    pub line_width: f32,
    /// Playback speed multiplier; 1.0 replays at recorded pace.
    pub speed: f32,
    /// Paint everything in the first step, skipping delays and cursor.
    pub instant: bool,
    /// Smoothing level 0-9 applied to the x and y streams.
    pub smooth_level: u8,
    pub brush: Brush,
    /// Cursor image riding at the pen position.
    pub cursor: Option<Bitmap>,
    /// Display scale for the cursor image; the blit does the resizing.
    pub cursor_scale: f32,
}

struct CursorOverlay {
    image: Bitmap,
    /// On-surface cursor dimensions after scaling.
    w: u32,
    h: u32,
    /// Pixels under the last cursor blit, for restoration.
    saved: Option<(Bitmap, Rect)>,
}

/// Replays one character's stroke paths. See the module docs.
pub struct StrokeAnimation {
    paths: Vec<StrokePath>,
    origin: Point,
    scale: f32,
    color: Color,
    line_width: f32,
    speed: f32,
    instant: bool,
    brush: Brush,
    cursor: Option<CursorOverlay>,
    smoother_x: StreamSmoother,
    smoother_y: StreamSmoother,
    path_idx: usize,
    sample_idx: usize,
    prev_point: Option<Point>,
    pen: Point,
    deadline: Option<Instant>,
    x_max: f32,
    done: bool,
}

impl StrokeAnimation {
    pub fn new(paths: Vec<StrokePath>, params: AnimationParams) -> Self {
        let cursor = if params.instant {
            None
        } else {
            let scale = params.cursor_scale.max(f32::EPSILON);
            params.cursor.map(|image| CursorOverlay {
                w: ((image.width as f32 * scale) as u32).max(1),
                h: ((image.height as f32 * scale) as u32).max(1),
                image,
                saved: None,
            })
        };
        Self {
            paths,
            origin: params.origin,
            scale: params.scale,
            color: params.color,
            line_width: params.line_width,
            speed: params.speed.max(f32::EPSILON),
            instant: params.instant,
            brush: params.brush,
            cursor,
            smoother_x: StreamSmoother::from_level(params.smooth_level),
            smoother_y: StreamSmoother::from_level(params.smooth_level),
            path_idx: 0,
            sample_idx: 0,
            prev_point: None,
            pen: params.origin,
            deadline: None,
            x_max: params.origin.x,
            done: false,
        }
    }

    /// Advance the replay by at most one segment.
    pub fn step(&mut self, surface: &mut dyn Surface) -> StrokeStep {
        if self.done {
            return StrokeStep::Finished { x_max: self.x_max };
        }
        if self.instant {
            while self.paint_next(surface).is_some() {}
            self.finish(surface);
            return StrokeStep::Finished { x_max: self.x_max };
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() < deadline {
                return StrokeStep::Waiting;
            }
            self.deadline = None;
        }
        // lift the cursor before painting, otherwise the restore would
        // erase ink laid under it this step
        let mut damage = Rect::default();
        if let Some(rect) = self.lift_cursor(surface) {
            damage = damage.union(rect);
        }
        match self.paint_next(surface) {
            Some(painted) => {
                damage = damage.union(painted);
                if let Some(rect) = self.set_down_cursor(surface) {
                    damage = damage.union(rect);
                }
                StrokeStep::Painted(damage)
            }
            None => {
                self.finish(surface);
                StrokeStep::Finished { x_max: self.x_max }
            }
        }
    }

    /// Change the playback speed mid-replay. Any un-elapsed delay is
    /// rescaled so the change takes effect immediately.
    pub fn set_speed(&mut self, speed: f32) {
        let speed = speed.max(f32::EPSILON);
        if let Some(deadline) = self.deadline {
            let now = Instant::now();
            if deadline > now {
                let remaining = (deadline - now).mul_f64(f64::from(self.speed) / f64::from(speed));
                self.deadline = Some(now + remaining);
            }
        }
        self.speed = speed;
    }

    /// Stop early, removing the cursor overlay.
    pub fn abort(&mut self, surface: &mut dyn Surface) {
        if !self.done {
            self.finish(surface);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.done
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Current pen position in surface coordinates.
    pub fn pen(&self) -> Point {
        self.pen
    }

    /// Paint the next segment and schedule the following sample's
    /// deadline. `None` when every path is fully replayed.
    fn paint_next(&mut self, surface: &mut dyn Surface) -> Option<Rect> {
        loop {
            let path = self.paths.get(self.path_idx)?;
            if self.sample_idx >= path.samples.len() {
                // pen lift: next path restarts the smoothers
                self.path_idx += 1;
                self.sample_idx = 0;
                self.prev_point = None;
                self.smoother_x.reset();
                self.smoother_y.reset();
                continue;
            }
            let sample = path.samples[self.sample_idx];
            let raw = self.origin + sample.pos * self.scale;
            let pos = Point::new(self.smoother_x.push(raw.x), self.smoother_y.push(raw.y));
            let from = self.prev_point.unwrap_or(pos);
            self.prev_point = Some(pos);
            self.pen = pos;
            self.x_max = self.x_max.max(pos.x);
            if !self.instant {
                if let Some(next) = path.samples.get(self.sample_idx + 1) {
                    let dt_ms = next.time_ms.saturating_sub(sample.time_ms);
                    let delay = f64::from(dt_ms) / (1000.0 * f64::from(self.speed));
                    self.deadline = Some(Instant::now() + Duration::from_secs_f64(delay));
                }
            }
            self.sample_idx += 1;
            return Some(self.paint_segment(surface, from, pos));
        }
    }

    fn paint_segment(&mut self, surface: &mut dyn Surface, from: Point, to: Point) -> Rect {
        match &self.brush {
            Brush::Plain => {
                let width = self.line_width.round().max(1.0) as u32;
                surface.draw_line(from, to, self.color, width)
            }
            Brush::Nib(nib) => {
                let theta = nib.angle_deg.to_radians();
                let offset = Point::new(-theta.sin(), theta.cos()) * nib.width;
                surface.draw_polygon(&[from, to, to + offset, from + offset], self.color)
            }
            Brush::Spray(stamp) => {
                let length = from.distance_to(to);
                let mean_dim = ((stamp.width + stamp.height) as f32 / 2.0).max(1.0);
                let stamps = 1 + (5.0 * length / mean_dim) as u32;
                let mut damage = Rect::default();
                for i in 0..=stamps {
                    let t = i as f32 / stamps as f32;
                    let p = from + (to - from) * t;
                    let dest = Rect::new(
                        (p.x - stamp.width as f32 / 2.0) as i32,
                        (p.y - stamp.height as f32 / 2.0) as i32,
                        stamp.width,
                        stamp.height,
                    );
                    damage = damage.union(surface.blit(stamp, dest));
                }
                damage
            }
        }
    }

    /// Put the pixels under the cursor back, removing it from view.
    fn lift_cursor(&mut self, surface: &mut dyn Surface) -> Option<Rect> {
        let cursor = self.cursor.as_mut()?;
        let (image, rect) = cursor.saved.take()?;
        Some(surface.restore_region(&image, rect))
    }

    /// Save what is under the pen and draw the cursor there.
    fn set_down_cursor(&mut self, surface: &mut dyn Surface) -> Option<Rect> {
        let pen = self.pen;
        let cursor = self.cursor.as_mut()?;
        let dest = Rect::new(pen.x as i32, pen.y as i32, cursor.w, cursor.h);
        cursor.saved = Some((surface.save_region(dest), dest));
        Some(surface.blit(&cursor.image, dest))
    }

    fn finish(&mut self, surface: &mut dyn Surface) {
        if let Some(cursor) = self.cursor.as_mut() {
            if let Some((image, rect)) = cursor.saved.take() {
                surface.restore_region(&image, rect);
            }
        }
        self.done = true;
    }
}
