//! The playback driver: from marked-up text to a running animation
//!
//! [`Handwriter`] owns the loaded stroke store and the style table, and is
//! read-only once built, so one writer can serve any number of concurrent
//! [`Playback`]s. `write_text` runs the whole text-side pipeline up front
//! (validation, extraction, parsing, geometry, cursor and brush
//! resolution) and fails fast; everything that happens after the first
//! `step` is drawing.
//!
//! A [`Playback`] is a cooperative state machine. Each [`Playback::step`]
//! does a bounded amount of work, one stroke segment at the most, and
//! reports what happened through [`Tick`]. The host calls it once per
//! frame until `Finished` or `UserQuit` comes back. With
//! [`crate::WriteOptions::instant`] set the whole animation collapses into
//! the first step; only an overflowing line break interrupts it, and
//! stepping again resumes the run.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::animate::{AnimationParams, Brush, StrokeAnimation, StrokeStep};
use crate::error::{MarkupError, Result};
use crate::layout::{self, TextBox, TEXT_BOX_BORDER, TEXT_BOX_MARGIN};
use crate::markup::{
    delimit, legal, tokens, ParseNode, EQ_BLOCK_DELIM, EQ_INLINE_DELIM, SYMBOL_DELIM,
};
use crate::store::{char_key, StrokeStore};
use crate::style::{self, PenStyle, StyleMetrics, StyleTable, UNDERLINE_OFFSET};
use crate::traits::{AssetProvider, EquationRasterizer, InputSource, Surface, UserEvent};
use crate::{Bitmap, Color, CursorSpec, Point, Rect, WriteOptions, RECORDED_PT_SIZE};

/// How long a `\p` directive stalls the pen.
pub const PAUSE_DELAY_MS: u64 = 500;

// Typeset equation sizing, all relative to the playback's point size
// except the block pad which is absolute pixels.
const EQ_INLINE_HEIGHT_SF: f32 = 1.2;
const EQ_BLOCK_HEIGHT_SF: f32 = 1.5;
const EQ_INLINE_VERT_OFFSET_SF: f32 = 0.15;
const EQ_FULL_LINE_SF: f32 = 0.9;
const EQ_HSPACE_SF: f32 = 0.2;
const EQ_BLOCK_VERT_PAD: f32 = 10.0;

/// The collaborators a playback draws through, handed in per step so the
/// host keeps ownership of its window, event queue and toolchains.
pub struct StepContext<'a> {
    pub surface: &'a mut dyn Surface,
    pub input: &'a mut dyn InputSource,
    pub equations: &'a dyn EquationRasterizer,
}

/// What one [`Playback::step`] call did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    /// Work was done; the point is the current pen position.
    Progress(Point),
    /// A delay or a `\w` wait is in effect; nothing was drawn.
    Waiting,
    /// A line break moved the pen below the text box. The playback keeps
    /// going if stepped again, and reports this once per crossing break,
    /// in instant mode too, so the caller decides whether to truncate.
    Overflow,
    /// The user quit; the cursor is cleaned up and the playback is over.
    UserQuit,
    /// All nodes are consumed. Repeated steps keep returning this.
    Finished,
}

/// The text-to-animation engine. Build one per loaded font, share it
/// freely; all mutable state lives in the [`Playback`]s it hands out.
pub struct Handwriter {
    store: StrokeStore,
    style_table: StyleTable,
    assets: Option<Box<dyn AssetProvider>>,
}

impl Handwriter {
    pub fn new(store: StrokeStore) -> Self {
        Self {
            store,
            style_table: StyleTable::builtin(),
            assets: None,
        }
    }

    /// Replace the builtin style table, e.g. to register custom tokens.
    pub fn with_style_table(mut self, table: StyleTable) -> Self {
        self.style_table = table;
        self
    }

    /// Attach a provider for cursor images and spray stamps.
    pub fn with_assets(mut self, assets: Box<dyn AssetProvider>) -> Self {
        self.assets = Some(assets);
        self
    }

    pub fn store(&self) -> &StrokeStore {
        &self.store
    }

    pub fn style_table(&self) -> &StyleTable {
        &self.style_table
    }

    /// Prepare an animation of `text` into `opts.text_rect`.
    ///
    /// All markup problems surface here, before any ink: illegal escapes,
    /// unmatched extraction delimiters, unbalanced style braces.
    /// Background and border decorations are painted immediately; the
    /// returned [`Playback`] then animates on top of them step by step.
    pub fn write_text<'a>(
        &'a self,
        surface: &mut dyn Surface,
        text: &str,
        opts: &WriteOptions,
    ) -> Result<Playback<'a>> {
        if let Some(index) = legal::find_illegal_escape(text, &self.style_table) {
            return Err(MarkupError::IllegalEscape { index }.into());
        }
        let (inline_eqs, text) = delimit::extract(text, EQ_INLINE_DELIM, "\\$")?;
        let (block_eqs, text) = delimit::extract(&text, EQ_BLOCK_DELIM, "\\£")?;
        let (symbols, text) = delimit::extract(&text, SYMBOL_DELIM, "\\`")?;
        // a tab glued to the end of a word would defeat word measuring
        let text = text.replace("\\t", " \\t");
        let nodes = tokens::parse(&text, &self.style_table)?;

        let (sw, sh) = surface.size();
        let text_rect = opts.text_rect.unwrap_or_else(|| {
            Rect::new(
                TEXT_BOX_BORDER,
                TEXT_BOX_BORDER,
                sw.saturating_sub(2 * TEXT_BOX_BORDER as u32).max(1),
                sh.saturating_sub(2 * TEXT_BOX_BORDER as u32).max(1),
            )
        });
        let line_spacing = opts.line_spacing.unwrap_or(1.5 * opts.pt_size);
        let text_box = TextBox::new(text_rect, opts.num_tabs, line_spacing);

        // decorations go down before any ink
        let bounds = surface.bounds();
        if let Some(bg) = opts.surface_bg {
            surface.fill(bg, bounds);
        }
        if let Some((color, width)) = opts.surface_border {
            stroke_rect(surface, bounds, color, width);
        }
        if let Some(bg) = opts.text_rect_bg {
            surface.fill(bg, text_rect);
        }
        if let Some((color, width)) = opts.text_rect_border {
            stroke_rect(surface, text_rect, color, width);
        }

        let cursor = match &opts.cursor {
            CursorSpec::None => None,
            CursorSpec::Named(name) => {
                let image = self.assets.as_ref().and_then(|a| a.cursor(name));
                if image.is_none() {
                    log::warn!("unknown cursor '{name}', animating without one");
                }
                image
            }
            CursorSpec::Image(bitmap) => Some(bitmap.clone()),
        };
        let brush = if let Some(nib) = opts.nib {
            Brush::Nib(nib)
        } else if let Some(spray) = opts.spray {
            match self.assets.as_ref().and_then(|a| a.spray_stamp(&spray)) {
                Some(stamp) => Brush::Spray(stamp),
                None => {
                    log::warn!("no spray stamp available, falling back to plain lines");
                    Brush::Plain
                }
            }
        } else {
            Brush::Plain
        };

        let base_style = PenStyle {
            color: opts.color,
            line_width: opts.line_width,
            scale: opts.pt_size / RECORDED_PT_SIZE,
            speed: opts.speed,
            vert_offset: 0.0,
        };

        Ok(Playback {
            writer: self,
            nodes,
            idx: 0,
            pen: Point::new(text_box.line_start_x(), text_box.first_baseline_y()),
            text_box,
            base_style,
            metrics: StyleMetrics::for_pt_size(opts.pt_size),
            pt_size: opts.pt_size,
            char_spacing: opts.char_spacing,
            word_spacing: opts.word_spacing,
            smooth_level: opts.smooth_level,
            instant: opts.instant,
            hyphenation: opts.hyphenation,
            brush,
            cursor,
            cursor_scale: opts.cursor_scale,
            inline_eqs: inline_eqs.into(),
            block_eqs: block_eqs.into(),
            symbols: symbols.into(),
            eq_bg: opts.text_rect_bg.unwrap_or(Color::BLACK),
            state: PlayState::NextNode,
            underline: None,
            done: false,
        })
    }
}

/// Four edge strips just inside `rect`.
fn stroke_rect(surface: &mut dyn Surface, rect: Rect, color: Color, width: u32) {
    let w = width.min(rect.w).min(rect.h);
    surface.fill(color, Rect::new(rect.x, rect.y, rect.w, w));
    surface.fill(color, Rect::new(rect.x, rect.bottom() - w as i32, rect.w, w));
    surface.fill(color, Rect::new(rect.x, rect.y, w, rect.h));
    surface.fill(color, Rect::new(rect.right() - w as i32, rect.y, w, rect.h));
}

enum PlayState {
    /// Ready to consume the next parse node.
    NextNode,
    /// A character (or symbol) is mid-replay. `gap` is the post-character
    /// advance in pixels.
    Animating { anim: StrokeAnimation, gap: f32 },
    /// A `\p` pause runs until the deadline.
    PauseUntil(Instant),
    /// A `\w` wait holds until the input source reports a key.
    WaitForKey,
}

struct UnderlineRun {
    start_x: f32,
    /// Baseline the run opened on; the line lands a fixed offset below.
    y: f32,
    color: Color,
}

/// One in-flight handwriting animation. See the module docs for the
/// stepping contract.
pub struct Playback<'a> {
    writer: &'a Handwriter,
    nodes: Vec<ParseNode>,
    idx: usize,
    pen: Point,
    text_box: TextBox,
    base_style: PenStyle,
    metrics: StyleMetrics,
    pt_size: f32,
    char_spacing: f32,
    word_spacing: f32,
    smooth_level: u8,
    instant: bool,
    hyphenation: bool,
    brush: Brush,
    cursor: Option<Bitmap>,
    cursor_scale: f32,
    inline_eqs: VecDeque<String>,
    block_eqs: VecDeque<String>,
    symbols: VecDeque<String>,
    eq_bg: Color,
    state: PlayState,
    underline: Option<UnderlineRun>,
    done: bool,
}

impl std::fmt::Debug for Playback<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Playback")
            .field("idx", &self.idx)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl Playback<'_> {
    /// Advance the animation by one bounded unit of work.
    pub fn step(&mut self, ctx: &mut StepContext) -> Tick {
        if self.instant {
            loop {
                match self.step_once(ctx) {
                    Tick::Progress(_) | Tick::Waiting => continue,
                    tick => return tick,
                }
            }
        } else {
            self.step_once(ctx)
        }
    }

    /// Change the playback speed. Takes effect immediately, including on
    /// the un-elapsed part of the current delay.
    pub fn set_speed(&mut self, speed: f32) {
        let speed = speed.max(f32::EPSILON);
        let factor = speed / self.base_style.speed;
        self.base_style.speed = speed;
        if let PlayState::Animating { anim, .. } = &mut self.state {
            let rescaled = anim.speed() * factor;
            anim.set_speed(rescaled);
        }
    }

    /// Current pen position in surface coordinates.
    pub fn pen(&self) -> Point {
        self.pen
    }

    pub fn is_finished(&self) -> bool {
        self.done
    }

    /// The rect this playback writes into.
    pub fn text_rect(&self) -> Rect {
        self.text_box.rect
    }

    fn step_once(&mut self, ctx: &mut StepContext) -> Tick {
        if self.done {
            return Tick::Finished;
        }
        if let Some(event) = ctx.input.poll() {
            match event {
                UserEvent::Escaped | UserEvent::WindowClosed => {
                    if let PlayState::Animating { anim, .. } = &mut self.state {
                        anim.abort(ctx.surface);
                    }
                    self.flush_underline(ctx.surface);
                    self.done = true;
                    return Tick::UserQuit;
                }
                UserEvent::KeyPressed => {
                    if matches!(self.state, PlayState::WaitForKey) {
                        self.state = PlayState::NextNode;
                    }
                }
            }
        }
        match std::mem::replace(&mut self.state, PlayState::NextNode) {
            PlayState::NextNode => self.process_node(ctx),
            PlayState::PauseUntil(deadline) => {
                if Instant::now() < deadline {
                    self.state = PlayState::PauseUntil(deadline);
                    Tick::Waiting
                } else {
                    Tick::Progress(self.pen)
                }
            }
            PlayState::WaitForKey => {
                self.state = PlayState::WaitForKey;
                Tick::Waiting
            }
            PlayState::Animating { mut anim, gap } => match anim.step(ctx.surface) {
                StrokeStep::Painted(_) => {
                    let pen = anim.pen();
                    self.state = PlayState::Animating { anim, gap };
                    Tick::Progress(pen)
                }
                StrokeStep::Waiting => {
                    self.state = PlayState::Animating { anim, gap };
                    Tick::Waiting
                }
                StrokeStep::Finished { x_max } => {
                    self.pen.x = x_max + gap;
                    Tick::Progress(self.pen)
                }
            },
        }
    }

    fn process_node(&mut self, ctx: &mut StepContext) -> Tick {
        let Some(node) = self.nodes.get(self.idx).cloned() else {
            self.flush_underline(ctx.surface);
            self.done = true;
            return Tick::Finished;
        };
        self.idx += 1;
        match node.ch {
            '\\' => {
                let follow = self.nodes.get(self.idx).cloned();
                self.idx += 1;
                self.dispatch_escape(ctx, follow)
            }
            ' ' => self.process_space(ctx, &node),
            ch => self.process_char(ctx, &node, ch),
        }
    }

    fn process_space(&mut self, ctx: &mut StepContext, node: &ParseNode) -> Tick {
        let style = style::resolve(&self.base_style, &node.styles, &self.metrics);
        if !node.has_style("underline") {
            self.flush_underline(ctx.surface);
        }
        // a space never indents a fresh line
        if self.pen.x > self.text_box.line_start_x() {
            self.pen.x += self.word_spacing * style.scale;
        }
        if !self.hyphenation {
            let word =
                layout::word_length_px(&self.nodes, self.idx, &self.writer.store, style.scale);
            if word > 0.0
                && self.pen.x + word > self.text_box.right_edge() - TEXT_BOX_MARGIN
                && self.newline(ctx.surface)
            {
                return Tick::Overflow;
            }
        }
        Tick::Progress(self.pen)
    }

    fn process_char(&mut self, ctx: &mut StepContext, node: &ParseNode, ch: char) -> Tick {
        let style = style::resolve(&self.base_style, &node.styles, &self.metrics);
        // a word glued to a sentence period wraps like one after a space
        let mut crossed = false;
        if !self.hyphenation
            && self.idx >= 2
            && self.nodes[self.idx - 2].ch == '.'
            && layout::is_word_boundary(&self.nodes, self.idx - 2)
        {
            let word =
                layout::word_length_px(&self.nodes, self.idx - 1, &self.writer.store, style.scale);
            if self.pen.x + word > self.text_box.right_edge() - TEXT_BOX_MARGIN {
                crossed = self.newline(ctx.surface);
            }
        }
        if node.has_style("underline") {
            if self.underline.is_none() {
                self.underline = Some(UnderlineRun {
                    start_x: self.pen.x,
                    y: self.pen.y,
                    color: style.color,
                });
            }
        } else {
            self.flush_underline(ctx.surface);
        }
        let tick = self.begin_glyph(ctx, char_key(ch), style);
        if crossed {
            Tick::Overflow
        } else {
            tick
        }
    }

    /// Queue the animation for one glyph (a character or a named symbol),
    /// breaking the line first under hyphenation if it will not fit.
    fn begin_glyph(&mut self, ctx: &mut StepContext, key: String, style: PenStyle) -> Tick {
        let (w, h) = self.writer.store.size(&key);
        let mut crossed = false;
        if self.hyphenation
            && self.pen.x + w * style.scale > self.text_box.right_edge() - TEXT_BOX_MARGIN
        {
            let (from, to) = layout::hyphen_segment(
                (self.pen.x, self.pen.y),
                self.writer.store.generic_size(),
                style.scale,
                self.pt_size,
            );
            ctx.surface.draw_line(
                Point::new(from.0, from.1),
                Point::new(to.0, to.1),
                style.color,
                style.line_width.round().max(1.0) as u32,
            );
            crossed = self.newline(ctx.surface);
        }
        let Some(paths) = self.writer.store.paths(&key) else {
            log::warn!("no stroke data for '{key}', advancing past it");
            self.pen.x += w * style.scale;
            return if crossed { Tick::Overflow } else { Tick::Progress(self.pen) };
        };
        let origin = Point::new(self.pen.x, self.pen.y - h * style.scale + style.vert_offset);
        let anim = StrokeAnimation::new(
            paths.to_vec(),
            AnimationParams {
                origin,
                scale: style.scale,
                color: style.color,
                line_width: style.line_width,
                speed: style.speed,
                instant: self.instant,
                smooth_level: self.smooth_level,
                brush: self.brush.clone(),
                cursor: self.cursor.clone(),
                cursor_scale: self.cursor_scale,
            },
        );
        self.state = PlayState::Animating {
            anim,
            gap: self.char_spacing * style.scale,
        };
        if crossed {
            Tick::Overflow
        } else {
            Tick::Progress(self.pen)
        }
    }

    fn dispatch_escape(&mut self, ctx: &mut StepContext, follow: Option<ParseNode>) -> Tick {
        let Some(follow) = follow else {
            return Tick::Progress(self.pen);
        };
        match follow.ch {
            'n' => {
                if self.newline(ctx.surface) {
                    Tick::Overflow
                } else {
                    Tick::Progress(self.pen)
                }
            }
            't' => match self.text_box.tab_stop_after(self.pen.x) {
                Some(x) => {
                    self.pen.x = x;
                    Tick::Progress(self.pen)
                }
                None => {
                    if self.newline(ctx.surface) {
                        Tick::Overflow
                    } else {
                        Tick::Progress(self.pen)
                    }
                }
            },
            'p' => {
                if !self.instant {
                    self.state =
                        PlayState::PauseUntil(Instant::now() + Duration::from_millis(PAUSE_DELAY_MS));
                }
                Tick::Progress(self.pen)
            }
            'w' => {
                if !self.instant {
                    self.state = PlayState::WaitForKey;
                }
                Tick::Progress(self.pen)
            }
            EQ_INLINE_DELIM => self.inline_equation(ctx, &follow),
            EQ_BLOCK_DELIM => self.block_equation(ctx, &follow),
            SYMBOL_DELIM => self.symbol(ctx, &follow),
            ' ' => {
                let style = style::resolve(&self.base_style, &follow.styles, &self.metrics);
                self.pen.x += self.word_spacing * style.scale;
                Tick::Progress(self.pen)
            }
            other => {
                log::warn!("unhandled escape '\\{other}', skipping");
                Tick::Progress(self.pen)
            }
        }
    }

    fn symbol(&mut self, ctx: &mut StepContext, node: &ParseNode) -> Tick {
        let Some(name) = self.symbols.pop_front() else {
            log::warn!("symbol placeholder with no recorded payload");
            return Tick::Progress(self.pen);
        };
        let style = style::resolve(&self.base_style, &node.styles, &self.metrics);
        self.begin_glyph(ctx, name, style)
    }

    fn inline_equation(&mut self, ctx: &mut StepContext, node: &ParseNode) -> Tick {
        let Some(source) = self.inline_eqs.pop_front() else {
            log::warn!("equation placeholder with no recorded payload");
            return Tick::Progress(self.pen);
        };
        let style = style::resolve(&self.base_style, &node.styles, &self.metrics);
        let image = match ctx
            .equations
            .rasterize(&source, self.pt_size, style.color, self.eq_bg)
        {
            Ok(image) => image,
            Err(err) => {
                log::warn!("skipping inline equation ({}): {err}", ctx.equations.name());
                return Tick::Progress(self.pen);
            }
        };
        let usable = self.text_box.right_edge() - TEXT_BOX_MARGIN - self.text_box.line_start_x();
        let (w, h) = fit_equation(
            &image,
            EQ_INLINE_HEIGHT_SF * self.pt_size,
            EQ_FULL_LINE_SF * usable,
        );
        let hspace = EQ_HSPACE_SF * self.pt_size;
        let mut crossed = false;
        if self.pen.x + hspace + w as f32 > self.text_box.right_edge() - TEXT_BOX_MARGIN {
            crossed = self.newline(ctx.surface);
        }
        self.pen.x += hspace;
        let top = self.pen.y - h as f32 + EQ_INLINE_VERT_OFFSET_SF * self.pt_size;
        ctx.surface
            .blit(&image, Rect::new(self.pen.x as i32, top as i32, w, h));
        self.pen.x += w as f32 + hspace;
        if crossed {
            Tick::Overflow
        } else {
            Tick::Progress(self.pen)
        }
    }

    fn block_equation(&mut self, ctx: &mut StepContext, node: &ParseNode) -> Tick {
        let Some(source) = self.block_eqs.pop_front() else {
            log::warn!("equation placeholder with no recorded payload");
            return Tick::Progress(self.pen);
        };
        let style = style::resolve(&self.base_style, &node.styles, &self.metrics);
        let image = match ctx
            .equations
            .rasterize(&source, self.pt_size, style.color, self.eq_bg)
        {
            Ok(image) => image,
            Err(err) => {
                log::warn!("skipping block equation ({}): {err}", ctx.equations.name());
                return Tick::Progress(self.pen);
            }
        };
        let mut crossed = false;
        if self.pen.x > self.text_box.line_start_x() {
            crossed = self.newline(ctx.surface);
        }
        let usable = self.text_box.rect.w as f32 - 2.0 * TEXT_BOX_MARGIN;
        let (w, h) = fit_equation(
            &image,
            EQ_BLOCK_HEIGHT_SF * self.pt_size,
            EQ_FULL_LINE_SF * usable,
        );
        let x = self.text_box.rect.x as f32 + (self.text_box.rect.w as f32 - w as f32) / 2.0;
        let top = self.pen.y - self.pt_size;
        ctx.surface.blit(&image, Rect::new(x as i32, top as i32, w, h));
        // resume writing on a fresh line clear of the image
        self.pen.x = self.text_box.line_start_x();
        self.pen.y = top + h as f32 + EQ_BLOCK_VERT_PAD + self.pt_size;
        if self.pen.y > self.text_box.bottom() {
            crossed = true;
        }
        if crossed {
            Tick::Overflow
        } else {
            Tick::Progress(self.pen)
        }
    }

    /// Break the line, flushing any open underline run first. Returns
    /// whether the new baseline left the text box.
    fn newline(&mut self, surface: &mut dyn Surface) -> bool {
        self.flush_underline(surface);
        self.pen.x = self.text_box.line_start_x();
        self.pen.y += self.text_box.line_spacing;
        self.pen.y > self.text_box.bottom()
    }

    /// Draw the pending underline run, if any, up to the current pen.
    fn flush_underline(&mut self, surface: &mut dyn Surface) {
        if let Some(run) = self.underline.take() {
            if self.pen.x > run.start_x {
                let y = run.y + UNDERLINE_OFFSET;
                surface.draw_line(
                    Point::new(run.start_x, y),
                    Point::new(self.pen.x, y),
                    run.color,
                    self.base_style.line_width.round().max(1.0) as u32,
                );
            }
        }
    }
}

/// Scale an equation image to a target height, shrinking further when it
/// would exceed the usable line width. Aspect ratio is preserved.
fn fit_equation(image: &Bitmap, target_h: f32, max_w: f32) -> (u32, u32) {
    if image.width == 0 || image.height == 0 {
        return (0, 0);
    }
    let mut h = target_h;
    let mut w = image.width as f32 * h / image.height as f32;
    if w > max_w {
        h *= max_w / w;
        w = max_w;
    }
    ((w as u32).max(1), (h as u32).max(1))
}
