//! End-to-end pipeline tests: markup in, recorded drawing calls out.

use std::collections::{HashMap, VecDeque};

use scrawl_core::driver::{Handwriter, StepContext, Tick};
use scrawl_core::error::EquationError;
use scrawl_core::store::{char_key, StrokeStore};
use scrawl_core::traits::{
    EquationRasterizer, InputSource, NoEquationSupport, NullInput, Surface, UserEvent,
};
use scrawl_core::{Bitmap, Color, Point, Rect, StrokePath, StrokeSample, WriteOptions};

/// Records every drawing call without touching pixels.
#[derive(Default)]
struct RecordingSurface {
    lines: Vec<(Point, Point, Color)>,
    blits: Vec<Rect>,
    fills: Vec<(Color, Rect)>,
}

impl Surface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        (800, 600)
    }

    fn fill(&mut self, color: Color, rect: Rect) -> Rect {
        self.fills.push((color, rect));
        rect
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Color, _width: u32) -> Rect {
        self.lines.push((from, to, color));
        Rect::new(from.x as i32, from.y as i32, 1, 1)
    }

    fn draw_polygon(&mut self, _points: &[Point], _color: Color) -> Rect {
        Rect::default()
    }

    fn blit(&mut self, _image: &Bitmap, dest: Rect) -> Rect {
        self.blits.push(dest);
        dest
    }

    fn save_region(&self, rect: Rect) -> Bitmap {
        Bitmap::blank(rect.w.max(1), rect.h.max(1))
    }

    fn restore_region(&mut self, _image: &Bitmap, rect: Rect) -> Rect {
        rect
    }
}

struct Events(VecDeque<UserEvent>);

impl InputSource for Events {
    fn poll(&mut self) -> Option<UserEvent> {
        self.0.pop_front()
    }
}

/// Renders every equation as a solid 40x20 block of the foreground colour.
struct StubEquations;

impl EquationRasterizer for StubEquations {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn rasterize(
        &self,
        _source: &str,
        _pt_size: f32,
        foreground: Color,
        _background: Color,
    ) -> Result<Bitmap, EquationError> {
        Ok(Bitmap::solid(40, 20, foreground))
    }
}

/// Each glyph is one two-sample diagonal, 10 recorded units wide and tall.
fn test_store() -> StrokeStore {
    let mut glyphs = HashMap::new();
    for ch in ['a', 'b', 'c', 'd', 'e', '?', 'W'] {
        glyphs.insert(
            char_key(ch),
            vec![StrokePath::new(vec![
                StrokeSample {
                    pos: Point::new(0.0, 0.0),
                    time_ms: 0,
                },
                StrokeSample {
                    pos: Point::new(10.0, 10.0),
                    time_ms: 0,
                },
            ])],
        );
    }
    StrokeStore::from_single(glyphs)
}

fn instant() -> WriteOptions {
    WriteOptions {
        instant: true,
        ..WriteOptions::default()
    }
}

fn run(
    writer: &Handwriter,
    surface: &mut RecordingSurface,
    text: &str,
    opts: &WriteOptions,
) -> (Vec<Tick>, Point) {
    let mut playback = writer.write_text(surface, text, opts).expect("valid markup");
    let mut input = NullInput;
    let mut ticks = Vec::new();
    for _ in 0..100_000 {
        let tick = playback.step(&mut StepContext {
            surface: &mut *surface,
            input: &mut input,
            equations: &StubEquations,
        });
        ticks.push(tick);
        if matches!(tick, Tick::Finished | Tick::UserQuit) {
            return (ticks, playback.pen());
        }
    }
    panic!("playback never finished");
}

#[test]
fn pen_lands_just_past_the_last_glyph() {
    // default geometry: text box at 50 px border, 20 px margin, so the
    // line starts at x = 70; 10-unit glyphs render 15 px wide at 30 pt
    let writer = Handwriter::new(test_store());
    let mut surface = RecordingSurface::default();
    let (_, pen) = run(&writer, &mut surface, "ab", &instant());
    assert_eq!(pen.x, 100.0);
    assert_eq!(surface.lines.len(), 4);
}

#[test]
fn instant_and_stepped_runs_draw_the_same_ink() {
    let writer = Handwriter::new(test_store());
    let mut fast = RecordingSurface::default();
    run(&writer, &mut fast, "abc ab", &instant());

    let mut slow = RecordingSurface::default();
    let (ticks, _) = run(&writer, &mut slow, "abc ab", &WriteOptions::default());
    assert!(ticks.len() > 1);
    assert_eq!(fast.lines, slow.lines);
}

#[test]
fn quit_leaves_partial_ink_behind() {
    let writer = Handwriter::new(test_store());
    let mut full = RecordingSurface::default();
    run(&writer, &mut full, "abcde", &instant());
    let full_count = full.lines.len();

    let mut surface = RecordingSurface::default();
    let mut playback = writer
        .write_text(&mut surface, "abcde", &WriteOptions::default())
        .expect("valid markup");
    let mut input = Events(VecDeque::new());
    // six steps gets the second glyph underway
    for _ in 0..6 {
        playback.step(&mut StepContext {
            surface: &mut surface,
            input: &mut input,
            equations: &NoEquationSupport,
        });
    }
    input.0.push_back(UserEvent::Escaped);
    let tick = playback.step(&mut StepContext {
        surface: &mut surface,
        input: &mut input,
        equations: &NoEquationSupport,
    });
    assert_eq!(tick, Tick::UserQuit);
    assert!(!surface.lines.is_empty());
    assert!(surface.lines.len() < full_count);
}

#[test]
fn styled_text_changes_colour_only_inside_the_scope() {
    let writer = Handwriter::new(test_store());
    let mut surface = RecordingSurface::default();
    run(&writer, &mut surface, "a\\red{b}c", &instant());
    let red = Color::rgb(255, 0, 0);
    assert_eq!(surface.lines.len(), 6);
    assert_eq!(surface.lines[0].2, Color::WHITE);
    assert_eq!(surface.lines[2].2, red);
    assert_eq!(surface.lines[3].2, red);
    assert_eq!(surface.lines[4].2, Color::WHITE);
}

#[test]
fn inline_equation_is_blitted_at_text_height() {
    let writer = Handwriter::new(test_store());
    let mut surface = RecordingSurface::default();
    run(&writer, &mut surface, "a $x^2$ b", &instant());
    assert_eq!(surface.blits.len(), 1);
    let dest = surface.blits[0];
    // 40x20 source scaled to 1.2 * 30 pt tall
    assert_eq!(dest.h, 36);
    assert_eq!(dest.w, 72);
}

#[test]
fn block_equation_is_centred_on_its_own_line() {
    let writer = Handwriter::new(test_store());
    let mut surface = RecordingSurface::default();
    run(&writer, &mut surface, "a £E£ b", &instant());
    assert_eq!(surface.blits.len(), 1);
    let dest = surface.blits[0];
    // 45 px tall, centred in the 700 px wide default text box
    assert_eq!(dest.h, 45);
    let centre = dest.x + dest.w as i32 / 2;
    assert_eq!(centre, 50 + 350);
}

#[test]
fn recorded_symbols_draw_like_glyphs() {
    let mut store = test_store();
    let mut symbols = HashMap::new();
    symbols.insert(
        "star".to_string(),
        vec![StrokePath::new(vec![
            StrokeSample {
                pos: Point::new(0.0, 0.0),
                time_ms: 0,
            },
            StrokeSample {
                pos: Point::new(8.0, 8.0),
                time_ms: 0,
            },
        ])],
    );
    store.add_glyphs(symbols);
    let writer = Handwriter::new(store);
    let mut surface = RecordingSurface::default();
    let (ticks, _) = run(&writer, &mut surface, "`star`", &instant());
    assert_eq!(*ticks.last().unwrap(), Tick::Finished);
    assert_eq!(surface.lines.len(), 2);
}

#[test]
fn tab_jumps_to_the_next_stop() {
    let writer = Handwriter::new(test_store());
    let mut surface = RecordingSurface::default();
    let (_, pen) = run(&writer, &mut surface, "a\\tb", &instant());
    // after 'a' the pen sits at 98.5 (glyph end plus the space the tab
    // rewrite inserts); the next of six stops across 700 px is 116.67
    // from the box edge, then 'b' adds its 15 px
    let expected = 50.0 + 700.0 / 6.0 + 15.0;
    assert!((pen.x - expected).abs() < 0.01, "pen at {}", pen.x);
}

#[test]
fn background_decorations_precede_ink() {
    let writer = Handwriter::new(test_store());
    let mut surface = RecordingSurface::default();
    let opts = WriteOptions {
        surface_bg: Some(Color::rgb(10, 10, 10)),
        text_rect_border: Some((Color::rgb(200, 200, 200), 2)),
        ..instant()
    };
    run(&writer, &mut surface, "a", &opts);
    // one full-surface fill plus four border strips
    assert_eq!(surface.fills.len(), 5);
    assert_eq!(surface.fills[0].1, Rect::new(0, 0, 800, 600));
}
