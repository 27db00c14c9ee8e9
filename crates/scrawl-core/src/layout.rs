//! Layout decisions: margins, tab stops, word measuring, hyphen geometry
//!
//! Pure geometry; the driver asks questions here and does the drawing
//! itself. Two line-breaking strategies exist and are mutually exclusive:
//! forward word measuring (measure the next word, break before it when it
//! will not fit) and reactive hyphenation (break mid-word at the margin
//! with a crude hyphen mark, no linguistic break-point search).

use crate::markup::ParseNode;
use crate::store::{char_key, StrokeStore};
use crate::Rect;

/// Default gap between the text box and the surface edge when no text
/// rect is given.
pub const TEXT_BOX_BORDER: i32 = 50;

/// Right/left margin buffer inside the text box, in pixels.
pub const TEXT_BOX_MARGIN: f32 = 20.0;

/// Hyphen mark length in pixels at the reference point size.
pub const HYPHEN_LENGTH: f32 = 15.0;

/// Point size the hyphen length is calibrated for.
pub const HYPHEN_REF_PT_SIZE: f32 = 28.0;

/// The text box a playback writes into, with derived spacing.
#[derive(Debug, Clone, Copy)]
pub struct TextBox {
    pub rect: Rect,
    pub tab_spacing: f32,
    pub line_spacing: f32,
}

impl TextBox {
    pub fn new(rect: Rect, num_tabs: u32, line_spacing: f32) -> Self {
        Self {
            rect,
            tab_spacing: rect.w as f32 / num_tabs.max(1) as f32,
            line_spacing,
        }
    }

    /// Where every line starts.
    pub fn line_start_x(&self) -> f32 {
        self.rect.x as f32 + TEXT_BOX_MARGIN
    }

    /// Absolute x of the box's right edge.
    pub fn right_edge(&self) -> f32 {
        self.rect.right() as f32
    }

    /// Absolute y past which the text has overflowed.
    pub fn bottom(&self) -> f32 {
        self.rect.bottom() as f32
    }

    /// Baseline of the first line.
    pub fn first_baseline_y(&self) -> f32 {
        self.rect.y as f32 + self.line_spacing
    }

    /// Absolute x of the next tab stop for a pen at absolute `x`, or
    /// `None` when that stop would leave the box (callers newline
    /// instead).
    pub fn tab_stop_after(&self, x: f32) -> Option<f32> {
        let rel = x - self.rect.x as f32;
        let stop = next_tab_stop(rel, self.tab_spacing);
        let abs = self.rect.x as f32 + stop;
        if abs >= self.right_edge() - TEXT_BOX_MARGIN {
            None
        } else {
            Some(abs)
        }
    }
}

/// Next multiple of `spacing` at or after `x`. A pen already on a stop
/// stays put.
pub fn next_tab_stop(x: f32, spacing: f32) -> f32 {
    let whole = (x / spacing).floor() * spacing;
    if x - whole > 0.0 {
        whole + spacing
    } else {
        whole
    }
}

/// True when the node at `i` ends a word: a space, or a period followed
/// immediately by a non-space character.
pub fn is_word_boundary(nodes: &[ParseNode], i: usize) -> bool {
    match nodes.get(i).map(|n| n.ch) {
        Some(' ') => true,
        Some('.') => nodes.get(i + 1).map(|n| n.ch) != Some(' ') && i + 1 < nodes.len(),
        _ => false,
    }
}

/// Pixel width of the word starting at node `start`, scanning forward to
/// the next space and skipping two-character escape pairs. Character
/// widths come from the store's cache with its usual fallbacks.
pub fn word_length_px(
    nodes: &[ParseNode],
    start: usize,
    store: &StrokeStore,
    scale: f32,
) -> f32 {
    let mut length = 0.0;
    let mut j = start;
    while j < nodes.len() && nodes[j].ch != ' ' {
        if nodes[j].ch == '\\' {
            j += 2;
            continue;
        }
        let (w, _) = store.size(&char_key(nodes[j].ch));
        length += w * scale;
        j += 1;
    }
    length
}

/// Hyphen mark geometry: start point offset from the pen position by half
/// a generic character, and a length scaled from the reference size.
pub fn hyphen_segment(
    pen: (f32, f32),
    generic_size: (f32, f32),
    scale: f32,
    pt_size: f32,
) -> ((f32, f32), (f32, f32)) {
    let start = (
        pen.0 + 0.5 * generic_size.0 * scale,
        pen.1 - 0.5 * generic_size.1 * scale,
    );
    let length = (pt_size / HYPHEN_REF_PT_SIZE) * HYPHEN_LENGTH;
    (start, (start.0 + length, start.1))
}
