//! Style tokens and cumulative style resolution
//!
//! A style token binds a name ("bold", "red", "bigger") to its escape
//! spelling ("\bold"). The builtin table carries the formatting directives
//! plus one token per named colour, and is read-only process-wide state;
//! callers who need extra tokens clone and extend it.
//!
//! Resolution derives a fresh effective [`PenStyle`] per character from
//! the playback's base style: scales multiply, vertical offsets add, bold
//! multiplies line width, speed styles multiply the speed. Each distinct
//! style applies once no matter how deeply it nests, and styles apply in
//! scope-open order, so when two colours are active the innermost wins.

use once_cell::sync::Lazy;

use crate::Color;

/// Scale factor for one level of `\bigger` / `\smaller`.
pub const SCALE_MULTIPLIER: f32 = 1.5;
/// Line width factor for `\bold`.
pub const BOLD_LINE_WIDTH_SF: f32 = 4.0;
/// Glyph scale factor for superscripts and subscripts.
pub const SUPER_SIZE_SF: f32 = 0.55;
pub const SUB_SIZE_SF: f32 = 0.55;
/// Vertical offsets relative to point size; up is negative.
pub const SUPER_OFFSET_SF: f32 = -0.4;
pub const SUB_OFFSET_SF: f32 = 0.2;
pub const UP_OFFSET_SF: f32 = -0.2;
pub const DOWN_OFFSET_SF: f32 = 0.2;
/// Underline distance below the baseline, in pixels.
pub const UNDERLINE_OFFSET: f32 = 5.0;

/// The named colours usable as style tokens (`\red{...}`).
pub static NAMED_COLORS: Lazy<Vec<(&'static str, Color)>> = Lazy::new(|| {
    vec![
        ("white", Color::rgb(255, 255, 255)),
        ("black", Color::rgb(0, 0, 0)),
        ("red", Color::rgb(255, 0, 0)),
        ("green", Color::rgb(0, 255, 0)),
        ("blue", Color::rgb(0, 0, 255)),
        ("yellow", Color::rgb(255, 255, 0)),
        ("cyan", Color::rgb(0, 255, 255)),
        ("magenta", Color::rgb(255, 0, 255)),
        ("orange", Color::rgb(255, 165, 0)),
        ("purple", Color::rgb(160, 32, 240)),
        ("pink", Color::rgb(255, 192, 203)),
        ("brown", Color::rgb(165, 42, 42)),
        ("gray", Color::rgb(128, 128, 128)),
        ("grey", Color::rgb(128, 128, 128)),
        ("maroon", Color::rgb(128, 0, 0)),
        ("navy", Color::rgb(0, 0, 128)),
        ("gold", Color::rgb(255, 215, 0)),
        ("silver", Color::rgb(192, 192, 192)),
        ("violet", Color::rgb(238, 130, 238)),
        ("turquoise", Color::rgb(64, 224, 208)),
    ]
});

/// Look up a colour by its style-token name.
pub fn named_color(name: &str) -> Option<Color> {
    NAMED_COLORS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, c)| *c)
}

/// Formatting style names that are not colours.
const FORMAT_STYLES: [&str; 10] = [
    "bold",
    "underline",
    "sub",
    "super",
    "doublespeed",
    "halfspeed",
    "bigger",
    "smaller",
    "up",
    "down",
];

/// Name → escape spelling, in registration order.
///
/// Registration order matters to the parser only in that lookups scan it
/// front to back; spellings are distinct so no entry shadows another.
#[derive(Debug, Clone)]
pub struct StyleTable {
    entries: Vec<(String, String)>,
}

impl StyleTable {
    /// The builtin formatting directives plus every named colour.
    pub fn builtin() -> Self {
        let mut table = Self {
            entries: Vec::new(),
        };
        for name in FORMAT_STYLES {
            table.register(name);
        }
        for (name, _) in NAMED_COLORS.iter() {
            table.register(name);
        }
        table
    }

    /// Add a token whose spelling is a backslash followed by its name.
    pub fn register(&mut self, name: &str) {
        self.entries
            .push((name.to_string(), format!("\\{name}")));
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, String)> {
        self.entries.iter()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The concrete drawing parameters for one character, derived fresh from
/// the playback's base style plus the character's active style scopes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenStyle {
    pub color: Color,
    pub line_width: f32,
    /// Recorded-units → pixels factor.
    pub scale: f32,
    /// Playback speed multiplier; higher is faster.
    pub speed: f32,
    /// Pixels added to the character's baseline; down is positive.
    pub vert_offset: f32,
}

/// Pixel offsets that depend on the playback's point size.
#[derive(Debug, Clone, Copy)]
pub struct StyleMetrics {
    pub super_offset: f32,
    pub sub_offset: f32,
    pub up_offset: f32,
    pub down_offset: f32,
}

impl StyleMetrics {
    pub fn for_pt_size(pt_size: f32) -> Self {
        Self {
            super_offset: SUPER_OFFSET_SF * pt_size,
            sub_offset: SUB_OFFSET_SF * pt_size,
            up_offset: UP_OFFSET_SF * pt_size,
            down_offset: DOWN_OFFSET_SF * pt_size,
        }
    }
}

/// Apply the active style scopes to a copy of `base`.
///
/// Styles act as a set: a style nested inside itself still applies once.
/// Application order is scope order, which only matters for colours.
pub fn resolve(base: &PenStyle, active: &[String], metrics: &StyleMetrics) -> PenStyle {
    let mut style = *base;
    for (i, name) in active.iter().enumerate() {
        if active[..i].contains(name) {
            continue;
        }
        match name.as_str() {
            "bigger" => style.scale *= SCALE_MULTIPLIER,
            "smaller" => style.scale /= SCALE_MULTIPLIER,
            "bold" => style.line_width *= BOLD_LINE_WIDTH_SF,
            "super" => {
                style.vert_offset += metrics.super_offset;
                style.scale *= SUPER_SIZE_SF;
            }
            "sub" => {
                style.vert_offset += metrics.sub_offset;
                style.scale *= SUB_SIZE_SF;
            }
            "up" => style.vert_offset += metrics.up_offset,
            "down" => style.vert_offset += metrics.down_offset,
            "doublespeed" => style.speed *= 2.0,
            "halfspeed" => style.speed *= 0.5,
            // underline is positional bookkeeping, handled by the driver
            "underline" => {}
            other => {
                if let Some(color) = named_color(other) {
                    style.color = color;
                }
            }
        }
    }
    style
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> PenStyle {
        PenStyle {
            color: Color::WHITE,
            line_width: 1.0,
            scale: 1.5,
            speed: 5.0,
            vert_offset: 0.0,
        }
    }

    fn metrics() -> StyleMetrics {
        StyleMetrics::for_pt_size(30.0)
    }

    #[test]
    fn builtin_table_has_formats_and_colours() {
        let table = StyleTable::builtin();
        assert!(table.contains("bold"));
        assert!(table.contains("underline"));
        assert!(table.contains("maroon"));
        assert_eq!(table.len(), FORMAT_STYLES.len() + NAMED_COLORS.len());
    }

    #[test]
    fn base_style_is_never_mutated() {
        let b = base();
        let styled = resolve(&b, &["bigger".into(), "bold".into()], &metrics());
        assert_eq!(b, base());
        assert_eq!(styled.scale, 1.5 * SCALE_MULTIPLIER);
        assert_eq!(styled.line_width, BOLD_LINE_WIDTH_SF);
    }

    #[test]
    fn nested_same_style_applies_once() {
        let styled = resolve(&base(), &["bigger".into(), "bigger".into()], &metrics());
        assert_eq!(styled.scale, 1.5 * SCALE_MULTIPLIER);
    }

    #[test]
    fn innermost_colour_wins() {
        let styled = resolve(&base(), &["red".into(), "blue".into()], &metrics());
        assert_eq!(styled.color, named_color("blue").unwrap());
    }

    #[test]
    fn super_scales_and_lifts() {
        let styled = resolve(&base(), &["super".into()], &metrics());
        assert_eq!(styled.scale, 1.5 * SUPER_SIZE_SF);
        assert_eq!(styled.vert_offset, SUPER_OFFSET_SF * 30.0);
    }

    #[test]
    fn speed_styles_multiply() {
        let styled = resolve(&base(), &["doublespeed".into()], &metrics());
        assert_eq!(styled.speed, 10.0);
        let styled = resolve(&base(), &["halfspeed".into()], &metrics());
        assert_eq!(styled.speed, 2.5);
    }
}
