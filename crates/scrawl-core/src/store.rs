//! The stroke store: character-key → recorded pen paths
//!
//! Built once at font-load time, read-only afterwards, safe to share
//! across any number of concurrent playbacks. Lookups fall through three
//! levels: the user font, the default font, and finally a single
//! "unrecognised character" placeholder glyph. Sizes get the same
//! treatment, ending at a generic reference character's extent.

use std::collections::HashMap;

use crate::StrokePath;

/// Character drawn when a key exists in neither store.
pub const PLACEHOLDER_CHAR: char = '?';

/// Reference character whose extent stands in for unknown sizes.
pub const GENERIC_SIZE_CHAR: char = 'W';

/// Extent used when even the generic reference character is missing.
const LAST_RESORT_SIZE: (f32, f32) = (30.0, 40.0);

/// The store key for an ordinary character: its decimal code point.
/// Symbol keys are free-form names and are produced by the recorder, not
/// by this function.
pub fn char_key(ch: char) -> String {
    (ch as u32).to_string()
}

/// Read-only mapping from character-key to stroke paths, with a parallel
/// size cache and a fallback store for missing glyphs.
#[derive(Debug, Clone, Default)]
pub struct StrokeStore {
    glyphs: HashMap<String, Vec<StrokePath>>,
    sizes: HashMap<String, (f32, f32)>,
    fallback_glyphs: HashMap<String, Vec<StrokePath>>,
    fallback_sizes: HashMap<String, (f32, f32)>,
    generic_size: (f32, f32),
}

impl StrokeStore {
    /// Build a store from a primary glyph map and a default-font fallback
    /// map. Both size caches and the generic reference size are computed
    /// here, once.
    pub fn new(
        primary: HashMap<String, Vec<StrokePath>>,
        fallback: HashMap<String, Vec<StrokePath>>,
    ) -> Self {
        let sizes = compute_sizes(&primary);
        let fallback_sizes = compute_sizes(&fallback);
        let generic_key = char_key(GENERIC_SIZE_CHAR);
        let generic_size = sizes
            .get(&generic_key)
            .or_else(|| fallback_sizes.get(&generic_key))
            .copied()
            .unwrap_or(LAST_RESORT_SIZE);
        Self {
            glyphs: primary,
            sizes,
            fallback_glyphs: fallback,
            fallback_sizes,
            generic_size,
        }
    }

    /// A store whose primary map doubles as its own fallback.
    pub fn from_single(glyphs: HashMap<String, Vec<StrokePath>>) -> Self {
        Self::new(glyphs.clone(), glyphs)
    }

    /// Merge extra glyphs (e.g. the shared symbol set) into the primary
    /// map, recomputing their sizes.
    pub fn add_glyphs(&mut self, glyphs: HashMap<String, Vec<StrokePath>>) {
        for (key, paths) in glyphs {
            let size = paths_extent(&paths);
            self.sizes.insert(key.clone(), size);
            self.glyphs.insert(key, paths);
        }
    }

    /// Paths for a key: user font, then default font, then the
    /// placeholder glyph. `None` only when the placeholder itself is
    /// missing from both stores.
    pub fn paths(&self, key: &str) -> Option<&[StrokePath]> {
        if let Some(paths) = self.glyphs.get(key) {
            return Some(paths);
        }
        if let Some(paths) = self.fallback_glyphs.get(key) {
            return Some(paths);
        }
        let placeholder = char_key(PLACEHOLDER_CHAR);
        self.glyphs
            .get(&placeholder)
            .or_else(|| self.fallback_glyphs.get(&placeholder))
            .map(Vec::as_slice)
    }

    /// Recorded extent of a key: user font size, default-font size, then
    /// the generic reference size. Always succeeds.
    pub fn size(&self, key: &str) -> (f32, f32) {
        self.sizes
            .get(key)
            .or_else(|| self.fallback_sizes.get(key))
            .copied()
            .unwrap_or(self.generic_size)
    }

    /// Extent of the generic reference character.
    pub fn generic_size(&self) -> (f32, f32) {
        self.generic_size
    }

    /// Whether path data exists for this key without falling back to the
    /// placeholder.
    pub fn contains(&self, key: &str) -> bool {
        self.glyphs.contains_key(key) || self.fallback_glyphs.contains_key(key)
    }

    /// Number of keys in the primary map.
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }
}

fn compute_sizes(glyphs: &HashMap<String, Vec<StrokePath>>) -> HashMap<String, (f32, f32)> {
    glyphs
        .iter()
        .map(|(key, paths)| (key.clone(), paths_extent(paths)))
        .collect()
}

/// Bounding extent across all of a key's paths.
fn paths_extent(paths: &[StrokePath]) -> (f32, f32) {
    let mut min_x = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    let mut any = false;
    for path in paths {
        for s in &path.samples {
            any = true;
            min_x = min_x.min(s.pos.x);
            max_x = max_x.max(s.pos.x);
            min_y = min_y.min(s.pos.y);
            max_y = max_y.max(s.pos.y);
        }
    }
    if any {
        (max_x - min_x, max_y - min_y)
    } else {
        (0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Point, StrokeSample};

    fn path(points: &[(f32, f32)]) -> StrokePath {
        StrokePath::new(
            points
                .iter()
                .enumerate()
                .map(|(i, &(x, y))| StrokeSample {
                    pos: Point::new(x, y),
                    time_ms: i as u32 * 10,
                })
                .collect(),
        )
    }

    fn store() -> StrokeStore {
        let mut primary = HashMap::new();
        primary.insert(char_key('a'), vec![path(&[(0.0, 0.0), (10.0, 5.0)])]);
        let mut fallback = HashMap::new();
        fallback.insert(char_key('b'), vec![path(&[(0.0, 0.0), (8.0, 4.0)])]);
        fallback.insert(char_key('?'), vec![path(&[(0.0, 0.0), (6.0, 9.0)])]);
        fallback.insert(char_key('W'), vec![path(&[(0.0, 0.0), (20.0, 30.0)])]);
        StrokeStore::new(primary, fallback)
    }

    #[test]
    fn lookup_falls_through_to_default_font() {
        let s = store();
        assert!(s.paths(&char_key('a')).is_some());
        assert!(s.paths(&char_key('b')).is_some());
    }

    #[test]
    fn missing_key_gets_the_placeholder() {
        let s = store();
        let paths = s.paths(&char_key('z')).unwrap();
        assert_eq!(paths[0].extent(), (6.0, 9.0));
    }

    #[test]
    fn size_falls_through_to_generic() {
        let s = store();
        assert_eq!(s.size(&char_key('a')), (10.0, 5.0));
        assert_eq!(s.size(&char_key('z')), (20.0, 30.0));
        assert_eq!(s.generic_size(), (20.0, 30.0));
    }

    #[test]
    fn extent_spans_all_paths_of_a_key() {
        let mut primary = HashMap::new();
        primary.insert(
            "x".to_string(),
            vec![path(&[(0.0, 0.0), (4.0, 1.0)]), path(&[(2.0, -3.0), (9.0, 2.0)])],
        );
        let s = StrokeStore::new(primary, HashMap::new());
        assert_eq!(s.size("x"), (9.0, 5.0));
    }

    #[test]
    fn symbols_merge_into_primary() {
        let mut s = store();
        let mut symbols = HashMap::new();
        symbols.insert("happy".to_string(), vec![path(&[(0.0, 0.0), (12.0, 12.0)])]);
        s.add_glyphs(symbols);
        assert!(s.contains("happy"));
        assert_eq!(s.size("happy"), (12.0, 12.0));
    }
}
