//! Where recorded handwriting comes from: stroke-font discovery and loading
//!
//! A stroke font is a directory of small JSON files, one per glyph, named
//! `<font>#<key>.json`. The key is a decimal code point for ordinary
//! characters or a free-form name for recorded symbols; symbols live in
//! the shared `hw_symbol` pseudo-font. Each file holds the glyph's pen
//! paths as the recorder captured them:
//!
//! ```json
//! [[{"pos": [1.0, 2.0], "time": 0}, {"pos": [3.5, 4.0], "time": 16}]]
//! ```
//!
//! A wholly absent font is a hard error; an individual unreadable glyph
//! file is logged and skipped so one bad recording never takes the whole
//! font down.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use scrawl_core::error::{Result, StrokeFontError};
use scrawl_core::{Point, StrokePath, StrokeSample, StrokeStore};

/// The pseudo-font holding recorded symbols, shared by every font.
pub const SYMBOL_FONT: &str = "hw_symbol";

/// One recorded sample on disk.
#[derive(Debug, Deserialize)]
struct SampleRec {
    pos: [f32; 2],
    time: u32,
}

/// Load every glyph of `font` from `dir`.
///
/// Fails with [`StrokeFontError::FontNotFound`] when no file carries the
/// font's prefix at all. Files that do match but will not parse are
/// skipped with a warning.
pub fn load_glyphs(dir: &Path, font: &str) -> Result<HashMap<String, Vec<StrokePath>>> {
    let prefix = format!("{font}#");
    let mut glyphs = HashMap::new();
    let mut matched = 0usize;

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let Some(key) = glyph_key(&path, &prefix) else {
            continue;
        };
        matched += 1;
        match read_glyph(&path) {
            Ok(paths) => {
                glyphs.insert(key, paths);
            }
            Err(err) => {
                log::warn!("skipping unreadable glyph file {}: {err}", path.display());
            }
        }
    }

    if matched == 0 {
        return Err(StrokeFontError::FontNotFound(font.to_string()).into());
    }
    log::debug!("loaded {} of {matched} glyphs for font '{font}'", glyphs.len());
    Ok(glyphs)
}

/// The key encoded in a glyph filename, if it belongs to `prefix`.
fn glyph_key(path: &Path, prefix: &str) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    if path.extension()?.to_str()? != "json" {
        return None;
    }
    stem.strip_prefix(prefix).map(str::to_string)
}

fn read_glyph(path: &Path) -> std::result::Result<Vec<StrokePath>, StrokeFontError> {
    let data = fs::read_to_string(path).map_err(|e| StrokeFontError::InvalidData {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let recs: Vec<Vec<SampleRec>> =
        serde_json::from_str(&data).map_err(|e| StrokeFontError::InvalidData {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
    Ok(recs
        .into_iter()
        .map(|samples| {
            StrokePath::new(
                samples
                    .into_iter()
                    .map(|s| StrokeSample {
                        pos: Point::new(s.pos[0], s.pos[1]),
                        time_ms: s.time,
                    })
                    .collect(),
            )
        })
        .collect())
}

/// A directory of stroke fonts.
pub struct StrokeFontDb {
    root: PathBuf,
}

impl StrokeFontDb {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Build a ready-to-animate [`StrokeStore`]: the requested font, an
    /// optional fallback font for missing glyphs, and the shared symbol
    /// set when present.
    pub fn load_store(&self, font: &str, fallback: Option<&str>) -> Result<StrokeStore> {
        let primary = load_glyphs(&self.root, font)?;
        let fallback_map = match fallback {
            Some(name) if name != font => match load_glyphs(&self.root, name) {
                Ok(map) => map,
                Err(err) => {
                    log::warn!("fallback font '{name}' unavailable: {err}");
                    primary.clone()
                }
            },
            _ => primary.clone(),
        };
        let mut store = StrokeStore::new(primary, fallback_map);
        match load_glyphs(&self.root, SYMBOL_FONT) {
            Ok(symbols) => store.add_glyphs(symbols),
            // a missing symbol set just means no `...` markup support
            Err(err) => log::debug!("no symbol set: {err}"),
        }
        Ok(store)
    }

    /// The distinct font names present in the directory, sorted.
    pub fn available_fonts(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some((font, _)) = stem.split_once('#') {
                if font != SYMBOL_FONT && !names.contains(&font.to_string()) {
                    names.push(font.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrawl_core::store::char_key;

    fn write_glyph(dir: &Path, font: &str, key: &str, json: &str) {
        fs::write(dir.join(format!("{font}#{key}.json")), json).unwrap();
    }

    const GLYPH: &str = r#"[[{"pos": [0.0, 0.0], "time": 0}, {"pos": [10.0, 5.0], "time": 20}]]"#;

    #[test]
    fn loads_glyphs_by_prefix() {
        let dir = tempfile::tempdir().unwrap();
        write_glyph(dir.path(), "cursive", &char_key('a'), GLYPH);
        write_glyph(dir.path(), "cursive", &char_key('b'), GLYPH);
        write_glyph(dir.path(), "print", &char_key('a'), GLYPH);

        let glyphs = load_glyphs(dir.path(), "cursive").unwrap();
        assert_eq!(glyphs.len(), 2);
        let paths = &glyphs[&char_key('a')];
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].samples.len(), 2);
        assert_eq!(paths[0].samples[1].pos, Point::new(10.0, 5.0));
        assert_eq!(paths[0].samples[1].time_ms, 20);
    }

    #[test]
    fn absent_font_is_a_hard_error() {
        let dir = tempfile::tempdir().unwrap();
        write_glyph(dir.path(), "cursive", &char_key('a'), GLYPH);
        let err = load_glyphs(dir.path(), "gothic").unwrap_err();
        assert!(err.to_string().contains("gothic"));
    }

    #[test]
    fn corrupt_glyph_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_glyph(dir.path(), "cursive", &char_key('a'), GLYPH);
        write_glyph(dir.path(), "cursive", &char_key('b'), "not json at all");

        let glyphs = load_glyphs(dir.path(), "cursive").unwrap();
        assert_eq!(glyphs.len(), 1);
        assert!(glyphs.contains_key(&char_key('a')));
    }

    #[test]
    fn store_merges_symbols_and_fallback() {
        let dir = tempfile::tempdir().unwrap();
        write_glyph(dir.path(), "cursive", &char_key('a'), GLYPH);
        write_glyph(dir.path(), "default", &char_key('b'), GLYPH);
        write_glyph(dir.path(), SYMBOL_FONT, "star", GLYPH);

        let db = StrokeFontDb::new(dir.path());
        let store = db.load_store("cursive", Some("default")).unwrap();
        assert!(store.paths(&char_key('a')).is_some());
        assert!(store.paths(&char_key('b')).is_some());
        assert!(store.contains("star"));
    }

    #[test]
    fn available_fonts_are_distinct_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write_glyph(dir.path(), "print", &char_key('a'), GLYPH);
        write_glyph(dir.path(), "cursive", &char_key('a'), GLYPH);
        write_glyph(dir.path(), "cursive", &char_key('b'), GLYPH);
        write_glyph(dir.path(), SYMBOL_FONT, "star", GLYPH);

        let db = StrokeFontDb::new(dir.path());
        assert_eq!(db.available_fonts().unwrap(), vec!["cursive", "print"]);
    }
}
