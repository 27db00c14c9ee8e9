//! Loading a realistic font directory end to end: primary font, fallback
//! font, shared symbol set and one corrupt recording in the same tree.

use std::fs;
use std::path::Path;

use scrawl_core::store::char_key;
use scrawl_strokedb::{StrokeFontDb, SYMBOL_FONT};

const GLYPH: &str = r#"[[{"pos": [0.0, 0.0], "time": 0}, {"pos": [9.0, 12.0], "time": 30}]]"#;

fn write_glyph(dir: &Path, font: &str, key: &str, json: &str) {
    fs::write(dir.join(format!("{font}#{key}.json")), json).unwrap();
}

#[test]
fn mixed_directory_loads_into_one_store() {
    let dir = tempfile::tempdir().unwrap();
    for ch in ['h', 'i'] {
        write_glyph(dir.path(), "cursive", &char_key(ch), GLYPH);
    }
    write_glyph(dir.path(), "default", &char_key('z'), GLYPH);
    write_glyph(dir.path(), "cursive", &char_key('x'), "{ truncated");
    write_glyph(dir.path(), SYMBOL_FONT, "smiley", GLYPH);

    let db = StrokeFontDb::new(dir.path());
    let store = db.load_store("cursive", Some("default")).unwrap();

    assert!(store.contains(&char_key('h')));
    // 'z' only exists in the fallback font
    assert!(store.contains(&char_key('z')));
    assert!(store.contains("smiley"));
    // the corrupt recording was skipped, not fatal
    assert!(!store.contains(&char_key('x')));
    assert_eq!(store.size(&char_key('h')), (9.0, 12.0));

    assert_eq!(db.available_fonts().unwrap(), vec!["cursive", "default"]);
}

#[test]
fn missing_primary_font_fails_even_with_a_fallback() {
    let dir = tempfile::tempdir().unwrap();
    write_glyph(dir.path(), "default", &char_key('a'), GLYPH);

    let db = StrokeFontDb::new(dir.path());
    assert!(db.load_store("gothic", Some("default")).is_err());
}
