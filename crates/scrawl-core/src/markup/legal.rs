//! Escape-token pre-flight validation
//!
//! A fast scan run before extraction or parsing: every backslash must be
//! followed by a space, a formatting/flow escape character, or a style
//! token spelling with its opening brace (`bold{`, `red{`, ...). The first
//! violation is reported by character index so callers can point at it.

use crate::markup::{FLOW_ESCAPES, FORMATTING_ESCAPES};
use crate::style::StyleTable;

/// Index of the first backslash introducing an unrecognised escape, or
/// `None` when the text is clean. Indexes count characters, not bytes.
pub fn find_illegal_escape(text: &str, table: &StyleTable) -> Option<usize> {
    let legal = legal_suffixes(table);
    let chars: Vec<char> = text.chars().collect();

    let mut i = 0;
    while i < chars.len() {
        if chars[i] != '\\' {
            i += 1;
            continue;
        }
        // backslash-space is an allowed no-op escape
        if chars.get(i + 1) == Some(&' ') {
            i += 2;
            continue;
        }
        let mut matched = false;
        for token in &legal {
            let len = token.chars().count();
            if i + 1 + len <= chars.len()
                && chars[i + 1..i + 1 + len].iter().collect::<String>() == *token
            {
                i += 1 + len;
                matched = true;
                break;
            }
        }
        if !matched {
            return Some(i);
        }
    }
    None
}

/// Everything allowed to follow a backslash: single escape characters plus
/// each style spelling with a trailing `{`.
fn legal_suffixes(table: &StyleTable) -> Vec<String> {
    let mut suffixes: Vec<String> = FORMATTING_ESCAPES
        .iter()
        .chain(FLOW_ESCAPES.iter())
        .map(|c| c.to_string())
        .collect();
    // literal close brace
    suffixes.push("}".to_string());
    for (_, spelling) in table.iter() {
        // spelling is "\name"; the legal suffix is "name{"
        let name = spelling.trim_start_matches('\\');
        suffixes.push(format!("{name}{{"));
    }
    suffixes
}
