//! The style-scope bracket parser
//!
//! Scans character by character, keeping a stack of open style scopes.
//! `\bold{` pushes `bold`; `}` pops the innermost scope; everything else
//! is emitted tagged with a snapshot of the stack. The token spelling is
//! recognised *retroactively*: when a `{` turns up, the characters already
//! emitted are checked for a spelling immediately before it and removed
//! from the output if they match. Braces with no spelling in front are
//! ordinary characters, and `\}` is a literal close brace.

use crate::error::MarkupError;
use crate::markup::ParseNode;
use crate::style::StyleTable;

/// Parse `text` into a flat node sequence, resolving nested style scopes.
///
/// A close brace with no open scope is a [`MarkupError::UnbalancedBraces`]
/// failure; no partially valid prefix is returned.
pub fn parse(text: &str, table: &StyleTable) -> Result<Vec<ParseNode>, MarkupError> {
    let chars: Vec<char> = text.chars().collect();
    let mut open: Vec<String> = Vec::new();
    let mut nodes: Vec<ParseNode> = Vec::new();

    for (i, &c) in chars.iter().enumerate() {
        if c == '{' {
            let mut matched = false;
            for (name, spelling) in table.iter() {
                let len = spelling.chars().count();
                if i >= len && chars[i - len..i].iter().collect::<String>() == *spelling {
                    // drop the spelling's characters from the output and
                    // swallow the brace itself
                    nodes.truncate(nodes.len().saturating_sub(len));
                    open.push(name.clone());
                    matched = true;
                    break;
                }
            }
            if !matched {
                nodes.push(ParseNode::new(open.clone(), c));
            }
        } else if c == '}' {
            if i > 0 && chars[i - 1] == '\\' {
                // literal close brace; remove the escaping backslash
                nodes.pop();
                nodes.push(ParseNode::new(open.clone(), c));
            } else if open.pop().is_none() {
                return Err(MarkupError::UnbalancedBraces);
            }
        } else {
            nodes.push(ParseNode::new(open.clone(), c));
        }
    }

    Ok(nodes)
}

/// The character-only projection of a node sequence. Handy in tests and
/// for measuring.
pub fn plain_text(nodes: &[ParseNode]) -> String {
    nodes.iter().map(|n| n.ch).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::StyleTable;

    fn table() -> StyleTable {
        StyleTable::builtin()
    }

    #[test]
    fn plain_text_passes_through() {
        let nodes = parse("hello", &table()).unwrap();
        assert_eq!(plain_text(&nodes), "hello");
        assert!(nodes.iter().all(|n| n.styles.is_empty()));
    }

    #[test]
    fn bold_scope_tags_its_characters() {
        let nodes = parse("\\bold{hi}", &table()).unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0], ParseNode::new(vec!["bold".into()], 'h'));
        assert_eq!(nodes[1], ParseNode::new(vec!["bold".into()], 'i'));
    }

    #[test]
    fn nesting_keeps_scope_order() {
        let nodes = parse("\\bold{\\red{x}y}", &table()).unwrap();
        assert_eq!(plain_text(&nodes), "xy");
        assert_eq!(nodes[0].styles, vec!["bold".to_string(), "red".to_string()]);
        assert_eq!(nodes[1].styles, vec!["bold".to_string()]);
    }

    #[test]
    fn innermost_colour_is_last() {
        let nodes = parse("\\red{\\blue{x}}", &table()).unwrap();
        assert_eq!(nodes[0].styles, vec!["red".to_string(), "blue".to_string()]);
    }

    #[test]
    fn bare_open_brace_is_a_literal() {
        let nodes = parse("a{b", &table()).unwrap();
        assert_eq!(plain_text(&nodes), "a{b");
    }

    #[test]
    fn escaped_close_brace_is_a_literal() {
        let nodes = parse("a\\}b", &table()).unwrap();
        assert_eq!(plain_text(&nodes), "a}b");
    }

    #[test]
    fn extra_close_brace_fails() {
        assert_eq!(
            parse("\\bold{hi}}", &table()).unwrap_err(),
            MarkupError::UnbalancedBraces
        );
        assert_eq!(parse("}", &table()).unwrap_err(), MarkupError::UnbalancedBraces);
    }

    #[test]
    fn token_text_never_leaks_into_output() {
        let nodes = parse("say \\green{go} now", &table()).unwrap();
        assert_eq!(plain_text(&nodes), "say go now");
    }
}
