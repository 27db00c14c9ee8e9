//! Out-of-band payload extraction
//!
//! Equation source and symbol names are written between sentinel
//! characters (`$...$`, `£...£`, `` `...` ``). They leave the text stream
//! here, before the style parser ever sees it: each delimited span is
//! replaced by an escaped placeholder (e.g. `\$`) that the playback driver
//! later treats as a flow-control escape, popping the next payload off the
//! matching queue.
//!
//! Nested occurrences of the same delimiter are not supported; the split
//! is purely positional.

use crate::error::MarkupError;

/// Split `text` on `delimiter` and pull out the payloads between pairs.
///
/// Returns the payloads in left-to-right order plus the rewritten text in
/// which every `delim payload delim` span became `placeholder`. Text
/// without the delimiter comes back unchanged with no payloads. An odd
/// number of occurrences is a [`MarkupError::UnmatchedDelimiter`].
pub fn extract(
    text: &str,
    delimiter: char,
    placeholder: &str,
) -> Result<(Vec<String>, String), MarkupError> {
    let pieces: Vec<&str> = text.split(delimiter).collect();
    if pieces.len() == 1 {
        return Ok((Vec::new(), text.to_string()));
    }
    // N delimiters split into N+1 pieces; balanced means N is even.
    if pieces.len() % 2 == 0 {
        return Err(MarkupError::UnmatchedDelimiter { delimiter });
    }

    let payloads = pieces
        .iter()
        .skip(1)
        .step_by(2)
        .map(|s| (*s).to_string())
        .collect();

    let rewritten = pieces
        .iter()
        .step_by(2)
        .copied()
        .collect::<Vec<_>>()
        .join(placeholder);

    Ok((payloads, rewritten))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_delimiters_passes_through() {
        let (payloads, rest) = extract("plain text", '$', "\\$").unwrap();
        assert!(payloads.is_empty());
        assert_eq!(rest, "plain text");
    }

    #[test]
    fn payloads_come_out_in_order() {
        let (payloads, rest) = extract("a $x^2$ b $y+1$ c", '$', "\\$").unwrap();
        assert_eq!(payloads, vec!["x^2", "y+1"]);
        assert_eq!(rest, "a \\$ b \\$ c");
    }

    #[test]
    fn leading_delimiter() {
        let (payloads, rest) = extract("$E=mc^2$ rest", '$', "\\$").unwrap();
        assert_eq!(payloads, vec!["E=mc^2"]);
        assert_eq!(rest, "\\$ rest");
    }

    #[test]
    fn no_raw_delimiter_survives() {
        let input = "x $a$ y $b$ z $c$ w";
        let (payloads, rest) = extract(input, '$', "\\$").unwrap();
        assert_eq!(payloads.len(), 3);
        // every remaining '$' is the escaped placeholder
        let chars: Vec<char> = rest.chars().collect();
        for (i, &c) in chars.iter().enumerate() {
            if c == '$' {
                assert_eq!(chars[i - 1], '\\');
            }
        }
    }

    #[test]
    fn unmatched_delimiter_is_an_error() {
        let err = extract("a $broken", '$', "\\$").unwrap_err();
        assert_eq!(err, MarkupError::UnmatchedDelimiter { delimiter: '$' });
    }

    #[test]
    fn successive_classes_do_not_leak() {
        let text = "eq $a+b$ then `happy` symbol";
        let (eqs, rest) = extract(text, '$', "\\$").unwrap();
        let (syms, rest) = extract(&rest, '`', "\\`").unwrap();
        assert_eq!(eqs, vec!["a+b"]);
        assert_eq!(syms, vec!["happy"]);
        assert_eq!(rest, "eq \\$ then \\` symbol");
    }
}
