//! Markup handling: extraction, tokenizing, validation
//!
//! Three passes run before any ink is laid, in this order:
//!
//! 1. [`legal::find_illegal_escape`] rejects unknown escape tokens.
//! 2. [`delimit::extract`] pulls equation and symbol payloads out of the
//!    stream, leaving escaped placeholders behind.
//! 3. [`tokens::parse`] resolves `\style{...}` scopes into a flat list of
//!    [`ParseNode`]s.
//!
//! All three are pure string work; failures here are fatal and surface
//! before playback starts.

pub mod delimit;
pub mod legal;
pub mod tokens;

/// Escape characters that adjust position: `\n` newline, `\t` tab.
pub const FORMATTING_ESCAPES: [char; 2] = ['n', 't'];

/// Escape characters that stall playback: `\p` pause, `\w` wait for key.
pub const FLOW_ESCAPES: [char; 2] = ['p', 'w'];

/// Delimiter for inline typeset equations.
pub const EQ_INLINE_DELIM: char = '$';

/// Delimiter for centred own-line typeset equations.
pub const EQ_BLOCK_DELIM: char = '£';

/// Delimiter for named symbols, as in markdown.
pub const SYMBOL_DELIM: char = '`';

/// One unit of parsed text: a character plus the style scopes that were
/// open when it was emitted, innermost last.
///
/// Scope order is kept (rather than a bare set) so conflicting styles,
/// two colours say, resolve deterministically to the innermost one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNode {
    pub styles: Vec<String>,
    pub ch: char,
}

impl ParseNode {
    pub fn new(styles: Vec<String>, ch: char) -> Self {
        Self { styles, ch }
    }

    pub fn has_style(&self, name: &str) -> bool {
        self.styles.iter().any(|s| s == name)
    }
}
