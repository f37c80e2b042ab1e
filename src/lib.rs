//! Translate backslash-escaped regexps into a readable symbolic-expression
//! tree, and present the translation inline over source text through a
//! reversible expand/collapse session.

pub mod ast;
pub mod document;
pub mod error;
pub mod locate;
pub mod parser;
pub mod printer;
pub mod session;

pub use error::{DocumentError, PatternError, SessionError};

/// Translate a pattern into its symbolic-expression form.
///
/// Composes the parser and the printer and strips trailing whitespace.
/// Pure: same pattern in, same text out, no side effects.
pub fn explain(pattern: &str) -> Result<String, PatternError> {
    tracing::trace!(pattern, "explaining pattern");
    let node = parser::parse(pattern)?;
    Ok(printer::render(&node).trim_end().to_string())
}

/// Reference text for the input dialect and the output vocabulary.
pub fn syntax_help() -> &'static str {
    SYNTAX_HELP
}

const SYNTAX_HELP: &str = "\
Input dialect (backslash-escaped):
  \\( ... \\)     capturing group        \\(?: ... \\)   shy group
  \\(?N: ... \\)  explicitly numbered    \\|            alternation
  * + ?          quantifiers            \\{m,n\\}       counted repetition
  trailing ?     lazy variant           [...] [^...]  character class
  [a-z]          range                  [[:name:]]    named class
  ^ $            line anchors           \\` \\'         buffer anchors
  \\b \\B         word boundary          \\< \\>         word start/end
  \\w \\W         word constituent       \\sC \\SC       syntax class
  \\1 .. \\9      backreference          .             any non-newline char

Output vocabulary:
  sequence alternative group group-n backref
  zero-or-more one-or-more zero-or-one exact-count at-least repeat lazy
  any-of none-of range non-newline-char word-char not-word-char
  syntax-char not-syntax-char
  line-start line-end buffer-start buffer-end
  word-boundary not-word-boundary word-start word-end";
