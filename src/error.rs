use thiserror::Error;

/// Reasons a pattern fails to parse.
///
/// Every variant is a local syntax failure; parsing never produces a partial
/// tree alongside an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("unterminated group: missing `\\)`")]
    UnterminatedGroup,
    #[error("unmatched `\\)` outside any group")]
    UnmatchedGroupClose,
    #[error("unterminated character class: missing `]`")]
    UnterminatedClass,
    #[error("dangling `\\` at end of pattern")]
    DanglingEscape,
    #[error("malformed counted repetition")]
    MalformedRepeat,
    #[error("bad group syntax after `\\(?`")]
    BadGroupSyntax,
    #[error("unknown syntax class code `{0}`")]
    UnknownSyntaxClass(char),
    #[error("unknown named character class `[:{0}:]`")]
    UnknownNamedClass(String),
    #[error("group nesting exceeds {limit} levels")]
    TooDeep { limit: usize },
}

/// Contract errors of the document abstraction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("document is read-only")]
    ReadOnly,
    #[error("region {start}..{end} is not a valid span of the document")]
    InvalidRegion { start: usize, end: usize },
}

/// Failures of the expand transition.
///
/// Collapse with no active session is a no-op, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("point is not inside a string literal")]
    NotInString,
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error(transparent)]
    Document(#[from] DocumentError),
}
