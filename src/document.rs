//! Document abstraction and an in-memory reference implementation.
//!
//! The session machinery only ever talks to the [`Document`] trait; a real
//! host editor supplies its own implementation. [`TextDocument`] is the
//! in-memory stand-in used by the binary and the tests: a flat string with a
//! read-only flag, a detachable undo log, a modified flag, a small
//! string-literal lexer and a decoration list.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::DocumentError;

/// Identity of a document, used to key sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(u64);

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Lexical classification of a position, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenState {
    pub inside_string: bool,
    /// Byte offset of the opening quote; meaningful only when inside.
    pub string_start: usize,
    /// One past the closing quote; meaningful only when inside.
    pub string_end: usize,
}

impl TokenState {
    fn outside() -> Self {
        Self {
            inside_string: false,
            string_start: 0,
            string_end: 0,
        }
    }
}

/// Visual annotation styles over a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecorationStyle {
    /// Marks the replaced region itself.
    Region,
    /// Cosmetic highlight layered under the region marker.
    Highlight,
}

/// Handle to a decoration created on a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecorationHandle(u64);

/// Opaque, restorable undo state. Taking the handle detaches the log and
/// disables recording until it is restored.
#[derive(Debug)]
pub struct UndoHandle {
    log: Option<Vec<EditRecord>>,
}

/// One recorded edit: enough to revert it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRecord {
    pub start: usize,
    pub old: String,
    pub new_len: usize,
}

/// Host capability set required by the locator and the session machinery.
pub trait Document {
    fn id(&self) -> DocumentId;
    fn text(&self) -> &str;
    fn read_region(&self, start: usize, end: usize) -> &str;
    fn replace_region(&mut self, start: usize, end: usize, text: &str)
        -> Result<(), DocumentError>;
    fn token_state_at(&self, pos: usize) -> TokenState;
    /// Set the read-only flag, returning its previous value.
    fn set_read_only(&mut self, read_only: bool) -> bool;
    fn take_undo_handle(&mut self) -> UndoHandle;
    fn restore_undo_handle(&mut self, handle: UndoHandle);
    fn is_modified(&self) -> bool;
    fn set_modified(&mut self, modified: bool);
    fn create_decoration(
        &mut self,
        start: usize,
        end: usize,
        style: DecorationStyle,
        priority: i32,
    ) -> DecorationHandle;
    fn remove_decoration(&mut self, handle: DecorationHandle);
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Decoration {
    handle: DecorationHandle,
    start: usize,
    end: usize,
    style: DecorationStyle,
    priority: i32,
}

/// In-memory document over a flat string.
#[derive(Debug)]
pub struct TextDocument {
    id: DocumentId,
    text: String,
    read_only: bool,
    modified: bool,
    /// `None` while the undo handle is taken; edits are not recorded then.
    undo: Option<Vec<EditRecord>>,
    decorations: Vec<Decoration>,
    next_decoration: u64,
}

impl TextDocument {
    pub fn new(content: &str) -> Self {
        Self {
            id: DocumentId(NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed)),
            text: content.to_string(),
            read_only: false,
            modified: false,
            undo: Some(Vec::new()),
            decorations: Vec::new(),
            next_decoration: 1,
        }
    }

    pub fn undo_records(&self) -> &[EditRecord] {
        self.undo.as_deref().unwrap_or(&[])
    }

    /// Revert the most recent recorded edit.
    pub fn undo(&mut self) -> bool {
        let Some(record) = self.undo.as_mut().and_then(|log| log.pop()) else {
            return false;
        };
        let end = record.start + record.new_len;
        self.text.replace_range(record.start..end, &record.old);
        true
    }

    pub fn decoration_count(&self) -> usize {
        self.decorations.len()
    }

    /// Decorations as `(start, end, style, priority)`, in creation order.
    pub fn decoration_spans(&self) -> Vec<(usize, usize, DecorationStyle, i32)> {
        self.decorations
            .iter()
            .map(|d| (d.start, d.end, d.style, d.priority))
            .collect()
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }
}

impl Document for TextDocument {
    fn id(&self) -> DocumentId {
        self.id
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn read_region(&self, start: usize, end: usize) -> &str {
        self.text.get(start..end).unwrap_or("")
    }

    fn replace_region(
        &mut self,
        start: usize,
        end: usize,
        text: &str,
    ) -> Result<(), DocumentError> {
        if self.read_only {
            return Err(DocumentError::ReadOnly);
        }
        if self.text.get(start..end).is_none() {
            return Err(DocumentError::InvalidRegion { start, end });
        }
        if let Some(log) = self.undo.as_mut() {
            log.push(EditRecord {
                start,
                old: self.text[start..end].to_string(),
                new_len: text.len(),
            });
        }
        self.text.replace_range(start..end, text);
        self.modified = true;
        Ok(())
    }

    /// Classify `pos` against the double-quoted string tokens of the text.
    ///
    /// A position is inside a string strictly between the opening quote and
    /// one past the closing quote. An unterminated string at end of text is
    /// not a string token.
    fn token_state_at(&self, pos: usize) -> TokenState {
        let mut start = None;
        let mut escaped = false;
        for (i, c) in self.text.char_indices() {
            match start {
                None => {
                    if c == '"' {
                        start = Some(i);
                    }
                }
                Some(s) => {
                    if escaped {
                        escaped = false;
                    } else if c == '\\' {
                        escaped = true;
                    } else if c == '"' {
                        let end = i + 1;
                        if pos > s && pos < end {
                            return TokenState {
                                inside_string: true,
                                string_start: s,
                                string_end: end,
                            };
                        }
                        start = None;
                    }
                }
            }
        }
        TokenState::outside()
    }

    fn set_read_only(&mut self, read_only: bool) -> bool {
        std::mem::replace(&mut self.read_only, read_only)
    }

    fn take_undo_handle(&mut self) -> UndoHandle {
        UndoHandle {
            log: self.undo.take(),
        }
    }

    fn restore_undo_handle(&mut self, handle: UndoHandle) {
        self.undo = handle.log;
    }

    fn is_modified(&self) -> bool {
        self.modified
    }

    fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
    }

    fn create_decoration(
        &mut self,
        start: usize,
        end: usize,
        style: DecorationStyle,
        priority: i32,
    ) -> DecorationHandle {
        let handle = DecorationHandle(self.next_decoration);
        self.next_decoration += 1;
        self.decorations.push(Decoration {
            handle,
            start,
            end,
            style,
            priority,
        });
        handle
    }

    fn remove_decoration(&mut self, handle: DecorationHandle) {
        self.decorations.retain(|d| d.handle != handle);
    }
}

/// Decode a double-quoted string literal into its character content.
///
/// `\\`, `\"`, `\n`, `\t` and `\r` are decoded; any other escaped character
/// stands for itself. Returns `None` when the input is not a quoted literal.
pub fn decode_string_literal(literal: &str) -> Option<String> {
    let inner = literal
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => return None,
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_region() {
        let mut doc = TextDocument::new("hello world");
        doc.replace_region(0, 5, "goodbye").unwrap();
        assert_eq!(doc.text(), "goodbye world");
        assert!(doc.is_modified());
    }

    #[test]
    fn test_replace_region_read_only() {
        let mut doc = TextDocument::new("hello");
        doc.set_read_only(true);
        assert_eq!(
            doc.replace_region(0, 5, "x"),
            Err(crate::error::DocumentError::ReadOnly)
        );
        assert_eq!(doc.text(), "hello");
    }

    #[test]
    fn test_replace_region_out_of_bounds() {
        let mut doc = TextDocument::new("hi");
        assert!(doc.replace_region(0, 10, "x").is_err());
    }

    #[test]
    fn test_undo_reverts_edit() {
        let mut doc = TextDocument::new("abc");
        doc.replace_region(1, 2, "XY").unwrap();
        assert_eq!(doc.text(), "aXYc");
        assert!(doc.undo());
        assert_eq!(doc.text(), "abc");
        assert!(!doc.undo());
    }

    #[test]
    fn test_detached_undo_records_nothing() {
        let mut doc = TextDocument::new("abc");
        let handle = doc.take_undo_handle();
        doc.replace_region(0, 1, "z").unwrap();
        doc.restore_undo_handle(handle);
        assert!(doc.undo_records().is_empty());
    }

    #[test]
    fn test_token_state_inside_string() {
        let doc = TextDocument::new("let x = \"abc\";");
        let state = doc.token_state_at(10);
        assert!(state.inside_string);
        assert_eq!(state.string_start, 8);
        assert_eq!(state.string_end, 13);
    }

    #[test]
    fn test_token_state_outside_string() {
        let doc = TextDocument::new("let x = \"abc\";");
        assert!(!doc.token_state_at(3).inside_string);
        // on the opening quote counts as outside
        assert!(!doc.token_state_at(8).inside_string);
        // one past the closing quote counts as outside
        assert!(!doc.token_state_at(13).inside_string);
    }

    #[test]
    fn test_token_state_skips_escaped_quote() {
        let doc = TextDocument::new(r#"x = "a\"b";"#);
        let state = doc.token_state_at(6);
        assert!(state.inside_string);
        assert_eq!(state.string_start, 4);
        assert_eq!(state.string_end, 10);
    }

    #[test]
    fn test_token_state_unterminated_string() {
        let doc = TextDocument::new("x = \"abc");
        assert!(!doc.token_state_at(6).inside_string);
    }

    #[test]
    fn test_decorations() {
        let mut doc = TextDocument::new("abc");
        let a = doc.create_decoration(0, 3, DecorationStyle::Region, 100);
        let b = doc.create_decoration(0, 3, DecorationStyle::Highlight, 0);
        assert_eq!(doc.decoration_count(), 2);
        doc.remove_decoration(a);
        doc.remove_decoration(b);
        assert_eq!(doc.decoration_count(), 0);
    }

    #[test]
    fn test_decode_string_literal() {
        assert_eq!(decode_string_literal("\"abc\""), Some("abc".to_string()));
        assert_eq!(
            decode_string_literal(r#""\\(a\\)""#),
            Some("\\(a\\)".to_string())
        );
        assert_eq!(decode_string_literal(r#""a\"b""#), Some("a\"b".to_string()));
        assert_eq!(decode_string_literal(r#""a\nb""#), Some("a\nb".to_string()));
        assert_eq!(decode_string_literal("no quotes"), None);
    }
}
