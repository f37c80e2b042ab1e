//! Reversible expand/collapse sessions over documents.
//!
//! A session replaces a string literal with its rendered explanation and
//! remembers everything needed to put the document back byte for byte: the
//! original text, the saved read-only flag, the detached undo handle and the
//! saved modified flag. While a session is active the document is forced
//! read-only; only the machinery's own edits go through. Sessions live in an
//! arena keyed by document identity, one per document.

use std::collections::HashMap;

use crate::document::{decode_string_literal, DecorationHandle, DecorationStyle, Document, DocumentId, UndoHandle};
use crate::error::SessionError;
use crate::explain;
use crate::locate::locate_string_at;

/// Live record of one expand-to-collapse cycle.
#[derive(Debug)]
struct Session {
    span_start: usize,
    span_end: usize,
    original_text: String,
    saved_read_only: bool,
    saved_modified: bool,
    saved_undo: UndoHandle,
    region_decoration: DecorationHandle,
    highlight_decoration: DecorationHandle,
}

/// Arena of sessions, one slot per document.
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: HashMap<DocumentId, Session>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded<D: Document + ?Sized>(&self, doc: &D) -> bool {
        self.sessions.contains_key(&doc.id())
    }

    /// Expand the string literal at `pos` into its rendered explanation.
    ///
    /// Atomic: when the pattern fails to parse, the document is restored to
    /// its pre-expand state before the error propagates. Expanding a
    /// document that already has a session is a no-op.
    pub fn expand<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        pos: usize,
    ) -> Result<(), SessionError> {
        if self.sessions.contains_key(&doc.id()) {
            return Ok(());
        }

        let span = locate_string_at(doc, pos).ok_or(SessionError::NotInString)?;
        let original_text = doc.read_region(span.start, span.end).to_string();
        let pattern = decode_string_literal(&original_text).ok_or(SessionError::NotInString)?;

        // enter session mode: undo detached first so nothing below is recorded
        let saved_modified = doc.is_modified();
        let saved_undo = doc.take_undo_handle();
        let saved_read_only = doc.set_read_only(true);

        let replaced = explain(&pattern).map_err(SessionError::from).and_then(|rendered| {
            let indented = indent_block(&rendered, column_at(doc.text(), span.start));
            doc.set_read_only(false);
            let result = doc.replace_region(span.start, span.end, &indented);
            doc.set_read_only(true);
            result?;
            Ok(indented.len())
        });

        let replaced_len = match replaced {
            Ok(len) => len,
            Err(err) => {
                doc.set_read_only(saved_read_only);
                doc.restore_undo_handle(saved_undo);
                doc.set_modified(saved_modified);
                return Err(err);
            }
        };

        let span_end = span.start + replaced_len;
        let region_decoration =
            doc.create_decoration(span.start, span_end, DecorationStyle::Region, 100);
        let highlight_decoration =
            doc.create_decoration(span.start, span_end, DecorationStyle::Highlight, 0);

        tracing::debug!(
            start = span.start,
            end = span_end,
            "expanded pattern into explanation"
        );

        self.sessions.insert(
            doc.id(),
            Session {
                span_start: span.start,
                span_end,
                original_text,
                saved_read_only,
                saved_modified,
                saved_undo,
                region_decoration,
                highlight_decoration,
            },
        );
        Ok(())
    }

    /// Restore the original text and leave session mode.
    ///
    /// Returns `false` when no session is active (a no-op, not an error).
    pub fn collapse<D: Document + ?Sized>(&mut self, doc: &mut D) -> Result<bool, SessionError> {
        let Some(session) = self.sessions.remove(&doc.id()) else {
            return Ok(false);
        };

        doc.set_read_only(false);
        let result = doc.replace_region(
            session.span_start,
            session.span_end,
            &session.original_text,
        );
        doc.remove_decoration(session.region_decoration);
        doc.remove_decoration(session.highlight_decoration);
        doc.set_read_only(session.saved_read_only);
        doc.restore_undo_handle(session.saved_undo);
        doc.set_modified(session.saved_modified);

        tracing::debug!(start = session.span_start, "collapsed explanation");

        result?;
        Ok(true)
    }

    /// Host hook: called before any user command touches the document.
    ///
    /// A pending user edit during an active session collapses it first, so
    /// the edit lands on the restored original text.
    pub fn on_user_command<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
    ) -> Result<(), SessionError> {
        if self.is_expanded(doc) {
            self.collapse(doc)?;
        }
        Ok(())
    }
}

/// Column of `pos` on its line, in characters.
fn column_at(text: &str, pos: usize) -> usize {
    let line_start = text[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0);
    text[line_start..pos].chars().count()
}

/// Indent every line after the first to `column`, matching the indentation
/// context the rendering is inserted into.
fn indent_block(text: &str, column: usize) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, line) in text.lines().enumerate() {
        if i > 0 {
            out.push('\n');
            for _ in 0..column {
                out.push(' ');
            }
        }
        out.push_str(line);
    }
    out
}
