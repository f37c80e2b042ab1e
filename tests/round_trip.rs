//! End-to-end checks of the expand/collapse cycle and the translator's
//! output guarantees, through the public API only.

use proptest::prelude::*;

use regex_explain::document::{Document, TextDocument};
use regex_explain::session::SessionManager;
use regex_explain::{explain, PatternError, SessionError};

const SOURCE: &str = "(defun scan ()\n  (re-search-forward \"\\\\([0-9]+\\\\) \\\\(.\\\\)\"))\n";

fn cursor_in_string(doc: &TextDocument) -> usize {
    doc.text().find('"').map(|i| i + 1).unwrap()
}

#[test]
fn expand_collapse_round_trips_bytes_and_state() {
    let mut doc = TextDocument::new(SOURCE);
    let mut sessions = SessionManager::new();
    let before = doc.text().to_string();
    let pos = cursor_in_string(&doc);

    sessions.expand(&mut doc, pos).unwrap();
    assert!(sessions.is_expanded(&doc));
    assert_ne!(doc.text(), before);

    assert!(sessions.collapse(&mut doc).unwrap());
    assert_eq!(doc.text(), before);
    assert!(!sessions.is_expanded(&doc));
    assert!(!doc.is_modified());
}

#[test]
fn expand_collapse_leaves_undo_history_identical() {
    let mut doc = TextDocument::new(SOURCE);
    doc.replace_region(0, 0, ";; edited\n").unwrap();
    let history_before = doc.undo_records().to_vec();
    let mut sessions = SessionManager::new();
    let pos = cursor_in_string(&doc);

    sessions.expand(&mut doc, pos).unwrap();
    sessions.collapse(&mut doc).unwrap();

    assert_eq!(doc.undo_records(), &history_before[..]);
    assert!(doc.is_modified());
}

#[test]
fn expand_outside_string_fails_and_changes_nothing() {
    let mut doc = TextDocument::new(SOURCE);
    let before = doc.text().to_string();
    let mut sessions = SessionManager::new();

    let result = sessions.expand(&mut doc, 3);
    assert_eq!(result, Err(SessionError::NotInString));
    assert_eq!(doc.text(), before);
    assert!(!doc.is_modified());
    assert!(doc.undo_records().is_empty());
}

#[test]
fn expand_on_malformed_pattern_unwinds_completely() {
    let mut doc = TextDocument::new("(looking-at \"\\\\(oops\")\n");
    let before = doc.text().to_string();
    let mut sessions = SessionManager::new();
    let pos = cursor_in_string(&doc);

    let result = sessions.expand(&mut doc, pos);
    assert_eq!(
        result,
        Err(SessionError::Pattern(PatternError::UnterminatedGroup))
    );
    assert_eq!(doc.text(), before);
    assert!(!doc.is_read_only());
    assert!(!sessions.is_expanded(&doc));
}

#[test]
fn edits_are_rejected_while_expanded_then_land_after_auto_collapse() {
    let mut doc = TextDocument::new(SOURCE);
    let before = doc.text().to_string();
    let mut sessions = SessionManager::new();
    let pos = cursor_in_string(&doc);
    sessions.expand(&mut doc, pos).unwrap();

    assert!(doc.replace_region(0, 0, "x").is_err());

    sessions.on_user_command(&mut doc).unwrap();
    doc.replace_region(0, 0, "x").unwrap();
    assert_eq!(doc.text(), format!("x{before}"));
}

#[test]
fn explained_text_matches_facade_output() {
    let mut doc = TextDocument::new("(setq re \"a\\\\|b\")");
    let mut sessions = SessionManager::new();
    sessions.expand(&mut doc, 11).unwrap();
    let rendered = explain("a\\|b").unwrap();
    assert!(doc.text().contains(&rendered));
    sessions.collapse(&mut doc).unwrap();
}

proptest! {
    // any pattern that parses renders the same way every time, with clean
    // line endings
    #[test]
    fn render_is_deterministic_and_tidy(s in ".*") {
        if let Ok(first) = explain(&s) {
            let second = explain(&s).unwrap();
            prop_assert_eq!(&first, &second);
            prop_assert!(!first.ends_with('\n'));
            for line in first.lines() {
                prop_assert_eq!(line, line.trim_end());
            }
        }
    }
}
