//! Renders a [`RegexNode`] tree as an indented symbolic expression.
//!
//! The printer owns the whole minimization rule set: sequence flattening,
//! literal-run merging, single-member class collapsing, run-to-range
//! collapsing and shy-group elision all happen here, never in the parser.

use crate::ast::{AnchorKind, ClassItem, GroupKind, RegexNode, RepeatKind};

/// Forms whose inline rendering stays within this width (counting the
/// current indentation) are kept on one line; anything longer lays its
/// children out vertically.
const LINE_WIDTH: usize = 72;

/// Render a tree as the symbolic-expression text.
///
/// Total function: every tree the parser produces has a rendering. The
/// output has no trailing newline and no trailing whitespace on any line.
pub fn render(node: &RegexNode) -> String {
    let form = build(node);
    let mut out = String::new();
    write_form(&form, 0, &mut out);
    out
}

/// Intermediate shape between the AST and the text: either a single-line
/// token or a keyword applied to arguments.
enum Form {
    Atom(String),
    List(&'static str, Vec<Form>),
}

fn build(node: &RegexNode) -> Form {
    match node {
        RegexNode::Seq(children) => build_seq(children),
        RegexNode::Alt(branches) => build_alt(branches),
        RegexNode::Repeat { node, kind, lazy } => {
            let child = build(node);
            let form = match kind {
                RepeatKind::ZeroOrMore => Form::List("zero-or-more", vec![child]),
                RepeatKind::OneOrMore => Form::List("one-or-more", vec![child]),
                RepeatKind::ZeroOrOne => Form::List("zero-or-one", vec![child]),
                RepeatKind::Exactly(n) => {
                    Form::List("exact-count", vec![Form::Atom(n.to_string()), child])
                }
                RepeatKind::AtLeast(n) => {
                    Form::List("at-least", vec![Form::Atom(n.to_string()), child])
                }
                RepeatKind::Between(n, m) => Form::List(
                    "repeat",
                    vec![Form::Atom(n.to_string()), Form::Atom(m.to_string()), child],
                ),
            };
            if *lazy {
                Form::List("lazy", vec![form])
            } else {
                form
            }
        }
        RegexNode::Group { kind, node } => match kind {
            GroupKind::Capturing(_) => Form::List("group", vec![build(node)]),
            GroupKind::Numbered(n) => {
                Form::List("group-n", vec![Form::Atom(n.to_string()), build(node)])
            }
            // the tree already makes grouping explicit
            GroupKind::Shy => build(node),
        },
        RegexNode::BackRef { id } => Form::List("backref", vec![Form::Atom(id.to_string())]),
        RegexNode::Anchor(kind) => Form::Atom(anchor_keyword(*kind).to_string()),
        RegexNode::Dot => Form::Atom("non-newline-char".to_string()),
        RegexNode::WordChar => Form::Atom("word-char".to_string()),
        RegexNode::NotWordChar => Form::Atom("not-word-char".to_string()),
        RegexNode::Syntax { class, negated } => {
            let keyword = if *negated {
                "not-syntax-char"
            } else {
                "syntax-char"
            };
            Form::List(keyword, vec![Form::Atom(class.name().to_string())])
        }
        RegexNode::CharClass { items, negated } => build_class(items, *negated),
        RegexNode::Literal(c) => Form::Atom(quote_string(&c.to_string())),
    }
}

fn anchor_keyword(kind: AnchorKind) -> &'static str {
    match kind {
        AnchorKind::LineStart => "line-start",
        AnchorKind::LineEnd => "line-end",
        AnchorKind::BufferStart => "buffer-start",
        AnchorKind::BufferEnd => "buffer-end",
        AnchorKind::WordBoundary => "word-boundary",
        AnchorKind::NotWordBoundary => "not-word-boundary",
        AnchorKind::WordStart => "word-start",
        AnchorKind::WordEnd => "word-end",
    }
}

/// Build a sequence: flatten nested sequences one level, merge adjacent
/// character literals into one quoted string, and unwrap a single child.
fn build_seq(children: &[RegexNode]) -> Form {
    let mut flat: Vec<&RegexNode> = Vec::new();
    for child in children {
        match child {
            RegexNode::Seq(inner) => flat.extend(inner.iter()),
            _ => flat.push(child),
        }
    }

    let mut forms = Vec::new();
    let mut run = String::new();
    for child in flat {
        if let RegexNode::Literal(c) = child {
            run.push(*c);
        } else {
            if !run.is_empty() {
                forms.push(Form::Atom(quote_string(&run)));
                run.clear();
            }
            forms.push(build(child));
        }
    }
    if !run.is_empty() {
        forms.push(Form::Atom(quote_string(&run)));
    }

    if forms.len() > 1 {
        Form::List("sequence", forms)
    } else {
        forms
            .pop()
            .unwrap_or_else(|| Form::Atom(quote_string("")))
    }
}

/// Build an alternation. Branches that are all single characters collapse
/// into a character set instead of an `alternative` form.
fn build_alt(branches: &[RegexNode]) -> Form {
    let mut chars = Vec::new();
    for branch in branches {
        match branch {
            RegexNode::Seq(inner) if inner.len() == 1 => match &inner[0] {
                RegexNode::Literal(c) => chars.push(ClassItem::Char(*c)),
                _ => break,
            },
            RegexNode::Literal(c) => chars.push(ClassItem::Char(*c)),
            _ => break,
        }
    }
    if chars.len() == branches.len() {
        return build_class(&chars, false);
    }
    Form::List("alternative", branches.iter().map(build).collect())
}

/// Build a character-set form, applying the single-member and
/// run-to-range collapses.
fn build_class(items: &[ClassItem], negated: bool) -> Form {
    let items = collapse_runs(items);

    if !negated && items.len() == 1 {
        match items[0] {
            ClassItem::Char(c) => return Form::Atom(quote_string(&c.to_string())),
            ClassItem::Range(a, b) => return range_form(a, b),
            ClassItem::Named(class) => return Form::Atom(class.name().to_string()),
        }
    }

    let keyword = if negated { "none-of" } else { "any-of" };
    let mut members = Vec::new();
    let mut run = String::new();
    for item in items {
        match item {
            ClassItem::Char(c) => run.push(c),
            ClassItem::Range(a, b) => {
                flush_run(&mut run, &mut members);
                members.push(range_form(a, b));
            }
            ClassItem::Named(class) => {
                flush_run(&mut run, &mut members);
                members.push(Form::Atom(class.name().to_string()));
            }
        }
    }
    flush_run(&mut run, &mut members);
    Form::List(keyword, members)
}

fn flush_run(run: &mut String, members: &mut Vec<Form>) {
    if !run.is_empty() {
        members.push(Form::Atom(quote_string(run)));
        run.clear();
    }
}

fn range_form(a: char, b: char) -> Form {
    Form::List("range", vec![Form::Atom(quote_string(&format!("{a}-{b}")))])
}

/// Replace runs of three or more consecutive characters with a range.
fn collapse_runs(items: &[ClassItem]) -> Vec<ClassItem> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < items.len() {
        if let ClassItem::Char(start) = items[i] {
            let mut prev = start;
            let mut j = i + 1;
            while j < items.len() {
                match items[j] {
                    ClassItem::Char(c) if c as u32 == prev as u32 + 1 => {
                        prev = c;
                        j += 1;
                    }
                    _ => break,
                }
            }
            if j - i >= 3 {
                out.push(ClassItem::Range(start, prev));
            } else {
                out.extend_from_slice(&items[i..j]);
            }
            i = j;
        } else {
            out.push(items[i]);
            i += 1;
        }
    }
    out
}

fn quote_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

fn write_form(form: &Form, indent: usize, out: &mut String) {
    match form {
        Form::Atom(token) => out.push_str(token),
        Form::List(keyword, args) => {
            if indent + inline_width(form) <= LINE_WIDTH {
                write_inline(form, out);
                return;
            }
            out.push('(');
            out.push_str(keyword);
            for arg in args {
                out.push('\n');
                for _ in 0..indent + 2 {
                    out.push(' ');
                }
                write_form(arg, indent + 2, out);
            }
            out.push(')');
        }
    }
}

fn write_inline(form: &Form, out: &mut String) {
    match form {
        Form::Atom(token) => out.push_str(token),
        Form::List(keyword, args) => {
            out.push('(');
            out.push_str(keyword);
            for arg in args {
                out.push(' ');
                write_inline(arg, out);
            }
            out.push(')');
        }
    }
}

fn inline_width(form: &Form) -> usize {
    match form {
        Form::Atom(token) => token.chars().count(),
        Form::List(keyword, args) => {
            2 + keyword.len() + args.iter().map(|a| 1 + inline_width(a)).sum::<usize>()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn explain(pattern: &str) -> String {
        render(&parse(pattern).unwrap())
    }

    #[test]
    fn test_plain_literal_renders_as_string() {
        assert_eq!(explain("Hello"), "\"Hello\"");
    }

    #[test]
    fn test_empty_pattern_renders_as_empty_string() {
        assert_eq!(explain(""), "\"\"");
    }

    #[test]
    fn test_single_child_sequence_unwrapped() {
        assert_eq!(explain("a*"), "(zero-or-more \"a\")");
    }

    #[test]
    fn test_literal_run_merges_around_atoms() {
        assert_eq!(explain("ab.cd"), "(sequence \"ab\" non-newline-char \"cd\")");
    }

    #[test]
    fn test_single_range_class_collapses() {
        assert_eq!(explain("[0-9]"), "(range \"0-9\")");
        assert_eq!(explain("[a]"), "\"a\"");
        assert_eq!(explain("[[:digit:]]"), "digit");
        assert_eq!(explain("\\d"), "digit");
    }

    #[test]
    fn test_general_class_renders_as_set() {
        assert_eq!(
            explain("[a-z0-9_]"),
            "(any-of (range \"a-z\") (range \"0-9\") \"_\")"
        );
    }

    #[test]
    fn test_negated_class_renders_none_of() {
        assert_eq!(explain("[^ \t\n]"), "(none-of \" \\t\\n\")");
    }

    #[test]
    fn test_consecutive_chars_collapse_to_range() {
        assert_eq!(explain("[abcdef]"), "(range \"a-f\")");
        // two in a row stay literal members
        assert_eq!(explain("[abx]"), "(any-of \"abx\")");
    }

    #[test]
    fn test_single_char_alternation_collapses_to_set() {
        assert_eq!(explain("a\\|x\\|3"), "(any-of \"ax3\")");
        assert_eq!(explain("a\\|b\\|c"), "(range \"a-c\")");
    }

    #[test]
    fn test_alternation_of_sequences() {
        assert_eq!(explain("foo\\|bar"), "(alternative \"foo\" \"bar\")");
    }

    #[test]
    fn test_group_forms() {
        assert_eq!(explain("\\(a\\)"), "(group \"a\")");
        assert_eq!(explain("\\(?5:a\\)"), "(group-n 5 \"a\")");
        // shy groups are transparent
        assert_eq!(explain("\\(?:ab\\)+"), "(one-or-more \"ab\")");
    }

    #[test]
    fn test_quantifier_forms() {
        assert_eq!(explain("a\\{3\\}"), "(exact-count 3 \"a\")");
        assert_eq!(explain("a\\{2,\\}"), "(at-least 2 \"a\")");
        assert_eq!(explain("a\\{2,5\\}"), "(repeat 2 5 \"a\")");
        assert_eq!(explain("a+?"), "(lazy (one-or-more \"a\"))");
    }

    #[test]
    fn test_anchors_and_escapes() {
        assert_eq!(
            explain("^\\w+$"),
            "(sequence line-start (one-or-more word-char) line-end)"
        );
        assert_eq!(explain("\\s-"), "(syntax-char whitespace)");
        assert_eq!(explain("\\Sw"), "(not-syntax-char word)");
        assert_eq!(explain("\\2"), "(backref 2)");
    }

    #[test]
    fn test_long_sequence_goes_vertical() {
        let rendered = explain("\\([0-9]\\{5\\}\\):\\([0-9]\\{10\\}\\) \\([0-9]\\{5\\}\\) \\(.\\)");
        assert_eq!(
            rendered,
            "(sequence\n\
             \x20 (group (exact-count 5 (range \"0-9\")))\n\
             \x20 \":\"\n\
             \x20 (group (exact-count 10 (range \"0-9\")))\n\
             \x20 \" \"\n\
             \x20 (group (exact-count 5 (range \"0-9\")))\n\
             \x20 \" \"\n\
             \x20 (group non-newline-char))"
        );
    }

    #[test]
    fn test_no_trailing_whitespace() {
        let rendered = explain("\\([0-9]\\{5\\}\\):\\([0-9]\\{10\\}\\) \\([0-9]\\{5\\}\\) \\(.\\)");
        for line in rendered.lines() {
            assert_eq!(line, line.trim_end());
        }
        assert!(!rendered.ends_with('\n'));
    }

    #[test]
    fn test_render_deterministic() {
        let node = parse("\\(a\\|b\\)*c\\{2,3\\}[x-z]").unwrap();
        assert_eq!(render(&node), render(&node));
    }
}
