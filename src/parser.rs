use crate::ast::{AnchorKind, ClassItem, GroupKind, NamedClass, RegexNode, RepeatKind, SyntaxClass};
use crate::error::PatternError;

/// Nesting limit for `\( ... \)` groups; deeper input is rejected instead of
/// risking unbounded recursion.
pub const MAX_GROUP_DEPTH: usize = 64;

/// Parse a pattern in the escaped dialect into a [`RegexNode`] tree.
///
/// In this dialect grouping, alternation and counted repetition are spelled
/// with a backslash (`\(`, `\|`, `\{2,5\}`); the bare characters `( ) { } |`
/// are ordinary literals.
pub fn parse(source: &str) -> Result<RegexNode, PatternError> {
    Parser::new(source).parse()
}

/// Parser for escaped-dialect regular expressions.
///
/// Holds the pattern and the current byte position, and manages group
/// numbering for capturing groups.
pub struct Parser<'a> {
    pattern: &'a str,
    pos: usize,
    next_group_id: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given pattern.
    pub fn new(pattern: &'a str) -> Self {
        Self {
            pattern,
            pos: 0,
            next_group_id: 1,
            depth: 0,
        }
    }

    /// Allocate the next number for a capturing group.
    ///
    /// An explicitly numbered group `\(?N:` bumps the counter past N, so
    /// later plain groups keep numbering upward from there.
    fn alloc_group_id(&mut self) -> usize {
        let id = self.next_group_id;
        self.next_group_id += 1;
        id
    }

    fn rest(&self) -> &str {
        &self.pattern[self.pos..]
    }

    /// Peek at the next character in the pattern without advancing.
    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Peek `n` characters past the current position.
    fn peek_at(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    /// Advance the parser by one character and return it.
    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    /// Expect a specific character and advance if it matches.
    fn expect(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// True when the input at the current position is `\` followed by `ch`.
    fn at_escaped(&self, ch: char) -> bool {
        let mut chars = self.rest().chars();
        chars.next() == Some('\\') && chars.next() == Some(ch)
    }

    /// Expect the two-character sequence `\` + `ch` and advance past it.
    fn eat_escaped(&mut self, ch: char) -> bool {
        if self.at_escaped(ch) {
            self.advance();
            self.advance();
            true
        } else {
            false
        }
    }

    /// Entry point for parsing a pattern.
    ///
    /// Any input left over after the top-level alternation can only be a
    /// `\)` that never had a matching `\(`.
    pub fn parse(&mut self) -> Result<RegexNode, PatternError> {
        let node = self.parse_alt()?;
        if self.pos < self.pattern.len() {
            return Err(PatternError::UnmatchedGroupClose);
        }
        Ok(node)
    }

    /// Parse alternation (`\|`), the lowest-precedence construct.
    ///
    /// Example:
    /// - Pattern: `a\|b\|c` → Alt([Seq([Literal('a')]), Seq([Literal('b')]), Seq([Literal('c')])])
    /// - Pattern: `abc`     → Seq([Literal('a'), Literal('b'), Literal('c')])
    fn parse_alt(&mut self) -> Result<RegexNode, PatternError> {
        let mut branches = Vec::new();
        branches.push(self.parse_seq()?);
        while self.eat_escaped('|') {
            branches.push(self.parse_seq()?);
        }
        if branches.len() == 1 {
            Ok(branches.pop().unwrap_or(RegexNode::Seq(Vec::new())))
        } else {
            Ok(RegexNode::Alt(branches))
        }
    }

    /// Parse a sequence of atoms up to the next `\|`, `\)` or end of input.
    ///
    /// `^` and `$` are anchors only where an anchor can occur: `^` at the
    /// start of a branch, `$` at its end. Anywhere else they are literals.
    fn parse_seq(&mut self) -> Result<RegexNode, PatternError> {
        let mut nodes = Vec::new();
        while let Some(ch) = self.peek() {
            if self.at_escaped(')') || self.at_escaped('|') {
                break;
            }
            if ch == '^' && nodes.is_empty() {
                self.advance();
                nodes.push(RegexNode::Anchor(AnchorKind::LineStart));
                continue;
            }
            if ch == '$' && self.dollar_ends_branch() {
                self.advance();
                nodes.push(RegexNode::Anchor(AnchorKind::LineEnd));
                continue;
            }
            nodes.push(self.parse_repeat()?);
        }
        Ok(RegexNode::Seq(nodes))
    }

    /// True when the `$` at the current position closes its branch.
    fn dollar_ends_branch(&self) -> bool {
        let after = &self.rest()[1..];
        after.is_empty() || after.starts_with("\\)") || after.starts_with("\\|")
    }

    /// Parse an atom followed by an optional quantifier.
    ///
    /// Example:
    /// - Pattern: `a?`      → Repeat { node: Literal('a'), kind: ZeroOrOne, lazy: false }
    /// - Pattern: `b+?`     → Repeat { node: Literal('b'), kind: OneOrMore, lazy: true }
    /// - Pattern: `c\{2,5\}` → Repeat { node: Literal('c'), kind: Between(2, 5), lazy: false }
    fn parse_repeat(&mut self) -> Result<RegexNode, PatternError> {
        let atom = self.parse_atom()?;
        let kind = match self.peek() {
            Some('*') => {
                self.advance();
                Some(RepeatKind::ZeroOrMore)
            }
            Some('+') => {
                self.advance();
                Some(RepeatKind::OneOrMore)
            }
            Some('?') => {
                self.advance();
                Some(RepeatKind::ZeroOrOne)
            }
            _ if self.at_escaped('{') => {
                self.advance();
                self.advance();
                Some(self.parse_count()?)
            }
            _ => None,
        };
        match kind {
            Some(kind) => {
                let lazy = self.expect('?');
                Ok(RegexNode::Repeat {
                    node: Box::new(atom),
                    kind,
                    lazy,
                })
            }
            None => Ok(atom),
        }
    }

    /// Parse the inside of a counted repetition, after the opening `\{`.
    ///
    /// Accepts `m`, `m,` and `m,n`; requires the closing `\}`.
    fn parse_count(&mut self) -> Result<RepeatKind, PatternError> {
        let min = self.parse_number().ok_or(PatternError::MalformedRepeat)?;
        let kind = if self.expect(',') {
            if self.at_escaped('}') {
                RepeatKind::AtLeast(min)
            } else {
                let max = self.parse_number().ok_or(PatternError::MalformedRepeat)?;
                if max < min {
                    return Err(PatternError::MalformedRepeat);
                }
                RepeatKind::Between(min, max)
            }
        } else {
            RepeatKind::Exactly(min)
        };
        if !self.eat_escaped('}') {
            return Err(PatternError::MalformedRepeat);
        }
        Ok(kind)
    }

    /// Scan a decimal number; `None` when there are no digits or the value
    /// overflows.
    fn parse_number(&mut self) -> Option<usize> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        if self.pos == start {
            return None;
        }
        self.pattern[start..self.pos].parse().ok()
    }

    /// Parse a single atom: escape, character class, `.` or literal.
    fn parse_atom(&mut self) -> Result<RegexNode, PatternError> {
        match self.peek() {
            Some('\\') => self.parse_escape(),
            Some('[') => self.parse_char_class(),
            Some('.') => {
                self.advance();
                Ok(RegexNode::Dot)
            }
            Some(c) => {
                self.advance();
                Ok(RegexNode::Literal(c))
            }
            None => Ok(RegexNode::Seq(Vec::new())),
        }
    }

    /// Parse an escape sequence, the backslash not yet consumed.
    ///
    /// Examples:
    /// - Pattern: `\(ab\)` → Group { kind: Capturing(1), node: ... }
    /// - Pattern: `\w`     → WordChar
    /// - Pattern: `\s-`    → Syntax { class: Whitespace, negated: false }
    /// - Pattern: `\1`     → BackRef { id: 1 }
    /// - Pattern: `\.`     → Literal('.')
    fn parse_escape(&mut self) -> Result<RegexNode, PatternError> {
        self.advance();
        match self.advance() {
            None => Err(PatternError::DanglingEscape),
            Some('(') => self.parse_group(),
            Some('{') => Err(PatternError::MalformedRepeat),
            Some('w') => Ok(RegexNode::WordChar),
            Some('W') => Ok(RegexNode::NotWordChar),
            Some('s') => self.parse_syntax_class(false),
            Some('S') => self.parse_syntax_class(true),
            Some('d') => Ok(RegexNode::CharClass {
                items: vec![ClassItem::Named(NamedClass::Digit)],
                negated: false,
            }),
            Some('b') => Ok(RegexNode::Anchor(AnchorKind::WordBoundary)),
            Some('B') => Ok(RegexNode::Anchor(AnchorKind::NotWordBoundary)),
            Some('<') => Ok(RegexNode::Anchor(AnchorKind::WordStart)),
            Some('>') => Ok(RegexNode::Anchor(AnchorKind::WordEnd)),
            Some('`') => Ok(RegexNode::Anchor(AnchorKind::BufferStart)),
            Some('\'') => Ok(RegexNode::Anchor(AnchorKind::BufferEnd)),
            Some(c) if c.is_ascii_digit() && c != '0' => {
                let id = (c as u8 - b'0') as usize;
                Ok(RegexNode::BackRef { id })
            }
            Some(c) => Ok(RegexNode::Literal(c)),
        }
    }

    /// Parse the one-character code after `\s` or `\S`.
    fn parse_syntax_class(&mut self, negated: bool) -> Result<RegexNode, PatternError> {
        let code = self.advance().ok_or(PatternError::DanglingEscape)?;
        let class = SyntaxClass::from_code(code).ok_or(PatternError::UnknownSyntaxClass(code))?;
        Ok(RegexNode::Syntax { class, negated })
    }

    /// Parse a group, the opening `\(` already consumed.
    ///
    /// Examples:
    /// - Pattern: `\(abc\)`   → Group { kind: Capturing(1), ... }
    /// - Pattern: `\(?:abc\)` → Group { kind: Shy, ... }
    /// - Pattern: `\(?5:ab\)` → Group { kind: Numbered(5), ... }
    fn parse_group(&mut self) -> Result<RegexNode, PatternError> {
        if self.depth >= MAX_GROUP_DEPTH {
            return Err(PatternError::TooDeep {
                limit: MAX_GROUP_DEPTH,
            });
        }
        self.depth += 1;
        let kind = if self.expect('?') {
            match self.peek() {
                Some(':') => {
                    self.advance();
                    GroupKind::Shy
                }
                Some(c) if c.is_ascii_digit() => {
                    let n = self.parse_number().ok_or(PatternError::BadGroupSyntax)?;
                    if !self.expect(':') {
                        return Err(PatternError::BadGroupSyntax);
                    }
                    self.next_group_id = self.next_group_id.max(n.saturating_add(1));
                    GroupKind::Numbered(n)
                }
                _ => return Err(PatternError::BadGroupSyntax),
            }
        } else {
            GroupKind::Capturing(self.alloc_group_id())
        };
        let node = self.parse_alt()?;
        if !self.eat_escaped(')') {
            return Err(PatternError::UnterminatedGroup);
        }
        self.depth -= 1;
        Ok(RegexNode::Group {
            kind,
            node: Box::new(node),
        })
    }

    /// Parse a character class, e.g. `[abc]`, `[a-z]`, `[^ \t]`, `[[:digit:]]`.
    ///
    /// Backslash is not special inside a class. A `]` directly after the
    /// opening bracket (or after `^`) is an ordinary member.
    fn parse_char_class(&mut self) -> Result<RegexNode, PatternError> {
        self.advance();
        let negated = if self.peek() == Some('^') {
            self.advance();
            true
        } else {
            false
        };
        let mut items = Vec::new();
        if self.peek() == Some(']') {
            self.advance();
            items.push(ClassItem::Char(']'));
        }
        loop {
            match self.peek() {
                None => return Err(PatternError::UnterminatedClass),
                Some(']') => {
                    self.advance();
                    break;
                }
                Some('[') if self.rest().starts_with("[:") => {
                    items.push(self.parse_named_class()?);
                }
                Some(ch) => {
                    self.advance();
                    if self.peek() == Some('-') && !matches!(self.peek_at(1), None | Some(']')) {
                        self.advance();
                        let end = self.advance().ok_or(PatternError::UnterminatedClass)?;
                        items.push(ClassItem::Range(ch, end));
                    } else {
                        items.push(ClassItem::Char(ch));
                    }
                }
            }
        }
        Ok(RegexNode::CharClass { items, negated })
    }

    /// Parse a `[:name:]` member, the position sitting on its `[`.
    ///
    /// A `[:` with no closing `:]` in sight is an ordinary `[` member.
    fn parse_named_class(&mut self) -> Result<ClassItem, PatternError> {
        let rest = &self.rest()[2..];
        let Some(end) = rest.find(":]") else {
            self.advance();
            return Ok(ClassItem::Char('['));
        };
        let name = &rest[..end];
        let class = NamedClass::from_name(name)
            .ok_or_else(|| PatternError::UnknownNamedClass(name.to_string()))?;
        self.pos += 2 + end + 2;
        Ok(ClassItem::Named(class))
    }
}
