//! Single-pass scanner for declaration sources.
//!
//! Splits a module into top-level statements and exposes the depth-aware
//! helpers the parser uses to take signatures apart. Brackets are tracked on
//! an explicit stack so `(]` is reported instead of silently miscounted; the
//! `>` of an arrow (`=>`) is not a bracket.

use std::ops::ControlFlow;

/// Unbalanced or unterminated input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ScanError {
    pub offset: usize,
    pub message: String,
}

impl ScanError {
    fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bracket {
    Paren,
    Square,
    Angle,
    Brace,
}

impl Bracket {
    fn opening(c: char) -> Option<Self> {
        match c {
            '(' => Some(Bracket::Paren),
            '[' => Some(Bracket::Square),
            '<' => Some(Bracket::Angle),
            '{' => Some(Bracket::Brace),
            _ => None,
        }
    }

    fn closing(c: char) -> Option<Self> {
        match c {
            ')' => Some(Bracket::Paren),
            ']' => Some(Bracket::Square),
            '>' => Some(Bracket::Angle),
            '}' => Some(Bracket::Brace),
            _ => None,
        }
    }

    fn open_char(self) -> char {
        match self {
            Bracket::Paren => '(',
            Bracket::Square => '[',
            Bracket::Angle => '<',
            Bracket::Brace => '{',
        }
    }
}

#[derive(Debug, Default)]
struct Depth {
    open: Vec<(Bracket, usize)>,
}

impl Depth {
    fn total(&self) -> usize {
        self.open.len()
    }

    fn feed(&mut self, offset: usize, c: char, prev: char) -> Result<(), ScanError> {
        if let Some(kind) = Bracket::opening(c) {
            self.open.push((kind, offset));
            return Ok(());
        }

        let Some(kind) = Bracket::closing(c) else {
            return Ok(());
        };
        if kind == Bracket::Angle && prev == '=' {
            return Ok(());
        }

        match self.open.pop() {
            Some((open, _)) if open == kind => Ok(()),
            Some((open, at)) => Err(ScanError::new(
                offset,
                format!("'{}' opened at offset {} is closed by '{}'", open.open_char(), at, c),
            )),
            None => Err(ScanError::new(offset, format!("unexpected '{}'", c))),
        }
    }

    fn finish(&self) -> Result<(), ScanError> {
        match self.open.last() {
            Some((open, at)) => Err(ScanError::new(
                *at,
                format!("'{}' is never closed", open.open_char()),
            )),
            None => Ok(()),
        }
    }
}

/// Visit every character of `text` with the bracket depth before and after it.
///
/// String literal bodies are skipped; only their opening quote is visited.
fn walk(
    text: &str,
    mut visit: impl FnMut(usize, char, usize, usize) -> ControlFlow<()>,
) -> Result<(), ScanError> {
    let mut depth = Depth::default();
    let mut chars = text.char_indices();
    let mut prev = '\0';

    while let Some((i, c)) = chars.next() {
        let before = depth.total();

        if matches!(c, '"' | '\'' | '`') {
            if visit(i, c, before, before).is_break() {
                return Ok(());
            }
            let mut escaped = false;
            let mut closed = false;
            for (_, s) in chars.by_ref() {
                if escaped {
                    escaped = false;
                } else if s == '\\' {
                    escaped = true;
                } else if s == c {
                    closed = true;
                    break;
                }
            }
            if !closed {
                return Err(ScanError::new(i, "unterminated string literal"));
            }
            prev = c;
            continue;
        }

        depth.feed(i, c, prev)?;
        if visit(i, c, before, depth.total()).is_break() {
            return Ok(());
        }
        prev = c;
    }

    depth.finish()
}

/// Split `text` on `sep` wherever it appears outside brackets and strings.
pub(crate) fn split_top_level(text: &str, sep: char) -> Result<Vec<&str>, ScanError> {
    let mut pieces = Vec::new();
    let mut start = 0;
    walk(text, |i, c, before, _| {
        if c == sep && before == 0 {
            pieces.push(&text[start..i]);
            start = i + c.len_utf8();
        }
        ControlFlow::Continue(())
    })?;
    pieces.push(&text[start..]);
    Ok(pieces)
}

/// Offset of the first top-level character accepted by `pred`.
pub(crate) fn find_top_level(
    text: &str,
    mut pred: impl FnMut(usize, char) -> bool,
) -> Result<Option<usize>, ScanError> {
    let mut found = None;
    walk(text, |i, c, before, after| {
        if before == 0 && after == 0 && pred(i, c) {
            found = Some(i);
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    })?;
    Ok(found)
}

/// Offset of the bracket closing the one at `open`.
pub(crate) fn matching_close(text: &str, open: usize) -> Result<Option<usize>, ScanError> {
    let mut found = None;
    walk(&text[open..], |i, _, before, after| {
        if before == 1 && after == 0 {
            found = Some(open + i);
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    })?;
    Ok(found)
}

/// Check for a function type arrow outside brackets.
pub(crate) fn has_top_level_arrow(text: &str) -> Result<bool, ScanError> {
    let found = find_top_level(text, |i, c| c == '=' && text[i + 1..].starts_with('>'))?;
    Ok(found.is_some())
}

/// A top-level statement with comments blanked out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Statement {
    /// Byte offset of the first character within the module source.
    pub offset: usize,
    /// Statement text without the terminating `;`, trimmed.
    pub text: String,
    /// Summary of the doc comment directly preceding the statement.
    pub doc: Option<String>,
}

struct DocComment {
    end: usize,
    summary: Option<String>,
}

/// Replace comments with spaces, keeping byte offsets and newlines intact.
fn blank_comments(source: &str) -> (String, Vec<DocComment>) {
    let mut cleaned = String::with_capacity(source.len());
    let mut docs = Vec::new();
    let mut chars = source.char_indices().peekable();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    let blank = |cleaned: &mut String, c: char| {
        if c == '\n' {
            cleaned.push('\n');
        } else {
            cleaned.extend(std::iter::repeat(' ').take(c.len_utf8()));
        }
    };

    while let Some((i, c)) = chars.next() {
        if let Some(q) = quote {
            cleaned.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q || c == '\n' {
                quote = None;
            }
            continue;
        }

        match (c, chars.peek().map(|&(_, n)| n)) {
            ('/', Some('/')) => {
                blank(&mut cleaned, c);
                while let Some(&(_, n)) = chars.peek() {
                    if n == '\n' {
                        break;
                    }
                    blank(&mut cleaned, n);
                    chars.next();
                }
            }
            ('/', Some('*')) => {
                blank(&mut cleaned, c);
                let body_start = i + 2;
                let mut body_end = source.len();
                let mut end = source.len();
                let mut prev = '\0';
                for (j, n) in chars.by_ref() {
                    blank(&mut cleaned, n);
                    // the `*` of the opening `/*` cannot close the comment
                    if j >= i + 3 && prev == '*' && n == '/' {
                        body_end = j - 1;
                        end = j + 1;
                        break;
                    }
                    prev = n;
                }
                let body = &source[body_start.min(body_end)..body_end];
                if let Some(doc) = body.strip_prefix('*') {
                    docs.push(DocComment {
                        end,
                        summary: doc_summary(doc),
                    });
                }
            }
            ('"' | '\'' | '`', _) => {
                quote = Some(c);
                cleaned.push(c);
            }
            _ => cleaned.push(c),
        }
    }

    (cleaned, docs)
}

/// Summary lines of a `/** ... */` body, up to the first `@` tag.
fn doc_summary(body: &str) -> Option<String> {
    let lines: Vec<&str> = body
        .lines()
        .map(|line| line.trim().trim_start_matches('*').trim())
        .take_while(|line| !line.starts_with('@'))
        .filter(|line| !line.is_empty())
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join(" "))
    }
}

/// Split a module source into its top-level statements.
///
/// A statement ends at a top-level `;`, or after a top-level `}` that is not
/// followed by `;` or a type operator (block declarations such as interfaces).
pub(crate) fn scan_statements(source: &str) -> Result<Vec<Statement>, ScanError> {
    let (cleaned, docs) = blank_comments(source);

    let mut spans: Vec<(usize, usize)> = Vec::new();
    let mut start: Option<usize> = None;
    let mut block_end: Option<usize> = None;

    walk(&cleaned, |i, c, before, after| {
        if c.is_whitespace() {
            return ControlFlow::Continue(());
        }

        if let Some(end) = block_end.take() {
            if !matches!(c, ';' | '|' | '&' | '[') {
                if let Some(s) = start.take() {
                    spans.push((s, end));
                }
            }
        }

        if before == 0 && c == ';' {
            if let Some(s) = start.take() {
                spans.push((s, i));
            }
            return ControlFlow::Continue(());
        }

        if start.is_none() {
            start = Some(i);
        }
        if c == '}' && before == 1 && after == 0 {
            block_end = Some(i + 1);
        }
        ControlFlow::Continue(())
    })?;

    if let Some(s) = start {
        spans.push((s, cleaned.len()));
    }

    let mut doc_index = 0;
    let mut previous_end = 0;
    let mut statements = Vec::with_capacity(spans.len());
    for (s, e) in spans {
        let mut doc = None;
        while doc_index < docs.len() && docs[doc_index].end <= s {
            if docs[doc_index].end >= previous_end {
                doc = docs[doc_index].summary.clone();
            }
            doc_index += 1;
        }
        previous_end = e;

        statements.push(Statement {
            offset: s,
            text: cleaned[s..e].trim().to_string(),
            doc,
        });
    }

    Ok(statements)
}
