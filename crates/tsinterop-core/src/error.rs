use serde::Serialize;
use thiserror::Error;

/// Failure recorded while parsing a single declaration module.
///
/// Parse errors never abort a run: they are collected next to the modules
/// that parsed successfully.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{path}:{line}: {kind} (offset {offset})")]
pub struct ParseError {
    /// Path of the module the error belongs to.
    pub path: String,
    /// 1-based line of the offending statement.
    pub line: usize,
    /// Byte offset of the offending statement within the module source.
    pub offset: usize,
    /// What went wrong.
    pub kind: ParseErrorKind,
}

impl ParseError {
    /// Create a parse error, deriving the line number from `offset`.
    pub fn new(path: impl Into<String>, source: &str, offset: usize, kind: ParseErrorKind) -> Self {
        let offset = offset.min(source.len());
        let line = source.as_bytes()[..offset]
            .iter()
            .filter(|&&b| b == b'\n')
            .count()
            + 1;

        Self {
            path: path.into(),
            line,
            offset,
            kind,
        }
    }

    /// Whether this error caused the whole module to be dropped.
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind, ParseErrorKind::UnbalancedBrackets(_))
    }
}

/// Parse error categories.
///
/// `MalformedSignature` and `UnbalancedBrackets` are both malformed
/// signatures: the first is confined to one declaration, the second leaves
/// no statement boundary to recover at and drops the module. Both render as
/// "malformed signature".
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ParseErrorKind {
    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    /// Malformed signature spanning the module: brackets that never close or
    /// close without opening.
    #[error("malformed signature: unbalanced brackets, {0}")]
    UnbalancedBrackets(String),

    #[error("duplicate symbol '{0}'")]
    DuplicateSymbol(String),
}

impl ParseErrorKind {
    /// Whether this is a malformed signature, recoverable or not.
    pub fn is_malformed_signature(&self) -> bool {
        matches!(
            self,
            ParseErrorKind::MalformedSignature(_) | ParseErrorKind::UnbalancedBrackets(_)
        )
    }
}

/// Failure that aborts a whole generation call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// Invalid name pattern or invoke settings, detected before any output.
    #[error("Generation config error: {0}")]
    Config(String),

    #[error("Duplicate symbol '{symbol}': declared by '{first}' and '{second}'")]
    DuplicateSymbol {
        symbol: String,
        first: String,
        second: String,
    },
}

/// Error type for operations outside the pure parse/generate core.
#[derive(Error, Debug)]
pub enum InteropError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl From<serde_json::Error> for InteropError {
    fn from(e: serde_json::Error) -> Self {
        InteropError::Serialization(e.to_string())
    }
}

/// Result type alias using InteropError.
pub type Result<T> = std::result::Result<T, InteropError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_line_from_offset() {
        let source = "a;\nb;\nexport function f(;";
        let offset = source.find("export").unwrap();
        let err = ParseError::new(
            "m.d.ts",
            source,
            offset,
            ParseErrorKind::MalformedSignature("expected ')'".into()),
        );
        assert_eq!(err.line, 3);
        assert_eq!(err.offset, offset);
        assert!(!err.is_fatal());
        assert_eq!(
            err.to_string(),
            format!("m.d.ts:3: malformed signature: expected ')' (offset {})", offset)
        );
    }

    #[test]
    fn test_unbalanced_brackets_is_malformed_signature() {
        let kind = ParseErrorKind::UnbalancedBrackets("'(' at offset 4 is never closed".into());
        assert!(kind.is_malformed_signature());
        assert!(kind.to_string().starts_with("malformed signature: "));
        assert!(ParseError::new("m.d.ts", "abc", 0, kind).is_fatal());

        assert!(ParseErrorKind::MalformedSignature("x".into()).is_malformed_signature());
        assert!(!ParseErrorKind::DuplicateSymbol("f".into()).is_malformed_signature());
    }

    #[test]
    fn test_parse_error_offset_clamped() {
        let err = ParseError::new("m.d.ts", "abc", 99, ParseErrorKind::DuplicateSymbol("f".into()));
        assert_eq!(err.offset, 3);
        assert_eq!(err.line, 1);
    }

    #[test]
    fn test_duplicate_symbol_message_names_both_paths() {
        let err = GenerationError::DuplicateSymbol {
            symbol: "Ping".into(),
            first: "a.d.ts".into(),
            second: "b.d.ts".into(),
        };
        let message = err.to_string();
        assert!(message.contains("a.d.ts"));
        assert!(message.contains("b.d.ts"));
    }
}
