//! Identifier templates.
//!
//! A pattern such as `Preload{module}` is compiled once per generation run;
//! placeholders that the identifier kind does not provide are rejected at
//! compile time so rendering itself cannot fail.

use tsinterop_core::config::{NameCasing, NamePatternSpec};
use tsinterop_core::GenerationError;

/// The identifier a pattern produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Interface,
    RuntimeClass,
    Module,
    Preload,
    Method,
    Parameter,
}

impl NameKind {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            NameKind::Interface => "interface",
            NameKind::RuntimeClass => "runtime_class",
            NameKind::Module => "module",
            NameKind::Preload => "preload",
            NameKind::Method => "method",
            NameKind::Parameter => "parameter",
        }
    }

    fn accepts(&self, placeholder: Placeholder) -> bool {
        match self {
            NameKind::Interface | NameKind::RuntimeClass | NameKind::Parameter => {
                placeholder == Placeholder::Name
            }
            NameKind::Module | NameKind::Preload => {
                matches!(placeholder, Placeholder::Name | Placeholder::Module)
            }
            NameKind::Method => true,
        }
    }
}

impl std::fmt::Display for NameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placeholder {
    Name,
    Module,
    Function,
    Action,
}

impl Placeholder {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "name" => Some(Placeholder::Name),
            "module" => Some(Placeholder::Module),
            "function" => Some(Placeholder::Function),
            "action" => Some(Placeholder::Action),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(Placeholder),
}

/// Values available to a pattern.
///
/// `name` is the kind's own base name: the runtime name for interface and
/// class patterns, the module name for module and preload patterns, the
/// function name for methods and the declared name for parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameContext<'a> {
    pub name: &'a str,
    pub module: &'a str,
    pub function: &'a str,
    pub action: &'a str,
}

/// A compiled name pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePattern {
    segments: Vec<Segment>,
    casing: NameCasing,
}

impl NamePattern {
    /// Compile a pattern for `kind`.
    pub fn compile(kind: NameKind, spec: &NamePatternSpec) -> Result<Self, GenerationError> {
        let pattern = spec.pattern.as_str();
        if pattern.trim().is_empty() {
            return Err(GenerationError::Config(format!(
                "{} name pattern is empty",
                kind
            )));
        }

        let mut segments = Vec::new();
        let mut rest = pattern;
        while !rest.is_empty() {
            let next = rest.find(['{', '}']).unwrap_or(rest.len());
            if next > 0 {
                segments.push(Segment::Literal(rest[..next].to_string()));
            }
            rest = &rest[next..];

            if rest.starts_with('}') {
                return Err(GenerationError::Config(format!(
                    "unmatched '}}' in {} name pattern '{}'",
                    kind, pattern
                )));
            }
            if rest.is_empty() {
                break;
            }

            let close = rest.find('}').ok_or_else(|| {
                GenerationError::Config(format!(
                    "unterminated placeholder in {} name pattern '{}'",
                    kind, pattern
                ))
            })?;
            let token = &rest[1..close];
            match Placeholder::from_token(token) {
                Some(placeholder) if kind.accepts(placeholder) => {
                    segments.push(Segment::Placeholder(placeholder))
                }
                _ => {
                    return Err(GenerationError::Config(format!(
                        "unknown placeholder '{{{}}}' in {} name pattern '{}'",
                        token, kind, pattern
                    )))
                }
            }
            rest = &rest[close + 1..];
        }

        Ok(Self {
            segments,
            casing: spec.casing,
        })
    }

    /// Check if the pattern contains `{action}`.
    pub fn uses_action(&self) -> bool {
        self.segments
            .contains(&Segment::Placeholder(Placeholder::Action))
    }

    /// Render the pattern. Casing applies to substituted values only.
    pub fn render(&self, context: &NameContext<'_>) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(placeholder) => {
                    let value = match placeholder {
                        Placeholder::Name => context.name,
                        Placeholder::Module => context.module,
                        Placeholder::Function => context.function,
                        Placeholder::Action => context.action,
                    };
                    out.push_str(&self.casing.apply(value));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(kind: NameKind, pattern: &str, casing: NameCasing) -> Result<NamePattern, GenerationError> {
        NamePattern::compile(kind, &NamePatternSpec::new(pattern, casing))
    }

    #[test]
    fn test_render_method() {
        let pattern = compile(NameKind::Method, "{action}{function}", NameCasing::PascalCase).unwrap();
        let context = NameContext {
            name: "getItem",
            module: "storage",
            function: "getItem",
            action: "invokeAsync",
        };
        assert_eq!(pattern.render(&context), "InvokeAsyncGetItem");
        assert!(pattern.uses_action());
    }

    #[test]
    fn test_casing_skips_literals() {
        let pattern = compile(NameKind::Preload, "load_{module}", NameCasing::PascalCase).unwrap();
        let context = NameContext {
            name: "site",
            module: "site",
            ..Default::default()
        };
        assert_eq!(pattern.render(&context), "load_Site");

        let pattern = compile(NameKind::Parameter, "{name}", NameCasing::CamelCase).unwrap();
        let context = NameContext {
            name: "Value",
            ..Default::default()
        };
        assert_eq!(pattern.render(&context), "value");
    }

    #[test]
    fn test_literal_only_pattern() {
        let pattern = compile(NameKind::Interface, "IJsBindings", NameCasing::Verbatim).unwrap();
        assert_eq!(pattern.render(&NameContext::default()), "IJsBindings");
    }

    #[test]
    fn test_recognized_placeholders_always_render() {
        let kinds = [
            (NameKind::Interface, vec!["name"]),
            (NameKind::RuntimeClass, vec!["name"]),
            (NameKind::Module, vec!["name", "module"]),
            (NameKind::Preload, vec!["name", "module"]),
            (NameKind::Method, vec!["name", "module", "function", "action"]),
            (NameKind::Parameter, vec!["name"]),
        ];
        for (kind, tokens) in kinds {
            let template: String = tokens.iter().map(|t| format!("x{{{}}}", t)).collect();
            let pattern = compile(kind, &template, NameCasing::PascalCase).unwrap();
            let context = NameContext {
                name: "a",
                module: "b",
                function: "c",
                action: "d",
            };
            assert!(pattern.render(&context).starts_with('x'));
        }
    }

    #[test]
    fn test_unknown_placeholder_rejected() {
        let err = compile(NameKind::Method, "{verb}{function}", NameCasing::Verbatim).unwrap_err();
        assert!(matches!(err, GenerationError::Config(ref m) if m.contains("{verb}")));

        // known token, wrong kind
        assert!(compile(NameKind::Parameter, "{module}_{name}", NameCasing::Verbatim).is_err());
        assert!(compile(NameKind::Preload, "{action}", NameCasing::Verbatim).is_err());
    }

    #[test]
    fn test_malformed_patterns_rejected() {
        assert!(compile(NameKind::Method, "{function", NameCasing::Verbatim).is_err());
        assert!(compile(NameKind::Method, "function}", NameCasing::Verbatim).is_err());
        assert!(compile(NameKind::Method, "{}", NameCasing::Verbatim).is_err());
        assert!(compile(NameKind::Method, "  ", NameCasing::Verbatim).is_err());
    }
}
