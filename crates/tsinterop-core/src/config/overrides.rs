use serde::{Deserialize, Serialize};

/// Host type a TypeScript type is replaced with.
///
/// Written either as a plain string (`number = "int"`) or as a table whose
/// generic parameters are added to every method using the type:
///
/// ```toml
/// number = { type = "TNumber", generics = [{ name = "TNumber", constraint = "INumber<TNumber>" }] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeOverride {
    Plain(String),
    Generic(GenericOverride),
}

/// Override that introduces generic parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenericOverride {
    #[serde(rename = "type")]
    pub host: String,

    #[serde(default)]
    pub generics: Vec<OverrideGeneric>,
}

/// A generic parameter declared by an override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverrideGeneric {
    pub name: String,

    /// Emitted verbatim as `where {name} : {constraint}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<String>,
}

impl TypeOverride {
    /// Host type text.
    pub fn host(&self) -> &str {
        match self {
            TypeOverride::Plain(host) => host,
            TypeOverride::Generic(generic) => &generic.host,
        }
    }

    /// Generic parameters the host type relies on.
    pub fn generics(&self) -> &[OverrideGeneric] {
        match self {
            TypeOverride::Plain(_) => &[],
            TypeOverride::Generic(generic) => &generic.generics,
        }
    }
}

impl From<&str> for TypeOverride {
    fn from(host: &str) -> Self {
        TypeOverride::Plain(host.to_string())
    }
}

impl From<String> for TypeOverride {
    fn from(host: String) -> Self {
        TypeOverride::Plain(host)
    }
}

impl PartialEq<str> for TypeOverride {
    fn eq(&self, other: &str) -> bool {
        self.host() == other && self.generics().is_empty()
    }
}

impl OverrideGeneric {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraint: None,
        }
    }

    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraint = Some(constraint.into());
        self
    }
}
