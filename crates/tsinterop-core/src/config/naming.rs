use serde::{Deserialize, Serialize};

/// Case transform applied to values substituted into a name pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameCasing {
    /// Keep the value as declared.
    #[default]
    Verbatim,
    /// Upper-case the first character.
    PascalCase,
    /// Lower-case the first character.
    CamelCase,
}

impl NameCasing {
    /// Apply the transform to a single value.
    pub fn apply(&self, value: &str) -> String {
        let mut chars = value.chars();
        match (self, chars.next()) {
            (NameCasing::Verbatim, _) | (_, None) => value.to_string(),
            (NameCasing::PascalCase, Some(first)) => first.to_uppercase().chain(chars).collect(),
            (NameCasing::CamelCase, Some(first)) => first.to_lowercase().chain(chars).collect(),
        }
    }
}

/// A name template plus the casing applied to its placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamePatternSpec {
    /// Template text with `{placeholder}` tokens.
    pub pattern: String,

    #[serde(default)]
    pub casing: NameCasing,
}

impl NamePatternSpec {
    pub fn new(pattern: impl Into<String>, casing: NameCasing) -> Self {
        Self {
            pattern: pattern.into(),
            casing,
        }
    }
}

/// Name patterns for every generated identifier kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamePatternConfig {
    /// Capability interface name.
    #[serde(default = "default_interface")]
    pub interface: NamePatternSpec,

    /// Runtime class name.
    #[serde(default = "default_runtime_class")]
    pub runtime_class: NamePatternSpec,

    /// Per-module implementation fragment name.
    #[serde(default = "default_module")]
    pub module: NamePatternSpec,

    /// Per-module preload method name.
    #[serde(default = "default_preload")]
    pub preload: NamePatternSpec,

    /// Method name for each bound function.
    #[serde(default = "default_method")]
    pub method: NamePatternSpec,

    /// Parameter names.
    #[serde(default = "default_parameter")]
    pub parameter: NamePatternSpec,
}

impl Default for NamePatternConfig {
    fn default() -> Self {
        Self {
            interface: default_interface(),
            runtime_class: default_runtime_class(),
            module: default_module(),
            preload: default_preload(),
            method: default_method(),
            parameter: default_parameter(),
        }
    }
}

fn default_interface() -> NamePatternSpec {
    NamePatternSpec::new("I{name}", NameCasing::Verbatim)
}

fn default_runtime_class() -> NamePatternSpec {
    NamePatternSpec::new("{name}", NameCasing::Verbatim)
}

fn default_module() -> NamePatternSpec {
    NamePatternSpec::new("{name}Module", NameCasing::PascalCase)
}

fn default_preload() -> NamePatternSpec {
    NamePatternSpec::new("Preload{module}", NameCasing::PascalCase)
}

fn default_method() -> NamePatternSpec {
    NamePatternSpec::new("{function}", NameCasing::PascalCase)
}

fn default_parameter() -> NamePatternSpec {
    NamePatternSpec::new("{name}", NameCasing::Verbatim)
}
