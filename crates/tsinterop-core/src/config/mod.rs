mod invoke;
mod naming;
mod overrides;

pub use invoke::{ActionNames, InvokeConfig};
pub use naming::{NameCasing, NamePatternConfig, NamePatternSpec};
pub use overrides::{GenericOverride, OverrideGeneric, TypeOverride};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{InteropError, Result};

/// Root configuration for tsinterop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InteropConfig {
    /// Namespace of every generated fragment.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Extra `using` directives added to every fragment.
    #[serde(default = "default_using_statements")]
    pub using_statements: Vec<String>,

    /// Host type emitted when a TypeScript type has no mapping.
    #[serde(default = "default_unknown_type_fallback")]
    pub unknown_type_fallback: String,

    /// Canonical TypeScript type text to host type.
    #[serde(default)]
    pub type_overrides: BTreeMap<String, TypeOverride>,

    /// Identifier templates.
    #[serde(default)]
    pub name_patterns: NamePatternConfig,

    /// Invoke flavours.
    #[serde(default)]
    pub invoke: InvokeConfig,

    /// Name of the interface method that loads every module.
    #[serde(default = "default_preload_all_modules_name")]
    pub preload_all_modules_name: String,

    /// Emit an `IServiceCollection` extension registering the runtime.
    #[serde(default = "default_service_extension")]
    pub service_extension: bool,

    /// Directories or files holding declaration modules.
    #[serde(default = "default_input")]
    pub input: Vec<InputPath>,

    /// Where generated fragments are written.
    #[serde(default)]
    pub output: OutputConfig,
}

impl Default for InteropConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            using_statements: default_using_statements(),
            unknown_type_fallback: default_unknown_type_fallback(),
            type_overrides: BTreeMap::new(),
            name_patterns: NamePatternConfig::default(),
            invoke: InvokeConfig::default(),
            preload_all_modules_name: default_preload_all_modules_name(),
            service_extension: default_service_extension(),
            input: default_input(),
            output: OutputConfig::default(),
        }
    }
}

impl InteropConfig {
    /// Load configuration from a file, JSON for `.json` and TOML otherwise.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| InteropError::Config(format!("Failed to read config file: {}", e)))?;

        tracing::debug!(path = %path.display(), "Loading configuration");

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::parse_json(&content),
            _ => Self::parse_toml(&content),
        }
    }

    /// Parse configuration from a TOML string.
    pub fn parse_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| InteropError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Parse configuration from a JSON string.
    pub fn parse_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| InteropError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Serialize the configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| InteropError::Serialization(e.to_string()))
    }
}

fn default_namespace() -> String {
    "Microsoft.JSInterop".to_string()
}

fn default_using_statements() -> Vec<String> {
    vec!["Microsoft.AspNetCore.Components".to_string()]
}

fn default_unknown_type_fallback() -> String {
    "object".to_string()
}

fn default_preload_all_modules_name() -> String {
    "PreloadAllModules".to_string()
}

fn default_service_extension() -> bool {
    true
}

fn default_input() -> Vec<InputPath> {
    vec![InputPath::default()]
}

/// A declaration root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputPath {
    /// Directory to scan, or a single declaration file.
    pub include: String,

    /// Path prefixes, relative to `include`, that are skipped.
    #[serde(default)]
    pub excludes: Vec<String>,

    /// Module path used instead of the file name when `include` is a file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_path: Option<String>,
}

impl Default for InputPath {
    fn default() -> Self {
        Self {
            include: ".".to_string(),
            excludes: vec!["bin".to_string(), "obj".to_string()],
            module_path: None,
        }
    }
}

impl InputPath {
    /// Check if a path relative to `include` is excluded.
    pub fn is_excluded(&self, relative: &str) -> bool {
        let relative = relative.replace('\\', "/");
        self.excludes.iter().any(|exclude| {
            let exclude = exclude.trim_end_matches('/');
            relative == exclude || relative.starts_with(&format!("{}/", exclude))
        })
    }
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory fragments are written to.
    #[serde(default = "default_output_directory")]
    pub directory: String,

    /// File extension appended to each fragment name.
    #[serde(default = "default_file_extension")]
    pub file_extension: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            file_extension: default_file_extension(),
        }
    }
}

impl OutputConfig {
    /// File name for a fragment.
    pub fn file_name(&self, fragment_name: &str) -> String {
        format!("{}{}", fragment_name, self.file_extension)
    }
}

fn default_output_directory() -> String {
    "TSRuntime".to_string()
}

fn default_file_extension() -> String {
    ".g.cs".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = InteropConfig::default();
        assert_eq!(config.namespace, "Microsoft.JSInterop");
        assert_eq!(config.unknown_type_fallback, "object");
        assert!(config.type_overrides.is_empty());
        assert_eq!(config.name_patterns.method.pattern, "{function}");
        assert_eq!(config.name_patterns.method.casing, NameCasing::PascalCase);
        assert_eq!(config.invoke.enabled_count(), 1);
        assert!(!config.invoke.promise_append_async);
        assert_eq!(config.preload_all_modules_name, "PreloadAllModules");
        assert!(config.service_extension);
        assert_eq!(config.input.len(), 1);
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = InteropConfig::parse_toml("").unwrap();
        assert_eq!(config, InteropConfig::default());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            namespace = "MyApp.Interop"
            unknown_type_fallback = "JsonElement"
            using_statements = ["System.Text.Json"]
            preload_all_modules_name = "PreloadEverything"
            service_extension = false

            [type_overrides]
            number = "int"
            "HTMLElement" = "ElementReference"
            bigint = { type = "TInteger", generics = [{ name = "TInteger", constraint = "IBinaryInteger<TInteger>" }] }

            [name_patterns.method]
            pattern = "{action}{function}"
            casing = "pascal_case"

            [invoke]
            sync_enabled = true
            async_enabled = true

            [invoke.action_names]
            async = "CallAsync"

            [[input]]
            include = "wwwroot"
            excludes = ["lib"]

            [output]
            directory = "Generated"
        "#;

        let config = InteropConfig::parse_toml(toml).unwrap();
        assert_eq!(config.namespace, "MyApp.Interop");
        assert_eq!(config.type_overrides.get("number").unwrap(), "int");
        assert_eq!(config.type_overrides["bigint"].host(), "TInteger");
        assert_eq!(config.type_overrides["bigint"].generics().len(), 1);
        assert_eq!(config.preload_all_modules_name, "PreloadEverything");
        assert!(!config.service_extension);
        assert_eq!(config.name_patterns.method.pattern, "{action}{function}");
        assert_eq!(config.name_patterns.parameter.pattern, "{name}");
        assert_eq!(config.invoke.enabled_count(), 3);
        assert_eq!(config.invoke.action_names.async_, "CallAsync");
        assert_eq!(config.invoke.action_names.sync, "Invoke");
        assert_eq!(config.input[0].include, "wwwroot");
        assert_eq!(config.output.directory, "Generated");
        assert_eq!(config.output.file_extension, ".g.cs");
    }

    #[test]
    fn test_parse_json_config() {
        let json = r#"{
            "type_overrides": { "number": "float" },
            "name_patterns": { "preload": { "pattern": "Load{module}" } }
        }"#;

        let config = InteropConfig::parse_json(json).unwrap();
        assert_eq!(config.type_overrides.get("number").unwrap(), "float");
        assert_eq!(config.name_patterns.preload.pattern, "Load{module}");
        assert_eq!(config.name_patterns.preload.casing, NameCasing::Verbatim);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = InteropConfig::parse_toml("namespce = \"Typo\"");
        assert!(matches!(result, Err(InteropError::Config(_))));
    }

    #[test]
    fn test_toml_roundtrip_of_defaults() {
        let config = InteropConfig::default();
        let text = config.to_toml().unwrap();
        assert_eq!(InteropConfig::parse_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_from_file_picks_format() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("tsinterop.json");
        std::fs::write(&json_path, r#"{ "namespace": "FromJson" }"#).unwrap();
        assert_eq!(InteropConfig::from_file(&json_path).unwrap().namespace, "FromJson");

        let toml_path = dir.path().join("tsinterop.toml");
        std::fs::write(&toml_path, "namespace = \"FromToml\"").unwrap();
        assert_eq!(InteropConfig::from_file(&toml_path).unwrap().namespace, "FromToml");

        assert!(InteropConfig::from_file(dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_input_excludes() {
        let input = InputPath::default();
        assert!(input.is_excluded("bin/Debug/x.d.ts"));
        assert!(input.is_excluded("obj"));
        assert!(!input.is_excluded("binary/x.d.ts"));
        assert!(!input.is_excluded("js/x.d.ts"));
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(OutputConfig::default().file_name("ITSRuntime"), "ITSRuntime.g.cs");
    }
}
