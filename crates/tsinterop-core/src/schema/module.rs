//! Declaration module definitions.
//!
//! A module is one declaration file; its functions are the `export function`
//! statements it contains, kept in declaration order.

use serde::Serialize;

use super::types::TypeExpr;

/// Function parameter definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    /// Parameter name as declared.
    pub name: String,
    /// Declared type.
    pub ty: TypeExpr,
    /// Declared with a trailing `?`.
    pub optional: bool,
}

impl Parameter {
    /// Create a new required parameter.
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
        }
    }

    /// Mark the parameter as optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Generic type parameter, e.g. `Key extends keyof Type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenericParameter {
    pub name: String,
    pub constraint: Option<TypeExpr>,
}

impl GenericParameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraint: None,
        }
    }

    pub fn with_constraint(mut self, constraint: TypeExpr) -> Self {
        self.constraint = Some(constraint);
        self
    }
}

/// Exported function signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Function {
    /// Function name, unique within its module.
    pub name: String,
    /// Generic parameters in declaration order.
    pub generics: Vec<GenericParameter>,
    /// Parameters in declaration order.
    pub parameters: Vec<Parameter>,
    /// Declared return type, `PromiseOf` when the function is async.
    pub return_type: TypeExpr,
    /// Summary of the preceding doc comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

impl Function {
    /// Create a new function without parameters or generics.
    pub fn new(name: impl Into<String>, return_type: TypeExpr) -> Self {
        Self {
            name: name.into(),
            generics: Vec::new(),
            parameters: Vec::new(),
            return_type,
            doc: None,
        }
    }

    /// Add a generic parameter.
    pub fn with_generic(mut self, generic: GenericParameter) -> Self {
        self.generics.push(generic);
        self
    }

    /// Add a parameter.
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Set documentation.
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Check if the function returns a `Promise`.
    pub fn returns_promise(&self) -> bool {
        self.return_type.is_promise()
    }

    /// The return type with one `Promise` layer removed.
    pub fn awaited_return_type(&self) -> &TypeExpr {
        match &self.return_type {
            TypeExpr::PromiseOf(inner) => inner,
            other => other,
        }
    }
}

/// A parsed declaration module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Module {
    /// Path the module was read from, relative to its input root.
    pub path: String,
    /// Identifier derived from the file name.
    pub name: String,
    /// URL the JavaScript module is imported from.
    pub url: String,
    /// Exported functions in declaration order.
    pub functions: Vec<Function>,
}

impl Module {
    /// Create an empty module, deriving its name and URL from `path`.
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            name: module_name(&path),
            url: module_url(&path),
            path,
            functions: Vec::new(),
        }
    }

    /// Get a function by name.
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }
}

fn strip_declaration_suffix(path: &str) -> &str {
    [".d.ts", ".ts", ".js"]
        .iter()
        .find_map(|suffix| path.strip_suffix(suffix))
        .unwrap_or(path)
}

/// Derive the module identifier: the file stem with every character that is
/// not alphanumeric replaced by `_`, prefixed with `_` when it starts with a digit.
pub fn module_name(path: &str) -> String {
    let normalized = path.replace('\\', "/");
    let file = normalized.rsplit('/').next().unwrap_or_default();
    let stem = strip_declaration_suffix(file);
    let stem = stem.strip_suffix(".razor").unwrap_or(stem);

    let mut name: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

/// Derive the URL a module is imported from, e.g. `wwwroot/js/site.d.ts` -> `/js/site.js`.
pub fn module_url(path: &str) -> String {
    let normalized = path.replace('\\', "/");
    let trimmed = normalized.trim_start_matches("./").trim_start_matches('/');
    let trimmed = trimmed.strip_prefix("wwwroot/").unwrap_or(trimmed);
    format!("/{}.js", strip_declaration_suffix(trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Primitive;

    #[test]
    fn test_module_name_and_url() {
        let module = Module::new("GenericModule.d.ts");
        assert_eq!(module.name, "GenericModule");
        assert_eq!(module.url, "/GenericModule.js");

        let module = Module::new("wwwroot/js/site-utils.d.ts");
        assert_eq!(module.name, "site_utils");
        assert_eq!(module.url, "/js/site-utils.js");
    }

    #[test]
    fn test_module_name_edge_cases() {
        assert_eq!(module_name("Pages/Counter.razor.d.ts"), "Counter");
        assert_eq!(module_name("1st.d.ts"), "_1st");
        assert_eq!(module_name("dir\\My Module.d.ts"), "My_Module");
        assert_eq!(module_url("./lib/api.js"), "/lib/api.js");
    }

    #[test]
    fn test_function_builder() {
        let func = Function::new(
            "load",
            TypeExpr::PromiseOf(Box::new(TypeExpr::primitive(Primitive::String))),
        )
        .with_generic(GenericParameter::new("T"))
        .with_parameter(Parameter::new("id", TypeExpr::primitive(Primitive::Number)))
        .with_parameter(Parameter::new("tag", TypeExpr::primitive(Primitive::String)).optional())
        .with_doc("Loads a value.");

        assert!(func.returns_promise());
        assert_eq!(
            func.awaited_return_type(),
            &TypeExpr::primitive(Primitive::String)
        );
        assert_eq!(func.parameters.len(), 2);
        assert!(func.parameters[1].optional);
        assert_eq!(func.doc.as_deref(), Some("Loads a value."));
    }

    #[test]
    fn test_module_lookup() {
        let mut module = Module::new("a.d.ts");
        module
            .functions
            .push(Function::new("ping", TypeExpr::primitive(Primitive::Void)));
        assert!(module.function("ping").is_some());
        assert!(module.function("pong").is_none());
    }
}
