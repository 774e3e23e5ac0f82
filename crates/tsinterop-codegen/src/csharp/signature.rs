use tsinterop_core::config::ActionNames;

/// How a bound function is invoked through the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvokeAction {
    Sync,
    TrySync,
    Async,
}

impl InvokeAction {
    /// Scaffold helper the implementation forwards to.
    pub fn helper(&self) -> &'static str {
        match self {
            InvokeAction::Sync => "TSInvoke",
            InvokeAction::TrySync => "TSInvokeTrySync",
            InvokeAction::Async => "TSInvokeAsync",
        }
    }

    /// Configured value for `{action}`.
    pub fn name<'a>(&self, names: &'a ActionNames) -> &'a str {
        match self {
            InvokeAction::Sync => &names.sync,
            InvokeAction::TrySync => &names.trysync,
            InvokeAction::Async => &names.async_,
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            InvokeAction::Sync => "synchronously; the module must be preloaded",
            InvokeAction::TrySync => {
                "synchronously when the runtime supports it, otherwise asynchronously"
            }
            InvokeAction::Async => "asynchronously",
        }
    }

    fn is_cancellable(&self) -> bool {
        !matches!(self, InvokeAction::Sync)
    }
}

/// Name of the generated cancellation parameter, unless a declared parameter
/// already uses it.
const CANCELLATION_TOKEN: &str = "cancellationToken";

/// A resolved method parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct HostParameter {
    pub ty: String,
    pub name: String,
    pub has_default: bool,
}

/// A fully resolved C# method for one function and invoke action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct MethodSignature {
    pub action: InvokeAction,
    pub name: String,
    /// Resolved awaited return type, `void` included.
    pub result: String,
    pub generics: Vec<String>,
    /// `(parameter, constraint)` pairs for the `where` clauses.
    pub constraints: Vec<(String, String)>,
    pub parameters: Vec<HostParameter>,
    /// Name of the trailing `CancellationToken` parameter.
    pub token: String,
}

/// Pick a cancellation parameter name no declared parameter uses.
pub(super) fn token_name(parameters: &[HostParameter]) -> String {
    let mut token = CANCELLATION_TOKEN.to_string();
    while parameters.iter().any(|p| p.name == token) {
        token.push('_');
    }
    token
}

impl MethodSignature {
    fn is_void(&self) -> bool {
        self.result == crate::resolver::VOID
    }

    fn return_type(&self) -> String {
        match (self.action, self.is_void()) {
            (InvokeAction::Sync, _) => self.result.clone(),
            (_, true) => "ValueTask".to_string(),
            (_, false) => format!("ValueTask<{}>", self.result),
        }
    }

    /// Type argument passed to the scaffold helper.
    fn helper_result(&self) -> &str {
        if self.is_void() {
            "IJSVoidResult"
        } else {
            &self.result
        }
    }

    fn generic_clause(&self) -> String {
        if self.generics.is_empty() {
            String::new()
        } else {
            format!("<{}>", self.generics.join(", "))
        }
    }

    fn where_clauses(&self) -> String {
        self.constraints
            .iter()
            .map(|(name, constraint)| format!(" where {} : {}", name, constraint))
            .collect()
    }

    fn parameter_list(&self) -> String {
        let mut parameters: Vec<String> = self
            .parameters
            .iter()
            .map(|p| {
                if p.has_default {
                    format!("{} {} = default", p.ty, p.name)
                } else {
                    format!("{} {}", p.ty, p.name)
                }
            })
            .collect();
        if self.action.is_cancellable() {
            parameters.push(format!("CancellationToken {} = default", self.token));
        }
        parameters.join(", ")
    }

    /// `ValueTask<T> Name<T>(T value, CancellationToken cancellationToken = default) where ...`
    pub fn declaration(&self) -> String {
        format!(
            "{} {}{}({}){}",
            self.return_type(),
            self.name,
            self.generic_clause(),
            self.parameter_list(),
            self.where_clauses()
        )
    }

    /// Interface member, doc comment included.
    pub fn interface_member(&self, summary: &str, indent: &str) -> String {
        format!(
            "{indent}/// <summary>\n{indent}/// {}\n{indent}/// </summary>\n{indent}{};\n",
            summary,
            self.declaration(),
        )
    }

    /// Implementation member forwarding to the scaffold helper.
    pub fn implementation(&self, url: &str, identifier: &str, indent: &str) -> String {
        let asynchronous = self.is_void() && self.action.is_cancellable();

        let mut arguments = vec![format!("\"{}\"", url), format!("\"{}\"", identifier)];
        if self.action.is_cancellable() {
            arguments.push(self.token.clone());
        }
        arguments.extend(self.parameters.iter().map(|p| p.name.clone()));

        format!(
            "{indent}public {}{}\n{indent}    => {}{}<{}>({});\n",
            if asynchronous { "async " } else { "" },
            self.declaration(),
            if asynchronous { "await " } else { "" },
            self.action.helper(),
            self.helper_result(),
            arguments.join(", "),
        )
    }

    /// Default summary when the declaration carries no doc comment.
    pub fn describe(&self, function: &str, url: &str) -> String {
        format!(
            "Invokes '{}' of module '{}' {}.",
            function,
            url,
            self.action.describe()
        )
    }
}

/// Escape text for an XML doc comment.
pub(super) fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

const KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

/// Prefix C# keywords with `@` so they can be used as identifiers.
pub(super) fn escape_identifier(name: &str) -> String {
    if KEYWORDS.contains(&name) {
        format!("@{}", name)
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signature(action: InvokeAction, result: &str) -> MethodSignature {
        MethodSignature {
            action,
            name: "GetProperty".into(),
            result: result.into(),
            generics: vec!["Type".into(), "Key".into()],
            constraints: vec![("Key".into(), "IKeyOf<Type>".into())],
            parameters: vec![
                HostParameter {
                    ty: "Type".into(),
                    name: "obj".into(),
                    has_default: false,
                },
                HostParameter {
                    ty: "Key?".into(),
                    name: "key".into(),
                    has_default: true,
                },
            ],
            token: CANCELLATION_TOKEN.into(),
        }
    }

    #[test]
    fn test_declaration_trysync() {
        let sig = signature(InvokeAction::TrySync, "double");
        assert_eq!(
            sig.declaration(),
            "ValueTask<double> GetProperty<Type, Key>(Type obj, Key? key = default, CancellationToken cancellationToken = default) where Key : IKeyOf<Type>"
        );
    }

    #[test]
    fn test_declaration_sync_void() {
        let mut sig = signature(InvokeAction::Sync, "void");
        sig.generics.clear();
        sig.constraints.clear();
        sig.parameters.clear();
        assert_eq!(sig.declaration(), "void GetProperty()");
        assert_eq!(
            sig.implementation("/m.js", "getProperty", ""),
            "public void GetProperty()\n    => TSInvoke<IJSVoidResult>(\"/m.js\", \"getProperty\");\n"
        );
    }

    #[test]
    fn test_implementation_async_void_awaits() {
        let sig = signature(InvokeAction::Async, "void");
        let code = sig.implementation("/m.js", "getProperty", "    ");
        assert!(code.starts_with("    public async ValueTask GetProperty<Type, Key>("));
        assert!(code.contains(
            "=> await TSInvokeAsync<IJSVoidResult>(\"/m.js\", \"getProperty\", cancellationToken, obj, key);"
        ));
    }

    #[test]
    fn test_implementation_value() {
        let sig = signature(InvokeAction::TrySync, "string");
        let code = sig.implementation("/m.js", "getProperty", "");
        assert!(code.starts_with("public ValueTask<string> GetProperty"));
        assert!(code.contains("=> TSInvokeTrySync<string>(\"/m.js\", \"getProperty\", cancellationToken, obj, key);"));
    }

    #[test]
    fn test_token_name_avoids_parameters() {
        let mut sig = signature(InvokeAction::TrySync, "string");
        assert_eq!(token_name(&sig.parameters), "cancellationToken");

        sig.parameters[1].name = "cancellationToken".into();
        sig.parameters[0].name = "cancellationToken_".into();
        sig.token = token_name(&sig.parameters);
        assert_eq!(sig.token, "cancellationToken__");
        assert!(sig
            .declaration()
            .contains("Key? cancellationToken = default, CancellationToken cancellationToken__ = default)"));
        assert!(sig
            .implementation("/m.js", "getProperty", "")
            .contains("cancellationToken__, cancellationToken_, cancellationToken);"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape_identifier("event"), "@event");
        assert_eq!(escape_identifier("element"), "element");
        assert_eq!(xml_escape("a < b && c"), "a &lt; b &amp;&amp; c");
    }
}
