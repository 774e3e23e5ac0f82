use serde::{Deserialize, Serialize};

/// TypeScript keyword types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    String,
    Number,
    Boolean,
    BigInt,
    Void,
    Undefined,
    Null,
    Any,
    Unknown,
    Never,
    Object,
    Symbol,
}

impl Primitive {
    /// Look up a keyword type by its TypeScript spelling.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let primitive = match keyword {
            "string" => Primitive::String,
            "number" => Primitive::Number,
            "boolean" => Primitive::Boolean,
            "bigint" => Primitive::BigInt,
            "void" => Primitive::Void,
            "undefined" => Primitive::Undefined,
            "null" => Primitive::Null,
            "any" => Primitive::Any,
            "unknown" => Primitive::Unknown,
            "never" => Primitive::Never,
            "object" => Primitive::Object,
            "symbol" => Primitive::Symbol,
            _ => return None,
        };
        Some(primitive)
    }

    /// Get the TypeScript spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Number => "number",
            Primitive::Boolean => "boolean",
            Primitive::BigInt => "bigint",
            Primitive::Void => "void",
            Primitive::Undefined => "undefined",
            Primitive::Null => "null",
            Primitive::Any => "any",
            Primitive::Unknown => "unknown",
            Primitive::Never => "never",
            Primitive::Object => "object",
            Primitive::Symbol => "symbol",
        }
    }

    /// `null` and `undefined` only mark a value as optional.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Primitive::Null | Primitive::Undefined)
    }
}

impl std::fmt::Display for Primitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A parsed TypeScript type expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "of", rename_all = "snake_case")]
pub enum TypeExpr {
    /// Keyword type such as `string` or `void`.
    Primitive(Primitive),
    /// `T[]`, `Array<T>` or `ReadonlyArray<T>`
    ArrayOf(Box<TypeExpr>),
    /// `A | B | ...`, members in declaration order without repeats
    UnionOf(Vec<TypeExpr>),
    /// `Promise<T>`
    PromiseOf(Box<TypeExpr>),
    /// `keyof T`
    KeyOf(Box<TypeExpr>),
    /// Any other named or structural type, whitespace-normalized.
    Reference(String),
    /// A generic parameter declared by the enclosing function.
    GenericParamRef(String),
}

impl TypeExpr {
    /// Shorthand for a primitive type.
    pub fn primitive(primitive: Primitive) -> Self {
        TypeExpr::Primitive(primitive)
    }

    /// Render the expression in canonical TypeScript syntax.
    ///
    /// The rendering is deterministic and is the key used for type overrides:
    /// `number[]`, `string | null`, `Promise<void>`, `keyof T`, `(A | B)[]`.
    pub fn canonical_text(&self) -> String {
        match self {
            TypeExpr::Primitive(p) => p.as_str().to_string(),
            TypeExpr::ArrayOf(inner) => format!("{}[]", inner.canonical_operand()),
            TypeExpr::UnionOf(members) => members
                .iter()
                .map(TypeExpr::canonical_text)
                .collect::<Vec<_>>()
                .join(" | "),
            TypeExpr::PromiseOf(inner) => format!("Promise<{}>", inner.canonical_text()),
            TypeExpr::KeyOf(inner) => format!("keyof {}", inner.canonical_operand()),
            TypeExpr::Reference(name) | TypeExpr::GenericParamRef(name) => name.clone(),
        }
    }

    /// Canonical text, parenthesized when it would not bind as an operand.
    fn canonical_operand(&self) -> String {
        match self {
            TypeExpr::UnionOf(_) | TypeExpr::KeyOf(_) => format!("({})", self.canonical_text()),
            _ => self.canonical_text(),
        }
    }

    /// Check if this is `null` or `undefined`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, TypeExpr::Primitive(p) if p.is_nullish())
    }

    /// Check if this is a `Promise<T>`.
    pub fn is_promise(&self) -> bool {
        matches!(self, TypeExpr::PromiseOf(_))
    }
}

impl std::fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.canonical_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_keywords() {
        for keyword in ["string", "number", "boolean", "bigint", "void", "null", "symbol"] {
            let primitive = Primitive::from_keyword(keyword).unwrap();
            assert_eq!(primitive.as_str(), keyword);
        }
        assert_eq!(Primitive::from_keyword("String"), None);
        assert_eq!(Primitive::from_keyword("HTMLElement"), None);
    }

    #[test]
    fn test_canonical_text_array_of_union() {
        let ty = TypeExpr::ArrayOf(Box::new(TypeExpr::UnionOf(vec![
            TypeExpr::primitive(Primitive::Number),
            TypeExpr::primitive(Primitive::Null),
        ])));
        assert_eq!(ty.canonical_text(), "(number | null)[]");
    }

    #[test]
    fn test_canonical_text_nested() {
        let ty = TypeExpr::PromiseOf(Box::new(TypeExpr::ArrayOf(Box::new(TypeExpr::Reference(
            "HTMLElement".into(),
        )))));
        assert_eq!(ty.canonical_text(), "Promise<HTMLElement[]>");
        assert_eq!(ty.to_string(), "Promise<HTMLElement[]>");

        let key = TypeExpr::KeyOf(Box::new(TypeExpr::GenericParamRef("Type".into())));
        assert_eq!(key.canonical_text(), "keyof Type");
        let keys = TypeExpr::ArrayOf(Box::new(key));
        assert_eq!(keys.canonical_text(), "(keyof Type)[]");
    }

    #[test]
    fn test_nullish_and_promise() {
        assert!(TypeExpr::primitive(Primitive::Undefined).is_nullish());
        assert!(!TypeExpr::primitive(Primitive::Void).is_nullish());
        assert!(TypeExpr::PromiseOf(Box::new(TypeExpr::primitive(Primitive::Void))).is_promise());
    }

    #[test]
    fn test_serialize_tagged() {
        let ty = TypeExpr::ArrayOf(Box::new(TypeExpr::primitive(Primitive::String)));
        let json = serde_json::to_value(&ty).unwrap();
        assert_eq!(json["kind"], "array_of");
        assert_eq!(json["of"]["of"], "string");
    }
}
