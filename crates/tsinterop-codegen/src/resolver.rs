//! Mapping from TypeScript type expressions to C# types.

use std::collections::BTreeMap;

use tsinterop_core::config::{OverrideGeneric, TypeOverride};
use tsinterop_core::schema::{Primitive, TypeExpr};
use tsinterop_core::InteropConfig;

/// Marker interface the runtime scaffold declares for `keyof` constraints.
pub const KEY_OF_INTERFACE: &str = "IKeyOf";

/// Host type for a resolved `void`.
pub const VOID: &str = "void";

/// C# built-in types, none of which may appear as a generic constraint.
const BUILT_IN_TYPES: &[&str] = &[
    "bool", "byte", "sbyte", "char", "decimal", "double", "float", "int", "uint", "nint",
    "nuint", "long", "ulong", "short", "ushort", "object", "string", "dynamic", "void",
];

/// Resolves type expressions to C# type names.
///
/// Resolution is total: the override table is consulted first, then the
/// structural rules, and anything still unmapped becomes the configured
/// fallback type.
#[derive(Debug, Clone, Copy)]
pub struct TypeResolver<'a> {
    overrides: &'a BTreeMap<String, TypeOverride>,
    unknown: &'a str,
}

impl<'a> TypeResolver<'a> {
    /// Create a resolver from the configured overrides and fallback.
    pub fn new(config: &'a InteropConfig) -> Self {
        Self::with_overrides(&config.type_overrides, &config.unknown_type_fallback)
    }

    pub fn with_overrides(overrides: &'a BTreeMap<String, TypeOverride>, unknown: &'a str) -> Self {
        Self { overrides, unknown }
    }

    /// Resolve a type expression to a C# type.
    pub fn resolve(&self, ty: &TypeExpr) -> String {
        // a bare generic reference is always the parameter itself
        if let TypeExpr::GenericParamRef(name) = ty {
            return name.clone();
        }
        if let Some(host) = self.overrides.get(&ty.canonical_text()) {
            return host.host().to_string();
        }

        match ty {
            TypeExpr::Primitive(primitive) => self.primitive(*primitive),
            TypeExpr::ArrayOf(element) => format!("{}[]", self.resolve(element)),
            TypeExpr::PromiseOf(inner) => {
                let inner = self.resolve(inner);
                if inner == VOID {
                    "ValueTask".to_string()
                } else {
                    format!("ValueTask<{}>", inner)
                }
            }
            TypeExpr::UnionOf(members) => {
                let mut concrete = members.iter().filter(|m| !m.is_nullish());
                match (concrete.next(), concrete.next()) {
                    (Some(member), None) => {
                        let host = self.resolve(member);
                        // there is no nullable void
                        if host == VOID {
                            host
                        } else {
                            optional(&host)
                        }
                    }
                    _ => self.unknown.to_string(),
                }
            }
            TypeExpr::KeyOf(target) => match target.as_ref() {
                TypeExpr::GenericParamRef(name) => format!("{}<{}>", KEY_OF_INTERFACE, name),
                _ => self.unknown.to_string(),
            },
            TypeExpr::Reference(_) => self.unknown.to_string(),
            TypeExpr::GenericParamRef(name) => name.clone(),
        }
    }

    fn primitive(&self, primitive: Primitive) -> String {
        let host = match primitive {
            Primitive::String => "string",
            Primitive::Number => "double",
            Primitive::Boolean => "bool",
            Primitive::BigInt => "long",
            Primitive::Void | Primitive::Undefined | Primitive::Never => VOID,
            Primitive::Null => "object?",
            Primitive::Any | Primitive::Unknown | Primitive::Object => "object",
            Primitive::Symbol => self.unknown,
        };
        host.to_string()
    }

    /// Resolve a generic constraint for a `where` clause.
    ///
    /// Only generic parameters, `keyof` of a generic parameter and override
    /// hits have a C# constraint form. Anything else, and any override naming a
    /// built-in, nullable or array type, yields `None` and the constraint is
    /// dropped.
    pub fn constraint(&self, ty: &TypeExpr) -> Option<String> {
        let host = match ty {
            TypeExpr::GenericParamRef(name) => return Some(name.clone()),
            TypeExpr::KeyOf(target) if matches!(target.as_ref(), TypeExpr::GenericParamRef(_)) => {
                self.resolve(ty)
            }
            _ => self.overrides.get(&ty.canonical_text())?.host().to_string(),
        };
        is_constraint_type(&host, self.unknown).then_some(host)
    }

    /// Generic parameters introduced by the overrides `ty` resolves through,
    /// in resolution order.
    pub fn introduced_generics(&self, ty: &TypeExpr) -> Vec<&'a OverrideGeneric> {
        let mut found = Vec::new();
        self.collect_generics(ty, &mut found);
        found
    }

    fn collect_generics(&self, ty: &TypeExpr, found: &mut Vec<&'a OverrideGeneric>) {
        if let TypeExpr::GenericParamRef(_) = ty {
            return;
        }
        if let Some(host) = self.overrides.get(&ty.canonical_text()) {
            found.extend(host.generics());
            return;
        }

        match ty {
            TypeExpr::ArrayOf(inner) | TypeExpr::PromiseOf(inner) => {
                self.collect_generics(inner, found)
            }
            TypeExpr::UnionOf(members) => {
                let mut concrete = members.iter().filter(|m| !m.is_nullish());
                if let (Some(member), None) = (concrete.next(), concrete.next()) {
                    self.collect_generics(member, found);
                }
            }
            _ => {}
        }
    }

    /// The configured fallback type.
    pub fn unknown(&self) -> &str {
        self.unknown
    }
}

fn is_constraint_type(host: &str, unknown: &str) -> bool {
    !host.is_empty()
        && host != unknown
        && !host.ends_with('?')
        && !host.ends_with("[]")
        && !BUILT_IN_TYPES.contains(&host)
}

/// Make a C# type nullable.
pub fn optional(host: &str) -> String {
    if host.ends_with('?') {
        host.to_string()
    } else {
        format!("{}?", host)
    }
}
