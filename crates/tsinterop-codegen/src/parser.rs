//! Declaration module parser.
//!
//! Extracts `export function` / `export declare function` signatures from
//! `.d.ts` sources into the schema model. Every other statement is ignored.

use std::collections::HashSet;

use rayon::prelude::*;
use tsinterop_core::schema::{Function, GenericParameter, Module, Parameter, Primitive, TypeExpr};
use tsinterop_core::{ParseError, ParseErrorKind};

use crate::scanner::{self, ScanError};

/// Result of parsing a set of modules.
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    /// Modules that parsed, in input order.
    pub modules: Vec<Module>,
    /// Every error recorded, in input order.
    pub errors: Vec<ParseError>,
}

impl ParseOutcome {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Result of parsing a single module.
#[derive(Debug, Clone)]
pub struct ModuleParse {
    /// `None` when the module had unbalanced brackets.
    pub module: Option<Module>,
    pub errors: Vec<ParseError>,
}

/// Parse `(path, source)` pairs in parallel.
///
/// Modules are independent, so a failure in one never affects another. A path
/// that appears twice is reported and its later occurrence dropped.
pub fn parse_modules<P, S>(sources: &[(P, S)]) -> ParseOutcome
where
    P: AsRef<str> + Sync,
    S: AsRef<str> + Sync,
{
    let parsed: Vec<ModuleParse> = sources
        .par_iter()
        .map(|(path, source)| parse_module(path.as_ref(), source.as_ref()))
        .collect();

    let mut outcome = ParseOutcome::default();
    let mut seen = HashSet::new();

    for (result, (path, source)) in parsed.into_iter().zip(sources) {
        outcome.errors.extend(result.errors);

        let Some(module) = result.module else {
            continue;
        };
        if !seen.insert(module.path.clone()) {
            let error = ParseError::new(
                path.as_ref(),
                source.as_ref(),
                0,
                ParseErrorKind::DuplicateSymbol(module.path.clone()),
            );
            tracing::warn!(error = %error, "Duplicate module path");
            outcome.errors.push(error);
            continue;
        }
        outcome.modules.push(module);
    }

    tracing::info!(
        modules = outcome.modules.len(),
        errors = outcome.errors.len(),
        "Parsed declaration modules"
    );
    outcome
}

/// Parse a single declaration module.
pub fn parse_module(path: &str, source: &str) -> ModuleParse {
    let statements = match scanner::scan_statements(source) {
        Ok(statements) => statements,
        Err(e) => {
            let error = ParseError::new(
                path,
                source,
                e.offset,
                ParseErrorKind::UnbalancedBrackets(e.message),
            );
            tracing::warn!(error = %error, "Dropping module");
            return ModuleParse {
                module: None,
                errors: vec![error],
            };
        }
    };

    let mut module = Module::new(path);
    let mut errors = Vec::new();

    for statement in statements {
        let Some(signature) = strip_function_prefix(&statement.text) else {
            continue;
        };

        match parse_function(signature) {
            Ok(mut function) => {
                if module.function(&function.name).is_some() {
                    let error = ParseError::new(
                        path,
                        source,
                        statement.offset,
                        ParseErrorKind::DuplicateSymbol(function.name),
                    );
                    tracing::warn!(error = %error, "Skipping function");
                    errors.push(error);
                    continue;
                }
                function.doc = statement.doc;
                module.functions.push(function);
            }
            Err(message) => {
                let error = ParseError::new(
                    path,
                    source,
                    statement.offset,
                    ParseErrorKind::MalformedSignature(message),
                );
                tracing::warn!(error = %error, "Skipping function");
                errors.push(error);
            }
        }
    }

    tracing::debug!(path, functions = module.functions.len(), "Parsed module");
    ModuleParse {
        module: Some(module),
        errors,
    }
}

/// Strip `word` and the whitespace after it.
fn strip_word<'a>(text: &'a str, word: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(word)?;
    if rest.starts_with(char::is_whitespace) {
        Some(rest.trim_start())
    } else {
        None
    }
}

/// The text after `export [declare] function`, if the statement is one.
fn strip_function_prefix(statement: &str) -> Option<&str> {
    let rest = strip_word(statement, "export")?;
    let rest = strip_word(rest, "declare").unwrap_or(rest);
    strip_word(rest, "function")
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

fn is_identifier(text: &str) -> bool {
    text.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && text.chars().all(is_ident_char)
}

fn scan_message(e: ScanError) -> String {
    e.message
}

/// Parse `name<generics>(params): return` into a function.
fn parse_function(text: &str) -> Result<Function, String> {
    let name_len = text.find(|c: char| !is_ident_char(c)).unwrap_or(text.len());
    let name = &text[..name_len];
    if !is_identifier(name) {
        return Err("missing function name".to_string());
    }

    let mut rest = text[name_len..].trim_start();
    let mut generics = Vec::new();
    if rest.starts_with('<') {
        let close = scanner::matching_close(rest, 0)
            .map_err(scan_message)?
            .ok_or("unclosed generic parameter list")?;
        generics = parse_generics(&rest[1..close])?;
        rest = rest[close + 1..].trim_start();
    }

    if !rest.starts_with('(') {
        return Err(format!("expected '(' after '{}'", name));
    }
    let close = scanner::matching_close(rest, 0)
        .map_err(scan_message)?
        .ok_or("unclosed parameter list")?;

    let generic_names: Vec<String> = generics.iter().map(|g: &GenericParameter| g.name.clone()).collect();
    let parameters = parse_parameters(&rest[1..close], &generic_names)?;

    let tail = rest[close + 1..].trim();
    let return_type = match tail.strip_prefix(':') {
        Some(ty) => parse_type(ty, &generic_names)?,
        None if tail.is_empty() => TypeExpr::Primitive(Primitive::Any),
        None => return Err(format!("unexpected '{}' after parameter list", tail)),
    };

    Ok(Function {
        name: name.to_string(),
        generics,
        parameters,
        return_type,
        doc: None,
    })
}

/// Parse the inside of a `<...>` generic parameter clause.
///
/// Names are collected first so constraints may refer to any parameter of the
/// clause, e.g. `<Type, Key extends keyof Type>`.
fn parse_generics(text: &str) -> Result<Vec<GenericParameter>, String> {
    let mut declared = Vec::new();

    for entry in scanner::split_top_level(text, ',').map_err(scan_message)? {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let entry = strip_word(entry, "const").unwrap_or(entry);

        // `T = Default` keeps only `T`
        let entry = match scanner::find_top_level(entry, |i, c| {
            c == '=' && !entry[i + 1..].starts_with('>')
        })
        .map_err(scan_message)?
        {
            Some(eq) => entry[..eq].trim_end(),
            None => entry,
        };

        let name_len = entry.find(|c: char| !is_ident_char(c)).unwrap_or(entry.len());
        let name = &entry[..name_len];
        if !is_identifier(name) {
            return Err(format!("invalid generic parameter '{}'", entry));
        }

        let rest = entry[name_len..].trim_start();
        let constraint = if rest.is_empty() {
            None
        } else {
            match strip_word(rest, "extends") {
                Some(constraint) => Some(constraint),
                None => return Err(format!("invalid generic parameter '{}'", entry)),
            }
        };
        declared.push((name, constraint));
    }

    let names: Vec<String> = declared.iter().map(|(name, _)| name.to_string()).collect();
    declared
        .into_iter()
        .map(|(name, constraint)| {
            let generic = GenericParameter::new(name);
            match constraint {
                Some(text) => Ok(generic.with_constraint(parse_type(text, &names)?)),
                None => Ok(generic),
            }
        })
        .collect()
}

/// Parse the inside of a `(...)` parameter list.
fn parse_parameters(text: &str, generics: &[String]) -> Result<Vec<Parameter>, String> {
    let mut parameters = Vec::new();

    for entry in scanner::split_top_level(text, ',').map_err(scan_message)? {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let entry = entry.strip_prefix("...").unwrap_or(entry);

        let colon = scanner::find_top_level(entry, |_, c| c == ':').map_err(scan_message)?;
        let (declared_name, ty) = match colon {
            Some(i) => (entry[..i].trim(), Some(&entry[i + 1..])),
            None => (entry, None),
        };
        let (name, optional) = match declared_name.strip_suffix('?') {
            Some(name) => (name.trim_end(), true),
            None => (declared_name, false),
        };

        if !is_identifier(name) {
            return Err(format!("invalid parameter name '{}'", declared_name));
        }
        // `this` only types the receiver
        if name == "this" {
            continue;
        }

        let ty = match ty {
            Some(ty) => parse_type(ty, generics)?,
            None => TypeExpr::Primitive(Primitive::Any),
        };
        parameters.push(Parameter {
            name: name.to_string(),
            ty,
            optional,
        });
    }

    Ok(parameters)
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse a type expression. Unions bind loosest.
pub fn parse_type(text: &str, generics: &[String]) -> Result<TypeExpr, String> {
    let text = text.trim();
    if text.is_empty() {
        return Err("missing type".to_string());
    }

    if scanner::has_top_level_arrow(text).map_err(scan_message)? {
        return Ok(TypeExpr::Reference(normalize_whitespace(text)));
    }

    let members: Vec<&str> = scanner::split_top_level(text, '|')
        .map_err(scan_message)?
        .into_iter()
        .map(str::trim)
        .filter(|member| !member.is_empty())
        .collect();

    let mut union: Vec<TypeExpr> = Vec::with_capacity(members.len());
    for member in members {
        let ty = parse_member(member, generics)?;
        if !union.contains(&ty) {
            union.push(ty);
        }
    }

    match union.len() {
        0 => Err("missing type".to_string()),
        1 => Ok(union.remove(0)),
        _ => Ok(TypeExpr::UnionOf(union)),
    }
}

/// Parse one union member.
fn parse_member(text: &str, generics: &[String]) -> Result<TypeExpr, String> {
    let text = text.trim();

    if text.starts_with('(')
        && scanner::matching_close(text, 0).map_err(scan_message)? == Some(text.len() - 1)
    {
        return parse_type(&text[1..text.len() - 1], generics);
    }

    if let Some(rest) = strip_word(text, "readonly") {
        return parse_member(rest, generics);
    }

    if let Some(rest) = strip_word(text, "keyof") {
        return Ok(TypeExpr::KeyOf(Box::new(parse_member(rest, generics)?)));
    }

    if let Some(element) = text.strip_suffix("[]") {
        if !element.trim().is_empty() {
            return Ok(TypeExpr::ArrayOf(Box::new(parse_member(element, generics)?)));
        }
    }

    if let Some((name, argument)) = generic_application(text)? {
        return match name {
            "Promise" => Ok(TypeExpr::PromiseOf(Box::new(parse_type(argument, generics)?))),
            "Array" | "ReadonlyArray" => {
                Ok(TypeExpr::ArrayOf(Box::new(parse_type(argument, generics)?)))
            }
            _ => Ok(TypeExpr::Reference(normalize_whitespace(text))),
        };
    }

    if is_identifier(text) {
        if let Some(primitive) = Primitive::from_keyword(text) {
            return Ok(TypeExpr::Primitive(primitive));
        }
        if generics.iter().any(|g| g == text) {
            return Ok(TypeExpr::GenericParamRef(text.to_string()));
        }
    }

    Ok(TypeExpr::Reference(normalize_whitespace(text)))
}

/// Split `Name<args>` into the name and the argument text.
fn generic_application(text: &str) -> Result<Option<(&str, &str)>, String> {
    let Some(open) = text.find('<') else {
        return Ok(None);
    };
    let name = text[..open].trim_end();
    if !name.split('.').all(is_identifier) {
        return Ok(None);
    }

    let close = scanner::matching_close(text, open).map_err(scan_message)?;
    if close == Some(text.len() - 1) {
        Ok(Some((name, &text[open + 1..text.len() - 1])))
    } else {
        Ok(None)
    }
}
