//! C# code generator for Blazor JS interop.
//!
//! Produces the runtime scaffold, the capability interface listing every bound
//! function, and one partial class per declaration module implementing that
//! interface by forwarding to the scaffold's invoke helpers.

mod scaffold;
mod signature;

pub use signature::InvokeAction;

use std::collections::HashMap;

use tsinterop_core::schema::{Function, Module};
use tsinterop_core::{GenerationError, InteropConfig};

use crate::naming::{NameContext, NameKind, NamePattern};
use crate::resolver::{optional, TypeResolver};
use signature::{escape_identifier, token_name, xml_escape, HostParameter, MethodSignature};

/// Second line of every generated file. Output directories are only cleaned of
/// files carrying it.
pub const GENERATED_MARKER: &str = "// Generated by tsinterop.";

/// Base name substituted for `{name}` in interface and class patterns.
const RUNTIME_BASE_NAME: &str = "TSRuntime";

/// Owner reported for identifiers the runtime scaffold declares.
const RUNTIME_SCAFFOLD: &str = "runtime scaffold";

const INDENT: &str = "    ";

/// One generated source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Identifier the fragment is named after, without extension.
    pub name: String,
    pub content: String,
}

/// All fragments of one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSources {
    pub runtime_scaffold: Fragment,
    pub capability_interface: Fragment,
    /// One per module, in module order.
    pub module_implementations: Vec<Fragment>,
}

impl GeneratedSources {
    /// Every fragment: scaffold, interface, then module implementations.
    pub fn fragments(&self) -> impl Iterator<Item = &Fragment> {
        std::iter::once(&self.runtime_scaffold)
            .chain(std::iter::once(&self.capability_interface))
            .chain(self.module_implementations.iter())
    }
}

/// Generate all fragments for `modules`.
pub fn generate(
    modules: &[Module],
    config: &InteropConfig,
) -> Result<GeneratedSources, GenerationError> {
    Generator::new(config)?.generate(modules)
}

struct NamePatterns {
    interface: NamePattern,
    runtime_class: NamePattern,
    module: NamePattern,
    preload: NamePattern,
    method: NamePattern,
    parameter: NamePattern,
}

impl NamePatterns {
    fn compile(config: &InteropConfig) -> Result<Self, GenerationError> {
        let patterns = &config.name_patterns;
        Ok(Self {
            interface: NamePattern::compile(NameKind::Interface, &patterns.interface)?,
            runtime_class: NamePattern::compile(NameKind::RuntimeClass, &patterns.runtime_class)?,
            module: NamePattern::compile(NameKind::Module, &patterns.module)?,
            preload: NamePattern::compile(NameKind::Preload, &patterns.preload)?,
            method: NamePattern::compile(NameKind::Method, &patterns.method)?,
            parameter: NamePattern::compile(NameKind::Parameter, &patterns.parameter)?,
        })
    }
}

/// Methods and names planned for one module.
struct ModulePlan<'m> {
    module: &'m Module,
    fragment_name: String,
    preload: String,
    methods: Vec<(&'m Function, MethodSignature)>,
}

/// Generated identifiers and the module that claimed each one first.
#[derive(Default)]
struct SymbolTable<'m> {
    claimed: HashMap<String, &'m str>,
}

impl<'m> SymbolTable<'m> {
    fn claim(&mut self, symbol: &str, path: &'m str) -> Result<(), GenerationError> {
        if let Some(first) = self.claimed.get(symbol) {
            return Err(GenerationError::DuplicateSymbol {
                symbol: symbol.to_string(),
                first: first.to_string(),
                second: path.to_string(),
            });
        }
        self.claimed.insert(symbol.to_string(), path);
        Ok(())
    }
}

/// C# binding generator.
///
/// Construction validates the configuration, so a generator that exists can
/// only fail on the modules it is given.
pub struct Generator<'a> {
    config: &'a InteropConfig,
    resolver: TypeResolver<'a>,
    names: NamePatterns,
    actions: Vec<InvokeAction>,
}

impl<'a> Generator<'a> {
    /// Create a generator, rejecting invalid name patterns and invoke settings.
    pub fn new(config: &'a InteropConfig) -> Result<Self, GenerationError> {
        let names = NamePatterns::compile(config)?;

        let invoke = &config.invoke;
        let actions: Vec<InvokeAction> = [
            (invoke.sync_enabled, InvokeAction::Sync),
            (invoke.trysync_enabled, InvokeAction::TrySync),
            (invoke.async_enabled, InvokeAction::Async),
        ]
        .into_iter()
        .filter_map(|(enabled, action)| enabled.then_some(action))
        .collect();

        if actions.is_empty() {
            return Err(GenerationError::Config(
                "no invoke action is enabled".to_string(),
            ));
        }
        if actions.len() > 1 && !names.method.uses_action() {
            return Err(GenerationError::Config(format!(
                "method name pattern '{}' must contain {{action}} when several invoke actions are enabled",
                config.name_patterns.method.pattern
            )));
        }
        if !is_identifier(&config.preload_all_modules_name) {
            return Err(GenerationError::Config(format!(
                "preload_all_modules_name '{}' is not a valid identifier",
                config.preload_all_modules_name
            )));
        }

        Ok(Self {
            config,
            resolver: TypeResolver::new(config),
            names,
            actions,
        })
    }

    /// Name of the capability interface.
    pub fn interface_name(&self) -> String {
        self.names.interface.render(&NameContext {
            name: RUNTIME_BASE_NAME,
            ..Default::default()
        })
    }

    /// Name of the runtime class.
    pub fn runtime_class_name(&self) -> String {
        self.names.runtime_class.render(&NameContext {
            name: RUNTIME_BASE_NAME,
            ..Default::default()
        })
    }

    /// Generate all fragments. Fails without partial output.
    pub fn generate(&self, modules: &[Module]) -> Result<GeneratedSources, GenerationError> {
        let plans = self.plan(modules)?;
        let interface = self.interface_name();
        let class = self.runtime_class_name();

        let service_extension = self.config.service_extension;
        let runtime_scaffold = Fragment {
            content: scaffold::render(
                &self.header(&scaffold::usings(service_extension)),
                &self.config.namespace,
                &class,
                &interface,
                service_extension,
            ),
            name: class.clone(),
        };

        let capability_interface = Fragment {
            content: self.emit_interface(&interface, &class, &plans),
            name: interface,
        };

        let module_implementations: Vec<Fragment> = plans
            .iter()
            .map(|plan| Fragment {
                name: plan.fragment_name.clone(),
                content: self.emit_module(&class, plan),
            })
            .collect();

        tracing::info!(
            modules = plans.len(),
            methods = plans.iter().map(|p| p.methods.len()).sum::<usize>(),
            "Generated interop sources"
        );

        Ok(GeneratedSources {
            runtime_scaffold,
            capability_interface,
            module_implementations,
        })
    }

    /// Actions a function is bound with.
    fn actions_for(&self, function: &Function) -> Vec<InvokeAction> {
        if function.returns_promise() && self.config.invoke.promise_only_async {
            vec![InvokeAction::Async]
        } else {
            self.actions.clone()
        }
    }

    /// Resolve names and signatures, rejecting any identifier produced twice.
    fn plan<'m>(&self, modules: &'m [Module]) -> Result<Vec<ModulePlan<'m>>, GenerationError> {
        let mut members = SymbolTable::default();
        let mut fragments = SymbolTable::default();
        let mut plans = Vec::with_capacity(modules.len());

        let class = self.runtime_class_name();
        let interface = self.interface_name();
        let reserved = [
            class.as_str(),
            interface.as_str(),
            self.config.preload_all_modules_name.as_str(),
        ];
        for symbol in scaffold::MEMBERS.iter().copied().chain(reserved) {
            members.claim(symbol, RUNTIME_SCAFFOLD)?;
        }

        for module in modules {
            let context = NameContext {
                name: &module.name,
                module: &module.name,
                ..Default::default()
            };
            let fragment_name = self.names.module.render(&context);
            fragments.claim(&fragment_name, &module.path)?;

            let preload = self.names.preload.render(&context);
            members.claim(&preload, &module.path)?;

            let mut methods = Vec::new();
            for function in &module.functions {
                for action in self.actions_for(function) {
                    let signature = self.signature(module, function, action)?;
                    members.claim(&signature.name, &module.path)?;
                    methods.push((function, signature));
                }
            }

            tracing::debug!(
                path = %module.path,
                fragment = %fragment_name,
                methods = methods.len(),
                "Planned module"
            );
            plans.push(ModulePlan {
                module,
                fragment_name,
                preload,
                methods,
            });
        }

        Ok(plans)
    }

    fn signature(
        &self,
        module: &Module,
        function: &Function,
        action: InvokeAction,
    ) -> Result<MethodSignature, GenerationError> {
        let mut name = self.names.method.render(&NameContext {
            name: &function.name,
            module: &module.name,
            function: &function.name,
            action: action.name(&self.config.invoke.action_names),
        });
        if self.config.invoke.promise_append_async
            && function.returns_promise()
            && !name.ends_with("Async")
        {
            name.push_str("Async");
        }

        // generics of mapped overrides come before the function's own
        let mut generics: Vec<String> = Vec::new();
        let mut constraints: Vec<(String, String)> = Vec::new();
        let mapped = function
            .parameters
            .iter()
            .map(|p| &p.ty)
            .chain(std::iter::once(function.awaited_return_type()))
            .chain(function.generics.iter().filter_map(|g| g.constraint.as_ref()))
            .flat_map(|ty| self.resolver.introduced_generics(ty));
        for generic in mapped {
            if generics.contains(&generic.name) {
                continue;
            }
            generics.push(generic.name.clone());
            if let Some(constraint) = &generic.constraint {
                constraints.push((generic.name.clone(), constraint.clone()));
            }
        }
        for generic in &function.generics {
            if !generics.contains(&generic.name) {
                generics.push(generic.name.clone());
            }
            let constraint = generic
                .constraint
                .as_ref()
                .and_then(|c| self.resolver.constraint(c));
            if let Some(constraint) = constraint {
                if !constraints.iter().any(|(n, _)| n == &generic.name) {
                    constraints.push((generic.name.clone(), constraint));
                }
            }
        }

        // only a trailing run of optional parameters may take defaults
        let required_end = function
            .parameters
            .iter()
            .rposition(|p| !p.optional)
            .map_or(0, |i| i + 1);

        let mut parameters: Vec<HostParameter> = Vec::with_capacity(function.parameters.len());
        for (i, p) in function.parameters.iter().enumerate() {
            let ty = self.resolver.resolve(&p.ty);
            let rendered = escape_identifier(&self.names.parameter.render(&NameContext {
                name: &p.name,
                ..Default::default()
            }));
            if parameters.iter().any(|other| other.name == rendered) {
                return Err(GenerationError::DuplicateSymbol {
                    symbol: format!("{}({})", name, rendered),
                    first: module.path.clone(),
                    second: module.path.clone(),
                });
            }
            parameters.push(HostParameter {
                ty: if p.optional { optional(&ty) } else { ty },
                name: rendered,
                has_default: p.optional && i >= required_end,
            });
        }

        Ok(MethodSignature {
            action,
            name,
            result: self.resolver.resolve(function.awaited_return_type()),
            generics,
            constraints,
            token: token_name(&parameters),
            parameters,
        })
    }

    fn header(&self, usings: &[&str]) -> String {
        let mut out = format!(
            "// <auto-generated/>\n{} Changes to this file will be lost.\n#pragma warning disable\n#nullable enable annotations\n\n",
            GENERATED_MARKER
        );

        let mut seen: Vec<&str> = Vec::new();
        let configured = self.config.using_statements.iter().map(String::as_str);
        for using in usings.iter().copied().chain(configured) {
            if !seen.contains(&using) {
                out.push_str(&format!("using {};\n", using));
                seen.push(using);
            }
        }
        out
    }

    fn emit_interface(&self, interface: &str, class: &str, plans: &[ModulePlan<'_>]) -> String {
        let mut out = self.header(&["System.Threading", "System.Threading.Tasks"]);
        out.push_str(&format!("\nnamespace {};\n\n", self.config.namespace));
        out.push_str(&format!(
            "/// <summary>\n/// Typed access to the JavaScript modules bound by <see cref=\"{}\"/>.\n/// </summary>\npublic interface {}\n{{\n",
            class, interface
        ));

        let preloads: Vec<String> = plans.iter().map(|p| format!("{}()", p.preload)).collect();
        let preload_all = if preloads.is_empty() {
            "Task.CompletedTask".to_string()
        } else {
            format!("Task.WhenAll({})", preloads.join(", "))
        };
        out.push_str(&format!(
            "{INDENT}/// <summary>\n{INDENT}/// Loads every bound module.\n{INDENT}/// </summary>\n{INDENT}Task {}() => {};\n",
            self.config.preload_all_modules_name, preload_all
        ));

        for plan in plans {
            out.push('\n');
            out.push_str(&format!(
                "{INDENT}/// <summary>\n{INDENT}/// Loads module '{}' ahead of its first invocation.\n{INDENT}/// </summary>\n{INDENT}Task {}();\n",
                xml_escape(&plan.module.url),
                plan.preload
            ));

            for (function, signature) in &plan.methods {
                let summary = match &function.doc {
                    Some(doc) => xml_escape(doc),
                    None => xml_escape(&signature.describe(&function.name, &plan.module.url)),
                };
                out.push('\n');
                out.push_str(&signature.interface_member(&summary, INDENT));
            }
        }

        out.push_str("}\n");
        out
    }

    fn emit_module(&self, class: &str, plan: &ModulePlan<'_>) -> String {
        let module = plan.module;

        let mut out = self.header(&[
            "System.Threading",
            "System.Threading.Tasks",
            "Microsoft.JSInterop",
            "Microsoft.JSInterop.Infrastructure",
        ]);
        out.push_str(&format!("\nnamespace {};\n\n", self.config.namespace));
        out.push_str(&format!(
            "/// <summary>\n/// Bindings for '{}', loaded from '{}'.\n/// </summary>\npublic sealed partial class {}\n{{\n",
            xml_escape(&module.path),
            xml_escape(&module.url),
            class
        ));

        out.push_str(&format!(
            "{INDENT}public Task {}() => GetOrLoadModule(\"{}\");\n",
            plan.preload, module.url
        ));
        for (function, signature) in &plan.methods {
            out.push('\n');
            out.push_str(&signature.implementation(&module.url, &function.name, INDENT));
        }

        out.push_str("}\n");
        out
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}
