//! Parser and C# generator for TypeScript declaration modules.
//!
//! `parse_modules` turns `.d.ts` sources into the schema model and
//! `generate` emits the interop fragments for them. Neither performs I/O.

pub mod csharp;
pub mod naming;
pub mod parser;
pub mod resolver;
mod scanner;
mod template;

pub use csharp::{generate, Fragment, GeneratedSources, Generator, InvokeAction, GENERATED_MARKER};
pub use naming::{NameContext, NameKind, NamePattern};
pub use parser::{parse_module, parse_modules, parse_type, ModuleParse, ParseOutcome};
pub use resolver::TypeResolver;

#[cfg(test)]
mod tests {
    use super::*;
    use tsinterop_core::InteropConfig;

    const GENERIC_MODULE: &str = "export function generic<A, B, C>(): A;\n";

    const SHOWCASE: &str = r#"
/** Reads a value from local storage. */
export declare function getItem(key: string): string | null;
export declare function setItem(key: string, value: string): void;
export declare function getProperty<Type, Key extends keyof Type>(obj: Type, key: Key): Type;
export declare function loadAll(urls: readonly string[]): Promise<number[]>;
export declare function measure(element: HTMLElement): DOMRect;
"#;

    #[test]
    fn test_generic_module_scenario() {
        let outcome = parse_modules(&[("GenericModule.d.ts", GENERIC_MODULE)]);
        assert!(!outcome.has_errors());

        let mut config = InteropConfig::default();
        config.unknown_type_fallback = "__Unresolved".into();
        let sources = generate(&outcome.modules, &config).unwrap();

        let interface = &sources.capability_interface.content;
        let generic_methods: Vec<&str> = interface
            .lines()
            .filter(|line| line.contains("Generic<"))
            .collect();
        assert_eq!(
            generic_methods,
            vec!["    ValueTask<A> Generic<A, B, C>(CancellationToken cancellationToken = default);"]
        );
        assert!(!interface.contains("__Unresolved"));
        assert!(!interface.contains(" where "));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let inputs = vec![
            ("wwwroot/js/storage.d.ts", SHOWCASE),
            ("GenericModule.d.ts", GENERIC_MODULE),
        ];
        let config = InteropConfig::default();

        let first = generate(&parse_modules(&inputs).modules, &config).unwrap();
        let second = generate(&parse_modules(&inputs).modules, &config).unwrap();
        assert_eq!(first, second);

        let names: Vec<&str> = first.fragments().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["TSRuntime", "ITSRuntime", "StorageModule", "GenericModuleModule"]
        );
    }

    #[test]
    fn test_showcase_end_to_end() {
        let mut config = InteropConfig::default();
        config
            .type_overrides
            .insert("HTMLElement".into(), "ElementReference".into());

        let outcome = parse_modules(&[("wwwroot/js/storage.d.ts", SHOWCASE)]);
        assert!(!outcome.has_errors());
        let sources = generate(&outcome.modules, &config).unwrap();
        let interface = &sources.capability_interface.content;

        assert!(interface.contains("    /// Reads a value from local storage.\n"));
        assert!(interface.contains(
            "    ValueTask<string?> GetItem(string key, CancellationToken cancellationToken = default);"
        ));
        assert!(interface.contains(
            "    ValueTask SetItem(string key, string value, CancellationToken cancellationToken = default);"
        ));
        assert!(interface.contains(
            "    ValueTask<Type> GetProperty<Type, Key>(Type obj, Key key, CancellationToken cancellationToken = default) where Key : IKeyOf<Type>;"
        ));
        assert!(interface.contains(
            "    ValueTask<double[]> LoadAll(string[] urls, CancellationToken cancellationToken = default);"
        ));
        assert!(interface.contains(
            "    ValueTask<object> Measure(ElementReference element, CancellationToken cancellationToken = default);"
        ));
        assert!(interface.contains("    Task PreloadStorage();"));

        let implementation = &sources.module_implementations[0].content;
        assert!(implementation.contains(
            "=> TSInvokeAsync<double[]>(\"/js/storage.js\", \"loadAll\", cancellationToken, urls);"
        ));
        assert!(implementation.contains(
            "=> await TSInvokeTrySync<IJSVoidResult>(\"/js/storage.js\", \"setItem\", cancellationToken, key, value);"
        ));
    }

    #[test]
    fn test_duplicate_requires_both_modules() {
        let a = ("a.d.ts", "export function ping(): void;");
        let b = ("b.d.ts", "export declare function ping(): void;");
        let config = InteropConfig::default();

        let both = parse_modules(&[a, b]);
        assert!(generate(&both.modules, &config).is_err());
        assert!(generate(&parse_modules(&[a]).modules, &config).is_ok());
        assert!(generate(&parse_modules(&[b]).modules, &config).is_ok());
    }
}
