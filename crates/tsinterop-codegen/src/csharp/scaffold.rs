use crate::resolver::KEY_OF_INTERFACE;
use crate::template;

/// Usings the scaffold needs regardless of configuration.
const USINGS: &[&str] = &[
    "System",
    "System.Collections.Generic",
    "System.Threading",
    "System.Threading.Tasks",
    "Microsoft.JSInterop",
];

const SERVICE_EXTENSION_USING: &str = "Microsoft.Extensions.DependencyInjection";

/// Members the scaffold declares on the runtime class.
pub(super) const MEMBERS: &[&str] = &[
    "jsRuntime",
    "cancellationTokenSource",
    "modules",
    "modulesLock",
    "GetOrLoadModule",
    "TSInvoke",
    "TSInvokeTrySync",
    "TSInvokeAsync",
    "Dispose",
    "DisposeAsync",
];

/// Usings of the scaffold fragment.
pub(super) fn usings(service_extension: bool) -> Vec<&'static str> {
    let mut usings = USINGS.to_vec();
    if service_extension {
        usings.push(SERVICE_EXTENSION_USING);
    }
    usings
}

const TEMPLATE: &str = r#"{{header}}
namespace {{namespace}};

/// <summary>
/// Marks a generic parameter declared as <c>keyof T</c> in TypeScript.
/// </summary>
/// <typeparam name="T">The type whose property names are accepted.</typeparam>
public interface {{key_of}}<T> { }

/// <summary>
/// Loads JavaScript modules on demand and invokes their exported functions.
/// </summary>
public sealed partial class {{class}} : {{interface}}, IDisposable, IAsyncDisposable
{
    private readonly IJSRuntime jsRuntime;
    private readonly CancellationTokenSource cancellationTokenSource = new();
    private readonly Dictionary<string, Task<IJSObjectReference>> modules = new();
    private readonly object modulesLock = new();

    public {{class}}(IJSRuntime jsRuntime)
    {
        this.jsRuntime = jsRuntime;
    }

    private Task<IJSObjectReference> GetOrLoadModule(string url)
    {
        lock (modulesLock)
        {
            if (modules.TryGetValue(url, out Task<IJSObjectReference>? module) && !module.IsFaulted && !module.IsCanceled)
                return module;

            module = jsRuntime.InvokeAsync<IJSObjectReference>("import", cancellationTokenSource.Token, url).AsTask();
            modules[url] = module;
            return module;
        }
    }

    private TResult TSInvoke<TResult>(string url, string identifier, params object?[]? args)
    {
        Task<IJSObjectReference> module = GetOrLoadModule(url);
        if (!module.IsCompletedSuccessfully)
            throw new InvalidOperationException($"JS module '{url}' is not loaded yet. Preload it before invoking '{identifier}' synchronously.");
        if (module.Result is not IJSInProcessObjectReference inProcessModule)
            throw new InvalidOperationException($"JS module '{url}' does not support synchronous invocation.");

        return inProcessModule.Invoke<TResult>(identifier, args);
    }

    private async ValueTask<TResult> TSInvokeTrySync<TResult>(string url, string identifier, CancellationToken cancellationToken, params object?[]? args)
    {
        IJSObjectReference module = await GetOrLoadModule(url);
        if (module is IJSInProcessObjectReference inProcessModule)
            return inProcessModule.Invoke<TResult>(identifier, args);

        return await module.InvokeAsync<TResult>(identifier, cancellationToken, args);
    }

    private async ValueTask<TResult> TSInvokeAsync<TResult>(string url, string identifier, CancellationToken cancellationToken, params object?[]? args)
    {
        IJSObjectReference module = await GetOrLoadModule(url);
        return await module.InvokeAsync<TResult>(identifier, cancellationToken, args);
    }

    public void Dispose()
    {
        cancellationTokenSource.Cancel();
        cancellationTokenSource.Dispose();

        lock (modulesLock)
        {
            foreach (Task<IJSObjectReference> module in modules.Values)
                if (module.IsCompletedSuccessfully)
                    _ = module.Result.DisposeAsync().AsTask();
            modules.Clear();
        }
    }

    public async ValueTask DisposeAsync()
    {
        cancellationTokenSource.Cancel();
        cancellationTokenSource.Dispose();

        List<Task<IJSObjectReference>> loaded;
        lock (modulesLock)
        {
            loaded = new List<Task<IJSObjectReference>>(modules.Values);
            modules.Clear();
        }

        foreach (Task<IJSObjectReference> module in loaded)
            if (module.IsCompletedSuccessfully)
                await module.Result.DisposeAsync();
    }
}
"#;

const SERVICE_EXTENSION_TEMPLATE: &str = r#"
/// <summary>
/// Registers <see cref="{{class}}"/> with dependency injection.
/// </summary>
public static class {{class}}ServiceExtension
{
    /// <summary>
    /// Adds <see cref="{{class}}"/> as a scoped service, also resolvable as <see cref="{{interface}}"/>.
    /// </summary>
    public static IServiceCollection Add{{class}}(this IServiceCollection services)
    {
        services.AddScoped<{{class}}>();
        services.AddScoped<{{interface}}>(serviceProvider => serviceProvider.GetRequiredService<{{class}}>());
        return services;
    }
}
"#;

/// Render the runtime scaffold. Depends on configuration only.
pub(super) fn render(
    header: &str,
    namespace: &str,
    class: &str,
    interface: &str,
    service_extension: bool,
) -> String {
    let vars = [
        ("header", header),
        ("namespace", namespace),
        ("class", class),
        ("interface", interface),
        ("key_of", KEY_OF_INTERFACE),
    ];

    let mut out = template::render(TEMPLATE, &vars);
    if service_extension {
        out.push_str(&template::render(SERVICE_EXTENSION_TEMPLATE, &vars));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_extension_registers_both_types() {
        let out = render("", "App", "Js", "IJs", true);
        assert!(out.contains("public static class JsServiceExtension"));
        assert!(out.contains("public static IServiceCollection AddJs(this IServiceCollection services)"));
        assert!(out.contains("services.AddScoped<IJs>(serviceProvider => serviceProvider.GetRequiredService<Js>());"));
        assert!(usings(true).contains(&SERVICE_EXTENSION_USING));
    }

    #[test]
    fn test_service_extension_disabled() {
        let out = render("", "App", "Js", "IJs", false);
        assert!(!out.contains("ServiceExtension"));
        assert!(!usings(false).contains(&SERVICE_EXTENSION_USING));
    }

    #[test]
    fn test_members_match_template() {
        for member in MEMBERS {
            assert!(TEMPLATE.contains(member), "{member}");
        }
    }
}
