use serde::{Deserialize, Serialize};

/// Which invoke flavours are generated for each function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InvokeConfig {
    /// Synchronous call, only valid for in-process runtimes.
    #[serde(default)]
    pub sync_enabled: bool,

    /// Synchronous when the runtime allows it, asynchronous otherwise.
    #[serde(default = "default_true")]
    pub trysync_enabled: bool,

    /// Always asynchronous.
    #[serde(default)]
    pub async_enabled: bool,

    /// Functions returning a `Promise` only get the async flavour.
    #[serde(default = "default_true")]
    pub promise_only_async: bool,

    /// Append `Async` to the method name of functions returning a `Promise`.
    #[serde(default)]
    pub promise_append_async: bool,

    /// Values substituted for `{action}` in method name patterns.
    #[serde(default)]
    pub action_names: ActionNames,
}

impl Default for InvokeConfig {
    fn default() -> Self {
        Self {
            sync_enabled: false,
            trysync_enabled: true,
            async_enabled: false,
            promise_only_async: true,
            promise_append_async: false,
            action_names: ActionNames::default(),
        }
    }
}

impl InvokeConfig {
    /// Number of enabled flavours.
    pub fn enabled_count(&self) -> usize {
        [self.sync_enabled, self.trysync_enabled, self.async_enabled]
            .iter()
            .filter(|enabled| **enabled)
            .count()
    }
}

fn default_true() -> bool {
    true
}

/// Per-flavour action names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionNames {
    #[serde(default = "default_sync_name")]
    pub sync: String,

    #[serde(default = "default_trysync_name")]
    pub trysync: String,

    #[serde(rename = "async", default = "default_async_name")]
    pub async_: String,
}

impl Default for ActionNames {
    fn default() -> Self {
        Self {
            sync: default_sync_name(),
            trysync: default_trysync_name(),
            async_: default_async_name(),
        }
    }
}

fn default_sync_name() -> String {
    "Invoke".to_string()
}

fn default_trysync_name() -> String {
    "InvokeTrySync".to_string()
}

fn default_async_name() -> String {
    "InvokeAsync".to_string()
}
