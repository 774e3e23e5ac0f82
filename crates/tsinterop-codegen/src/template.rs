//! `{{var}}` replacement for the fixed parts of generated sources.
//!
//! Single braces are left alone, so C# blocks and interpolated strings can be
//! written as-is in templates.

/// Render a template by replacing `{{key}}` placeholders with values.
pub(crate) fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        let placeholder = format!("{{{{{}}}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}
