use anyhow::Result;
use clap::Parser;
use console::style;

use super::sources::collect_sources;
use super::{load_config, print_parse_errors};

/// Parse declaration files and validate generation without writing anything.
#[derive(Parser)]
pub struct CheckCommand {
    /// Configuration file path.
    #[arg(short, long, default_value = "tsinterop.toml")]
    pub config: String,

    /// Print the parsed modules and errors as JSON.
    #[arg(long)]
    pub json: bool,
}

impl CheckCommand {
    /// Execute the check command.
    pub fn execute(self) -> Result<()> {
        let (config, base_dir) = load_config(&self.config)?;
        let sources = collect_sources(&config.input, &base_dir)?;
        let outcome = tsinterop_codegen::parse_modules(&sources);
        let generation = tsinterop_codegen::generate(&outcome.modules, &config);

        if self.json {
            let report = serde_json::json!({
                "modules": outcome.modules,
                "errors": outcome.errors,
                "generation_error": generation.as_ref().err().map(|e| e.to_string()),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            for module in &outcome.modules {
                println!(
                    "  {} {} ({} functions, {})",
                    style("✓").green(),
                    style(&module.path).cyan(),
                    module.functions.len(),
                    module.url
                );
            }
            print_parse_errors(&outcome.errors);
        }

        generation?;
        if outcome.has_errors() {
            anyhow::bail!("{} declaration error(s)", outcome.errors.len());
        }
        Ok(())
    }
}
