use std::path::Path;

use anyhow::Result;
use clap::Parser;
use console::style;
use tsinterop_core::InteropConfig;

/// Write a configuration file with every option at its default.
#[derive(Parser)]
pub struct InitCommand {
    /// Configuration file to create (`.json` writes JSON, anything else TOML).
    #[arg(default_value = "tsinterop.toml")]
    pub path: String,

    /// Overwrite an existing file.
    #[arg(long)]
    pub force: bool,
}

impl InitCommand {
    /// Execute the init command.
    pub fn execute(self) -> Result<()> {
        let path = Path::new(&self.path);
        if path.exists() && !self.force {
            anyhow::bail!(
                "{} already exists. Use --force to overwrite it.",
                self.path
            );
        }

        let config = InteropConfig::default();
        let content = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::to_string_pretty(&config)?,
            _ => config.to_toml()?,
        };
        std::fs::write(path, content)?;

        println!(
            "  {} Created {}",
            style("✓").green(),
            style(&self.path).cyan()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = tempdir().unwrap();
        for name in ["tsinterop.toml", "tsinterop.json"] {
            let path = dir.path().join(name);
            let cmd = InitCommand {
                path: path.to_string_lossy().into_owned(),
                force: false,
            };
            cmd.execute().unwrap();
            assert_eq!(InteropConfig::from_file(&path).unwrap(), InteropConfig::default());
        }
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tsinterop.toml");
        std::fs::write(&path, "namespace = \"Mine\"").unwrap();

        let cmd = InitCommand {
            path: path.to_string_lossy().into_owned(),
            force: false,
        };
        assert!(cmd.execute().is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "namespace = \"Mine\"");
    }
}
