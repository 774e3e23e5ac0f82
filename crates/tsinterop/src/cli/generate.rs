use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tsinterop_codegen::{GeneratedSources, GENERATED_MARKER};
use tsinterop_core::config::OutputConfig;

use super::sources::collect_sources;
use super::{load_config, print_parse_errors};

/// Generate C# bindings from declaration files.
#[derive(Parser)]
pub struct GenerateCommand {
    /// Configuration file path.
    #[arg(short, long, default_value = "tsinterop.toml")]
    pub config: String,

    /// Output directory (overrides config).
    #[arg(short, long)]
    pub output: Option<String>,

    /// Fail instead of skipping declarations that do not parse.
    #[arg(long)]
    pub strict: bool,
}

impl GenerateCommand {
    /// Execute the generate command.
    pub fn execute(self) -> Result<()> {
        let (config, base_dir) = load_config(&self.config)?;
        let output_dir = match &self.output {
            Some(output) => PathBuf::from(output),
            None => base_dir.join(&config.output.directory),
        };

        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        pb.enable_steady_tick(Duration::from_millis(100));

        pb.set_message("Scanning declaration files...");
        let sources = collect_sources(&config.input, &base_dir)?;

        pb.set_message("Parsing declarations...");
        let outcome = tsinterop_codegen::parse_modules(&sources);
        if outcome.has_errors() {
            pb.suspend(|| print_parse_errors(&outcome.errors));
            if self.strict {
                pb.finish_and_clear();
                anyhow::bail!(
                    "{} declaration error(s); nothing was written",
                    outcome.errors.len()
                );
            }
        }

        pb.set_message("Generating C# bindings...");
        let generated = match tsinterop_codegen::generate(&outcome.modules, &config) {
            Ok(generated) => generated,
            Err(e) => {
                pb.finish_and_clear();
                return Err(e.into());
            }
        };

        pb.set_message("Writing files...");
        let summary = write_fragments(&generated, &config.output, &output_dir)?;
        pb.finish_and_clear();

        let function_count: usize = outcome.modules.iter().map(|m| m.functions.len()).sum();
        println!();
        println!(
            "  {} Bound {} functions from {} modules",
            style("✓").green(),
            style(function_count).cyan(),
            style(outcome.modules.len()).cyan()
        );
        println!(
            "  {} {} written, {} unchanged, {} removed",
            style("✓").green(),
            summary.written,
            summary.unchanged,
            summary.removed
        );
        println!(
            "  {} Output: {}",
            style("📁").dim(),
            style(output_dir.display()).cyan()
        );
        println!();

        Ok(())
    }
}

/// What happened to the files of the output directory.
#[derive(Debug, Default, PartialEq, Eq)]
struct WriteSummary {
    written: usize,
    unchanged: usize,
    removed: usize,
}

/// Write every fragment, leaving files with identical content untouched and
/// removing generated files that no fragment produced this time.
///
/// Only files carrying the generated marker are ever removed.
fn write_fragments(
    generated: &GeneratedSources,
    output: &OutputConfig,
    dir: &Path,
) -> Result<WriteSummary> {
    fs::create_dir_all(dir)?;

    let mut summary = WriteSummary::default();
    let mut expected = HashSet::new();

    for fragment in generated.fragments() {
        let file_name = output.file_name(&fragment.name);
        let path = dir.join(&file_name);
        expected.insert(file_name);

        match fs::read_to_string(&path) {
            Ok(existing) if existing == fragment.content => summary.unchanged += 1,
            _ => {
                fs::write(&path, &fragment.content)?;
                tracing::debug!(path = %path.display(), "Wrote fragment");
                summary.written += 1;
            }
        }
    }

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type()?.is_file()
            && file_name.ends_with(&output.file_extension)
            && !expected.contains(&file_name)
            && is_generated(&entry.path())
        {
            fs::remove_file(entry.path())?;
            tracing::info!(path = %entry.path().display(), "Removed stale fragment");
            summary.removed += 1;
        }
    }

    Ok(summary)
}

/// Whether a file was written by this tool, judged by its header.
fn is_generated(path: &Path) -> bool {
    match fs::read_to_string(path) {
        Ok(content) => content.lines().take(3).any(|line| line.starts_with(GENERATED_MARKER)),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tsinterop_core::InteropConfig;

    fn write_project(root: &Path) {
        fs::create_dir_all(root.join("wwwroot/js")).unwrap();
        fs::write(
            root.join("wwwroot/js/site.d.ts"),
            "export declare function greet(name: string): string;\n",
        )
        .unwrap();
        fs::write(
            root.join("tsinterop.toml"),
            "[[input]]\ninclude = \"wwwroot\"\n\n[output]\ndirectory = \"Generated\"\n",
        )
        .unwrap();
    }

    fn command(root: &Path) -> GenerateCommand {
        GenerateCommand {
            config: root.join("tsinterop.toml").to_string_lossy().into_owned(),
            output: None,
            strict: false,
        }
    }

    #[test]
    fn test_generate_writes_fragments() {
        let dir = tempdir().unwrap();
        write_project(dir.path());

        command(dir.path()).execute().unwrap();

        let out = dir.path().join("Generated");
        assert!(out.join("TSRuntime.g.cs").exists());
        assert!(out.join("ITSRuntime.g.cs").exists());
        let module = fs::read_to_string(out.join("SiteModule.g.cs")).unwrap();
        assert!(module.contains("TSInvokeTrySync<string>(\"/js/site.js\", \"greet\", cancellationToken, name)"));
    }

    #[test]
    fn test_write_fragments_skips_unchanged_and_removes_stale() {
        let dir = tempdir().unwrap();
        let output = OutputConfig::default();
        let config = InteropConfig::default();
        let outcome = tsinterop_codegen::parse_modules(&[("a.d.ts", "export function a(): void;")]);
        let generated = tsinterop_codegen::generate(&outcome.modules, &config).unwrap();

        fs::write(
            dir.path().join("OldModule.g.cs"),
            format!("// <auto-generated/>\n{} Changes to this file will be lost.\n", GENERATED_MARKER),
        )
        .unwrap();
        fs::write(dir.path().join("Handwritten.g.cs"), "// generated by another tool\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "keep").unwrap();

        let first = write_fragments(&generated, &output, dir.path()).unwrap();
        assert_eq!(
            first,
            WriteSummary {
                written: 3,
                unchanged: 0,
                removed: 1
            }
        );
        assert!(!dir.path().join("OldModule.g.cs").exists());
        assert!(dir.path().join("Handwritten.g.cs").exists());
        assert!(dir.path().join("notes.txt").exists());

        let second = write_fragments(&generated, &output, dir.path()).unwrap();
        assert_eq!(second.unchanged, 3);
        assert_eq!(second.written, 0);
    }

    #[test]
    fn test_strict_refuses_parse_errors() {
        let dir = tempdir().unwrap();
        write_project(dir.path());
        fs::write(
            dir.path().join("wwwroot/js/broken.d.ts"),
            "export function broken(: void;",
        )
        .unwrap();

        let mut cmd = command(dir.path());
        cmd.strict = true;
        assert!(cmd.execute().is_err());
        assert!(!dir.path().join("Generated").exists());
    }

    #[test]
    fn test_missing_config() {
        let dir = tempdir().unwrap();
        assert!(command(dir.path()).execute().is_err());
    }
}
