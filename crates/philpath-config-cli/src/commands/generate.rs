//! Generate command: write a channel configuration for one input.

use std::path::PathBuf;

use anyhow::{Context, Result};
use philpath_config_core::{generate, ClassType, GenerateOptions, SourceRequest};
use tracing::debug;

use crate::config::Config;

/// Resolved arguments for one run.
#[derive(Debug, Clone)]
pub struct GenerateArgs {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub num_classes: Option<usize>,
    pub class_type: Option<ClassType>,
    pub stdout: bool,
    pub quiet: bool,
}

impl GenerateArgs {
    /// Merge command-line values over the loaded configuration.
    pub fn options(&self, config: &Config) -> Result<GenerateOptions> {
        Ok(GenerateOptions {
            source: SourceRequest {
                input: self.input.clone(),
                explicit_class_count: self.num_classes,
            },
            default_type: config.resolve_class_type(self.class_type)?,
        })
    }

    /// Output path, falling back to the configured default.
    pub fn output_path(&self, config: &Config) -> PathBuf {
        self.output.clone().unwrap_or_else(|| config.output.clone())
    }
}

/// Execute the generate command.
pub fn execute(config: &Config, args: &GenerateArgs) -> Result<()> {
    let options = args.options(config)?;
    options
        .source
        .validate()
        .context("Nothing to generate from. Pass an input file or --num-classes")?;
    debug!(?options, "generating channel configuration");

    let configuration = generate(&options, &mut rand::rng()).context("Failed to build configuration")?;

    if args.stdout {
        print!("{}", configuration.to_json_pretty()?);
        return Ok(());
    }

    let output = args.output_path(config);
    configuration
        .write_to(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    if !args.quiet {
        println!(
            "✅ Wrote {} channels to {}",
            configuration.len(),
            output.display()
        );
    }
    Ok(())
}
