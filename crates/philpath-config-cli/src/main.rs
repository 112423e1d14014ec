//! PhilPath config CLI - derive viewer channel configurations.
//!
//! Reads an algorithm descriptor (`.json`) or a Keras weight file (`.h5`), or
//! synthesizes classes from `--num-classes`, and writes `channels.json`.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use philpath_config_core::ClassType;
use tracing::Level;

mod commands;
mod config;

use commands::generate::{self, GenerateArgs};
use config::Config;

/// Generate a PhilPath channel configuration.
///
/// Class names, colors and types are inferred from the input file, or from
/// `--num-classes` when no input is given.
#[derive(Parser, Debug)]
#[command(
    name = "philpath-config",
    author,
    version,
    about = "Generate PhilPath channel configurations from models or algorithm descriptors",
    long_about = None
)]
struct Cli {
    /// Model weights (.h5) or algorithm descriptor (.json).
    /// Required unless --num-classes is given.
    #[arg(required_unless_present = "num_classes")]
    input_file: Option<PathBuf>,

    /// Output configuration file (default: channels.json).
    output: Option<PathBuf>,

    /// Output configuration file; usable without an input file.
    #[arg(short = 'o', long = "output", value_name = "FILE", conflicts_with = "output")]
    output_file: Option<PathBuf>,

    /// Number of classes (default: inferred from the input file).
    #[arg(short = 'n', long)]
    num_classes: Option<usize>,

    /// Default class type: STRUCTURE, BOUNDARY or BACKGROUND (default: STRUCTURE).
    #[arg(short = 't', long)]
    class_type: Option<ClassType>,

    /// Print the configuration to stdout instead of writing a file.
    #[arg(long, conflicts_with_all = ["output", "output_file"])]
    stdout: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    let level = if cli.quiet {
        Level::ERROR
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load()?;

    let args = GenerateArgs {
        input: cli.input_file,
        output: cli.output_file.or(cli.output),
        num_classes: cli.num_classes,
        class_type: cli.class_type,
        stdout: cli.stdout,
        quiet: cli.quiet,
    };

    generate::execute(&config, &args)
}
