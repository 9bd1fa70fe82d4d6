//! stubgen command-line front end
//!
//! Generates Go codec patch files for every document of a parsed IDL
//! forest and manages the TOML configuration.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use config::Config;
use pipeline::{generate_from_file, write_output};
use stubgen_cli::{error_chain, kind_label, CliError, Result};
use tracing::debug;

/// Command-line interface configuration for stubgen.
#[derive(Parser, Debug)]
#[command(name = "stubgen", about = "Fast-codec patch generator for IDL documents", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
    /// Configuration file (defaults to the user config file when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

/// Available stubgen commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate patch files for a document tree
    Generate {
        /// Document tree JSON file
        #[arg(long)]
        tree: PathBuf,
        /// Output root (overrides `generation.output_path`)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Module root of the generated code (overrides `generation.module`)
        #[arg(long)]
        module: Option<String>,
        /// Skip the high-performance codec path
        #[arg(long)]
        no_fast_api: bool,
        /// Also copy every IDL source next to its generated file
        #[arg(long)]
        copy_idl: bool,
        /// Directory IDL filenames are relative to (defaults to the tree file's directory)
        #[arg(long)]
        idl_root: Option<PathBuf>,
        /// List the units instead of writing them
        #[arg(long)]
        dry_run: bool,
    },
    /// Write a default configuration file
    InitConfig {
        /// Target file (defaults to the user config file)
        #[arg(long)]
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Main entry point for the stubgen application.
fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let chain = error_chain(&e);
            eprintln!("error: {}", chain[0]);
            for cause in &chain[1..] {
                eprintln!("  caused by: {}", cause);
            }
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.cmd {
        Commands::Generate {
            tree,
            output,
            module,
            no_fast_api,
            copy_idl,
            idl_root,
            dry_run,
        } => {
            let mut config = Config::load_or_default(cli.config.as_deref())?;
            logging::init(&config.logging.level, config.logging.file.as_deref())?;

            let generation = &mut config.generation;
            if let Some(module) = module {
                generation.module = module;
            }
            if no_fast_api {
                generation.fast_api = false;
            }
            if copy_idl {
                generation.copy_idl = true;
            }
            let output = output.unwrap_or_else(|| generation.output_path.clone());
            debug!(?generation, "effective generation settings");

            let units = generate_from_file(&tree, generation, idl_root.as_deref())?;
            if dry_run {
                for unit in &units {
                    println!("{}\t{}", kind_label(unit.kind), output.join(&unit.path).display());
                }
            } else {
                write_output(&output, &units)?;
                println!("[stubgen] wrote {} files to {}", units.len(), output.display());
            }
        }
        Commands::InitConfig { path, force } => {
            let path = match path {
                Some(path) => path,
                None => Config::default_path()?,
            };
            if path.exists() && !force {
                return Err(CliError::AlreadyExists(path));
            }
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            Config::default().save(&path)?;
            println!("[stubgen] wrote default configuration to {}", path.display());
        }
    }
    Ok(())
}
