//! macrolower - CLI

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use macrolower::middle::{PassKind, Pipeline};
use macrolower::util::config::{resolve_config, LowerConfig};
use macrolower::util::logger::{self, LogLevel};
use macrolower::{lower_file, lower_source, NAME, VERSION};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Lower macro instructions in offline-assembler listings
#[derive(Parser, Debug)]
#[command(name = "macrolower")]
#[command(version = VERSION)]
#[command(long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (takes precedence over macrolower.toml and the user config)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Lower listing files
    Lower {
        /// Listing files
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Output file (one input) or directory (several inputs)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Pass to run; repeat to build the pipeline in order
        #[arg(long = "pass", value_enum, value_name = "PASS")]
        passes: Vec<PassKind>,
    },

    /// Lower without writing output; fail on errors or leftover macros
    Check {
        /// Listing files
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Pass to run; repeat to build the pipeline in order
        #[arg(long = "pass", value_enum, value_name = "PASS")]
        passes: Vec<PassKind>,
    },

    /// List passes and the configured order
    Passes,

    /// Print version information
    Version,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let cwd = std::env::current_dir().context("Failed to read working directory")?;
    let config = resolve_config(args.config.as_deref(), &cwd).context("Failed to load config")?;

    let level = if args.verbose {
        LogLevel::Debug
    } else {
        config.log.level
    };
    logger::init_with_level(level);

    match args.command {
        Commands::Lower {
            files,
            output,
            passes,
        } => {
            let pipeline = pick_pipeline(&config, passes);
            if let [file] = files.as_slice() {
                let lowered = lower_file(file, &pipeline)
                    .with_context(|| format!("Failed to lower: {}", file.display()))?;
                match output {
                    Some(path) => fs::write(&path, lowered)
                        .with_context(|| format!("Failed to write: {}", path.display()))?,
                    None => print!("{}", lowered),
                }
            } else {
                lower_many(&files, output.as_deref(), &pipeline)?;
            }
        }
        Commands::Check { files, passes } => {
            let pipeline = pick_pipeline(&config, passes);
            check_many(&files, &pipeline)?;
        }
        Commands::Passes => {
            let configured = config.pipeline.to_pipeline();
            for kind in PassKind::ALL {
                let position = configured.passes().iter().position(|k| *k == kind);
                let order = position.map_or("-".to_string(), |i| (i + 1).to_string());
                println!("{:>2}  {:<14}{}", order, kind.name(), kind.description());
            }
        }
        Commands::Version => {
            println!("{} {}", NAME, VERSION);
        }
    }

    Ok(())
}

/// CLI `--pass` flags replace the configured list
fn pick_pipeline(
    config: &LowerConfig,
    passes: Vec<PassKind>,
) -> Pipeline {
    if passes.is_empty() {
        config.pipeline.to_pipeline()
    } else {
        Pipeline::new(passes)
    }
}

fn lowered_path(
    input: &Path,
    out_dir: Option<&Path>,
) -> PathBuf {
    let mut name = input.file_name().unwrap_or_default().to_os_string();
    name.push(".lowered");
    match out_dir {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    }
}

/// Each file gets its own pipeline run and temporary counter
fn lower_many(
    files: &[PathBuf],
    out_dir: Option<&Path>,
    pipeline: &Pipeline,
) -> Result<()> {
    if let Some(dir) = out_dir {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create: {}", dir.display()))?;
    }

    let failures = files
        .par_iter()
        .map(|file| -> Result<()> {
            let lowered = lower_file(file, pipeline)
                .with_context(|| format!("Failed to lower: {}", file.display()))?;
            let dest = lowered_path(file, out_dir);
            fs::write(&dest, lowered)
                .with_context(|| format!("Failed to write: {}", dest.display()))?;
            info!("{} -> {}", file.display(), dest.display());
            Ok(())
        })
        .filter_map(Result::err)
        .collect::<Vec<_>>();

    report(failures, files.len())
}

fn check_many(
    files: &[PathBuf],
    pipeline: &Pipeline,
) -> Result<()> {
    let failures = files
        .par_iter()
        .map(|file| -> Result<()> {
            let name = file.display().to_string();
            let source =
                fs::read_to_string(file).with_context(|| format!("Failed to read: {}", name))?;
            let nodes = lower_source(&name, &source, pipeline)
                .with_context(|| format!("Failed to lower: {}", name))?;
            if let Some(inst) = Pipeline::residual(&nodes) {
                bail!("{}: `{}` is still present after lowering", inst.origin, inst.opcode);
            }
            info!("ok: {}", name);
            Ok(())
        })
        .filter_map(Result::err)
        .collect::<Vec<_>>();

    report(failures, files.len())
}

fn report(
    failures: Vec<anyhow::Error>,
    total: usize,
) -> Result<()> {
    if failures.is_empty() {
        return Ok(());
    }
    for err in &failures {
        error!("{:#}", err);
    }
    bail!("{} of {} files failed", failures.len(), total)
}
