use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use mesh_io::{IoConfig, load_config};
use tracing::info;

use super::resolve_format;

#[derive(Args)]
pub struct ConvertArgs {
    /// Input mesh file
    pub input: PathBuf,

    /// Output mesh file
    pub output: PathBuf,

    /// Input format tag; inferred from the extension if omitted
    #[arg(long)]
    pub from: Option<String>,

    /// Output format tag; inferred from the extension if omitted
    #[arg(long)]
    pub to: Option<String>,

    /// Exodus time step to load (overrides the config file)
    #[arg(short, long)]
    pub timestep: Option<usize>,

    /// Number of pieces for parallel VTK XML output (overrides the config file)
    #[arg(long)]
    pub pieces: Option<usize>,

    /// JSON file with read/write options
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub fn execute(args: ConvertArgs) -> Result<()> {
    let from = resolve_format(args.from.as_deref(), &args.input)?;
    let to = resolve_format(args.to.as_deref(), &args.output)?;

    let mut config = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => IoConfig::default(),
    };
    if args.timestep.is_some() {
        config.read.timestep = args.timestep;
    }
    if let Some(pieces) = args.pieces {
        config.write.pieces = pieces;
    }

    let mesh = mesh_io::read_with_options(from, &args.input, &config.read)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    mesh_io::write_with_options(to, &args.output, &mesh, &config.write)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    info!(
        input = %args.input.display(),
        output = %args.output.display(),
        %from,
        %to,
        "converted mesh"
    );
    Ok(())
}
