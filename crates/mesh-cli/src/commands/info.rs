use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use mesh_io::{AttributeMap, Mesh, ReadOptions};

use super::resolve_format;

#[derive(Args)]
pub struct InfoArgs {
    /// Mesh file to inspect
    pub path: PathBuf,

    /// Format tag (legacy-vtk, vtk-xml, analysis-format); inferred from the extension if omitted
    #[arg(short, long)]
    pub format: Option<String>,

    /// Exodus time step to load
    #[arg(short, long)]
    pub timestep: Option<usize>,
}

pub fn execute(args: InfoArgs) -> Result<()> {
    let format = resolve_format(args.format.as_deref(), &args.path)?;
    let options = ReadOptions {
        timestep: args.timestep,
    };
    let mesh = mesh_io::read_with_options(format, &args.path, &options)
        .with_context(|| format!("failed to read {}", args.path.display()))?;
    println!("format: {format}");
    print_summary(&mesh);
    Ok(())
}

fn print_summary(mesh: &Mesh) {
    println!("points: {} x {}", mesh.num_points(), mesh.points.ncols());
    println!("cells: {} x {}", mesh.num_cells(), mesh.nodes_per_cell());
    print_attributes("point_data", &mesh.point_data);
    print_attributes("cell_data", &mesh.cell_data);
    print_attributes("field_data", &mesh.field_data);
}

fn print_attributes(label: &str, map: &AttributeMap) {
    if map.is_empty() {
        return;
    }
    println!("{label}:");
    for (name, values) in map {
        println!("  {name}: {:?}", values.shape());
    }
}
