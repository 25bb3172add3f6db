//! Exodus block resolution.
//!
//! An Exodus read produces a block tree (root → block → sub-block). The
//! resolver switches on every result array, optionally selects a time step,
//! and returns the one unstructured grid found two levels down.

use tracing::debug;

use crate::attributes::strip_trailing_delimiter;
use crate::error::{MeshIoError, Result};
use crate::grid::{Block, MultiBlock, UnstructuredGrid};

/// Result array families of an Exodus file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultKind {
    /// Nodal variables, read into point data
    Point,
    /// Element variables, read into cell data
    Element,
    /// Global variables, read into field data
    Global,
}

impl ResultKind {
    pub const ALL: [ResultKind; 3] = [ResultKind::Point, ResultKind::Element, ResultKind::Global];
}

/// Reader contract for multi-block result files.
///
/// Arrays are only materialized by [`update`](ResultSource::update) if their
/// status has been switched on.
pub trait ResultSource {
    /// Read metadata (array names, time steps) without loading data.
    fn update_information(&mut self) -> Result<()>;

    fn array_names(&self, kind: ResultKind) -> Vec<String>;

    fn set_array_status(&mut self, kind: ResultKind, name: &str, enabled: bool);

    fn num_time_steps(&self) -> usize;

    fn set_time_step(&mut self, step: usize) -> Result<()>;

    /// Load the block tree for the current time step.
    fn update(&mut self) -> Result<MultiBlock>;
}

/// Resolve the single unstructured grid of `source`.
pub fn resolve(source: &mut impl ResultSource, timestep: Option<usize>) -> Result<UnstructuredGrid> {
    source.update_information()?;

    if let Some(step) = timestep {
        let available = source.num_time_steps();
        if step >= available {
            return Err(MeshIoError::TimeStepOutOfRange {
                requested: step,
                available,
            });
        }
        source.set_time_step(step)?;
    }

    for kind in ResultKind::ALL {
        for name in source.array_names(kind) {
            source.set_array_status(kind, &name, true);
        }
    }

    let root = source.update()?;
    debug!(
        blocks = root.num_blocks(),
        grids = count_nested_grids(&root),
        "materialized exodus block tree"
    );
    let mut grids = take_nested_grids(root);
    if grids.len() != 1 {
        return Err(MeshIoError::AmbiguousGrid { found: grids.len() });
    }
    let mut grid = grids.remove(0);

    for array in grid.point_data.iter_mut() {
        let stripped = strip_trailing_delimiter(&array.name);
        if stripped.len() != array.name.len() {
            array.name = stripped.to_string();
        }
    }

    debug!(
        num_points = grid.num_points(),
        num_cells = grid.num_cells(),
        "resolved exodus grid"
    );
    Ok(grid)
}

/// Count the unstructured grids at depth two without consuming the tree.
pub fn count_nested_grids(root: &MultiBlock) -> usize {
    root.iter()
        .filter_map(|b| b.block.as_multiblock())
        .flat_map(MultiBlock::iter)
        .filter(|sub| sub.block.is_unstructured_grid())
        .count()
}

fn take_nested_grids(root: MultiBlock) -> Vec<UnstructuredGrid> {
    let mut grids = Vec::new();
    for block in root {
        let Block::MultiBlock(children) = block.block else {
            continue;
        };
        for sub in children {
            if let Block::Grid(grid) = sub.block {
                grids.push(*grid);
            }
        }
    }
    grids
}
