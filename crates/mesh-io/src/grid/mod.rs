//! Generic unstructured-grid object model.
//!
//! This is the format-neutral representation every backend parses into and
//! serializes from: a point set, a count-prefixed connectivity buffer with one
//! type code per cell, and three named-array containers (point, cell and field
//! data). Multi-block trees only appear on the Exodus read path.

mod cell_type;
mod data_array;
mod multiblock;

pub use cell_type::{CellType, NODES_PER_CELL_TO_TYPE, cell_type_for_nodes};
pub use data_array::{DataArray, DataArrays, NamedArrays};
pub use multiblock::{Block, MultiBlock, NamedBlock};

/// Cell connectivity in flat form: `[n, v0, .., vn-1, n, ..]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellArray {
    pub num_cells: usize,
    pub connectivity: Vec<u64>,
}

impl CellArray {
    pub fn new(num_cells: usize, connectivity: Vec<u64>) -> Self {
        Self {
            num_cells,
            connectivity,
        }
    }

    /// Per-cell vertex lists of the flat buffer, without the count prefixes.
    ///
    /// Iteration stops early if a count prefix runs past the end of the buffer.
    pub fn iter_cells(&self) -> impl Iterator<Item = &[u64]> {
        let data = &self.connectivity;
        let mut pos = 0usize;
        std::iter::from_fn(move || {
            let n = *data.get(pos)? as usize;
            let cell = data.get(pos + 1..pos + 1 + n)?;
            pos += n + 1;
            Some(cell)
        })
        .take(self.num_cells)
    }
}

/// Unstructured grid with attribute data.
#[derive(Debug, Clone, PartialEq)]
pub struct UnstructuredGrid {
    /// Coordinates, `point_dim` values per point
    pub points: Vec<f64>,
    /// Components per point (2 or 3)
    pub point_dim: usize,
    pub cells: CellArray,
    /// One type code per cell
    pub cell_types: Vec<CellType>,
    pub point_data: DataArrays,
    pub cell_data: DataArrays,
    pub field_data: DataArrays,
}

impl Default for UnstructuredGrid {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            point_dim: 3,
            cells: CellArray::default(),
            cell_types: Vec::new(),
            point_data: DataArrays::new(),
            cell_data: DataArrays::new(),
            field_data: DataArrays::new(),
        }
    }
}

impl UnstructuredGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_points(&self) -> usize {
        if self.point_dim == 0 {
            0
        } else {
            self.points.len() / self.point_dim
        }
    }

    pub fn num_cells(&self) -> usize {
        self.cells.num_cells
    }

    /// Assign a cell array whose cells all share `cell_type`.
    pub fn set_cells(&mut self, cell_type: CellType, cells: CellArray) {
        self.cell_types = vec![cell_type; cells.num_cells];
        self.cells = cells;
    }

    /// The cell type if all cells share one.
    pub fn uniform_cell_type(&self) -> Option<CellType> {
        let first = *self.cell_types.first()?;
        self.cell_types
            .iter()
            .all(|&ty| ty == first)
            .then_some(first)
    }

    /// Coordinates padded (or truncated) to three components per point.
    pub fn points_3d(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.num_points() * 3);
        for p in self.points.chunks_exact(self.point_dim.max(1)) {
            for k in 0..3 {
                out.push(p.get(k).copied().unwrap_or(0.0));
            }
        }
        out
    }
}
