use ndarray::{Array2, ArrayD};

use crate::attributes::AttributeMap;

/// Format-neutral mesh: an `N × D` point array, a uniform `M × K` cell array
/// and named attribute arrays on points, cells and the mesh as a whole.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub points: Array2<f64>,
    pub cells: Array2<usize>,
    pub point_data: AttributeMap,
    pub cell_data: AttributeMap,
    pub field_data: AttributeMap,
}

impl Mesh {
    pub fn new(points: Array2<f64>, cells: Array2<usize>) -> Self {
        Self {
            points,
            cells,
            point_data: AttributeMap::new(),
            cell_data: AttributeMap::new(),
            field_data: AttributeMap::new(),
        }
    }

    pub fn with_point_data(mut self, name: impl Into<String>, values: ArrayD<f64>) -> Self {
        self.point_data.insert(name.into(), values);
        self
    }

    pub fn with_cell_data(mut self, name: impl Into<String>, values: ArrayD<f64>) -> Self {
        self.cell_data.insert(name.into(), values);
        self
    }

    pub fn with_field_data(mut self, name: impl Into<String>, values: ArrayD<f64>) -> Self {
        self.field_data.insert(name.into(), values);
        self
    }

    pub fn num_points(&self) -> usize {
        self.points.nrows()
    }

    pub fn num_cells(&self) -> usize {
        self.cells.nrows()
    }

    /// Nodes per cell, `0` for a mesh without cells.
    pub fn nodes_per_cell(&self) -> usize {
        self.cells.ncols()
    }
}
