//! Grid construction from flat point and cell arrays.

use ndarray::Array2;
use tracing::debug;

use crate::connectivity;
use crate::error::{MeshIoError, Result};
use crate::grid::{CellArray, UnstructuredGrid, cell_type_for_nodes};

/// Build an [`UnstructuredGrid`] from an `N × D` point array and a uniform
/// `M × K` cell array.
///
/// The points are copied into storage owned by the grid. The cell type is
/// looked up from `K` (2 → line, 3 → triangle, 4 → tetrahedron).
pub fn build_grid(points: &Array2<f64>, cells: &Array2<usize>) -> Result<UnstructuredGrid> {
    let (num_points, dim) = points.dim();
    if !(2..=3).contains(&dim) {
        return Err(MeshIoError::invalid(format!(
            "points must have 2 or 3 columns, got {dim}"
        )));
    }

    let (num_cells, nodes_per_cell) = cells.dim();
    let cell_type = cell_type_for_nodes(nodes_per_cell)
        .ok_or(MeshIoError::UnsupportedCellType { nodes_per_cell })?;

    if let Some(&bad) = cells.iter().find(|&&v| v >= num_points) {
        return Err(MeshIoError::invalid(format!(
            "cell references vertex {bad} but the mesh has {num_points} points"
        )));
    }

    debug!(num_points, num_cells, ?cell_type, "building unstructured grid");

    let mut grid = UnstructuredGrid::new();
    grid.points = points.iter().copied().collect();
    grid.point_dim = dim;
    grid.set_cells(
        cell_type,
        CellArray::new(num_cells, connectivity::encode(cells)),
    );
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellType;
    use ndarray::array;

    fn unit_tet_points() -> Array2<f64> {
        array![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 1.0, 1.0]
        ]
    }

    #[test]
    fn infers_cell_type_from_columns() {
        let points = unit_tet_points();
        let cases = [
            (array![[0usize, 1], [1, 2]], CellType::Line),
            (array![[0usize, 1, 2]], CellType::Triangle),
            (array![[0usize, 1, 2, 3]], CellType::Tetra),
        ];
        for (cells, expected) in cases {
            let grid = build_grid(&points, &cells).expect("supported cell size");
            assert_eq!(grid.uniform_cell_type(), Some(expected));
            assert_eq!(grid.num_cells(), cells.nrows());
            assert_eq!(grid.cells.connectivity, connectivity::encode(&cells));
        }
    }

    #[test]
    fn five_node_cells_are_unsupported() {
        let cells = array![[0usize, 1, 2, 3, 4]];
        let err = build_grid(&unit_tet_points(), &cells).expect_err("K = 5");
        assert!(matches!(
            err,
            MeshIoError::UnsupportedCellType { nodes_per_cell: 5 }
        ));
    }

    #[test]
    fn copies_points() {
        let mut points = array![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
        let grid = build_grid(&points, &array![[0usize, 1, 2]]).expect("triangle");
        points[[1, 0]] = 42.0;
        assert_eq!(grid.point_dim, 2);
        assert_eq!(grid.points, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn rejects_out_of_range_vertices() {
        let points = array![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
        let err = build_grid(&points, &array![[0usize, 2]]).expect_err("index 2");
        assert!(matches!(err, MeshIoError::InvalidData(_)));
    }

    #[test]
    fn rejects_four_dimensional_points() {
        let points = Array2::<f64>::zeros((3, 4));
        let err = build_grid(&points, &array![[0usize, 1, 2]]).expect_err("D = 4");
        assert!(matches!(err, MeshIoError::InvalidData(_)));
    }
}
