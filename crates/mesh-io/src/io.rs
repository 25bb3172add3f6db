//! Format dispatch for mesh reads and writes.

use std::path::Path;

use ndarray::Array2;
use tracing::{debug, info};

use crate::attributes::{self, AttributeMap};
use crate::builder::build_grid;
use crate::connectivity;
use crate::error::{MeshIoError, Result};
use crate::format::FileFormat;
use crate::grid::UnstructuredGrid;
use crate::mesh::Mesh;
use crate::options::{ReadOptions, WriteOptions};
use crate::pvtu::PvtuWriter;
use crate::vtk;

/// Read a mesh with default options.
pub fn read(format: FileFormat, path: impl AsRef<Path>) -> Result<Mesh> {
    read_with_options(format, path, &ReadOptions::default())
}

/// Read `path` as `format`. Parallel VTK XML is write-only.
pub fn read_with_options(
    format: FileFormat,
    path: impl AsRef<Path>,
    options: &ReadOptions,
) -> Result<Mesh> {
    let path = path.as_ref();
    if !format.can_read() {
        return Err(MeshIoError::UnknownFormat(format!("{format} (write-only)")));
    }
    debug!(%format, path = %path.display(), "reading mesh");
    let grid = match format {
        FileFormat::LegacyVtk => vtk::read_legacy(path)?,
        FileFormat::VtkXml | FileFormat::ParallelVtkXml => vtk::read_xml(path)?,
        FileFormat::Exodus => read_exodus(path, options.timestep)?,
    };
    let mesh = grid_to_mesh(grid)?;
    info!(
        %format,
        num_points = mesh.num_points(),
        num_cells = mesh.num_cells(),
        "read mesh"
    );
    Ok(mesh)
}

/// Write a mesh with default options.
pub fn write(format: FileFormat, path: impl AsRef<Path>, mesh: &Mesh) -> Result<()> {
    write_with_options(format, path, mesh, &WriteOptions::default())
}

/// Write `mesh` to `path` as `format`. The mesh is validated before any file
/// is created.
pub fn write_with_options(
    format: FileFormat,
    path: impl AsRef<Path>,
    mesh: &Mesh,
    options: &WriteOptions,
) -> Result<()> {
    let path = path.as_ref();
    check_rows("point", &mesh.point_data, mesh.num_points())?;
    check_rows("cell", &mesh.cell_data, mesh.num_cells())?;

    let grid = mesh_to_grid(mesh, format)?;

    match format {
        FileFormat::LegacyVtk => {
            vtk::write_legacy(&grid, path, &options.title, options.legacy_encoding)?
        }
        FileFormat::VtkXml => vtk::write_xml(&grid, path, &options.title)?,
        FileFormat::ParallelVtkXml => {
            PvtuWriter::new(&grid, options).write(path)?;
        }
        FileFormat::Exodus => write_exodus(&grid, path, options)?,
    }
    info!(
        %format,
        path = %path.display(),
        num_points = mesh.num_points(),
        num_cells = mesh.num_cells(),
        "wrote mesh"
    );
    Ok(())
}

/// Only point data gets the Exodus vector naming fixup.
fn mesh_to_grid(mesh: &Mesh, format: FileFormat) -> Result<UnstructuredGrid> {
    let mut grid = build_grid(&mesh.points, &mesh.cells)?;
    attributes::inject(&mesh.point_data, &mut grid.point_data, format)?;
    attributes::inject_unchanged(&mesh.cell_data, &mut grid.cell_data)?;
    attributes::inject_unchanged(&mesh.field_data, &mut grid.field_data)?;
    Ok(grid)
}

fn grid_to_mesh(grid: UnstructuredGrid) -> Result<Mesh> {
    let cells = connectivity::decode(&grid.cells.connectivity, grid.num_cells())?;
    let point_data = attributes::extract(&grid.point_data)?;
    let cell_data = attributes::extract(&grid.cell_data)?;
    let field_data = attributes::extract(&grid.field_data)?;
    let num_points = grid.num_points();
    let points = Array2::from_shape_vec((num_points, grid.point_dim), grid.points)
        .map_err(|err| MeshIoError::invalid(format!("point coordinates: {err}")))?;
    Ok(Mesh {
        points,
        cells,
        point_data,
        cell_data,
        field_data,
    })
}

fn check_rows(location: &str, map: &AttributeMap, expected: usize) -> Result<()> {
    for (name, values) in map {
        let rows = values.shape().first().copied().unwrap_or(0);
        if rows != expected {
            return Err(MeshIoError::invalid(format!(
                "{location} array '{name}' has {rows} rows, expected {expected}"
            )));
        }
    }
    Ok(())
}

#[cfg(feature = "exodus")]
fn read_exodus(path: &Path, timestep: Option<usize>) -> Result<UnstructuredGrid> {
    let mut reader = crate::exodus::ExodusReader::new(path);
    crate::resolver::resolve(&mut reader, timestep)
}

#[cfg(not(feature = "exodus"))]
fn read_exodus(_path: &Path, _timestep: Option<usize>) -> Result<UnstructuredGrid> {
    Err(MeshIoError::FormatUnavailable(FileFormat::Exodus))
}

#[cfg(feature = "exodus")]
fn write_exodus(grid: &UnstructuredGrid, path: &Path, options: &WriteOptions) -> Result<()> {
    crate::exodus::write_exodus(grid, path, options)
}

#[cfg(not(feature = "exodus"))]
fn write_exodus(_grid: &UnstructuredGrid, _path: &Path, _options: &WriteOptions) -> Result<()> {
    Err(MeshIoError::FormatUnavailable(FileFormat::Exodus))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Block, MultiBlock, NamedArrays};
    use crate::resolver::{ResultKind, ResultSource, resolve};
    use ndarray::{Array1, array};
    use tempfile::tempdir;

    fn triangle() -> Mesh {
        Mesh::new(
            array![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            array![[0usize, 1, 2]],
        )
    }

    #[test]
    fn parallel_vtk_xml_is_not_readable() {
        let dir = tempdir().expect("temp dir");
        let err = read(FileFormat::ParallelVtkXml, dir.path().join("x.pvtu"))
            .expect_err("write-only");
        assert!(matches!(err, MeshIoError::UnknownFormat(_)));
    }

    #[test]
    fn mismatched_point_data_fails_before_writing() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("bad.vtk");
        let mesh = triangle()
            .with_point_data("p", Array1::from(vec![1.0, 2.0]).into_dyn());
        let err = write(FileFormat::LegacyVtk, &path, &mesh).expect_err("2 values for 3 points");
        assert!(matches!(err, MeshIoError::InvalidData(_)));
        assert!(!path.exists());
    }

    #[test]
    fn unsupported_cells_fail_before_writing() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("quad.vtu");
        let mesh = Mesh::new(
            array![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.5, 0.5]],
            array![[0usize, 1, 2, 3, 4]],
        );
        let err = write(FileFormat::VtkXml, &path, &mesh).expect_err("five nodes");
        assert!(matches!(err, MeshIoError::UnsupportedCellType { nodes_per_cell: 5 }));
        assert!(!path.exists());
    }

    #[test]
    fn legacy_roundtrip_through_dispatch() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("triangle.vtk");
        let mesh = triangle()
            .with_point_data("T", Array1::from(vec![1.0, 2.0, 3.0]).into_dyn())
            .with_cell_data("id", Array1::from(vec![7.0]).into_dyn());
        write(FileFormat::LegacyVtk, &path, &mesh).expect("write");
        let read_back = read(FileFormat::LegacyVtk, &path).expect("read");
        assert_eq!(read_back, mesh);
    }

    /// Serves one prepared grid as an Exodus-style block tree.
    struct PreparedBlocks(Option<UnstructuredGrid>);

    impl ResultSource for PreparedBlocks {
        fn update_information(&mut self) -> Result<()> {
            Ok(())
        }

        fn array_names(&self, _kind: ResultKind) -> Vec<String> {
            Vec::new()
        }

        fn set_array_status(&mut self, _kind: ResultKind, _name: &str, _enabled: bool) {}

        fn num_time_steps(&self) -> usize {
            1
        }

        fn set_time_step(&mut self, _step: usize) -> Result<()> {
            Ok(())
        }

        fn update(&mut self) -> Result<MultiBlock> {
            let grid = self.0.take().expect("single update");
            let blocks = MultiBlock::new().with_block("Unnamed block ID: 1", Block::Grid(Box::new(grid)));
            Ok(MultiBlock::new().with_block("Element Blocks", Block::MultiBlock(blocks)))
        }
    }

    #[test]
    fn exodus_names_of_three_column_arrays_survive_resolve() {
        let vectors = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]].into_dyn();
        let mesh = triangle()
            .with_point_data("velocity", vectors.clone())
            .with_cell_data("stress", array![[0.1, 0.2, 0.3]].into_dyn())
            .with_field_data("basis", array![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]].into_dyn());

        let grid = mesh_to_grid(&mesh, FileFormat::Exodus).expect("grid");
        assert_eq!(grid.point_data.names(), vec!["velocity_"]);
        assert_eq!(grid.cell_data.names(), vec!["stress"]);
        assert_eq!(grid.field_data.names(), vec!["basis"]);

        let resolved = resolve(&mut PreparedBlocks(Some(grid)), None).expect("resolve");
        let read_back = grid_to_mesh(resolved).expect("mesh");
        assert_eq!(read_back, mesh);
    }

    #[cfg(not(feature = "exodus"))]
    #[test]
    fn exodus_without_feature_is_unavailable() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("mesh.e");
        let err = write(FileFormat::Exodus, &path, &triangle()).expect_err("no netcdf");
        assert!(matches!(err, MeshIoError::FormatUnavailable(FileFormat::Exodus)));
        let err = read(FileFormat::Exodus, &path).expect_err("no netcdf");
        assert!(matches!(err, MeshIoError::FormatUnavailable(FileFormat::Exodus)));
    }
}
