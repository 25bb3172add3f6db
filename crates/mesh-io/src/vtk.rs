///! Legacy VTK and VTK XML backend.
///!
///! Converts between [`UnstructuredGrid`] and the `vtkio` data model, which does
///! the actual parsing and serialization.
///!
///! ## Attribute mapping
///!
///! | components | written as |
///! |------------|------------|
///! | 1, 2, 4    | `SCALARS`  |
///! | 3          | `VECTORS`  |
///! | 9          | `TENSORS`  |
///! | other      | generic array |
///!
///! Field data is stored as a `FIELD` attribute named [`FIELD_DATA_NAME`]
///! (legacy format only, the XML model has no place for it). `vtkio` writes
///! that block inside `POINT_DATA`, so VTK and ParaView load it as point
///! arrays whose length does not match the point count rather than as
///! dataset field data. This crate reads it back as field data.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use tracing::{debug, warn};
use vtkio::IOBuffer;
use vtkio::model::{self, Attribute, ElementType};

use crate::error::{MeshIoError, Result};
use crate::grid::{CellArray, CellType, DataArray, DataArrays, NamedArrays, UnstructuredGrid};
use crate::options::LegacyEncoding;

/// Name of the FIELD attribute carrying mesh-level field data.
pub const FIELD_DATA_NAME: &str = "FieldData";

/// Read a legacy `.vtk` unstructured grid (ASCII or big-endian binary).
pub fn read_legacy(path: &Path) -> Result<UnstructuredGrid> {
    let file = File::open(path)?;
    let vtk = model::Vtk::parse_legacy_be(BufReader::new(file))?;
    from_vtk(vtk)
}

/// Read a `.vtu` unstructured grid.
pub fn read_xml(path: &Path) -> Result<UnstructuredGrid> {
    let file = File::open(path)?;
    let vtk = model::Vtk::parse_xml(BufReader::new(file))?;
    from_vtk(vtk)
}

/// Write a legacy `.vtk` file.
pub fn write_legacy(
    grid: &UnstructuredGrid,
    path: &Path,
    title: &str,
    encoding: LegacyEncoding,
) -> Result<()> {
    let vtk = to_vtk(grid, title, true)?;
    match encoding {
        LegacyEncoding::Ascii => {
            let mut out = String::new();
            vtk.write_legacy_ascii(&mut out)?;
            fs::write(path, out)?;
        }
        LegacyEncoding::Binary => {
            let mut out = Vec::new();
            vtk.write_legacy(&mut out)?;
            fs::write(path, out)?;
        }
    }
    Ok(())
}

/// Write a `.vtu` file.
pub fn write_xml(grid: &UnstructuredGrid, path: &Path, title: &str) -> Result<()> {
    if !grid.field_data.is_empty() {
        warn!(
            arrays = grid.field_data.len(),
            "field data cannot be stored in VTK XML output and is dropped"
        );
    }
    let vtk = to_vtk(grid, title, false)?;
    let mut out = Vec::new();
    vtk.write_xml(&mut out)?;
    fs::write(path, out)?;
    Ok(())
}

fn to_vtk(grid: &UnstructuredGrid, title: &str, with_field_data: bool) -> Result<model::Vtk> {
    let vertices = grid
        .cells
        .connectivity
        .iter()
        .map(|&v| {
            u32::try_from(v).map_err(|_| {
                MeshIoError::invalid(format!("connectivity value {v} exceeds the VTK index range"))
            })
        })
        .collect::<Result<Vec<u32>>>()?;
    let num_cells = u32::try_from(grid.num_cells())
        .map_err(|_| MeshIoError::invalid("too many cells for a VTK file"))?;

    let mut point: Vec<Attribute> = grid.point_data.iter().map(to_vtk_attribute).collect();
    if with_field_data && !grid.field_data.is_empty() {
        point.push(to_vtk_field(&grid.field_data));
    }
    let cell = grid.cell_data.iter().map(to_vtk_attribute).collect();

    Ok(model::Vtk {
        version: model::Version::new((4, 2)),
        title: title.to_string(),
        byte_order: model::ByteOrder::BigEndian,
        file_path: None,
        data: model::DataSet::inline(model::UnstructuredGridPiece {
            points: IOBuffer::new(grid.points_3d()),
            cells: model::Cells {
                cell_verts: model::VertexNumbers::Legacy {
                    num_cells,
                    vertices,
                },
                types: grid.cell_types.iter().map(|&ty| to_vtk_cell_type(ty)).collect(),
            },
            data: model::Attributes { point, cell },
        }),
    })
}

fn to_vtk_attribute(array: &DataArray) -> Attribute {
    let data = IOBuffer::new(array.values.clone());
    let name = array.name.as_str();
    match array.num_components {
        n @ (1 | 2 | 4) => Attribute::scalars(name, n as u32).with_data(data),
        3 => Attribute::vectors(name).with_data(data),
        9 => Attribute::tensors(name).with_data(data),
        n => Attribute::generic(name, n as u32).with_data(data),
    }
}

fn to_vtk_field(field_data: &DataArrays) -> Attribute {
    let arrays = field_data
        .iter()
        .map(|a| {
            model::FieldArray::new(a.name.as_str(), a.num_components.max(1) as u32)
                .with_data(IOBuffer::new(a.values.clone()))
        })
        .collect::<Vec<_>>();
    Attribute::field(FIELD_DATA_NAME).with_field_data(arrays)
}

fn from_vtk(vtk: model::Vtk) -> Result<UnstructuredGrid> {
    let model::Vtk {
        file_path, data, ..
    } = vtk;
    let model::DataSet::UnstructuredGrid { pieces, .. } = data else {
        return Err(MeshIoError::invalid(
            "VTK file does not contain an unstructured grid",
        ));
    };

    let mut merged: Option<UnstructuredGrid> = None;
    for piece in pieces.iter() {
        let piece = piece
            .load_piece_data(file_path.as_ref().map(AsRef::as_ref))
            .map_err(|err| MeshIoError::invalid(format!("failed to load VTK piece: {err}")))?;
        let grid = from_vtk_piece(piece)?;
        merged = Some(match merged {
            None => grid,
            Some(mut acc) => {
                append_grid(&mut acc, grid);
                acc
            }
        });
    }
    let grid = merged.unwrap_or_default();
    debug!(
        num_points = grid.num_points(),
        num_cells = grid.num_cells(),
        pieces = pieces.len(),
        "parsed VTK unstructured grid"
    );
    Ok(grid)
}

fn from_vtk_piece(piece: model::UnstructuredGridPiece) -> Result<UnstructuredGrid> {
    let model::UnstructuredGridPiece {
        points,
        cells: model::Cells { cell_verts, types },
        data,
    } = piece;

    let coords: Vec<f64> = points
        .cast_into()
        .ok_or_else(|| MeshIoError::invalid("point coordinates are not numeric"))?;

    let (num_cells, vertices) = cell_verts.into_legacy();
    let cell_types = types
        .into_iter()
        .map(from_vtk_cell_type)
        .collect::<Result<Vec<_>>>()?;

    let mut grid = UnstructuredGrid {
        points: coords,
        point_dim: 3,
        cells: CellArray::new(
            num_cells as usize,
            vertices.into_iter().map(u64::from).collect(),
        ),
        cell_types,
        ..UnstructuredGrid::default()
    };
    let model::Attributes { point, cell } = data;
    read_attributes(point, &mut grid.point_data, &mut grid.field_data)?;
    read_attributes(cell, &mut grid.cell_data, &mut grid.field_data)?;
    Ok(grid)
}

fn read_attributes(
    attribs: Vec<Attribute>,
    target: &mut DataArrays,
    field: &mut DataArrays,
) -> Result<()> {
    for attrib in attribs {
        match attrib {
            Attribute::DataArray(model::DataArray { name, elem, data }) => {
                let num_components = match elem {
                    ElementType::Scalars { num_comp, .. } => num_comp as usize,
                    ElementType::TCoords(n) => n as usize,
                    ElementType::Generic(n) => n as usize,
                    ElementType::Vectors | ElementType::Normals => 3,
                    ElementType::Tensors => 9,
                    _ => {
                        warn!(attribute = %name, "skipping colour scalars or lookup table");
                        continue;
                    }
                };
                let values = cast_values(data, &name)?;
                target.add(DataArray::new(name, num_components, values));
            }
            Attribute::Field { name, data_array } => {
                let dest = if name == FIELD_DATA_NAME {
                    &mut *field
                } else {
                    &mut *target
                };
                for model::FieldArray { name, elem, data } in data_array {
                    let values = cast_values(data, &name)?;
                    dest.add(DataArray::new(name, elem as usize, values));
                }
            }
        }
    }
    Ok(())
}

fn cast_values(data: IOBuffer, name: &str) -> Result<Vec<f64>> {
    let values: Option<Vec<f64>> = data.cast_into();
    values.ok_or_else(|| MeshIoError::invalid(format!("array '{name}' is not numeric")))
}

/// Append `other` to `acc`, offsetting its vertex indices. Arrays missing
/// from either side are dropped.
fn append_grid(acc: &mut UnstructuredGrid, other: UnstructuredGrid) {
    let offset = acc.num_points() as u64;
    acc.points.extend(other.points_3d());
    for cell in other.cells.iter_cells() {
        acc.cells.connectivity.push(cell.len() as u64);
        acc.cells.connectivity.extend(cell.iter().map(|&v| v + offset));
    }
    acc.cells.num_cells += other.num_cells();
    acc.cell_types.extend(other.cell_types);
    merge_arrays(&mut acc.point_data, other.point_data);
    merge_arrays(&mut acc.cell_data, other.cell_data);
}

fn merge_arrays(acc: &mut DataArrays, other: DataArrays) {
    let names: Vec<String> = acc.names().into_iter().map(str::to_string).collect();
    for name in names {
        let matching = other
            .get(&name)
            .filter(|o| Some(o.num_components) == acc.get(&name).map(|a| a.num_components));
        match (matching, acc.get_mut(&name)) {
            (Some(o), Some(a)) => a.values.extend_from_slice(&o.values),
            _ => {
                warn!(array = %name, "array missing from a VTK piece, dropping it");
                acc.remove(&name);
            }
        }
    }
}

fn to_vtk_cell_type(ty: CellType) -> model::CellType {
    match ty {
        CellType::Vertex => model::CellType::Vertex,
        CellType::PolyVertex => model::CellType::PolyVertex,
        CellType::Line => model::CellType::Line,
        CellType::PolyLine => model::CellType::PolyLine,
        CellType::Triangle => model::CellType::Triangle,
        CellType::TriangleStrip => model::CellType::TriangleStrip,
        CellType::Polygon => model::CellType::Polygon,
        CellType::Pixel => model::CellType::Pixel,
        CellType::Quad => model::CellType::Quad,
        CellType::Tetra => model::CellType::Tetra,
        CellType::Voxel => model::CellType::Voxel,
        CellType::Hexahedron => model::CellType::Hexahedron,
        CellType::Wedge => model::CellType::Wedge,
        CellType::Pyramid => model::CellType::Pyramid,
        CellType::QuadraticEdge => model::CellType::QuadraticEdge,
        CellType::QuadraticTriangle => model::CellType::QuadraticTriangle,
        CellType::QuadraticQuad => model::CellType::QuadraticQuad,
        CellType::QuadraticTetra => model::CellType::QuadraticTetra,
        CellType::QuadraticHexahedron => model::CellType::QuadraticHexahedron,
    }
}

fn from_vtk_cell_type(ty: model::CellType) -> Result<CellType> {
    let id = ty as u8;
    CellType::from_vtk_id(id)
        .ok_or_else(|| MeshIoError::invalid(format!("unsupported VTK cell type id {id}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn two_triangles() -> UnstructuredGrid {
        let mut grid = UnstructuredGrid {
            points: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0],
            point_dim: 3,
            ..UnstructuredGrid::default()
        };
        grid.set_cells(
            CellType::Triangle,
            CellArray::new(2, vec![3, 0, 1, 2, 3, 1, 3, 2]),
        );
        grid.point_data
            .add(DataArray::new("temperature", 1, vec![10.0, 11.0, 12.0, 13.0]));
        grid.point_data.add(DataArray::new(
            "velocity",
            3,
            vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0],
        ));
        grid.cell_data.add(DataArray::new("material", 1, vec![1.0, 2.0]));
        grid
    }

    #[test]
    fn legacy_ascii_roundtrip_preserves_grid() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("two_triangles.vtk");
        let mut grid = two_triangles();
        grid.field_data.add(DataArray::new("time", 1, vec![0.5]));

        write_legacy(&grid, &path, "roundtrip", LegacyEncoding::Ascii).expect("write");
        let text = fs::read_to_string(&path).expect("read back text");
        assert!(text.contains("UNSTRUCTURED_GRID"));

        let read = read_legacy(&path).expect("parse");
        assert_eq!(read.points, grid.points);
        assert_eq!(read.cells, grid.cells);
        assert_eq!(read.cell_types, grid.cell_types);
        assert_eq!(read.point_data.get("velocity"), grid.point_data.get("velocity"));
        assert_eq!(read.point_data.get("temperature"), grid.point_data.get("temperature"));
        assert_eq!(read.cell_data.get("material"), grid.cell_data.get("material"));
        assert_eq!(read.field_data.get("time").map(|a| a.values.clone()), Some(vec![0.5]));
    }

    #[test]
    fn legacy_binary_roundtrip() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("binary.vtk");
        let grid = two_triangles();
        write_legacy(&grid, &path, "binary", LegacyEncoding::Binary).expect("write");
        let read = read_legacy(&path).expect("parse");
        assert_eq!(read.points, grid.points);
        assert_eq!(read.cells, grid.cells);
    }

    #[test]
    fn xml_roundtrip_preserves_points_and_cells() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("two_triangles.vtu");
        let grid = two_triangles();
        write_xml(&grid, &path, "xml").expect("write");
        let read = read_xml(&path).expect("parse");
        assert_eq!(read.points, grid.points);
        assert_eq!(read.cells, grid.cells);
        assert_eq!(read.cell_types, grid.cell_types);
        assert_eq!(
            read.point_data.get("velocity").map(|a| a.values.clone()),
            Some(grid.point_data.get("velocity").unwrap().values.clone())
        );
    }

    #[test]
    fn planar_points_are_padded() {
        let mut grid = UnstructuredGrid {
            points: vec![0.0, 0.0, 1.0, 0.0],
            point_dim: 2,
            ..UnstructuredGrid::default()
        };
        grid.set_cells(CellType::Line, CellArray::new(1, vec![2, 0, 1]));
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("line.vtk");
        write_legacy(&grid, &path, "line", LegacyEncoding::Ascii).expect("write");
        let read = read_legacy(&path).expect("parse");
        assert_eq!(read.point_dim, 3);
        assert_eq!(read.points, vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn append_offsets_vertices_and_keeps_common_arrays() {
        let mut acc = two_triangles();
        let mut other = two_triangles();
        other.point_data.remove("temperature");
        append_grid(&mut acc, other);

        assert_eq!(acc.num_points(), 8);
        assert_eq!(acc.num_cells(), 4);
        let last: Vec<_> = acc.cells.iter_cells().last().unwrap().to_vec();
        assert_eq!(last, vec![5, 7, 6]);
        assert!(acc.point_data.get("temperature").is_none());
        assert_eq!(acc.point_data.get("velocity").unwrap().num_tuples(), 8);
        assert_eq!(acc.cell_data.get("material").unwrap().values, vec![1.0, 2.0, 1.0, 2.0]);
    }

    #[test]
    fn cell_type_mapping_is_consistent() {
        for id in 0u8..30 {
            if let Some(ty) = CellType::from_vtk_id(id) {
                let vtk_ty = to_vtk_cell_type(ty);
                assert_eq!(from_vtk_cell_type(vtk_ty).unwrap(), ty);
            }
        }
    }
}
