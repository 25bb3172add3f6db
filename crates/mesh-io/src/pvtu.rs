///! Parallel VTK XML (`.pvtu`) writer.
///!
///! The grid is split into contiguous cell ranges. Each range is written as a
///! `<stem>_<i>.vtu` piece next to the index file, which lists the pieces and
///! declares the point and cell arrays they share.
///!
///! ```text
///! out/
///!   mesh.pvtu
///!   mesh_0.vtu
///!   mesh_1.vtu
///! ```

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{MeshIoError, Result};
use crate::grid::{CellArray, DataArray, DataArrays, NamedArrays, UnstructuredGrid};
use crate::options::WriteOptions;
use crate::vtk;

/// Writer for a partitioned unstructured grid.
pub struct PvtuWriter<'a> {
    grid: &'a UnstructuredGrid,
    pieces: usize,
    title: &'a str,
}

impl<'a> PvtuWriter<'a> {
    pub fn new(grid: &'a UnstructuredGrid, options: &'a WriteOptions) -> Self {
        Self {
            grid,
            pieces: options.pieces,
            title: &options.title,
        }
    }

    /// Write the pieces and the `.pvtu` index at `path`. Returns the piece paths.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<Vec<PathBuf>> {
        let path = path.as_ref();
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| MeshIoError::invalid(format!("invalid output path {}", path.display())))?;
        let dir = path.parent().unwrap_or_else(|| Path::new(""));

        let pieces = partition(self.grid, self.pieces);
        let mut sources = Vec::with_capacity(pieces.len());
        let mut written = Vec::with_capacity(pieces.len());
        for (i, piece) in pieces.iter().enumerate() {
            let source = format!("{stem}_{i}.vtu");
            let piece_path = dir.join(&source);
            vtk::write_xml(piece, &piece_path, self.title)?;
            sources.push(source);
            written.push(piece_path);
        }

        let mut file = BufWriter::new(File::create(path)?);
        self.write_pvtu_header(&mut file)?;
        self.write_pvtu_arrays(&mut file)?;
        for source in &sources {
            writeln!(file, "    <Piece Source=\"{}\"/>", escape_attribute(source))?;
        }
        self.write_pvtu_footer(&mut file)?;
        file.flush()?;

        debug!(path = %path.display(), pieces = sources.len(), "wrote parallel VTK XML");
        Ok(written)
    }

    fn write_pvtu_header(&self, file: &mut impl Write) -> std::io::Result<()> {
        writeln!(file, "<?xml version=\"1.0\"?>")?;
        writeln!(
            file,
            "<VTKFile type=\"PUnstructuredGrid\" version=\"0.1\" byte_order=\"BigEndian\">"
        )?;
        writeln!(file, "  <PUnstructuredGrid GhostLevel=\"0\">")?;
        Ok(())
    }

    fn write_pvtu_arrays(&self, file: &mut impl Write) -> std::io::Result<()> {
        writeln!(file, "    <PPoints>")?;
        writeln!(
            file,
            "      <PDataArray type=\"Float64\" NumberOfComponents=\"3\"/>"
        )?;
        writeln!(file, "    </PPoints>")?;
        write_pdata(file, "PPointData", &self.grid.point_data)?;
        write_pdata(file, "PCellData", &self.grid.cell_data)?;
        Ok(())
    }

    fn write_pvtu_footer(&self, file: &mut impl Write) -> std::io::Result<()> {
        writeln!(file, "  </PUnstructuredGrid>")?;
        writeln!(file, "</VTKFile>")?;
        Ok(())
    }
}

fn write_pdata(file: &mut impl Write, tag: &str, arrays: &DataArrays) -> std::io::Result<()> {
    if arrays.is_empty() {
        return Ok(());
    }
    writeln!(file, "    <{tag}>")?;
    for array in arrays.iter() {
        writeln!(
            file,
            "      <PDataArray type=\"Float64\" Name=\"{}\" NumberOfComponents=\"{}\"/>",
            escape_attribute(&array.name),
            array.num_components
        )?;
    }
    writeln!(file, "    </{tag}>")?;
    Ok(())
}

fn escape_attribute(value: &str) -> String {
    String::from_utf8_lossy(&quick_xml::escape::escape(value.as_bytes())).into_owned()
}

/// Split `grid` into at most `pieces` grids over contiguous cell ranges.
///
/// Every piece keeps only the points its cells reference, renumbered in
/// ascending order. Field data goes to the first piece.
pub fn partition(grid: &UnstructuredGrid, pieces: usize) -> Vec<UnstructuredGrid> {
    let num_cells = grid.num_cells();
    let pieces = pieces.clamp(1, num_cells.max(1));
    if pieces == 1 {
        return vec![grid.clone()];
    }

    let cells: Vec<&[u64]> = grid.cells.iter_cells().collect();
    let base = num_cells / pieces;
    let extra = num_cells % pieces;

    let mut out = Vec::with_capacity(pieces);
    let mut start = 0;
    for i in 0..pieces {
        let len = base + usize::from(i < extra);
        let range = start..start + len;
        start += len;

        let mut piece = extract_cells(grid, &cells[range.clone()], range.start);
        if i == 0 {
            piece.field_data = grid.field_data.clone();
        }
        out.push(piece);
    }
    out
}

fn extract_cells(grid: &UnstructuredGrid, cells: &[&[u64]], first_cell: usize) -> UnstructuredGrid {
    let mut renumber = BTreeMap::new();
    for &v in cells.iter().flat_map(|c| c.iter()) {
        renumber.insert(v, 0u64);
    }
    for (slot, index) in renumber.values_mut().zip(0u64..) {
        *slot = index;
    }
    let kept: Vec<usize> = renumber.keys().map(|&v| v as usize).collect();

    let mut connectivity = Vec::new();
    for cell in cells {
        connectivity.push(cell.len() as u64);
        connectivity.extend(cell.iter().map(|v| renumber[v]));
    }

    let dim = grid.point_dim;
    let points = kept
        .iter()
        .flat_map(|&p| grid.points[p * dim..(p + 1) * dim].iter().copied())
        .collect();

    let cell_ids: Vec<usize> = (first_cell..first_cell + cells.len()).collect();
    UnstructuredGrid {
        points,
        point_dim: dim,
        cells: CellArray::new(cells.len(), connectivity),
        cell_types: grid.cell_types[first_cell..first_cell + cells.len()].to_vec(),
        point_data: select_tuples(&grid.point_data, &kept),
        cell_data: select_tuples(&grid.cell_data, &cell_ids),
        field_data: DataArrays::new(),
    }
}

fn select_tuples(arrays: &DataArrays, indices: &[usize]) -> DataArrays {
    let mut out = DataArrays::new();
    for array in arrays.iter() {
        let values = indices
            .iter()
            .flat_map(|&i| array.tuple(i).iter().copied())
            .collect();
        out.add(DataArray::new(array.name.clone(), array.num_components, values));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellType;
    use std::fs;
    use tempfile::tempdir;

    /// Strip of four triangles over six points.
    fn strip() -> UnstructuredGrid {
        let mut grid = UnstructuredGrid {
            points: vec![
                0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 0.0, //
                0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 2.0, 1.0, 0.0,
            ],
            ..UnstructuredGrid::default()
        };
        grid.set_cells(
            CellType::Triangle,
            CellArray::new(
                4,
                vec![3, 0, 1, 3, 3, 1, 4, 3, 3, 1, 2, 4, 3, 2, 5, 4],
            ),
        );
        grid.point_data
            .add(DataArray::new("id", 1, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]));
        grid.cell_data
            .add(DataArray::new("cell", 1, vec![10.0, 11.0, 12.0, 13.0]));
        grid
    }

    #[test]
    fn partition_splits_cells_evenly() {
        let pieces = partition(&strip(), 3);
        let sizes: Vec<_> = pieces.iter().map(|p| p.num_cells()).collect();
        assert_eq!(sizes, vec![2, 1, 1]);
    }

    #[test]
    fn partition_renumbers_points_and_subsets_data() {
        let pieces = partition(&strip(), 2);
        let second = &pieces[1];
        // cells (1,2,4) and (2,5,4) reference points 1, 2, 4, 5
        assert_eq!(second.num_points(), 4);
        assert_eq!(second.point_data.get("id").unwrap().values, vec![1.0, 2.0, 4.0, 5.0]);
        assert_eq!(second.cell_data.get("cell").unwrap().values, vec![12.0, 13.0]);
        let cells: Vec<Vec<u64>> = second.cells.iter_cells().map(<[u64]>::to_vec).collect();
        assert_eq!(cells, vec![vec![0, 1, 2], vec![1, 3, 2]]);
        assert_eq!(second.cell_types, vec![CellType::Triangle; 2]);
    }

    #[test]
    fn partition_clamps_piece_count() {
        assert_eq!(partition(&strip(), 0).len(), 1);
        assert_eq!(partition(&strip(), 10).len(), 4);
    }

    #[test]
    fn writes_index_and_pieces() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("strip.pvtu");
        let options = WriteOptions {
            pieces: 2,
            ..WriteOptions::default()
        };
        let grid = strip();

        let written = PvtuWriter::new(&grid, &options).write(&path).expect("write");
        assert_eq!(written.len(), 2);
        for piece in &written {
            assert!(piece.exists(), "missing {}", piece.display());
        }

        let index = fs::read_to_string(&path).expect("index");
        assert!(index.contains("PUnstructuredGrid"));
        assert!(index.contains("<Piece Source=\"strip_0.vtu\"/>"));
        assert!(index.contains("<Piece Source=\"strip_1.vtu\"/>"));
        assert!(index.contains("Name=\"id\""));
        assert!(index.contains("<PCellData>"));

        let first = vtk::read_xml(&written[0]).expect("piece parses");
        assert_eq!(first.num_cells(), 2);
    }

    #[test]
    fn index_escapes_array_names() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("names.pvtu");
        let mut grid = strip();
        grid.point_data
            .add(DataArray::new("a<b&\"c'>", 1, vec![0.0; 6]));

        PvtuWriter::new(&grid, &WriteOptions::default())
            .write(&path)
            .expect("write");
        let index = fs::read_to_string(&path).expect("index");
        assert!(index.contains("Name=\"a&lt;b&amp;&quot;c&apos;&gt;\""), "{index}");
        assert!(!index.contains("a<b"));
    }
}
