use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::components::{ComponentGroup, GlobalGroup, group_components, group_globals, interleave};
use super::{ELEMENT_BLOCKS, NODE_SETS};
use crate::error::{MeshIoError, Result};
use crate::grid::{
    Block, CellArray, CellType, DataArray, DataArrays, MultiBlock, NamedArrays, UnstructuredGrid,
    cell_type_for_nodes,
};
use crate::resolver::{ResultKind, ResultSource};

/// Element block metadata.
#[derive(Debug, Clone)]
struct ElementBlock {
    /// 1-based block index used in variable names
    index: usize,
    id: i64,
    cell_type: CellType,
    num_cells: usize,
    nodes_per_cell: usize,
}

/// Result variables of one kind, regrouped into arrays.
#[derive(Debug, Clone, Default)]
struct ResultVariables {
    /// Component names in file order
    names: Vec<String>,
    /// Variable index (the `k` in `vals_*_var{k}`) per component
    indices: Vec<usize>,
    groups: Vec<ComponentGroup>,
}

impl ResultVariables {
    fn new(found: BTreeMap<usize, String>) -> Self {
        let (indices, names): (Vec<_>, Vec<_>) = found.into_iter().unzip();
        let groups = group_components(&names);
        Self {
            names,
            indices,
            groups,
        }
    }
}

/// Global variables, regrouped into field arrays.
#[derive(Debug, Clone, Default)]
struct GlobalVariables {
    names: Vec<String>,
    groups: Vec<GlobalGroup>,
}

#[derive(Debug, Default)]
struct Metadata {
    num_dim: usize,
    num_nodes: usize,
    time_values: Vec<f64>,
    blocks: Vec<ElementBlock>,
    point: ResultVariables,
    element: ResultVariables,
    global: GlobalVariables,
}

/// Exodus II reader producing a block tree of element blocks.
///
/// ```text
/// root
/// ├── Element Blocks
/// │   └── Unnamed block ID: 1   (unstructured grid)
/// └── Node Sets                 (empty)
/// ```
pub struct ExodusReader {
    path: PathBuf,
    file: Option<netcdf::File>,
    meta: Metadata,
    enabled: HashSet<(ResultKind, String)>,
    time_step: usize,
}

impl ExodusReader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            file: None,
            meta: Metadata::default(),
            enabled: HashSet::new(),
            time_step: 0,
        }
    }

    pub fn time_values(&self) -> &[f64] {
        &self.meta.time_values
    }

    fn file(&self) -> Result<&netcdf::File> {
        self.file
            .as_ref()
            .ok_or_else(|| MeshIoError::invalid("exodus metadata has not been read"))
    }

    fn read_points(&self, file: &netcdf::File) -> Result<Vec<f64>> {
        let dim = self.meta.num_dim;
        let mut axes = Vec::with_capacity(dim);
        for name in ["coordx", "coordy", "coordz"].iter().take(dim) {
            axes.push(read_all::<f64>(file, name)?);
        }
        Ok(interleave(&axes))
    }

    fn read_block(&self, file: &netcdf::File, block: &ElementBlock, points: &[f64]) -> Result<UnstructuredGrid> {
        let raw: Vec<i64> = read_all(file, &format!("connect{}", block.index))?;
        let mut connectivity = Vec::with_capacity(block.num_cells * (block.nodes_per_cell + 1));
        for cell in raw.chunks(block.nodes_per_cell.max(1)) {
            connectivity.push(cell.len() as u64);
            for &v in cell {
                let v = v
                    .checked_sub(1)
                    .and_then(|v| u64::try_from(v).ok())
                    .ok_or_else(|| {
                        MeshIoError::invalid(format!("invalid node number {v} in block {}", block.id))
                    })?;
                connectivity.push(v);
            }
        }

        let mut grid = UnstructuredGrid {
            points: points.to_vec(),
            point_dim: self.meta.num_dim,
            ..UnstructuredGrid::default()
        };
        grid.set_cells(block.cell_type, CellArray::new(block.num_cells, connectivity));

        if self.meta.time_values.is_empty() {
            return Ok(grid);
        }
        let t = self.time_step;
        let nodes = self.meta.num_nodes;
        read_results(&self.meta.point, ResultKind::Point, &self.enabled, &mut grid.point_data, |k| {
            if let Some(var) = file.variable(&format!("vals_nod_var{k}")) {
                return Ok(Some(var.values::<f64, _>([t..t + 1, 0..nodes].as_slice())?));
            }
            // older files keep all nodal variables in one array
            match (file.variable("vals_nod_var"), k.checked_sub(1)) {
                (Some(var), Some(j)) => Ok(Some(
                    var.values::<f64, _>([t..t + 1, j..j + 1, 0..nodes].as_slice())?,
                )),
                _ => Ok(None),
            }
        })?;
        read_results(&self.meta.element, ResultKind::Element, &self.enabled, &mut grid.cell_data, |k| {
            match file.variable(&format!("vals_elem_var{k}eb{}", block.index)) {
                Some(var) => Ok(Some(
                    var.values::<f64, _>([t..t + 1, 0..block.num_cells].as_slice())?,
                )),
                None => Ok(None),
            }
        })?;
        self.read_globals(file, &mut grid.field_data)?;
        Ok(grid)
    }

    fn read_globals(&self, file: &netcdf::File, target: &mut DataArrays) -> Result<()> {
        let vars = &self.meta.global;
        if vars.names.is_empty() {
            return Ok(());
        }
        let Some(var) = file.variable("vals_glo_var") else {
            warn!("global variables are named but vals_glo_var is missing");
            return Ok(());
        };
        let t = self.time_step;
        let values = var.values::<f64, _>([t..t + 1, 0..vars.names.len()].as_slice())?;
        for group in &vars.groups {
            if !self.enabled.contains(&(ResultKind::Global, group.name.clone())) {
                continue;
            }
            let group_values = group
                .indices
                .iter()
                .filter_map(|&i| values.get(i).copied())
                .collect();
            target.add(DataArray::new(group.name.clone(), group.num_components, group_values));
        }
        Ok(())
    }
}

/// Read the enabled groups of `vars`. `fetch` returns `None` for a variable
/// missing from the file, which skips its group.
fn read_results(
    vars: &ResultVariables,
    kind: ResultKind,
    enabled: &HashSet<(ResultKind, String)>,
    target: &mut DataArrays,
    fetch: impl Fn(usize) -> Result<Option<Vec<f64>>>,
) -> Result<()> {
    'groups: for group in &vars.groups {
        if !enabled.contains(&(kind, group.name.clone())) {
            continue;
        }
        let mut parts = Vec::with_capacity(group.num_components());
        for &i in &group.indices {
            let Some(values) = fetch(vars.indices[i])? else {
                if kind == ResultKind::Point {
                    warn!(array = %group.name, "nodal variable missing");
                }
                continue 'groups;
            };
            parts.push(values);
        }
        target.add(DataArray::new(group.name.clone(), group.num_components(), interleave(&parts)));
    }
    Ok(())
}

impl ResultSource for ExodusReader {
    fn update_information(&mut self) -> Result<()> {
        let file = netcdf::open(&self.path)?;

        let dim_len = |name: &str| file.dimension(name).map_or(0, |d| d.len());
        let num_dim = dim_len("num_dim");
        if !(1..=3).contains(&num_dim) {
            return Err(MeshIoError::invalid(format!(
                "{} is not an Exodus file (num_dim = {num_dim})",
                self.path.display()
            )));
        }
        let num_nodes = dim_len("num_nodes");

        let time_values = match file.variable("time_whole") {
            Some(var) if dim_len("time_step") > 0 => var.values::<f64, _>(..)?,
            _ => Vec::new(),
        };

        let ids: Vec<i64> = match file.variable("eb_prop1") {
            Some(var) => var.values::<i64, _>(..)?,
            None => Vec::new(),
        };
        let mut blocks = Vec::new();
        for index in 1..=dim_len("num_el_blk") {
            let Some(connect) = file.variable(&format!("connect{index}")) else {
                continue;
            };
            let num_cells = dim_len(&format!("num_el_in_blk{index}"));
            let nodes_per_cell = dim_len(&format!("num_nod_per_el{index}"));
            let elem_type = string_attribute(&connect, "elem_type").unwrap_or_default();
            let cell_type = CellType::from_exodus_name(&elem_type, nodes_per_cell)
                .or_else(|| cell_type_for_nodes(nodes_per_cell))
                .ok_or(MeshIoError::UnsupportedCellType { nodes_per_cell })?;
            blocks.push(ElementBlock {
                index,
                id: ids.get(index - 1).copied().unwrap_or(index as i64),
                cell_type,
                num_cells,
                nodes_per_cell,
            });
        }

        let point = match read_names(&file, "name_nod_var")? {
            Some(names) => numbered(names),
            None => scan_variables(&file, |n| n.strip_prefix("vals_nod_var")?.parse().ok()),
        };
        let element = match read_names(&file, "name_elem_var")? {
            Some(names) => numbered(names),
            None => scan_variables(&file, |n| {
                let (k, b) = n.strip_prefix("vals_elem_var")?.split_once("eb")?;
                b.parse::<usize>().ok()?;
                k.parse().ok()
            }),
        };
        let global_names = read_names(&file, "name_glo_var")?.unwrap_or_else(|| {
            let count = dim_len("num_glo_var");
            (1..=count).map(|k| format!("vals_glo_var{k}")).collect()
        });

        self.meta = Metadata {
            num_dim,
            num_nodes,
            time_values,
            blocks,
            point: ResultVariables::new(point),
            element: ResultVariables::new(element),
            global: GlobalVariables {
                groups: group_globals(&global_names),
                names: global_names,
            },
        };
        debug!(
            path = %self.path.display(),
            blocks = self.meta.blocks.len(),
            time_steps = self.meta.time_values.len(),
            nodal = self.meta.point.names.len(),
            element = self.meta.element.names.len(),
            global = self.meta.global.names.len(),
            "read exodus metadata"
        );
        self.file = Some(file);
        Ok(())
    }

    fn array_names(&self, kind: ResultKind) -> Vec<String> {
        match kind {
            ResultKind::Point => group_names(&self.meta.point.groups),
            ResultKind::Element => group_names(&self.meta.element.groups),
            ResultKind::Global => self.meta.global.groups.iter().map(|g| g.name.clone()).collect(),
        }
    }

    fn set_array_status(&mut self, kind: ResultKind, name: &str, enabled: bool) {
        if enabled {
            self.enabled.insert((kind, name.to_string()));
        } else {
            self.enabled.remove(&(kind, name.to_string()));
        }
    }

    fn num_time_steps(&self) -> usize {
        self.meta.time_values.len()
    }

    fn set_time_step(&mut self, step: usize) -> Result<()> {
        let available = self.num_time_steps();
        if step >= available {
            return Err(MeshIoError::TimeStepOutOfRange {
                requested: step,
                available,
            });
        }
        self.time_step = step;
        Ok(())
    }

    fn update(&mut self) -> Result<MultiBlock> {
        let file = self.file()?;
        let points = self.read_points(file)?;

        let mut element_blocks = MultiBlock::new();
        for block in &self.meta.blocks {
            let grid = self.read_block(file, block, &points)?;
            element_blocks.push(
                format!("Unnamed block ID: {}", block.id),
                Block::Grid(Box::new(grid)),
            );
        }

        Ok(MultiBlock::new()
            .with_block(ELEMENT_BLOCKS, Block::MultiBlock(element_blocks))
            .with_block(NODE_SETS, Block::MultiBlock(MultiBlock::new())))
    }
}

fn read_all<T: netcdf::NcPutGet>(file: &netcdf::File, name: &str) -> Result<Vec<T>> {
    let var = file
        .variable(name)
        .ok_or_else(|| MeshIoError::invalid(format!("missing exodus variable '{name}'")))?;
    Ok(var.values::<T, _>(..)?)
}

fn group_names(groups: &[ComponentGroup]) -> Vec<String> {
    groups.iter().map(|g| g.name.clone()).collect()
}

/// Variable indices are 1-based and follow the name table order.
fn numbered(names: Vec<String>) -> BTreeMap<usize, String> {
    (1..).zip(names).collect()
}

/// Result variables of a file without a name table, labelled by their own
/// variable name.
fn scan_variables(file: &netcdf::File, index_of: impl Fn(&str) -> Option<usize>) -> BTreeMap<usize, String> {
    let mut found = BTreeMap::new();
    for var in file.variables() {
        let var_name = var.name();
        if let Some(k) = index_of(&var_name) {
            found.entry(k).or_insert(var_name);
        }
    }
    found
}

/// Read an `NC_CHAR` name table (`count × len_name`). `None` if absent.
fn read_names(file: &netcdf::File, var_name: &str) -> Result<Option<Vec<String>>> {
    let Some(var) = file.variable(var_name) else {
        return Ok(None);
    };
    let (rows, width) = match var.dimensions() {
        [rows, width] => (rows.len(), width.len()),
        _ => return Ok(None),
    };
    let mut buf = vec![0u8; rows * width];
    var.raw_values(&mut buf, [0..rows, 0..width].as_slice())?;
    Ok(Some(buf.chunks(width.max(1)).map(decode_name).collect()))
}

fn decode_name(raw: &[u8]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).trim().to_string()
}

fn string_attribute(var: &netcdf::Variable, name: &str) -> Option<String> {
    var.attribute(name)
        .and_then(|a| a.value().ok())
        .and_then(|v| match v {
            netcdf::AttrValue::Str(s) => Some(s.trim_end_matches('\0').trim().to_string()),
            _ => None,
        })
}
