use std::path::Path;

use netcdf::types::{BasicType, VariableType};
use tracing::debug;

use super::components::{component_names, global_names, split_components};
use crate::error::{MeshIoError, Result};
use crate::grid::{DataArrays, UnstructuredGrid};
use crate::options::WriteOptions;

const COORD_NAMES: [&str; 3] = ["coordx", "coordy", "coordz"];
const AXIS_NAMES: [&str; 3] = ["x", "y", "z"];

/// Exodus default for `len_name`, 32 characters plus the terminator.
const MIN_NAME_LEN: usize = 33;

/// Write `grid` as a single-block Exodus II file with one result time step.
///
/// Result names go into the `name_nod_var`, `name_elem_var` and
/// `name_glo_var` tables. Nodal and element components are stored one
/// variable each, globals in the 2-D `vals_glo_var`.
pub fn write_exodus(grid: &UnstructuredGrid, path: &Path, options: &WriteOptions) -> Result<()> {
    let cell_type = grid
        .uniform_cell_type()
        .ok_or_else(|| MeshIoError::invalid("Exodus output needs cells of a single type"))?;
    let nodes_per_cell = grid.cells.iter_cells().next().map_or(0, <[u64]>::len);
    let num_points = grid.num_points();
    let num_cells = grid.num_cells();
    let dim = grid.point_dim;

    let (nodal_names, nodal) = expand(&grid.point_data);
    let (element_names, element) = expand(&grid.cell_data);
    let (global_names, global) = expand_globals(&grid.field_data);
    let len_name = nodal_names
        .iter()
        .chain(&element_names)
        .chain(&global_names)
        .map(|n| n.len() + 1)
        .fold(MIN_NAME_LEN, usize::max);

    let mut file = netcdf::create(path)?;
    file.add_attribute("api_version", 8.11f32)?;
    file.add_attribute("version", 8.11f32)?;
    file.add_attribute("floating_point_word_size", 8i32)?;
    file.add_attribute("file_size", 1i32)?;
    file.add_attribute("maximum_name_length", (len_name - 1) as i32)?;
    file.add_attribute("title", options.title.as_str())?;

    file.add_dimension("len_string", MIN_NAME_LEN)?;
    file.add_dimension("len_line", 81)?;
    file.add_dimension("four", 4)?;
    file.add_dimension("len_name", len_name)?;
    file.add_unlimited_dimension("time_step")?;
    file.add_dimension("num_dim", dim)?;
    file.add_dimension("num_nodes", num_points)?;
    file.add_dimension("num_elem", num_cells)?;
    file.add_dimension("num_el_blk", 1)?;
    file.add_dimension("num_el_in_blk1", num_cells)?;
    file.add_dimension("num_nod_per_el1", nodes_per_cell)?;

    {
        let mut var = file.add_variable::<f64>("time_whole", &["time_step"])?;
        var.put_values(&[options.time_value], [0..1usize].as_slice())?;
    }

    let axes: Vec<String> = AXIS_NAMES.iter().take(dim).map(|a| a.to_string()).collect();
    put_names(&mut file, "coor_names", "num_dim", &axes, len_name)?;
    for (axis, coord_name) in COORD_NAMES.iter().enumerate().take(dim) {
        let values: Vec<f64> = grid.points.iter().skip(axis).step_by(dim).copied().collect();
        let mut var = file.add_variable::<f64>(coord_name, &["num_nodes"])?;
        var.put_values(&values, ..)?;
    }

    {
        let mut var = file.add_variable::<i32>("eb_status", &["num_el_blk"])?;
        var.put_values(&[1i32], ..)?;
    }
    {
        let mut var = file.add_variable::<i32>("eb_prop1", &["num_el_blk"])?;
        var.add_attribute("name", "ID")?;
        var.put_values(&[1i32], ..)?;
    }
    {
        let connect = grid
            .cells
            .iter_cells()
            .flat_map(|cell| cell.iter().map(|&v| i32::try_from(v + 1)))
            .collect::<std::result::Result<Vec<i32>, _>>()
            .map_err(|_| MeshIoError::invalid("vertex index exceeds the Exodus integer range"))?;
        let mut var = file.add_variable::<i32>("connect1", &["num_el_in_blk1", "num_nod_per_el1"])?;
        var.add_attribute("elem_type", cell_type.exodus_name())?;
        var.put_values(&connect, ..)?;
    }

    if !nodal.is_empty() {
        file.add_dimension("num_nod_var", nodal.len())?;
        put_names(&mut file, "name_nod_var", "num_nod_var", &nodal_names, len_name)?;
        for (k, values) in nodal.iter().enumerate() {
            let mut var =
                file.add_variable::<f64>(&format!("vals_nod_var{}", k + 1), &["time_step", "num_nodes"])?;
            var.put_values(values, [0..1, 0..values.len()].as_slice())?;
        }
    }

    if !element.is_empty() {
        file.add_dimension("num_elem_var", element.len())?;
        put_names(&mut file, "name_elem_var", "num_elem_var", &element_names, len_name)?;
        {
            let mut var = file.add_variable::<i32>("elem_var_tab", &["num_el_blk", "num_elem_var"])?;
            var.put_values(&vec![1i32; element.len()], ..)?;
        }
        for (k, values) in element.iter().enumerate() {
            let mut var = file.add_variable::<f64>(
                &format!("vals_elem_var{}eb1", k + 1),
                &["time_step", "num_el_in_blk1"],
            )?;
            var.put_values(values, [0..1, 0..values.len()].as_slice())?;
        }
    }

    if !global.is_empty() {
        file.add_dimension("num_glo_var", global.len())?;
        put_names(&mut file, "name_glo_var", "num_glo_var", &global_names, len_name)?;
        let mut var = file.add_variable::<f64>("vals_glo_var", &["time_step", "num_glo_var"])?;
        var.put_values(&global, [0..1, 0..global.len()].as_slice())?;
    }

    debug!(
        path = %path.display(),
        num_points,
        num_cells,
        nodal = nodal.len(),
        element = element.len(),
        global = global.len(),
        "wrote exodus file"
    );
    Ok(())
}

/// NUL-padded `NC_CHAR` name table of shape `count_dim × len_name`.
fn put_names(
    file: &mut netcdf::MutableFile,
    var_name: &str,
    count_dim: &str,
    names: &[String],
    len_name: usize,
) -> Result<()> {
    let mut buf = vec![0u8; names.len() * len_name];
    for (row, name) in buf.chunks_mut(len_name).zip(names) {
        let bytes = name.as_bytes();
        let n = bytes.len().min(len_name - 1);
        row[..n].copy_from_slice(&bytes[..n]);
    }
    let mut var = file.add_variable_with_type(
        var_name,
        &[count_dim, "len_name"],
        &VariableType::Basic(BasicType::Char),
    )?;
    var.put_raw_values(&buf, [0..names.len(), 0..len_name].as_slice())?;
    Ok(())
}

/// One name and value vector per component, tuple-major input.
fn expand(arrays: &DataArrays) -> (Vec<String>, Vec<Vec<f64>>) {
    let mut names = Vec::new();
    let mut values = Vec::new();
    for array in arrays.iter() {
        names.extend(component_names(&array.name, array.num_components));
        values.extend(split_components(&array.values, array.num_components));
    }
    (names, values)
}

/// One name and value per flattened field array entry.
fn expand_globals(arrays: &DataArrays) -> (Vec<String>, Vec<f64>) {
    let mut names = Vec::new();
    let mut values = Vec::new();
    for array in arrays.iter() {
        names.extend(global_names(&array.name, array.values.len(), array.num_components));
        values.extend_from_slice(&array.values);
    }
    (names, values)
}
