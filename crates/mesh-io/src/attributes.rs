//! Attribute extraction and injection.
//!
//! Moves named arrays between a [`NamedArrays`] container and an
//! [`AttributeMap`]. Single-component arrays map to 1-D arrays, arrays with
//! `c > 1` components to `tuples × c` arrays.
//!
//! Exodus files name vector components inconsistently: a 2-component vector `v`
//! comes back as `v_` while a 3-component one comes back as `v`. Injection for
//! the Exodus format appends [`EXODUS_NAME_DELIMITER`] to 3-column arrays so
//! both cases carry the trailing delimiter, which the block resolver strips on
//! read. The resolver only strips point data, so cell and field data go
//! through [`inject_unchanged`].

use std::collections::BTreeMap;

use ndarray::{ArrayD, IxDyn};

use crate::error::{MeshIoError, Result};
use crate::format::FileFormat;
use crate::grid::{DataArray, NamedArrays};

/// Attribute name to array.
pub type AttributeMap = BTreeMap<String, ArrayD<f64>>;

pub const EXODUS_NAME_DELIMITER: char = '_';

/// Copy every array of `container` into a map keyed by name.
pub fn extract(container: &impl NamedArrays) -> Result<AttributeMap> {
    let mut out = AttributeMap::new();
    for name in container.names() {
        let Some(array) = container.get(name) else {
            continue;
        };
        out.insert(name.to_string(), to_ndarray(array)?);
    }
    Ok(out)
}

/// Add every entry of `map` to `container`, applying the Exodus vector naming
/// fixup when `format` is [`FileFormat::Exodus`].
pub fn inject(map: &AttributeMap, container: &mut impl NamedArrays, format: FileFormat) -> Result<()> {
    for (name, values) in map {
        let mut name = name.clone();
        if needs_delimiter(&name, values, format) {
            name.push(EXODUS_NAME_DELIMITER);
        }
        container.add(from_ndarray(name, values)?);
    }
    Ok(())
}

/// Add every entry of `map` to `container` under its own name.
pub fn inject_unchanged(map: &AttributeMap, container: &mut impl NamedArrays) -> Result<()> {
    for (name, values) in map {
        container.add(from_ndarray(name.clone(), values)?);
    }
    Ok(())
}

/// Remove one trailing delimiter, if present.
pub fn strip_trailing_delimiter(name: &str) -> &str {
    name.strip_suffix(EXODUS_NAME_DELIMITER).unwrap_or(name)
}

fn needs_delimiter(name: &str, values: &ArrayD<f64>, format: FileFormat) -> bool {
    format == FileFormat::Exodus
        && values.ndim() == 2
        && values.shape()[1] == 3
        && !name.ends_with(EXODUS_NAME_DELIMITER)
}

fn to_ndarray(array: &DataArray) -> Result<ArrayD<f64>> {
    let shape = if array.num_components <= 1 {
        vec![array.values.len()]
    } else {
        vec![array.num_tuples(), array.num_components]
    };
    ArrayD::from_shape_vec(IxDyn(&shape), array.values.clone()).map_err(|err| {
        MeshIoError::invalid(format!(
            "array '{}' has {} values, not a multiple of {} components: {err}",
            array.name,
            array.values.len(),
            array.num_components
        ))
    })
}

fn from_ndarray(name: String, values: &ArrayD<f64>) -> Result<DataArray> {
    let num_components = match values.ndim() {
        0 | 1 => 1,
        2 => values.shape()[1],
        n => {
            return Err(MeshIoError::invalid(format!(
                "array '{name}' has rank {n}; only 1-D and 2-D arrays are supported"
            )));
        }
    };
    Ok(DataArray::new(name, num_components, values.iter().copied().collect()))
}
