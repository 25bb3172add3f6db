//! Cell connectivity codec.
//!
//! Converts between the count-prefixed flat buffer stored in
//! [`CellArray`](crate::grid::CellArray) and a rectangular `cells × nodes`
//! array. All cells of one mesh must have the same number of nodes.

use ndarray::Array2;

use crate::error::{MeshIoError, Result};

/// Decode a flat buffer `[k, v0, .., vk-1, k, ..]` holding `num_cells` cells
/// into a `num_cells × k` array.
pub fn decode(flat: &[u64], num_cells: usize) -> Result<Array2<usize>> {
    let Some(&k) = flat.first() else {
        if num_cells == 0 {
            return Ok(Array2::zeros((0, 0)));
        }
        return Err(MeshIoError::FormatInvariantViolation {
            position: 0,
            expected: 0,
            found: 0,
        });
    };

    let nodes = k as usize;
    let stride = nodes + 1;
    for cell in 0..num_cells {
        let position = cell * stride;
        match flat.get(position) {
            Some(&n) if n == k => {}
            found => {
                return Err(MeshIoError::FormatInvariantViolation {
                    position,
                    expected: k,
                    found: found.copied().unwrap_or(0),
                });
            }
        }
    }
    if flat.len() != num_cells * stride {
        return Err(MeshIoError::FormatInvariantViolation {
            position: num_cells * stride,
            expected: k,
            found: flat.get(num_cells * stride).copied().unwrap_or(0),
        });
    }

    let mut cells = Array2::zeros((num_cells, nodes));
    for (row, chunk) in cells.rows_mut().into_iter().zip(flat.chunks_exact(stride)) {
        for (dst, &v) in row.into_iter().zip(&chunk[1..]) {
            *dst = usize::try_from(v).map_err(|_| {
                MeshIoError::invalid(format!("vertex index {v} does not fit in usize"))
            })?;
        }
    }
    Ok(cells)
}

/// Encode a `cells × k` array as a flat buffer of length `cells · (k + 1)`.
pub fn encode(cells: &Array2<usize>) -> Vec<u64> {
    let (num_cells, k) = cells.dim();
    let mut flat = Vec::with_capacity(num_cells * (k + 1));
    for row in cells.rows() {
        flat.push(k as u64);
        flat.extend(row.iter().map(|&v| v as u64));
    }
    flat
}
