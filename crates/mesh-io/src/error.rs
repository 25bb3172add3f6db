//! Error types for mesh-io

use thiserror::Error;

use crate::format::FileFormat;

pub type Result<T> = std::result::Result<T, MeshIoError>;

#[derive(Error, Debug)]
pub enum MeshIoError {
    #[error("Unknown file format: {0}")]
    UnknownFormat(String),

    #[error("Format support not compiled in: {0} (rebuild with the `exodus` feature)")]
    FormatUnavailable(FileFormat),

    #[error("Connectivity buffer violates uniform cell size at position {position}: expected {expected}, found {found}")]
    FormatInvariantViolation {
        position: usize,
        expected: u64,
        found: u64,
    },

    #[error("Expected exactly one unstructured grid in the block tree, found {found}")]
    AmbiguousGrid { found: usize },

    #[error("Unsupported cell type with {nodes_per_cell} nodes per cell")]
    UnsupportedCellType { nodes_per_cell: usize },

    #[error("Time step {requested} out of range ({available} available)")]
    TimeStepOutOfRange { requested: usize, available: usize },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("VTK error: {0}")]
    Vtk(#[from] vtkio::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "exodus")]
    #[error("NetCDF error: {0}")]
    NetCdf(#[from] netcdf::error::Error),
}

impl MeshIoError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        MeshIoError::InvalidData(message.into())
    }
}
