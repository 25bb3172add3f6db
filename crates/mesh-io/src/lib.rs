//! Mesh format conversion between VTK and Exodus II.
//!
//! This crate provides:
//! - **Legacy VTK** (`.vtk`) read/write, ASCII or binary
//! - **VTK XML** (`.vtu`) read/write
//! - **Parallel VTK XML** (`.pvtu`) write
//! - **Exodus II** (`.e`, `.exo`) read/write via NetCDF (enable the `exodus` feature)
//!
//! All formats go through a common [`Mesh`]: an `N × D` point array, a uniform
//! `M × K` cell array and named point, cell and field attributes.
//!
//! ```rust,no_run
//! use mesh_io::{FileFormat, read, write};
//!
//! let mesh = read(FileFormat::LegacyVtk, "beam.vtk")?;
//! write(FileFormat::VtkXml, "beam.vtu", &mesh)?;
//! # Ok::<(), mesh_io::MeshIoError>(())
//! ```

pub mod attributes;
pub mod builder;
pub mod connectivity;
pub mod error;
pub mod exodus;
pub mod format;
pub mod grid;
mod io;
mod mesh;
pub mod options;
pub mod pvtu;
pub mod resolver;
pub mod vtk;

pub use attributes::{AttributeMap, extract, inject, inject_unchanged};
pub use builder::build_grid;
pub use error::{MeshIoError, Result};
pub use format::FileFormat;
pub use grid::{CellType, DataArray, DataArrays, MultiBlock, NamedArrays, UnstructuredGrid};
pub use io::{read, read_with_options, write, write_with_options};
pub use mesh::Mesh;
pub use options::{IoConfig, LegacyEncoding, ReadOptions, WriteOptions, load_config, save_config};
pub use resolver::{ResultKind, ResultSource, resolve};

#[cfg(feature = "exodus")]
pub use exodus::ExodusReader;
