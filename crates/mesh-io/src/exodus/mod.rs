//! Exodus II analysis-format backend (NetCDF based).
//!
//! The reader and writer need the system NetCDF library and are only built
//! with the `exodus` feature. Component naming is always available.

pub mod components;

#[cfg(feature = "exodus")]
mod reader;
#[cfg(feature = "exodus")]
mod writer;

#[cfg(feature = "exodus")]
pub use reader::ExodusReader;
#[cfg(feature = "exodus")]
pub use writer::write_exodus;

/// Name of the block group holding element blocks.
pub const ELEMENT_BLOCKS: &str = "Element Blocks";
/// Name of the (always empty) node set group.
pub const NODE_SETS: &str = "Node Sets";
