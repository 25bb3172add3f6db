//! Read/write options and the JSON I/O configuration file.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReadOptions {
    /// Time step to load from Exodus files. `None` keeps the reader default
    /// (the first step).
    pub timestep: Option<usize>,
}

/// Encoding of legacy `.vtk` output.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LegacyEncoding {
    #[default]
    Ascii,
    /// Big-endian binary
    Binary,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WriteOptions {
    /// Title line (legacy VTK) or Exodus `title` attribute
    pub title: String,
    pub legacy_encoding: LegacyEncoding,
    /// Number of `.vtu` pieces written for parallel VTK XML output
    pub pieces: usize,
    /// Time value stored with the single Exodus result step
    pub time_value: f64,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            title: "mesh-io".to_string(),
            legacy_encoding: LegacyEncoding::Ascii,
            pieces: 1,
            time_value: 0.0,
        }
    }
}

/// Options loaded from a JSON config file. Missing keys keep their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IoConfig {
    pub read: ReadOptions,
    pub write: WriteOptions,
}

pub fn save_config(path: impl AsRef<Path>, config: &IoConfig) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let bytes = serde_json::to_vec_pretty(config)?;
    fs::write(path, bytes)?;
    Ok(())
}

pub fn load_config(path: impl AsRef<Path>) -> Result<IoConfig> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}
