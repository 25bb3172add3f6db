pub mod convert;
pub mod info;

use std::path::Path;

use anyhow::{Context, Result};
use mesh_io::FileFormat;

/// Use the explicit format tag if given, otherwise guess from the extension.
pub fn resolve_format(tag: Option<&str>, path: &Path) -> Result<FileFormat> {
    match tag {
        Some(tag) => Ok(tag.parse()?),
        None => FileFormat::from_path(path)
            .with_context(|| format!("cannot infer format of {}; pass it explicitly", path.display())),
    }
}
