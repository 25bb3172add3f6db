//! File format tags.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::MeshIoError;

/// On-disk mesh formats understood by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    /// Legacy VTK unstructured grid (`.vtk`)
    LegacyVtk,
    /// VTK XML unstructured grid (`.vtu`)
    VtkXml,
    /// Partitioned VTK XML unstructured grid (`.pvtu`), write-only
    ParallelVtkXml,
    /// NetCDF-based Exodus II analysis format (`.e`, `.exo`)
    Exodus,
}

impl FileFormat {
    pub const ALL: [FileFormat; 4] = [
        FileFormat::LegacyVtk,
        FileFormat::VtkXml,
        FileFormat::ParallelVtkXml,
        FileFormat::Exodus,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            FileFormat::LegacyVtk => "legacy-vtk",
            FileFormat::VtkXml => "vtk-xml",
            FileFormat::ParallelVtkXml => "parallel-vtk-xml",
            FileFormat::Exodus => "analysis-format",
        }
    }

    pub fn can_read(self) -> bool {
        !matches!(self, FileFormat::ParallelVtkXml)
    }

    /// Guess the format from a file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "vtk" => Some(FileFormat::LegacyVtk),
            "vtu" => Some(FileFormat::VtkXml),
            "pvtu" => Some(FileFormat::ParallelVtkXml),
            "e" | "exo" | "ex2" | "exii" => Some(FileFormat::Exodus),
            _ => None,
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for FileFormat {
    type Err = MeshIoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy-vtk" | "vtk" => Ok(FileFormat::LegacyVtk),
            "vtk-xml" | "vtu" => Ok(FileFormat::VtkXml),
            "parallel-vtk-xml" | "pvtu" => Ok(FileFormat::ParallelVtkXml),
            "analysis-format" | "exodus" | "exo" | "e" => Ok(FileFormat::Exodus),
            _ => Err(MeshIoError::UnknownFormat(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_tags_and_aliases() {
        for format in FileFormat::ALL {
            assert_eq!(format.tag().parse::<FileFormat>().unwrap(), format);
        }
        assert_eq!("vtu".parse::<FileFormat>().unwrap(), FileFormat::VtkXml);
        assert_eq!("Exodus".parse::<FileFormat>().unwrap(), FileFormat::Exodus);
    }

    #[test]
    fn rejects_unknown_tag() {
        let err = "stl".parse::<FileFormat>().expect_err("stl is not supported");
        assert!(matches!(err, MeshIoError::UnknownFormat(tag) if tag == "stl"));
    }

    #[test]
    fn guesses_format_from_extension() {
        assert_eq!(FileFormat::from_path("a/b/mesh.VTK"), Some(FileFormat::LegacyVtk));
        assert_eq!(FileFormat::from_path("out.pvtu"), Some(FileFormat::ParallelVtkXml));
        assert_eq!(FileFormat::from_path("result.exo"), Some(FileFormat::Exodus));
        assert_eq!(FileFormat::from_path("mesh.msh"), None);
        assert_eq!(FileFormat::from_path("noext"), None);
    }

    #[test]
    fn parallel_xml_is_write_only() {
        assert!(!FileFormat::ParallelVtkXml.can_read());
        assert!(FileFormat::LegacyVtk.can_read());
    }
}
