//! Cell type codes.
//!
//! Numbering follows the VTK cell type ids so the codes can be written to
//! VTK files unchanged.

/// Cell types carried by [`UnstructuredGrid`](super::UnstructuredGrid)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellType {
    Vertex = 1,
    PolyVertex = 2,
    Line = 3,
    PolyLine = 4,
    Triangle = 5,
    TriangleStrip = 6,
    Polygon = 7,
    Pixel = 8,
    Quad = 9,
    Tetra = 10,
    Voxel = 11,
    Hexahedron = 12,
    Wedge = 13,
    Pyramid = 14,
    QuadraticEdge = 21,
    QuadraticTriangle = 22,
    QuadraticQuad = 23,
    QuadraticTetra = 24,
    QuadraticHexahedron = 25,
}

/// Nodes per cell to cell type, used when building a grid from a uniform cell array.
pub const NODES_PER_CELL_TO_TYPE: [(usize, CellType); 3] = [
    (2, CellType::Line),
    (3, CellType::Triangle),
    (4, CellType::Tetra),
];

/// Look up the cell type implied by a uniform node count.
pub fn cell_type_for_nodes(nodes_per_cell: usize) -> Option<CellType> {
    NODES_PER_CELL_TO_TYPE
        .iter()
        .find(|(n, _)| *n == nodes_per_cell)
        .map(|(_, ty)| *ty)
}

impl CellType {
    pub fn vtk_id(self) -> u8 {
        self as u8
    }

    pub fn from_vtk_id(id: u8) -> Option<Self> {
        let ty = match id {
            1 => CellType::Vertex,
            2 => CellType::PolyVertex,
            3 => CellType::Line,
            4 => CellType::PolyLine,
            5 => CellType::Triangle,
            6 => CellType::TriangleStrip,
            7 => CellType::Polygon,
            8 => CellType::Pixel,
            9 => CellType::Quad,
            10 => CellType::Tetra,
            11 => CellType::Voxel,
            12 => CellType::Hexahedron,
            13 => CellType::Wedge,
            14 => CellType::Pyramid,
            21 => CellType::QuadraticEdge,
            22 => CellType::QuadraticTriangle,
            23 => CellType::QuadraticQuad,
            24 => CellType::QuadraticTetra,
            25 => CellType::QuadraticHexahedron,
            _ => return None,
        };
        Some(ty)
    }

    /// Exodus II element type name.
    pub fn exodus_name(self) -> &'static str {
        match self {
            CellType::Vertex | CellType::PolyVertex => "SPHERE",
            CellType::Line | CellType::PolyLine => "BAR2",
            CellType::QuadraticEdge => "BAR3",
            CellType::Triangle | CellType::TriangleStrip => "TRI3",
            CellType::QuadraticTriangle => "TRI6",
            CellType::Polygon => "NSIDED",
            CellType::Pixel | CellType::Quad => "QUAD4",
            CellType::QuadraticQuad => "QUAD8",
            CellType::Tetra => "TETRA4",
            CellType::QuadraticTetra => "TETRA10",
            CellType::Voxel | CellType::Hexahedron => "HEX8",
            CellType::QuadraticHexahedron => "HEX20",
            CellType::Wedge => "WEDGE6",
            CellType::Pyramid => "PYRAMID5",
        }
    }

    /// Interpret an Exodus II element type name; the node count picks linear
    /// or quadratic variants.
    pub fn from_exodus_name(name: &str, nodes_per_cell: usize) -> Option<Self> {
        let upper = name.trim().to_ascii_uppercase();
        let family = upper.trim_end_matches(|c: char| c.is_ascii_digit());
        let ty = match (family, nodes_per_cell) {
            ("SPHERE" | "CIRCLE", 1) => CellType::Vertex,
            ("BAR" | "BEAM" | "TRUSS" | "EDGE", 2) => CellType::Line,
            ("BAR" | "BEAM" | "TRUSS" | "EDGE", 3) => CellType::QuadraticEdge,
            ("TRI" | "TRIANGLE" | "TRISHELL", 3) => CellType::Triangle,
            ("TRI" | "TRIANGLE" | "TRISHELL", 6) => CellType::QuadraticTriangle,
            ("QUAD" | "SHELL", 4) => CellType::Quad,
            ("QUAD" | "SHELL", 8) => CellType::QuadraticQuad,
            ("TET" | "TETRA", 4) => CellType::Tetra,
            ("TET" | "TETRA", 10) => CellType::QuadraticTetra,
            ("HEX" | "HEXAHEDRON", 8) => CellType::Hexahedron,
            ("HEX" | "HEXAHEDRON", 20) => CellType::QuadraticHexahedron,
            ("WEDGE", 6) => CellType::Wedge,
            ("PYRAMID", 5) => CellType::Pyramid,
            _ => return None,
        };
        Some(ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_count_table() {
        assert_eq!(cell_type_for_nodes(2), Some(CellType::Line));
        assert_eq!(cell_type_for_nodes(3), Some(CellType::Triangle));
        assert_eq!(cell_type_for_nodes(4), Some(CellType::Tetra));
        assert_eq!(cell_type_for_nodes(5), None);
        assert_eq!(cell_type_for_nodes(0), None);
    }

    #[test]
    fn vtk_ids_roundtrip() {
        for id in 0u8..30 {
            if let Some(ty) = CellType::from_vtk_id(id) {
                assert_eq!(ty.vtk_id(), id);
            }
        }
        assert_eq!(CellType::Tetra.vtk_id(), 10);
        assert_eq!(CellType::from_vtk_id(42), None);
    }

    #[test]
    fn exodus_names() {
        assert_eq!(CellType::from_exodus_name("TETRA4", 4), Some(CellType::Tetra));
        assert_eq!(CellType::from_exodus_name("tetra", 10), Some(CellType::QuadraticTetra));
        assert_eq!(CellType::from_exodus_name("TRI3", 3), Some(CellType::Triangle));
        assert_eq!(CellType::from_exodus_name("BAR2", 2), Some(CellType::Line));
        assert_eq!(CellType::from_exodus_name("SUPERELEMENT", 4), None);
        for (n, ty) in NODES_PER_CELL_TO_TYPE {
            assert_eq!(CellType::from_exodus_name(ty.exodus_name(), n), Some(ty));
        }
    }
}
