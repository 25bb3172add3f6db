//! Hierarchical block container returned by the Exodus reader.

use super::UnstructuredGrid;

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Grid(Box<UnstructuredGrid>),
    MultiBlock(MultiBlock),
}

impl Block {
    pub fn is_unstructured_grid(&self) -> bool {
        matches!(self, Block::Grid(_))
    }

    pub fn as_multiblock(&self) -> Option<&MultiBlock> {
        match self {
            Block::MultiBlock(mb) => Some(mb),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedBlock {
    pub name: String,
    pub block: Block,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiBlock {
    blocks: Vec<NamedBlock>,
}

impl MultiBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, block: Block) {
        self.blocks.push(NamedBlock {
            name: name.into(),
            block,
        });
    }

    pub fn with_block(mut self, name: impl Into<String>, block: Block) -> Self {
        self.push(name, block);
        self
    }

    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedBlock> {
        self.blocks.iter()
    }
}

impl IntoIterator for MultiBlock {
    type Item = NamedBlock;
    type IntoIter = std::vec::IntoIter<NamedBlock>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.into_iter()
    }
}
