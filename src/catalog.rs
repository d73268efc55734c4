//! Building-block reference data.
//!
//! A [`Catalog`] lists every building-block type available to an assembly
//! problem. Types are addressed by 1-based index: the first entry is type
//! `1`. The catalog is immutable once built and is usually shared behind an
//! [`Arc`](std::sync::Arc) by every [`Case`](crate::Case) that draws on it.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::valence::ValenceCounts;

/// One building-block type.
///
/// # Examples
///
/// ```
/// use fragcrab::BuildingBlock;
///
/// let carbonyl = BuildingBlock {
///     total_valence: 2,
///     va: 1,
///     vb: 1,
///     vc: 0,
///     aromatic: false,
///     cyclic: false,
/// };
/// assert!(carbonyl.is_consistent());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildingBlock {
    /// Total number of bonds the group can form. Must equal `va + vb + vc`.
    pub total_valence: u8,
    pub va: u8,
    pub vb: u8,
    pub vc: u8,
    #[serde(default)]
    pub aromatic: bool,
    #[serde(default)]
    pub cyclic: bool,
}

impl BuildingBlock {
    pub fn is_consistent(&self) -> bool {
        u16::from(self.total_valence)
            == u16::from(self.va) + u16::from(self.vb) + u16::from(self.vc)
    }

    pub fn valence(&self) -> ValenceCounts {
        ValenceCounts {
            total: self.total_valence,
            va: self.va,
            vb: self.vb,
            vc: self.vc,
        }
    }
}

/// Errors raised while building or loading a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The catalog has no entries.
    Empty,
    /// A type's total valence disagrees with the sum of its channels.
    InconsistentValence {
        index: usize,
        total_valence: u8,
        channel_sum: u16,
    },
    /// The JSON document could not be decoded.
    Parse(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "catalog has no building blocks"),
            Self::InconsistentValence {
                index,
                total_valence,
                channel_sum,
            } => write!(
                f,
                "building block {}: total valence {} but va + vb + vc = {}",
                index, total_valence, channel_sum
            ),
            Self::Parse(msg) => write!(f, "invalid catalog document: {msg}"),
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

#[derive(Deserialize)]
struct CatalogDocument {
    blocks: Vec<BuildingBlock>,
}

/// Validated, immutable table of building-block types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    blocks: Vec<BuildingBlock>,
}

impl Catalog {
    pub fn new(blocks: Vec<BuildingBlock>) -> Result<Self, CatalogError> {
        if blocks.is_empty() {
            return Err(CatalogError::Empty);
        }
        for (i, block) in blocks.iter().enumerate() {
            if !block.is_consistent() {
                return Err(CatalogError::InconsistentValence {
                    index: i + 1,
                    total_valence: block.total_valence,
                    channel_sum: u16::from(block.va) + u16::from(block.vb) + u16::from(block.vc),
                });
            }
        }
        debug!(blocks = blocks.len(), "loaded building-block catalog");
        Ok(Self { blocks })
    }

    /// Reads `{"blocks": [...]}`; the `i`-th entry becomes type `i + 1`.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let doc: CatalogDocument = serde_json::from_str(json)?;
        Self::new(doc.blocks)
    }

    /// Number of building-block types, which is also the highest valid index.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Entry for a 1-based type index.
    pub fn get(&self, index: usize) -> Option<&BuildingBlock> {
        index.checked_sub(1).and_then(|i| self.blocks.get(i))
    }

    pub fn contains(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// `(index, block)` pairs with 1-based indices.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &BuildingBlock)> + '_ {
        self.blocks.iter().enumerate().map(|(i, b)| (i + 1, b))
    }

    fn indices_where(&self, pred: impl Fn(&BuildingBlock) -> bool) -> Vec<usize> {
        self.iter().filter(|(_, b)| pred(b)).map(|(i, _)| i).collect()
    }

    pub fn aromatics(&self) -> Vec<usize> {
        self.indices_where(|b| b.aromatic)
    }

    pub fn nonaromatics(&self) -> Vec<usize> {
        self.indices_where(|b| !b.aromatic)
    }

    pub fn cyclics(&self) -> Vec<usize> {
        self.indices_where(|b| b.cyclic)
    }

    pub fn noncyclics(&self) -> Vec<usize> {
        self.indices_where(|b| !b.cyclic)
    }
}
