use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use crate::catalog::{BuildingBlock, Catalog, CatalogError};

/// Errors raised while setting up an assembly case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseError {
    /// No building blocks were selected.
    NoBuildingBlocks,
    /// A selected index does not exist in the catalog.
    UnknownBuildingBlock { index: usize, catalog_len: usize },
    /// The same catalog type was selected twice.
    DuplicateBuildingBlock { index: usize },
    Catalog(CatalogError),
}

impl fmt::Display for CaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoBuildingBlocks => write!(f, "case selects no building blocks"),
            Self::UnknownBuildingBlock { index, catalog_len } => write!(
                f,
                "building block {} not in catalog (1..={})",
                index, catalog_len
            ),
            Self::DuplicateBuildingBlock { index } => {
                write!(f, "building block {} selected more than once", index)
            }
            Self::Catalog(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CaseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Catalog(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CatalogError> for CaseError {
    fn from(e: CatalogError) -> Self {
        Self::Catalog(e)
    }
}

impl From<serde_json::Error> for CaseError {
    fn from(e: serde_json::Error) -> Self {
        Self::Catalog(CatalogError::from(e))
    }
}

#[derive(Deserialize)]
struct CaseDocument {
    catalog: CatalogBlocks,
    bb: Vec<usize>,
}

#[derive(Deserialize)]
struct CatalogBlocks {
    blocks: Vec<BuildingBlock>,
}

/// One assembly problem: a catalog and the building blocks chosen from it.
///
/// `bb` holds 1-based catalog indices in ascending order. Position `i` in
/// `bb` is the short-form index `i` used by composition vectors, actions and
/// composite node ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Case {
    catalog: Arc<Catalog>,
    bb: Vec<usize>,
}

impl Case {
    pub fn new(catalog: Arc<Catalog>, mut bb: Vec<usize>) -> Result<Self, CaseError> {
        if bb.is_empty() {
            return Err(CaseError::NoBuildingBlocks);
        }
        bb.sort_unstable();
        for w in bb.windows(2) {
            if w[0] == w[1] {
                return Err(CaseError::DuplicateBuildingBlock { index: w[0] });
            }
        }
        if let Some(&index) = bb.iter().find(|&&i| !catalog.contains(i)) {
            return Err(CaseError::UnknownBuildingBlock {
                index,
                catalog_len: catalog.len(),
            });
        }
        Ok(Self { catalog, bb })
    }

    /// Reads `{"catalog": {"blocks": [...]}, "bb": [...]}`.
    pub fn from_json(json: &str) -> Result<Self, CaseError> {
        let doc: CaseDocument = serde_json::from_str(json)?;
        let catalog = Catalog::new(doc.catalog.blocks)?;
        Self::new(Arc::new(catalog), doc.bb)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn shared_catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    pub fn bb(&self) -> &[usize] {
        &self.bb
    }

    pub fn num_bb(&self) -> usize {
        self.bb.len()
    }

    /// Catalog index of the short-form block `block`.
    pub fn catalog_index(&self, block: usize) -> Option<usize> {
        self.bb.get(block).copied()
    }

    pub fn block(&self, block: usize) -> Option<&BuildingBlock> {
        self.catalog_index(block).and_then(|i| self.catalog.get(i))
    }

    /// Short-form position of a catalog index, if it was selected.
    pub fn short_index(&self, catalog_index: usize) -> Option<usize> {
        self.bb.binary_search(&catalog_index).ok()
    }

    fn selected_in(&self, class: &[usize]) -> Vec<usize> {
        self.bb
            .iter()
            .copied()
            .filter(|i| class.contains(i))
            .collect()
    }

    /// Selected catalog indices that are aromatic.
    pub fn aromatic_blocks(&self) -> Vec<usize> {
        self.selected_in(&self.catalog.aromatics())
    }

    pub fn nonaromatic_blocks(&self) -> Vec<usize> {
        self.selected_in(&self.catalog.nonaromatics())
    }

    pub fn cyclic_blocks(&self) -> Vec<usize> {
        self.selected_in(&self.catalog.cyclics())
    }

    pub fn noncyclic_blocks(&self) -> Vec<usize> {
        self.selected_in(&self.catalog.noncyclics())
    }
}
