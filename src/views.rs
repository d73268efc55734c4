//! Read-only projections of a state's composition, for reward shaping and
//! policy features.
//!
//! "Full" vectors are indexed by catalog position (`catalog index - 1`) and
//! span the whole catalog; the state's own composition vector only covers
//! the selected building blocks.

use serde::Serialize;

use crate::state::FragmentState;

/// Flattened observation of a state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Observation {
    pub group_counts: Vec<u32>,
    pub vtotal: Vec<u32>,
    pub va: Vec<u32>,
    pub vb: Vec<u32>,
    pub vc: Vec<u32>,
}

impl FragmentState {
    /// Composition vector expanded over the whole catalog.
    pub fn full_vector(&self) -> Vec<u32> {
        let mut fv = vec![0; self.case().catalog().len()];
        for (&index, &count) in self.bb().iter().zip(self.group_count()) {
            fv[index - 1] = count;
        }
        fv
    }

    fn full_vector_at(&self, indices: &[usize]) -> Vec<u32> {
        let fv = self.full_vector();
        indices.iter().map(|&i| fv[i - 1]).collect()
    }

    /// Counts of every aromatic catalog type, in catalog order.
    pub fn aromatics(&self) -> Vec<u32> {
        self.full_vector_at(&self.case().catalog().aromatics())
    }

    pub fn nonaromatics(&self) -> Vec<u32> {
        self.full_vector_at(&self.case().catalog().nonaromatics())
    }

    pub fn cyclics(&self) -> Vec<u32> {
        self.full_vector_at(&self.case().catalog().cyclics())
    }

    pub fn noncyclics(&self) -> Vec<u32> {
        self.full_vector_at(&self.case().catalog().noncyclics())
    }

    pub fn aromatic_count(&self) -> u32 {
        self.full_vector_at(&self.case().aromatic_blocks()).iter().sum()
    }

    pub fn nonaromatic_count(&self) -> u32 {
        self.full_vector_at(&self.case().nonaromatic_blocks()).iter().sum()
    }

    pub fn cyclic_count(&self) -> u32 {
        self.full_vector_at(&self.case().cyclic_blocks()).iter().sum()
    }

    pub fn noncyclic_count(&self) -> u32 {
        self.full_vector_at(&self.case().noncyclic_blocks()).iter().sum()
    }

    /// Total number of groups placed.
    pub fn total_groups(&self) -> u32 {
        self.group_count().iter().sum()
    }

    /// Instances of catalog type `index` (1-based); zero for types that were
    /// not selected or do not exist.
    pub fn count_of(&self, index: usize) -> u32 {
        self.case()
            .short_index(index)
            .map_or(0, |i| self.group_count()[i])
    }

    /// Number of placed groups whose building block has a total valence of
    /// at least `v`.
    pub fn groups_with_valence_at_least(&self, v: u8) -> u32 {
        self.group_count()
            .iter()
            .enumerate()
            .filter(|&(i, _)| self.case().block(i).is_some_and(|b| b.total_valence >= v))
            .map(|(_, &c)| c)
            .sum()
    }

    pub fn observation(&self) -> Observation {
        let valence = self.valence();
        Observation {
            group_counts: self.group_count().to_vec(),
            vtotal: valence.total.clone(),
            va: valence.va.clone(),
            vb: valence.vb.clone(),
            vc: valence.vc.clone(),
        }
    }
}
