pub mod bond;
pub mod canonical;
pub mod case;
pub mod catalog;
pub mod error;
pub mod fragment;
pub mod group;
pub mod signature;
pub mod spectral;
pub mod state;
pub mod valence;
pub mod views;

pub use bond::{Bond, BondChannel};
pub use canonical::{canonical_ordering, CanonicalForm};
pub use case::{Case, CaseError};
pub use catalog::{BuildingBlock, Catalog, CatalogError};
pub use error::StateError;
pub use fragment::FragmentGraph;
pub use group::{composite_id, GroupInstance, NodeAddress, SLOT_CAPACITY};
pub use signature::StateKey;
pub use state::{FragmentState, GroupAction, Rejection, Transition};
pub use valence::{ValenceCounts, ValenceSummary};
pub use views::Observation;

#[cfg(test)]
mod tests;
