use std::fmt;

use tracing::trace;

use crate::fragment::FragmentGraph;
use crate::spectral::quantized_spectrum;
use crate::valence::ValenceSummary;

/// Spectral section written for a fragment with no nodes.
const EMPTY_SPECTRUM_SENTINEL: i64 = 0;

/// Memoization key for a fragment state.
///
/// Layout: the quantized, sorted normalized-Laplacian spectrum as
/// little-endian `i64` (a single zero for the empty fragment), then the
/// `total`, `va`, `vb` and `vc` valence arrays as little-endian `u32`, then
/// the composition vector as little-endian `u32`.
///
/// Two states with equal keys are treated as the same state. The spectrum
/// is not a complete graph invariant (cospectral, non-isomorphic fragments
/// exist), so equal keys do not prove isomorphism; use
/// [`FragmentState::is_isomorphic_to`](crate::FragmentState::is_isomorphic_to)
/// where that matters.
///
/// The reverse also holds: the valence arrays are indexed by composite id,
/// so isomorphic fragments whose groups received their slots in a different
/// order can get different keys. For an order-independent identity compare
/// [`CanonicalForm`](crate::CanonicalForm)s or use `is_isomorphic_to`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateKey(Vec<u8>);

impl StateKey {
    pub fn compute(graph: &FragmentGraph, valence: &ValenceSummary, group_count: &[u32]) -> Self {
        let spectrum = if graph.is_empty() {
            vec![EMPTY_SPECTRUM_SENTINEL]
        } else {
            quantized_spectrum(graph)
        };

        let mut bytes =
            Vec::with_capacity(8 * spectrum.len() + 4 * (4 * valence.len() + group_count.len()));
        for ev in &spectrum {
            bytes.extend_from_slice(&ev.to_le_bytes());
        }
        valence.write_bytes(&mut bytes);
        for c in group_count {
            bytes.extend_from_slice(&c.to_le_bytes());
        }
        trace!(
            nodes = graph.node_count(),
            len = bytes.len(),
            "computed state key"
        );
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for StateKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateKey(")?;
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        write!(f, ")")
    }
}
