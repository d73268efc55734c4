use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::bond::BondChannel;
use crate::fragment::FragmentGraph;
use crate::valence::ValenceCounts;

struct Fnv1aHasher(u64);

impl Fnv1aHasher {
    fn new() -> Self {
        Self(0xcbf29ce484222325)
    }
}

impl Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(0x100000001b3);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct GroupInvariant {
    block: usize,
    full: (u8, u8, u8),
    remaining: (u8, u8, u8),
    degree: usize,
    /// `(own channel, neighbour channel)` for each incident bond, sorted.
    bond_channels: Vec<(BondChannel, BondChannel)>,
}

/// Channel pair of a bond as seen from `idx`: `(own channel, far channel)`.
fn channels_from(
    graph: &FragmentGraph,
    idx: NodeIndex,
    edge: EdgeIndex,
) -> (BondChannel, BondChannel) {
    let g = graph.graph();
    let bond = &g[edge];
    match g.edge_endpoints(edge) {
        Some((head, _)) if head == idx => (bond.head_channel, bond.tail_channel),
        _ => (bond.tail_channel, bond.head_channel),
    }
}

/// Channels spent at `idx`'s end and at the far end of each incident bond.
fn incident_channels(graph: &FragmentGraph, idx: NodeIndex) -> Vec<(BondChannel, BondChannel)> {
    let mut channels: Vec<(BondChannel, BondChannel)> = graph
        .graph()
        .edges(idx)
        .map(|e| channels_from(graph, idx, e.id()))
        .collect();
    channels.sort_unstable();
    channels
}

/// Neighbour ranks tagged with the channel pair of the connecting bond,
/// sorted. Two groups tie only if their neighbours are reached through the
/// same channels.
fn neighbour_signature(
    graph: &FragmentGraph,
    idx: NodeIndex,
    ranks: &[usize],
) -> Vec<(usize, BondChannel, BondChannel)> {
    let mut sig: Vec<_> = graph
        .graph()
        .edges(idx)
        .map(|e| {
            let far = if e.source() == idx { e.target() } else { e.source() };
            let (own, other) = channels_from(graph, idx, e.id());
            (ranks[far.index()], own, other)
        })
        .collect();
    sig.sort_unstable();
    sig
}

fn triple(v: ValenceCounts) -> (u8, u8, u8) {
    (v.va, v.vb, v.vc)
}

fn group_invariant(graph: &FragmentGraph, idx: NodeIndex) -> GroupInvariant {
    let group = &graph.graph()[idx];
    GroupInvariant {
        block: group.block,
        full: triple(group.full),
        remaining: triple(group.remaining),
        degree: graph.graph().neighbors(idx).count(),
        bond_channels: incident_channels(graph, idx),
    }
}

fn hash_invariant(inv: &GroupInvariant) -> u64 {
    let mut h = Fnv1aHasher::new();
    inv.hash(&mut h);
    h.finish()
}

fn ranks_from_values(values: &[u64]) -> Vec<usize> {
    let n = values.len();
    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by_key(|&i| values[i]);
    let mut ranks = vec![0usize; n];
    for i in 1..n {
        ranks[indices[i]] = if values[indices[i]] == values[indices[i - 1]] {
            ranks[indices[i - 1]]
        } else {
            i
        };
    }
    ranks
}

fn count_distinct(ranks: &[usize]) -> usize {
    let mut sorted: Vec<usize> = ranks.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted.len()
}

fn morgan_refine(graph: &FragmentGraph, ranks: &mut Vec<usize>) {
    let g = graph.graph();
    let n = g.node_count();
    let mut prev_distinct = count_distinct(ranks);

    loop {
        let mut new_values = vec![0u64; n];
        for node in g.node_indices() {
            let i = node.index();
            let mut h = Fnv1aHasher::new();
            ranks[i].hash(&mut h);
            neighbour_signature(graph, node, ranks).hash(&mut h);
            new_values[i] = h.finish();
        }
        let new_ranks = ranks_from_values(&new_values);
        let distinct = count_distinct(&new_ranks);
        if distinct <= prev_distinct {
            return;
        }
        *ranks = new_ranks;
        prev_distinct = distinct;
    }
}

fn break_ties(graph: &FragmentGraph, ranks: &mut Vec<usize>, invariants: &[GroupInvariant]) {
    let n = ranks.len();

    while count_distinct(ranks) < n {
        let Some(min_tied_rank) = smallest_tied_rank(ranks) else {
            return;
        };
        let tied: Vec<usize> = (0..n).filter(|&i| ranks[i] == min_tied_rank).collect();
        let max_rank = ranks.iter().copied().max().unwrap_or(0);

        // Promote each tied group in turn and keep the promotion whose
        // resulting trace is smallest; the trace never mentions node indices.
        let mut best: Option<(Vec<u64>, Vec<usize>)> = None;
        for &candidate in &tied {
            let mut trial = ranks.clone();
            trial[candidate] = max_rank + 1;
            morgan_refine(graph, &mut trial);
            let mut order: Vec<usize> = (0..n).collect();
            order.sort_by_key(|&i| trial[i]);
            let trace: Vec<u64> = order
                .iter()
                .map(|&i| {
                    let mut h = Fnv1aHasher::new();
                    invariants[i].hash(&mut h);
                    neighbour_signature(graph, NodeIndex::new(i), &trial).hash(&mut h);
                    h.finish()
                })
                .collect();
            if best.as_ref().is_none_or(|(t, _)| trace < *t) {
                best = Some((trace, trial));
            }
        }
        match best {
            Some((_, trial)) => *ranks = trial,
            None => return,
        }
    }
}

fn smallest_tied_rank(ranks: &[usize]) -> Option<usize> {
    let mut counts = HashMap::new();
    for &r in ranks {
        *counts.entry(r).or_insert(0usize) += 1;
    }
    counts
        .into_iter()
        .filter(|&(_, count)| count > 1)
        .map(|(rank, _)| rank)
        .min()
}

/// Canonical position of every node (indexed by petgraph node index).
pub fn canonical_ordering(graph: &FragmentGraph) -> Vec<usize> {
    let n = graph.node_count();
    if n == 0 {
        return Vec::new();
    }

    let invariants: Vec<GroupInvariant> = (0..n)
        .map(|i| group_invariant(graph, NodeIndex::new(i)))
        .collect();
    let initial: Vec<u64> = invariants.iter().map(hash_invariant).collect();
    let mut ranks = ranks_from_values(&initial);

    morgan_refine(graph, &mut ranks);
    if count_distinct(&ranks) < n {
        break_ties(graph, &mut ranks, &invariants);
    }

    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by_key(|&i| ranks[i]);
    let mut final_ranks = vec![0usize; n];
    for (rank, &i) in indices.iter().enumerate() {
        final_ranks[i] = rank;
    }
    final_ranks
}

/// A relabeling of a fragment into canonical node order.
///
/// Equal forms always describe isomorphic fragments, since the form is the
/// whole labeled graph under a permutation. Tie breaking between
/// symmetry-equivalent groups is greedy, so isomorphic fragments with
/// unusual symmetry may still produce different forms.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalForm {
    /// `(block, remaining valence)` in canonical order.
    pub nodes: Vec<(usize, ValenceCounts)>,
    /// `(rank, channel at rank, rank, channel at rank)` with the smaller
    /// rank first, sorted.
    pub bonds: Vec<(usize, BondChannel, usize, BondChannel)>,
}

impl CanonicalForm {
    pub fn of(graph: &FragmentGraph) -> Self {
        let ranks = canonical_ordering(graph);
        let g = graph.graph();

        let mut nodes = vec![(0, ValenceCounts::default()); ranks.len()];
        for idx in g.node_indices() {
            let group = &g[idx];
            nodes[ranks[idx.index()]] = (group.block, group.remaining);
        }

        let mut bonds: Vec<_> = g
            .edge_references()
            .map(|e| {
                let bond = e.weight();
                let h = (ranks[e.source().index()], bond.head_channel);
                let t = (ranks[e.target().index()], bond.tail_channel);
                let (a, b) = if h.0 <= t.0 { (h, t) } else { (t, h) };
                (a.0, a.1, b.0, b.1)
            })
            .collect();
        bonds.sort_unstable();

        Self { nodes, bonds }
    }
}
