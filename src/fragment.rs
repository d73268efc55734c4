use std::collections::BTreeMap;

use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::bond::{Bond, BondChannel};
use crate::error::StateError;
use crate::group::{GroupInstance, NodeAddress, SLOT_CAPACITY};

/// The undirected graph of placed groups and the bonds between them.
///
/// Nodes are addressed by composite id rather than by petgraph index, so two
/// fragments that placed the same groups agree on node names regardless of
/// the order the groups went in. Cloning performs a deep copy; no node data
/// is shared between clones.
#[derive(Clone)]
pub struct FragmentGraph {
    graph: UnGraph<GroupInstance, Bond>,
    index: BTreeMap<u32, NodeIndex>,
}

impl FragmentGraph {
    pub fn new() -> Self {
        Self {
            graph: UnGraph::default(),
            index: BTreeMap::new(),
        }
    }

    pub fn graph(&self) -> &UnGraph<GroupInstance, Bond> {
        &self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains(&self, composite_id: u32) -> bool {
        self.index.contains_key(&composite_id)
    }

    pub fn node_index(&self, composite_id: u32) -> Option<NodeIndex> {
        self.index.get(&composite_id).copied()
    }

    pub fn group(&self, composite_id: u32) -> Option<&GroupInstance> {
        self.node_index(composite_id).map(|idx| &self.graph[idx])
    }

    /// Groups in insertion order.
    pub fn groups(&self) -> impl Iterator<Item = &GroupInstance> + '_ {
        self.graph.node_weights()
    }

    /// Composite ids in ascending order.
    pub fn composite_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.index.keys().copied()
    }

    pub fn neighbors(&self, composite_id: u32) -> impl Iterator<Item = u32> + '_ {
        self.node_index(composite_id)
            .into_iter()
            .flat_map(move |idx| self.graph.neighbors(idx))
            .map(move |nb| self.graph[nb].composite_id())
    }

    pub fn degree(&self, composite_id: u32) -> usize {
        self.neighbors(composite_id).count()
    }

    /// Bonds as `(head, tail, bond)` composite-id triples.
    pub fn bonds(&self) -> impl Iterator<Item = (u32, u32, &Bond)> + '_ {
        self.graph.edge_references().map(move |e| {
            (
                self.graph[e.source()].composite_id(),
                self.graph[e.target()].composite_id(),
                e.weight(),
            )
        })
    }

    pub fn instance_count(&self, block: usize) -> usize {
        let lo = (block * SLOT_CAPACITY) as u32;
        let hi = lo + SLOT_CAPACITY as u32;
        self.index.range(lo..hi).count()
    }

    /// Address the next instance of `block` would take.
    ///
    /// Slots are handed out in order and never freed, so the next slot is
    /// the current instance count.
    pub fn allocate_node(&self, block: usize) -> Result<NodeAddress, StateError> {
        let count = self.instance_count(block);
        if count >= SLOT_CAPACITY {
            return Err(StateError::SlotCapacityExceeded {
                block,
                capacity: SLOT_CAPACITY,
            });
        }
        Ok(NodeAddress {
            block,
            slot: count as u8,
        })
    }

    /// Inserts a group at the address it carries. The address is expected to
    /// come from [`allocate_node`](Self::allocate_node).
    pub fn insert_group(&mut self, group: GroupInstance) -> NodeIndex {
        let id = group.composite_id();
        debug_assert!(!self.index.contains_key(&id), "composite id {id} reused");
        let idx = self.graph.add_node(group);
        self.index.insert(id, idx);
        idx
    }

    /// Spends one unit of `channel` on the group `composite_id`.
    pub fn consume_valence(
        &mut self,
        composite_id: u32,
        channel: BondChannel,
    ) -> Result<(), StateError> {
        let idx = self
            .node_index(composite_id)
            .ok_or(StateError::MissingNode { composite_id })?;
        let group = &mut self.graph[idx];
        group.remaining =
            group
                .remaining
                .consume(channel)
                .ok_or(StateError::ChannelExhausted {
                    composite_id,
                    channel,
                })?;
        Ok(())
    }

    /// Adds the bond `head -> tail` and spends the tail's side of it.
    ///
    /// The head's valence is not touched; a freshly inserted head already
    /// had its channel reserved.
    pub fn bond(&mut self, head: u32, tail: u32, bond: Bond) -> Result<EdgeIndex, StateError> {
        let h = self
            .node_index(head)
            .ok_or(StateError::MissingNode { composite_id: head })?;
        let t = self
            .node_index(tail)
            .ok_or(StateError::MissingNode { composite_id: tail })?;
        self.consume_valence(tail, bond.tail_channel)?;
        Ok(self.graph.add_edge(h, t, bond))
    }
}

impl Default for FragmentGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FragmentGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FragmentGraph")
            .field("node_count", &self.node_count())
            .field("edge_count", &self.edge_count())
            .field("nodes", &self.index.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valence::ValenceCounts;

    fn place(graph: &mut FragmentGraph, block: usize, full: ValenceCounts) -> u32 {
        let addr = graph.allocate_node(block).unwrap();
        graph.insert_group(GroupInstance::new(addr, full));
        addr.composite_id()
    }

    #[test]
    fn slots_are_assigned_in_order() {
        let mut graph = FragmentGraph::new();
        let v = ValenceCounts::new(1, 1, 0);
        assert_eq!(place(&mut graph, 3, v), 30);
        assert_eq!(place(&mut graph, 3, v), 31);
        assert_eq!(place(&mut graph, 0, v), 0);
        assert_eq!(place(&mut graph, 3, v), 32);
        assert_eq!(graph.instance_count(3), 3);
        assert_eq!(graph.instance_count(0), 1);
        assert_eq!(graph.instance_count(1), 0);
    }

    #[test]
    fn allocation_fails_past_capacity() {
        let mut graph = FragmentGraph::new();
        for _ in 0..SLOT_CAPACITY {
            place(&mut graph, 1, ValenceCounts::new(2, 0, 0));
        }
        assert_eq!(
            graph.allocate_node(1),
            Err(StateError::SlotCapacityExceeded {
                block: 1,
                capacity: SLOT_CAPACITY
            })
        );
        assert!(graph.allocate_node(2).is_ok());
    }

    #[test]
    fn bond_consumes_tail_channel() {
        let mut graph = FragmentGraph::new();
        let tail = place(&mut graph, 0, ValenceCounts::new(2, 1, 1));
        let head = place(&mut graph, 1, ValenceCounts::new(1, 0, 0));
        graph
            .bond(head, tail, Bond::new(BondChannel::A, BondChannel::B))
            .unwrap();
        assert_eq!(graph.edge_count(), 1);
        let t = graph.group(tail).unwrap();
        assert_eq!(t.remaining, ValenceCounts { total: 3, va: 2, vb: 0, vc: 1 });
        assert_eq!(graph.neighbors(tail).collect::<Vec<_>>(), vec![head]);
        assert_eq!(graph.degree(head), 1);
    }

    #[test]
    fn exhausted_channel_is_an_error() {
        let mut graph = FragmentGraph::new();
        let id = place(&mut graph, 0, ValenceCounts::new(1, 0, 0));
        assert_eq!(
            graph.consume_valence(id, BondChannel::C),
            Err(StateError::ChannelExhausted {
                composite_id: id,
                channel: BondChannel::C
            })
        );
        assert_eq!(
            graph.consume_valence(99, BondChannel::A),
            Err(StateError::MissingNode { composite_id: 99 })
        );
    }

    #[test]
    fn clone_is_independent() {
        let mut graph = FragmentGraph::new();
        let id = place(&mut graph, 0, ValenceCounts::new(2, 0, 0));
        let snapshot = graph.clone();
        graph.consume_valence(id, BondChannel::A).unwrap();
        assert_eq!(snapshot.group(id).unwrap().remaining.va, 2);
        assert_eq!(graph.group(id).unwrap().remaining.va, 1);
    }
}
