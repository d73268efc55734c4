//! Fragment states and the group-addition transition.
//!
//! A [`FragmentState`] is one immutable snapshot of a growing fragment.
//! [`FragmentState::add_group`] never touches `self`: on success it returns
//! a new state built on a copy of the graph, so one state can seed any
//! number of alternative transitions.

use std::fmt;
use std::sync::{Arc, OnceLock};

use petgraph::algo::is_isomorphic_matching;
use tracing::debug;

use crate::bond::{Bond, BondChannel};
use crate::canonical::CanonicalForm;
use crate::case::Case;
use crate::error::StateError;
use crate::fragment::FragmentGraph;
use crate::group::GroupInstance;
use crate::signature::StateKey;
use crate::valence::ValenceSummary;

/// A proposed growth step.
///
/// `block` is the short-form index of the building block to add. On an
/// empty fragment only `block` is read. Otherwise the new group bonds to
/// the existing group `tail`, spending `head` on its own side and
/// `tail_channel` on the tail's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupAction {
    pub block: usize,
    pub head: Option<BondChannel>,
    pub tail: Option<u32>,
    pub tail_channel: Option<BondChannel>,
}

impl GroupAction {
    /// Seed action for an empty fragment.
    pub fn first(block: usize) -> Self {
        Self {
            block,
            head: None,
            tail: None,
            tail_channel: None,
        }
    }

    pub fn attach(block: usize, head: BondChannel, tail: u32, tail_channel: BondChannel) -> Self {
        Self {
            block,
            head: Some(head),
            tail: Some(tail),
            tail_channel: Some(tail_channel),
        }
    }
}

/// Why a chemically infeasible action was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// The action named no tail, or a tail that is not in the fragment.
    TailNotFound { tail: Option<u32> },
    /// The action named a tail but no channel to bond through on it.
    MissingTailChannel { tail: u32 },
    /// The tail has no capacity left in the requested channel.
    TailChannelExhausted { tail: u32, channel: BondChannel },
    /// The new block has no capacity at all in the requested head channel.
    HeadChannelUnavailable { block: usize, channel: BondChannel },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TailNotFound { tail: Some(t) } => write!(f, "tail {} not in fragment", t),
            Self::TailNotFound { tail: None } => write!(f, "no tail given"),
            Self::MissingTailChannel { tail } => {
                write!(f, "no bond channel given for tail {}", tail)
            }
            Self::TailChannelExhausted { tail, channel } => {
                write!(f, "tail {} has no {} valence left", tail, channel)
            }
            Self::HeadChannelUnavailable { block, channel } => {
                write!(f, "block {} has no {} valence", block, channel)
            }
        }
    }
}

/// Outcome of a well-formed action.
#[derive(Debug, Clone)]
pub enum Transition {
    Accepted(FragmentState),
    Rejected(Rejection),
}

impl Transition {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    pub fn state(&self) -> Option<&FragmentState> {
        match self {
            Self::Accepted(s) => Some(s),
            Self::Rejected(_) => None,
        }
    }

    pub fn into_state(self) -> Option<FragmentState> {
        match self {
            Self::Accepted(s) => Some(s),
            Self::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Self::Accepted(_) => None,
            Self::Rejected(r) => Some(*r),
        }
    }
}

/// One snapshot of a fragment under construction.
#[derive(Clone)]
pub struct FragmentState {
    case: Arc<Case>,
    graph: FragmentGraph,
    group_count: Vec<u32>,
    valence: ValenceSummary,
    key: OnceLock<StateKey>,
}

impl FragmentState {
    /// The fragment with no groups placed.
    pub fn empty(case: Arc<Case>) -> Self {
        let num_bb = case.num_bb();
        Self {
            case,
            graph: FragmentGraph::new(),
            group_count: vec![0; num_bb],
            valence: ValenceSummary::empty(num_bb),
            key: OnceLock::new(),
        }
    }

    pub fn case(&self) -> &Case {
        &self.case
    }

    pub fn shared_case(&self) -> Arc<Case> {
        Arc::clone(&self.case)
    }

    pub fn bb(&self) -> &[usize] {
        self.case.bb()
    }

    pub fn num_bb(&self) -> usize {
        self.case.num_bb()
    }

    pub fn graph(&self) -> &FragmentGraph {
        &self.graph
    }

    /// Instances placed per selected block (short-form composition vector).
    pub fn group_count(&self) -> &[u32] {
        &self.group_count
    }

    pub fn valence(&self) -> &ValenceSummary {
        &self.valence
    }

    pub fn is_empty(&self) -> bool {
        self.group_count.iter().all(|&c| c == 0)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether `tail` exists and can still bond through `channel`.
    pub fn has_available_valence(&self, tail: u32, channel: BondChannel) -> bool {
        self.graph
            .group(tail)
            .is_some_and(|g| g.remaining.has_available(channel))
    }

    /// Applies `action`, returning the successor state or the reason the
    /// action is infeasible.
    ///
    /// Errors are reserved for malformed requests: an unknown block, a block
    /// whose slots are all taken, or a missing head channel on a non-empty
    /// fragment.
    pub fn add_group(&self, action: &GroupAction) -> Result<Transition, StateError> {
        let block = self
            .case
            .block(action.block)
            .ok_or(StateError::UnknownBlock {
                block: action.block,
                num_bb: self.num_bb(),
            })?;
        let address = self.graph.allocate_node(action.block)?;
        let group = GroupInstance::new(address, block.valence());

        if self.is_empty() {
            let mut graph = FragmentGraph::new();
            graph.insert_group(group);
            debug!(block = action.block, "placed first group");
            return Ok(Transition::Accepted(self.successor(graph, action.block)));
        }

        let head = action.head.ok_or(StateError::MissingHeadChannel {
            block: action.block,
        })?;
        let (tail, tail_channel) = match self.check_tail(action) {
            Ok(found) => found,
            Err(rejection) => {
                debug!(block = action.block, %rejection, "rejected group");
                return Ok(Transition::Rejected(rejection));
            }
        };
        let Some(group) = group.with_reserved(head) else {
            let rejection = Rejection::HeadChannelUnavailable {
                block: action.block,
                channel: head,
            };
            debug!(block = action.block, %rejection, "rejected group");
            return Ok(Transition::Rejected(rejection));
        };

        let head_id = address.composite_id();
        let mut graph = self.graph.clone();
        graph.insert_group(group);
        graph.bond(head_id, tail, Bond::new(head, tail_channel))?;
        debug!(
            block = action.block,
            node = head_id,
            tail,
            %head,
            %tail_channel,
            "attached group"
        );
        Ok(Transition::Accepted(self.successor(graph, action.block)))
    }

    fn check_tail(&self, action: &GroupAction) -> Result<(u32, BondChannel), Rejection> {
        let tail = match action.tail {
            Some(t) if self.graph.contains(t) => t,
            other => return Err(Rejection::TailNotFound { tail: other }),
        };
        let channel = action
            .tail_channel
            .ok_or(Rejection::MissingTailChannel { tail })?;
        if !self.has_available_valence(tail, channel) {
            return Err(Rejection::TailChannelExhausted { tail, channel });
        }
        Ok((tail, channel))
    }

    fn successor(&self, graph: FragmentGraph, block: usize) -> Self {
        let mut group_count = self.group_count.clone();
        group_count[block] += 1;
        let valence = ValenceSummary::from_graph(&graph, self.num_bb());
        Self {
            case: Arc::clone(&self.case),
            graph,
            group_count,
            valence,
            key: OnceLock::new(),
        }
    }

    /// Memoization key; computed once per state.
    pub fn key(&self) -> &StateKey {
        self.key
            .get_or_init(|| StateKey::compute(&self.graph, &self.valence, &self.group_count))
    }

    pub fn canonical_form(&self) -> CanonicalForm {
        CanonicalForm::of(&self.graph)
    }

    /// Exact structural comparison: same blocks, same remaining valences and
    /// the same bonds up to relabeling of groups.
    pub fn is_isomorphic_to(&self, other: &FragmentState) -> bool {
        if self.bb() != other.bb()
            || self.group_count != other.group_count
            || self.bond_count() != other.bond_count()
        {
            return false;
        }
        is_isomorphic_matching(
            self.graph.graph(),
            other.graph.graph(),
            |a: &GroupInstance, b: &GroupInstance| a.block == b.block && a.remaining == b.remaining,
            |a: &Bond, b: &Bond| {
                (a.head_channel == b.head_channel && a.tail_channel == b.tail_channel)
                    || (a.head_channel == b.tail_channel && a.tail_channel == b.head_channel)
            },
        )
    }
}

impl PartialEq for FragmentState {
    fn eq(&self, other: &Self) -> bool {
        self.bb() == other.bb() && self.key() == other.key()
    }
}

impl Eq for FragmentState {}

impl std::hash::Hash for FragmentState {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Debug for FragmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FragmentState")
            .field("bb", &self.bb())
            .field("group_count", &self.group_count)
            .field("graph", &self.graph)
            .finish()
    }
}

impl fmt::Display for FragmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--------State-------")?;
        writeln!(f, "{:<20}{:?}", "building blocks", self.bb())?;
        writeln!(f, "{:<20}{:?}", "group count:", self.group_count)?;
        writeln!(f, "{:<20}{}", "# building blocks:", self.num_bb())?;
        write!(f, "---------------------")
    }
}
