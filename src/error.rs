use std::fmt;

use crate::bond::BondChannel;

/// Contract violations raised while building fragment states.
///
/// These are distinct from a rejected action: a rejection means the driver
/// proposed something chemically infeasible and should try another move,
/// while a `StateError` means the request itself was malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// The block index does not name one of the selected building blocks.
    UnknownBlock { block: usize, num_bb: usize },
    /// Every slot of this block is already occupied.
    SlotCapacityExceeded { block: usize, capacity: usize },
    /// A channel decrement was requested on a node that has none left.
    ChannelExhausted {
        composite_id: u32,
        channel: BondChannel,
    },
    /// No group with this composite id exists in the fragment.
    MissingNode { composite_id: u32 },
    /// A group was attached to a non-empty fragment without naming the
    /// channel it bonds through.
    MissingHeadChannel { block: usize },
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownBlock { block, num_bb } => {
                write!(f, "block {} out of range ({} building blocks)", block, num_bb)
            }
            Self::SlotCapacityExceeded { block, capacity } => {
                write!(
                    f,
                    "block {} exceeds max allowed count per group ({})",
                    block, capacity
                )
            }
            Self::ChannelExhausted {
                composite_id,
                channel,
            } => write!(
                f,
                "node {} has no remaining {} valence",
                composite_id, channel
            ),
            Self::MissingNode { composite_id } => {
                write!(f, "no group with composite id {}", composite_id)
            }
            Self::MissingHeadChannel { block } => {
                write!(f, "block {} attached without a head bond channel", block)
            }
        }
    }
}

impl std::error::Error for StateError {}
