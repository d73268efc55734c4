use crate::bond::BondChannel;
use crate::valence::ValenceCounts;

/// Maximum number of instances of one building block in a fragment.
pub const SLOT_CAPACITY: usize = 10;

/// Composite node id for the `slot`-th instance of selected block `block`.
pub fn composite_id(block: usize, slot: u8) -> u32 {
    (block * SLOT_CAPACITY + slot as usize) as u32
}

/// Where the next instance of a block would be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeAddress {
    pub block: usize,
    pub slot: u8,
}

impl NodeAddress {
    pub fn composite_id(&self) -> u32 {
        composite_id(self.block, self.slot)
    }
}

/// One placed occurrence of a building block.
///
/// `block` is the short-form index into the case's selected building
/// blocks, not the catalog index. `full` keeps the catalog valence while
/// `remaining` tracks what is still free to bond.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupInstance {
    pub block: usize,
    pub slot: u8,
    pub full: ValenceCounts,
    pub remaining: ValenceCounts,
}

impl GroupInstance {
    pub fn new(address: NodeAddress, full: ValenceCounts) -> Self {
        Self {
            block: address.block,
            slot: address.slot,
            full,
            remaining: full,
        }
    }

    /// The same group with one unit of `channel` already spent, for a bond
    /// made at insertion time. `None` if the block has no such capacity.
    pub fn with_reserved(self, channel: BondChannel) -> Option<Self> {
        let remaining = self.remaining.consume(channel)?;
        Some(Self { remaining, ..self })
    }

    pub fn address(&self) -> NodeAddress {
        NodeAddress {
            block: self.block,
            slot: self.slot,
        }
    }

    pub fn composite_id(&self) -> u32 {
        composite_id(self.block, self.slot)
    }
}
