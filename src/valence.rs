use serde::{Deserialize, Serialize};

use crate::bond::BondChannel;
use crate::fragment::FragmentGraph;
use crate::group::SLOT_CAPACITY;

/// Valence counters of a group: the three typed channels and their sum.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ValenceCounts {
    pub total: u8,
    pub va: u8,
    pub vb: u8,
    pub vc: u8,
}

impl ValenceCounts {
    pub fn new(va: u8, vb: u8, vc: u8) -> Self {
        Self {
            total: va + vb + vc,
            va,
            vb,
            vc,
        }
    }

    pub fn channel(&self, channel: BondChannel) -> u8 {
        match channel {
            BondChannel::A => self.va,
            BondChannel::B => self.vb,
            BondChannel::C => self.vc,
        }
    }

    pub fn has_available(&self, channel: BondChannel) -> bool {
        self.channel(channel) != 0
    }

    /// Counts after one unit of `channel` (and of the total) is spent, or
    /// `None` if that channel is already empty.
    pub fn consume(self, channel: BondChannel) -> Option<Self> {
        let mut next = self;
        let slot = match channel {
            BondChannel::A => &mut next.va,
            BondChannel::B => &mut next.vb,
            BondChannel::C => &mut next.vc,
        };
        *slot = slot.checked_sub(1)?;
        next.total = next.total.checked_sub(1)?;
        Some(next)
    }

    pub fn is_consistent(&self) -> bool {
        u16::from(self.total) == u16::from(self.va) + u16::from(self.vb) + u16::from(self.vc)
    }
}

/// Remaining valence of every node of a fragment, laid out densely by
/// composite id (`num_bb * SLOT_CAPACITY` entries per array, zero where no
/// group is placed).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ValenceSummary {
    pub total: Vec<u32>,
    pub va: Vec<u32>,
    pub vb: Vec<u32>,
    pub vc: Vec<u32>,
}

impl ValenceSummary {
    pub fn empty(num_bb: usize) -> Self {
        let len = num_bb * SLOT_CAPACITY;
        Self {
            total: vec![0; len],
            va: vec![0; len],
            vb: vec![0; len],
            vc: vec![0; len],
        }
    }

    pub fn from_graph(graph: &FragmentGraph, num_bb: usize) -> Self {
        let mut summary = Self::empty(num_bb);
        for group in graph.groups() {
            let i = group.composite_id() as usize;
            if i >= summary.total.len() {
                continue;
            }
            let r = group.remaining;
            summary.total[i] = u32::from(r.total);
            summary.va[i] = u32::from(r.va);
            summary.vb[i] = u32::from(r.vb);
            summary.vc[i] = u32::from(r.vc);
        }
        summary
    }

    pub fn len(&self) -> usize {
        self.total.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total.is_empty()
    }

    pub(crate) fn write_bytes(&self, out: &mut Vec<u8>) {
        for array in [&self.total, &self.va, &self.vb, &self.vc] {
            for v in array {
                out.extend_from_slice(&v.to_le_bytes());
            }
        }
    }
}
