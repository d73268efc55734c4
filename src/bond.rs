use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the three labeled bond-capacity channels of a building block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BondChannel {
    #[serde(rename = "va")]
    A,
    #[serde(rename = "vb")]
    B,
    #[serde(rename = "vc")]
    C,
}

impl BondChannel {
    pub const ALL: [BondChannel; 3] = [BondChannel::A, BondChannel::B, BondChannel::C];

    /// Channel for a numeric code (`0 => va`, `1 => vb`, `2 => vc`).
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::A),
            1 => Some(Self::B),
            2 => Some(Self::C),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::C => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "va",
            Self::B => "vb",
            Self::C => "vc",
        }
    }
}

impl fmt::Display for BondChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Edge between two placed groups.
///
/// Every bond consumes one unit of valence on each endpoint; the channels
/// record which counter was drawn down on which side. For spectral
/// invariants a bond always weighs `valency`, which is `1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bond {
    pub head_channel: BondChannel,
    pub tail_channel: BondChannel,
    pub valency: f64,
}

impl Bond {
    pub fn new(head_channel: BondChannel, tail_channel: BondChannel) -> Self {
        Self {
            head_channel,
            tail_channel,
            valency: 1.0,
        }
    }
}
