//! Networks that switch forks mid-chain

use crate::error::{ForkError, ForkResult};
use crate::fork::Fork;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// What triggers a transition fork
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Activates at this block number
    Block(u64),
    /// Activates at this timestamp
    Timestamp(u64),
}

/// A network that starts on one fork and moves to the next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionFork {
    /// London activates at block 5
    BerlinToLondonAt5,
    /// Shanghai activates at timestamp 15000
    ParisToShanghaiAtTime15k,
    /// Cancun activates at timestamp 15000
    ShanghaiToCancunAtTime15k,
    /// Prague activates at timestamp 15000
    CancunToPragueAtTime15k,
    /// Osaka activates at timestamp 15000
    PragueToOsakaAtTime15k,
}

impl TransitionFork {
    /// Every transition fork
    pub const ALL: [TransitionFork; 5] = [
        TransitionFork::BerlinToLondonAt5,
        TransitionFork::ParisToShanghaiAtTime15k,
        TransitionFork::ShanghaiToCancunAtTime15k,
        TransitionFork::CancunToPragueAtTime15k,
        TransitionFork::PragueToOsakaAtTime15k,
    ];

    /// Name used in fixtures
    pub fn name(&self) -> &'static str {
        match self {
            TransitionFork::BerlinToLondonAt5 => "BerlinToLondonAt5",
            TransitionFork::ParisToShanghaiAtTime15k => "ParisToShanghaiAtTime15k",
            TransitionFork::ShanghaiToCancunAtTime15k => "ShanghaiToCancunAtTime15k",
            TransitionFork::CancunToPragueAtTime15k => "CancunToPragueAtTime15k",
            TransitionFork::PragueToOsakaAtTime15k => "PragueToOsakaAtTime15k",
        }
    }

    /// Fork before the transition
    pub fn from(&self) -> Fork {
        match self {
            TransitionFork::BerlinToLondonAt5 => Fork::Berlin,
            TransitionFork::ParisToShanghaiAtTime15k => Fork::Paris,
            TransitionFork::ShanghaiToCancunAtTime15k => Fork::Shanghai,
            TransitionFork::CancunToPragueAtTime15k => Fork::Cancun,
            TransitionFork::PragueToOsakaAtTime15k => Fork::Prague,
        }
    }

    /// Fork after the transition
    pub fn to(&self) -> Fork {
        match self {
            TransitionFork::BerlinToLondonAt5 => Fork::London,
            TransitionFork::ParisToShanghaiAtTime15k => Fork::Shanghai,
            TransitionFork::ShanghaiToCancunAtTime15k => Fork::Cancun,
            TransitionFork::CancunToPragueAtTime15k => Fork::Prague,
            TransitionFork::PragueToOsakaAtTime15k => Fork::Osaka,
        }
    }

    /// Activation condition of [`TransitionFork::to`]
    pub fn trigger(&self) -> Trigger {
        match self {
            TransitionFork::BerlinToLondonAt5 => Trigger::Block(5),
            _ => Trigger::Timestamp(15_000),
        }
    }

    /// Active fork for a block
    pub fn fork_at(&self, number: u64, timestamp: u64) -> Fork {
        let activated = match self.trigger() {
            Trigger::Block(at) => number >= at,
            Trigger::Timestamp(at) => timestamp >= at,
        };
        if activated {
            self.to()
        } else {
            self.from()
        }
    }
}

/// Fork selection for a whole chain: a single fork or a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    /// One fork from genesis on
    Fork(Fork),
    /// Fork switch at a block or timestamp
    Transition(TransitionFork),
}

impl Network {
    /// Active fork for a block
    pub fn fork_at(&self, number: u64, timestamp: u64) -> Fork {
        match self {
            Network::Fork(fork) => *fork,
            Network::Transition(t) => t.fork_at(number, timestamp),
        }
    }

    /// Fork at genesis
    pub fn genesis_fork(&self) -> Fork {
        self.fork_at(0, 0)
    }

    /// Latest fork reachable on this network
    pub fn latest_fork(&self) -> Fork {
        match self {
            Network::Fork(fork) => *fork,
            Network::Transition(t) => t.to(),
        }
    }

    /// Name used in fixtures
    pub fn name(&self) -> &'static str {
        match self {
            Network::Fork(fork) => fork.name(),
            Network::Transition(t) => t.name(),
        }
    }

    /// Whether the network switches forks
    pub fn is_transition(&self) -> bool {
        matches!(self, Network::Transition(_))
    }
}

impl From<Fork> for Network {
    fn from(fork: Fork) -> Self {
        Network::Fork(fork)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Network {
    type Err = ForkError;

    fn from_str(s: &str) -> ForkResult<Self> {
        if let Some(t) = TransitionFork::ALL
            .iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
        {
            return Ok(Network::Transition(*t));
        }
        s.parse().map(Network::Fork)
    }
}

impl Serialize for Network {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Network {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
