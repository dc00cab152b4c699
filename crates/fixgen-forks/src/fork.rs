//! Fork enumeration and per-fork rules

use crate::error::{ForkError, ForkResult};
use crate::header::{HeaderField, Requirement};
use fixgen_primitives::serde_hex::minimal_u64;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One wei-denominated ether
const ETHER: u128 = 1_000_000_000_000_000_000;

/// Gas consumed per blob
pub const GAS_PER_BLOB: u64 = 1 << 17;

/// Network upgrades in activation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Fork {
    /// Genesis rules
    Frontier,
    /// EIP-2, EIP-7
    Homestead,
    /// Metropolis part one
    Byzantium,
    /// Metropolis part two (with EIP-1283)
    Constantinople,
    /// Constantinople without EIP-1283
    ConstantinopleFix,
    /// EIP-2028 calldata repricing
    Istanbul,
    /// Access lists
    Berlin,
    /// EIP-1559 fee market
    London,
    /// The merge
    Paris,
    /// Withdrawals
    Shanghai,
    /// Blobs and beacon root
    Cancun,
    /// Execution requests and set-code transactions
    Prague,
    /// EOF
    Osaka,
}

impl Fork {
    /// Every fork, oldest first
    pub const ALL: [Fork; 13] = [
        Fork::Frontier,
        Fork::Homestead,
        Fork::Byzantium,
        Fork::Constantinople,
        Fork::ConstantinopleFix,
        Fork::Istanbul,
        Fork::Berlin,
        Fork::London,
        Fork::Paris,
        Fork::Shanghai,
        Fork::Cancun,
        Fork::Prague,
        Fork::Osaka,
    ];

    /// Name used in fixtures and tool invocations
    pub fn name(&self) -> &'static str {
        match self {
            Fork::Frontier => "Frontier",
            Fork::Homestead => "Homestead",
            Fork::Byzantium => "Byzantium",
            Fork::Constantinople => "Constantinople",
            Fork::ConstantinopleFix => "ConstantinopleFix",
            Fork::Istanbul => "Istanbul",
            Fork::Berlin => "Berlin",
            Fork::London => "London",
            Fork::Paris => "Paris",
            Fork::Shanghai => "Shanghai",
            Fork::Cancun => "Cancun",
            Fork::Prague => "Prague",
            Fork::Osaka => "Osaka",
        }
    }

    /// Whether `self` activates at or after `other`
    pub fn is_at_least(&self, other: Fork) -> bool {
        *self >= other
    }

    /// Fork preceding this one, if any
    pub fn parent(&self) -> Option<Fork> {
        let index = Fork::ALL.iter().position(|f| f == self)?;
        index.checked_sub(1).map(|i| Fork::ALL[i])
    }

    // ==================== Header rules ====================

    /// Whether `field` must be present in headers of this fork, or must be absent.
    pub fn header_requirement(&self, field: HeaderField) -> Requirement {
        let since = match field {
            HeaderField::BaseFee => Fork::London,
            HeaderField::WithdrawalsRoot => Fork::Shanghai,
            HeaderField::BlobGasUsed | HeaderField::ExcessBlobGas => Fork::Cancun,
            HeaderField::ParentBeaconBlockRoot => Fork::Cancun,
            HeaderField::RequestsHash => Fork::Prague,
            _ => return Requirement::Required,
        };
        if self.is_at_least(since) {
            Requirement::Required
        } else {
            Requirement::Forbidden
        }
    }

    /// Proof-of-stake headers carry zero difficulty
    pub fn header_zero_difficulty_required(&self) -> bool {
        self.is_at_least(Fork::Paris)
    }

    /// The mix hash field holds prev-randao instead of the PoW mix digest
    pub fn header_prev_randao_required(&self) -> bool {
        self.is_at_least(Fork::Paris)
    }

    /// Environment needs a difficulty value for the tool
    pub fn env_difficulty_required(&self) -> bool {
        !self.is_at_least(Fork::Paris)
    }

    // ==================== Transactions ====================

    /// Transaction envelope types accepted by this fork
    pub fn tx_types(&self) -> &'static [u8] {
        if self.is_at_least(Fork::Prague) {
            &[0, 1, 2, 3, 4]
        } else if self.is_at_least(Fork::Cancun) {
            &[0, 1, 2, 3]
        } else if self.is_at_least(Fork::London) {
            &[0, 1, 2]
        } else if self.is_at_least(Fork::Berlin) {
            &[0, 1]
        } else {
            &[0]
        }
    }

    /// Error when `tx_type` is not accepted
    pub fn check_tx_type(&self, tx_type: u8) -> ForkResult<()> {
        if self.tx_types().contains(&tx_type) {
            Ok(())
        } else {
            Err(ForkError::UnsupportedTxType {
                tx_type,
                fork: self.name().to_string(),
            })
        }
    }

    /// Whether EOF containers may be deployed
    pub fn supports_eof(&self) -> bool {
        self.is_at_least(Fork::Osaka)
    }

    /// Mining reward paid to the fee recipient, in wei
    pub fn block_reward(&self) -> u128 {
        if self.is_at_least(Fork::Paris) {
            0
        } else if self.is_at_least(Fork::Constantinople) {
            2 * ETHER
        } else if self.is_at_least(Fork::Byzantium) {
            3 * ETHER
        } else {
            5 * ETHER
        }
    }

    // ==================== Engine API ====================

    /// `engine_newPayloadVN` version, `None` before the merge
    pub fn engine_new_payload_version(&self) -> Option<u8> {
        match self {
            f if f.is_at_least(Fork::Prague) => Some(4),
            Fork::Cancun => Some(3),
            Fork::Shanghai => Some(2),
            Fork::Paris => Some(1),
            _ => None,
        }
    }

    /// `engine_forkchoiceUpdatedVN` version, `None` before the merge
    pub fn engine_forkchoice_updated_version(&self) -> Option<u8> {
        match self {
            f if f.is_at_least(Fork::Cancun) => Some(3),
            Fork::Shanghai => Some(2),
            Fork::Paris => Some(1),
            _ => None,
        }
    }

    /// New payload params carry the blob versioned hashes
    pub fn engine_new_payload_blob_hashes(&self) -> bool {
        self.is_at_least(Fork::Cancun)
    }

    /// New payload params carry the parent beacon block root
    pub fn engine_new_payload_beacon_root(&self) -> bool {
        self.is_at_least(Fork::Cancun)
    }

    /// New payload params carry the execution requests
    pub fn engine_new_payload_requests(&self) -> bool {
        self.is_at_least(Fork::Prague)
    }

    // ==================== Blobs ====================

    /// Blob parameters, `None` before blobs exist
    pub fn blob_schedule(&self) -> Option<BlobSchedule> {
        match self {
            f if f.is_at_least(Fork::Prague) => Some(BlobSchedule {
                target: 6,
                max: 9,
                base_fee_update_fraction: 5_007_716,
            }),
            Fork::Cancun => Some(BlobSchedule {
                target: 3,
                max: 6,
                base_fee_update_fraction: 3_338_477,
            }),
            _ => None,
        }
    }

    /// Blob schedule of this fork and every earlier fork with blobs, keyed by fork name
    pub fn blob_schedule_table(&self) -> Vec<(&'static str, BlobSchedule)> {
        Fork::ALL
            .iter()
            .filter(|f| **f <= *self)
            .filter_map(|f| f.blob_schedule().map(|s| (f.name(), s)))
            .collect()
    }

    /// Gas per blob, zero before blobs exist
    pub fn blob_gas_per_blob(&self) -> u64 {
        if self.blob_schedule().is_some() {
            GAS_PER_BLOB
        } else {
            0
        }
    }

    /// Target blob gas per block
    pub fn target_blob_gas_per_block(&self) -> u64 {
        self.blob_schedule()
            .map(|s| s.target * GAS_PER_BLOB)
            .unwrap_or(0)
    }
}

impl fmt::Display for Fork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Fork {
    type Err = ForkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Fork::ALL
            .iter()
            .find(|f| f.name().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| ForkError::UnknownFork(s.to_string()))
    }
}

impl Serialize for Fork {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Fork {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Blob parameters of one fork
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobSchedule {
    /// Target blobs per block
    #[serde(with = "minimal_u64")]
    pub target: u64,
    /// Maximum blobs per block
    #[serde(with = "minimal_u64")]
    pub max: u64,
    /// Denominator of the blob base fee exponent
    #[serde(with = "minimal_u64")]
    pub base_fee_update_fraction: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_and_names() {
        assert!(Fork::Osaka > Fork::Prague);
        assert!(Fork::ConstantinopleFix > Fork::Constantinople);
        for fork in Fork::ALL {
            assert_eq!(fork.name().parse::<Fork>(), Ok(fork));
        }
        assert_eq!("shanghai".parse::<Fork>(), Ok(Fork::Shanghai));
        assert!(matches!("Merge".parse::<Fork>(), Err(ForkError::UnknownFork(_))));
        assert_eq!(Fork::Frontier.parent(), None);
        assert_eq!(Fork::Cancun.parent(), Some(Fork::Shanghai));
    }

    #[test]
    fn test_header_requirements() {
        use HeaderField::*;
        assert_eq!(Fork::Berlin.header_requirement(BaseFee), Requirement::Forbidden);
        assert_eq!(Fork::London.header_requirement(BaseFee), Requirement::Required);
        assert_eq!(Fork::Paris.header_requirement(WithdrawalsRoot), Requirement::Forbidden);
        assert_eq!(Fork::Shanghai.header_requirement(WithdrawalsRoot), Requirement::Required);
        assert_eq!(Fork::Shanghai.header_requirement(BlobGasUsed), Requirement::Forbidden);
        assert_eq!(Fork::Cancun.header_requirement(ParentBeaconBlockRoot), Requirement::Required);
        assert_eq!(Fork::Cancun.header_requirement(RequestsHash), Requirement::Forbidden);
        assert_eq!(Fork::Prague.header_requirement(RequestsHash), Requirement::Required);
        assert_eq!(Fork::Frontier.header_requirement(StateRoot), Requirement::Required);
    }

    #[test]
    fn test_engine_versions() {
        assert_eq!(Fork::London.engine_new_payload_version(), None);
        assert_eq!(Fork::Paris.engine_new_payload_version(), Some(1));
        assert_eq!(Fork::Shanghai.engine_new_payload_version(), Some(2));
        assert_eq!(Fork::Cancun.engine_new_payload_version(), Some(3));
        assert_eq!(Fork::Osaka.engine_new_payload_version(), Some(4));
        assert_eq!(Fork::Prague.engine_forkchoice_updated_version(), Some(3));
        assert!(!Fork::Shanghai.engine_new_payload_blob_hashes());
        assert!(Fork::Cancun.engine_new_payload_beacon_root());
        assert!(!Fork::Cancun.engine_new_payload_requests());
        assert!(Fork::Prague.engine_new_payload_requests());
    }

    #[test]
    fn test_rewards_and_tx_types() {
        assert_eq!(Fork::Frontier.block_reward(), 5 * ETHER);
        assert_eq!(Fork::Byzantium.block_reward(), 3 * ETHER);
        assert_eq!(Fork::London.block_reward(), 2 * ETHER);
        assert_eq!(Fork::Paris.block_reward(), 0);
        assert_eq!(Fork::Berlin.tx_types(), &[0, 1]);
        assert!(Fork::Cancun.check_tx_type(3).is_ok());
        assert!(Fork::Cancun.check_tx_type(4).is_err());
        assert!(Fork::Osaka.supports_eof());
        assert!(!Fork::Prague.supports_eof());
    }

    #[test]
    fn test_blob_schedule() {
        assert_eq!(Fork::Shanghai.blob_schedule(), None);
        assert_eq!(Fork::Cancun.target_blob_gas_per_block(), 393_216);
        assert_eq!(Fork::Prague.blob_schedule().map(|s| s.max), Some(9));
        let table = Fork::Prague.blob_schedule_table();
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].0, "Cancun");

        let json = serde_json::to_value(Fork::Cancun.blob_schedule().unwrap()).unwrap();
        assert_eq!(json["target"], "0x3");
        assert_eq!(json["baseFeeUpdateFraction"], "0x32f0ed");
    }
}
