//! Header fields and their fork requirements

use std::fmt;

/// Whether a header field must be present for a fork
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// The field must be present
    Required,
    /// The field must be absent
    Forbidden,
}

/// Every field a header may carry, in RLP order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub enum HeaderField {
    ParentHash,
    OmmersHash,
    FeeRecipient,
    StateRoot,
    TransactionsRoot,
    ReceiptsRoot,
    LogsBloom,
    Difficulty,
    Number,
    GasLimit,
    GasUsed,
    Timestamp,
    ExtraData,
    PrevRandao,
    Nonce,
    BaseFee,
    WithdrawalsRoot,
    BlobGasUsed,
    ExcessBlobGas,
    ParentBeaconBlockRoot,
    RequestsHash,
}

impl HeaderField {
    /// Fields in RLP order
    pub const ALL: [HeaderField; 21] = [
        HeaderField::ParentHash,
        HeaderField::OmmersHash,
        HeaderField::FeeRecipient,
        HeaderField::StateRoot,
        HeaderField::TransactionsRoot,
        HeaderField::ReceiptsRoot,
        HeaderField::LogsBloom,
        HeaderField::Difficulty,
        HeaderField::Number,
        HeaderField::GasLimit,
        HeaderField::GasUsed,
        HeaderField::Timestamp,
        HeaderField::ExtraData,
        HeaderField::PrevRandao,
        HeaderField::Nonce,
        HeaderField::BaseFee,
        HeaderField::WithdrawalsRoot,
        HeaderField::BlobGasUsed,
        HeaderField::ExcessBlobGas,
        HeaderField::ParentBeaconBlockRoot,
        HeaderField::RequestsHash,
    ];

    /// Key used for this field in fixture JSON
    pub fn json_name(&self) -> &'static str {
        match self {
            HeaderField::ParentHash => "parentHash",
            HeaderField::OmmersHash => "uncleHash",
            HeaderField::FeeRecipient => "coinbase",
            HeaderField::StateRoot => "stateRoot",
            HeaderField::TransactionsRoot => "transactionsTrie",
            HeaderField::ReceiptsRoot => "receiptTrie",
            HeaderField::LogsBloom => "bloom",
            HeaderField::Difficulty => "difficulty",
            HeaderField::Number => "number",
            HeaderField::GasLimit => "gasLimit",
            HeaderField::GasUsed => "gasUsed",
            HeaderField::Timestamp => "timestamp",
            HeaderField::ExtraData => "extraData",
            HeaderField::PrevRandao => "mixHash",
            HeaderField::Nonce => "nonce",
            HeaderField::BaseFee => "baseFeePerGas",
            HeaderField::WithdrawalsRoot => "withdrawalsRoot",
            HeaderField::BlobGasUsed => "blobGasUsed",
            HeaderField::ExcessBlobGas => "excessBlobGas",
            HeaderField::ParentBeaconBlockRoot => "parentBeaconBlockRoot",
            HeaderField::RequestsHash => "requestsHash",
        }
    }
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.json_name())
    }
}
