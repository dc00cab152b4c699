//! Canonical exception enums

use crate::error::{ExceptionError, ExceptionResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

macro_rules! exception_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident => $text:literal,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[allow(missing_docs)]
        pub enum $name {
            $($variant,)*
        }

        impl $name {
            /// Every variant in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant,)*];

            /// Upper snake case name used in fixtures
            pub fn name(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)*
                }
            }

            /// Variant for an upper snake case name
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($text => Some($name::$variant),)*
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

exception_enum! {
    /// Reasons a transaction is rejected
    TransactionException {
        InsufficientAccountFunds => "INSUFFICIENT_ACCOUNT_FUNDS",
        InsufficientMaxFeePerGas => "INSUFFICIENT_MAX_FEE_PER_GAS",
        PriorityGreaterThanMaxFeePerGas => "PRIORITY_GREATER_THAN_MAX_FEE_PER_GAS",
        PriorityOverflow => "PRIORITY_OVERFLOW",
        GaslimitPriceProductOverflow => "GASLIMIT_PRICE_PRODUCT_OVERFLOW",
        IntrinsicGasTooLow => "INTRINSIC_GAS_TOO_LOW",
        IntrinsicGasBelowFloorGasCost => "INTRINSIC_GAS_BELOW_FLOOR_GAS_COST",
        NonceMismatchTooHigh => "NONCE_MISMATCH_TOO_HIGH",
        NonceMismatchTooLow => "NONCE_MISMATCH_TOO_LOW",
        NonceIsMax => "NONCE_IS_MAX",
        GasAllowanceExceeded => "GAS_ALLOWANCE_EXCEEDED",
        GasLimitExceedsMaximum => "GAS_LIMIT_EXCEEDS_MAXIMUM",
        InitcodeSizeExceeded => "INITCODE_SIZE_EXCEEDED",
        SenderNotEoa => "SENDER_NOT_EOA",
        TypeNotSupported => "TYPE_NOT_SUPPORTED",
        InsufficientMaxFeePerBlobGas => "INSUFFICIENT_MAX_FEE_PER_BLOB_GAS",
        Type3TxZeroBlobs => "TYPE_3_TX_ZERO_BLOBS",
        Type3TxBlobCountExceeded => "TYPE_3_TX_BLOB_COUNT_EXCEEDED",
        Type3TxMaxBlobGasAllowanceExceeded => "TYPE_3_TX_MAX_BLOB_GAS_ALLOWANCE_EXCEEDED",
        Type3TxInvalidBlobVersionedHash => "TYPE_3_TX_INVALID_BLOB_VERSIONED_HASH",
        Type3TxContractCreation => "TYPE_3_TX_CONTRACT_CREATION",
        Type3TxPreFork => "TYPE_3_TX_PRE_FORK",
        Type4EmptyAuthorizationList => "TYPE_4_EMPTY_AUTHORIZATION_LIST",
        Type4TxContractCreation => "TYPE_4_TX_CONTRACT_CREATION",
        Type4TxPreFork => "TYPE_4_TX_PRE_FORK",
    }
}

exception_enum! {
    /// Reasons a block is rejected
    BlockException {
        IncorrectBlockFormat => "INCORRECT_BLOCK_FORMAT",
        RlpStructuresEncoding => "RLP_STRUCTURES_ENCODING",
        RlpWithdrawalsNotRead => "RLP_WITHDRAWALS_NOT_READ",
        BlobGasUsedAboveLimit => "BLOB_GAS_USED_ABOVE_LIMIT",
        IncorrectBlobGasUsed => "INCORRECT_BLOB_GAS_USED",
        IncorrectExcessBlobGas => "INCORRECT_EXCESS_BLOB_GAS",
        InvalidRequests => "INVALID_REQUESTS",
        InvalidDepositEventLayout => "INVALID_DEPOSIT_EVENT_LAYOUT",
        SystemContractEmpty => "SYSTEM_CONTRACT_EMPTY",
        SystemContractCallFailed => "SYSTEM_CONTRACT_CALL_FAILED",
        GasUsedOverflow => "GAS_USED_OVERFLOW",
        InvalidGasUsed => "INVALID_GAS_USED",
        InvalidGaslimit => "INVALID_GASLIMIT",
        InvalidBasefeePerGas => "INVALID_BASEFEE_PER_GAS",
        InvalidStateRoot => "INVALID_STATE_ROOT",
        InvalidReceiptsRoot => "INVALID_RECEIPTS_ROOT",
        InvalidTransactionsRoot => "INVALID_TRANSACTIONS_ROOT",
        InvalidWithdrawalsRoot => "INVALID_WITHDRAWALS_ROOT",
        InvalidLogBloom => "INVALID_LOG_BLOOM",
        InvalidBlockNumber => "INVALID_BLOCK_NUMBER",
        InvalidBlockTimestampOlderThanParent => "INVALID_BLOCK_TIMESTAMP_OLDER_THAN_PARENT",
        ExtraDataTooBig => "EXTRA_DATA_TOO_BIG",
        UnknownParent => "UNKNOWN_PARENT",
    }
}

exception_enum! {
    /// Reasons an EOF container is invalid
    EofException {
        UndefinedInstruction => "UNDEFINED_INSTRUCTION",
        IncompleteMagic => "INCOMPLETE_MAGIC",
        InvalidMagic => "INVALID_MAGIC",
        InvalidVersion => "INVALID_VERSION",
        MissingTypeHeader => "MISSING_TYPE_HEADER",
        InvalidTypeSectionSize => "INVALID_TYPE_SECTION_SIZE",
        InvalidFirstSectionType => "INVALID_FIRST_SECTION_TYPE",
        MissingCodeHeader => "MISSING_CODE_HEADER",
        MissingDataSection => "MISSING_DATA_SECTION",
        MissingTerminator => "MISSING_TERMINATOR",
        UnexpectedHeaderKind => "UNEXPECTED_HEADER_KIND",
        IncompleteSectionNumber => "INCOMPLETE_SECTION_NUMBER",
        IncompleteSectionSize => "INCOMPLETE_SECTION_SIZE",
        ZeroSectionSize => "ZERO_SECTION_SIZE",
        TooManyCodeSections => "TOO_MANY_CODE_SECTIONS",
        TooManyContainers => "TOO_MANY_CONTAINERS",
        InvalidSectionBodiesSize => "INVALID_SECTION_BODIES_SIZE",
        ToplevelContainerTruncated => "TOPLEVEL_CONTAINER_TRUNCATED",
        ContainerSizeAboveLimit => "CONTAINER_SIZE_ABOVE_LIMIT",
        InputsOutputsNumAboveLimit => "INPUTS_OUTPUTS_NUM_ABOVE_LIMIT",
        MaxStackHeightAboveLimit => "MAX_STACK_HEIGHT_ABOVE_LIMIT",
        InvalidMaxStackHeight => "INVALID_MAX_STACK_HEIGHT",
        InvalidNonReturningFlag => "INVALID_NON_RETURNING_FLAG",
        TruncatedInstruction => "TRUNCATED_INSTRUCTION",
        MissingStopOpcode => "MISSING_STOP_OPCODE",
        InvalidRjumpDestination => "INVALID_RJUMP_DESTINATION",
        InvalidCodeSectionIndex => "INVALID_CODE_SECTION_INDEX",
        InvalidContainerSectionIndex => "INVALID_CONTAINER_SECTION_INDEX",
        InvalidDataloadnIndex => "INVALID_DATALOADN_INDEX",
        CallfToNonReturning => "CALLF_TO_NON_RETURNING",
        JumpfDestinationIncompatibleOutputs => "JUMPF_DESTINATION_INCOMPATIBLE_OUTPUTS",
        StackUnderflow => "STACK_UNDERFLOW",
        StackOverflow => "STACK_OVERFLOW",
        StackHeightMismatch => "STACK_HEIGHT_MISMATCH",
        StackHigherThanOutputs => "STACK_HIGHER_THAN_OUTPUTS",
        UnreachableInstructions => "UNREACHABLE_INSTRUCTIONS",
        UnreachableCodeSections => "UNREACHABLE_CODE_SECTIONS",
        OrphanSubcontainer => "ORPHAN_SUBCONTAINER",
        IncompatibleContainerKind => "INCOMPATIBLE_CONTAINER_KIND",
        EofcreateWithTruncatedContainer => "EOFCREATE_WITH_TRUNCATED_CONTAINER",
    }
}

/// Name of the catch-all for messages no table recognizes
pub const UNDEFINED_EXCEPTION: &str = "UNDEFINED_EXCEPTION";

/// Any canonical exception, or the undefined sentinel.
///
/// Rendered as `<Class>.<NAME>`, e.g. `TransactionException.INTRINSIC_GAS_TOO_LOW`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExceptionKind {
    /// Transaction rejection
    Transaction(TransactionException),
    /// Block rejection
    Block(BlockException),
    /// EOF container rejection
    Eof(EofException),
    /// Message no mapping recognized
    Undefined,
}

impl ExceptionKind {
    /// Class prefix
    pub fn class(&self) -> &'static str {
        match self {
            ExceptionKind::Transaction(_) => "TransactionException",
            ExceptionKind::Block(_) => "BlockException",
            ExceptionKind::Eof(_) => "EOFException",
            ExceptionKind::Undefined => "UndefinedException",
        }
    }

    /// Upper snake case name without the class
    pub fn name(&self) -> &'static str {
        match self {
            ExceptionKind::Transaction(e) => e.name(),
            ExceptionKind::Block(e) => e.name(),
            ExceptionKind::Eof(e) => e.name(),
            ExceptionKind::Undefined => UNDEFINED_EXCEPTION,
        }
    }

    /// Whether this is the undefined sentinel
    pub fn is_undefined(&self) -> bool {
        matches!(self, ExceptionKind::Undefined)
    }
}

impl From<TransactionException> for ExceptionKind {
    fn from(e: TransactionException) -> Self {
        ExceptionKind::Transaction(e)
    }
}

impl From<BlockException> for ExceptionKind {
    fn from(e: BlockException) -> Self {
        ExceptionKind::Block(e)
    }
}

impl From<EofException> for ExceptionKind {
    fn from(e: EofException) -> Self {
        ExceptionKind::Eof(e)
    }
}

impl fmt::Display for ExceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.class(), self.name())
    }
}

impl FromStr for ExceptionKind {
    type Err = ExceptionError;

    fn from_str(s: &str) -> ExceptionResult<Self> {
        let unknown = || ExceptionError::UnknownException(s.to_string());
        let (class, name) = s.trim().split_once('.').ok_or_else(unknown)?;
        let kind = match class {
            "TransactionException" => TransactionException::from_name(name).map(Self::Transaction),
            "BlockException" => BlockException::from_name(name).map(Self::Block),
            "EOFException" => EofException::from_name(name).map(Self::Eof),
            "UndefinedException" if name == UNDEFINED_EXCEPTION => Some(Self::Undefined),
            _ => None,
        };
        kind.ok_or_else(unknown)
    }
}

impl Serialize for ExceptionKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ExceptionKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse() {
        let kind = ExceptionKind::from(TransactionException::IntrinsicGasTooLow);
        assert_eq!(kind.to_string(), "TransactionException.INTRINSIC_GAS_TOO_LOW");
        assert_eq!(kind.to_string().parse::<ExceptionKind>(), Ok(kind));

        let eof = ExceptionKind::from(EofException::MissingStopOpcode);
        assert_eq!(eof.to_string(), "EOFException.MISSING_STOP_OPCODE");
        assert_eq!("EOFException.MISSING_STOP_OPCODE".parse::<ExceptionKind>(), Ok(eof));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("TransactionException.NOPE".parse::<ExceptionKind>().is_err());
        assert!("INTRINSIC_GAS_TOO_LOW".parse::<ExceptionKind>().is_err());
        assert!("BlockException.INTRINSIC_GAS_TOO_LOW".parse::<ExceptionKind>().is_err());
    }

    #[test]
    fn test_all_names_roundtrip() {
        for e in TransactionException::ALL {
            assert_eq!(TransactionException::from_name(e.name()), Some(*e));
        }
        for e in BlockException::ALL {
            assert_eq!(BlockException::from_name(e.name()), Some(*e));
        }
        for e in EofException::ALL {
            assert_eq!(EofException::from_name(e.name()), Some(*e));
        }
    }

    #[test]
    fn test_undefined() {
        let kind: ExceptionKind = "UndefinedException.UNDEFINED_EXCEPTION".parse().unwrap();
        assert!(kind.is_undefined());
    }
}
