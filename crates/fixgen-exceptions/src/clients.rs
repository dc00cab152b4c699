//! Builtin message tables per client

use crate::kinds::{
    BlockException as B, EofException as E, ExceptionKind, TransactionException as T,
};
use crate::mapper::ClientKind;

type Entry = (ExceptionKind, &'static str);

/// Static substring and regex tables of one client
pub(crate) struct ClientTable {
    pub(crate) substrings: &'static [Entry],
    pub(crate) regexes: &'static [Entry],
}

pub(crate) fn table_for(client: ClientKind) -> ClientTable {
    match client {
        ClientKind::Evmone => ClientTable {
            substrings: EVMONE,
            regexes: &[],
        },
        ClientKind::Geth => ClientTable {
            substrings: GETH,
            regexes: GETH_REGEX,
        },
        ClientKind::Besu => ClientTable {
            substrings: BESU,
            regexes: BESU_REGEX,
        },
        ClientKind::Nethermind => ClientTable {
            substrings: NETHERMIND,
            regexes: NETHERMIND_REGEX,
        },
        ClientKind::Reth => ClientTable {
            substrings: RETH,
            regexes: RETH_REGEX,
        },
    }
}

const fn tx(e: T) -> ExceptionKind {
    ExceptionKind::Transaction(e)
}

const fn block(e: B) -> ExceptionKind {
    ExceptionKind::Block(e)
}

const fn eof(e: E) -> ExceptionKind {
    ExceptionKind::Eof(e)
}

// ==================== evmone ====================

const EVMONE: &[Entry] = &[
    (tx(T::NonceIsMax), "nonce has max value"),
    (tx(T::InsufficientAccountFunds), "insufficient funds for gas * price + value"),
    (tx(T::IntrinsicGasTooLow), "intrinsic gas too low"),
    (tx(T::IntrinsicGasBelowFloorGasCost), "insufficient gas for floor data gas cost"),
    (tx(T::NonceMismatchTooHigh), "nonce too high"),
    (tx(T::NonceMismatchTooLow), "nonce too low"),
    (tx(T::InsufficientMaxFeePerGas), "max fee per gas less than block base fee"),
    (tx(T::PriorityGreaterThanMaxFeePerGas), "max priority fee per gas higher than max fee per gas"),
    (tx(T::InsufficientMaxFeePerBlobGas), "max blob fee per gas less than block base fee"),
    (tx(T::InitcodeSizeExceeded), "max initcode size exceeded"),
    (tx(T::SenderNotEoa), "sender not an eoa"),
    (tx(T::GasAllowanceExceeded), "gas limit reached"),
    (tx(T::GasLimitExceedsMaximum), "max gas limit exceeded"),
    (tx(T::TypeNotSupported), "transaction type not supported"),
    (tx(T::Type3TxZeroBlobs), "empty blob hashes list"),
    (tx(T::Type3TxInvalidBlobVersionedHash), "invalid blob hash version"),
    (tx(T::Type3TxBlobCountExceeded), "blob gas limit exceeded"),
    (tx(T::Type3TxContractCreation), "blob transaction must not be a create transaction"),
    (tx(T::Type4EmptyAuthorizationList), "empty authorization list"),
    (tx(T::Type4TxContractCreation), "set code transaction must not be a create transaction"),
    (block(B::IncorrectBlobGasUsed), "invalid blob gas used"),
    (block(B::IncorrectExcessBlobGas), "invalid excess blob gas"),
    (block(B::InvalidRequests), "invalid requests"),
    (eof(E::UndefinedInstruction), "err: undefined_instruction"),
    (eof(E::IncompleteMagic), "err: incomplete_magic"),
    (eof(E::InvalidMagic), "err: invalid_prefix"),
    (eof(E::InvalidVersion), "err: eof_version_unknown"),
    (eof(E::MissingTypeHeader), "err: type_section_missing"),
    (eof(E::InvalidTypeSectionSize), "err: invalid_type_section_size"),
    (eof(E::InvalidFirstSectionType), "err: invalid_first_section_type"),
    (eof(E::MissingCodeHeader), "err: code_section_missing"),
    (eof(E::MissingDataSection), "err: data_section_missing"),
    (eof(E::MissingTerminator), "err: header_terminator_missing"),
    (eof(E::UnexpectedHeaderKind), "err: unexpected_header_kind"),
    (eof(E::IncompleteSectionNumber), "err: incomplete_section_number"),
    (eof(E::IncompleteSectionSize), "err: incomplete_section_size"),
    (eof(E::ZeroSectionSize), "err: zero_section_size"),
    (eof(E::TooManyCodeSections), "err: too_many_code_sections"),
    (eof(E::TooManyContainers), "err: too_many_container_sections"),
    (eof(E::InvalidSectionBodiesSize), "err: invalid_section_bodies_size"),
    (eof(E::ToplevelContainerTruncated), "err: toplevel_container_truncated"),
    (eof(E::ContainerSizeAboveLimit), "err: container_size_above_limit"),
    (eof(E::InputsOutputsNumAboveLimit), "err: inputs_outputs_num_above_limit"),
    (eof(E::MaxStackHeightAboveLimit), "err: max_stack_height_above_limit"),
    (eof(E::InvalidMaxStackHeight), "err: invalid_max_stack_height"),
    (eof(E::InvalidNonReturningFlag), "err: invalid_non_returning_flag"),
    (eof(E::TruncatedInstruction), "err: truncated_instruction"),
    (eof(E::MissingStopOpcode), "err: no_terminating_instruction"),
    (eof(E::InvalidRjumpDestination), "err: invalid_rjump_destination"),
    (eof(E::InvalidCodeSectionIndex), "err: invalid_code_section_index"),
    (eof(E::InvalidContainerSectionIndex), "err: invalid_container_section_index"),
    (eof(E::InvalidDataloadnIndex), "err: invalid_dataloadn_index"),
    (eof(E::CallfToNonReturning), "err: callf_to_non_returning_function"),
    (eof(E::JumpfDestinationIncompatibleOutputs), "err: jumpf_destination_incompatible_outputs"),
    (eof(E::StackUnderflow), "err: stack_underflow"),
    (eof(E::StackOverflow), "err: stack_overflow"),
    (eof(E::StackHeightMismatch), "err: stack_height_mismatch"),
    (eof(E::StackHigherThanOutputs), "err: stack_higher_than_outputs_required"),
    (eof(E::UnreachableInstructions), "err: unreachable_instructions"),
    (eof(E::UnreachableCodeSections), "err: unreachable_code_sections"),
    (eof(E::OrphanSubcontainer), "err: unreferenced_subcontainer"),
    (eof(E::IncompatibleContainerKind), "err: incompatible_container_kind"),
    (eof(E::EofcreateWithTruncatedContainer), "err: eofcreate_with_truncated_container"),
];

// ==================== geth ====================

const GETH: &[Entry] = &[
    (tx(T::NonceIsMax), "nonce has max value"),
    (tx(T::NonceMismatchTooHigh), "nonce too high"),
    (tx(T::NonceMismatchTooLow), "nonce too low"),
    (tx(T::InsufficientAccountFunds), "insufficient funds for gas * price + value"),
    (tx(T::IntrinsicGasTooLow), "intrinsic gas too low"),
    (tx(T::IntrinsicGasBelowFloorGasCost), "insufficient gas for floor data gas cost"),
    (tx(T::InsufficientMaxFeePerGas), "max fee per gas less than block base fee"),
    (tx(T::PriorityGreaterThanMaxFeePerGas), "max priority fee per gas higher than max fee per gas"),
    (tx(T::PriorityOverflow), "max priority fee per gas higher than 2^256-1"),
    (tx(T::InsufficientMaxFeePerBlobGas), "max fee per blob gas less than block blob gas fee"),
    (tx(T::InitcodeSizeExceeded), "max initcode size exceeded"),
    (tx(T::SenderNotEoa), "sender not an eoa"),
    (tx(T::GasAllowanceExceeded), "gas limit reached"),
    (tx(T::GasLimitExceedsMaximum), "transaction gas limit too high"),
    (tx(T::TypeNotSupported), "transaction type not supported"),
    (tx(T::Type3TxZeroBlobs), "blob transaction missing blob hashes"),
    (tx(T::Type3TxContractCreation), "blob transaction of type create"),
    (tx(T::Type4EmptyAuthorizationList), "EIP-7702 transaction with empty auth list"),
    (tx(T::Type4TxContractCreation), "EIP-7702 transaction cannot be used to create contract"),
    (block(B::IncorrectBlobGasUsed), "blob gas used mismatch"),
    (block(B::IncorrectExcessBlobGas), "invalid excessBlobGas"),
    (block(B::InvalidRequests), "invalid requests hash"),
    (block(B::InvalidGasUsed), "invalid gas used"),
    (block(B::InvalidGaslimit), "invalid gas limit"),
    (block(B::InvalidStateRoot), "invalid merkle root"),
    (block(B::InvalidReceiptsRoot), "invalid receipt root hash"),
    (block(B::SystemContractEmpty), "system contract has no code"),
];

const GETH_REGEX: &[Entry] = &[
    (tx(T::Type3TxBlobCountExceeded), r"too many blobs in transaction: have \d+, permitted \d+"),
    (tx(T::Type3TxInvalidBlobVersionedHash), r"blob \d+ has invalid hash version"),
    (tx(T::Type3TxMaxBlobGasAllowanceExceeded), r"blob gas used \d+ exceeds maximum allowance \d+"),
    (block(B::RlpStructuresEncoding), r"^rlp: "),
    (block(B::InvalidDepositEventLayout), r"unable to parse deposit data: .*"),
];

// ==================== besu ====================

const BESU: &[Entry] = &[
    (tx(T::InsufficientAccountFunds), "UPFRONT_COST_EXCEEDS_BALANCE"),
    (tx(T::IntrinsicGasTooLow), "INTRINSIC_GAS_EXCEEDS_GAS_LIMIT"),
    (tx(T::IntrinsicGasBelowFloorGasCost), "INTRINSIC_GAS_BELOW_FLOOR_GAS_COST"),
    (tx(T::NonceMismatchTooHigh), "NONCE_TOO_HIGH"),
    (tx(T::NonceMismatchTooLow), "NONCE_TOO_LOW"),
    (tx(T::NonceIsMax), "NONCE_OVERFLOW"),
    (tx(T::InsufficientMaxFeePerGas), "GAS_PRICE_BELOW_CURRENT_BASE_FEE"),
    (tx(T::PriorityGreaterThanMaxFeePerGas), "MAX_PRIORITY_FEE_PER_GAS_EXCEEDS_MAX_FEE_PER_GAS"),
    (tx(T::InsufficientMaxFeePerBlobGas), "BLOB_GAS_PRICE_BELOW_CURRENT_BLOB_BASE_FEE"),
    (tx(T::SenderNotEoa), "TX_SENDER_NOT_AUTHORIZED"),
    (tx(T::InitcodeSizeExceeded), "INITCODE_TOO_LARGE"),
    (tx(T::GasAllowanceExceeded), "TX_GAS_LIMIT_EXCEEDS_BLOCK_GAS_LIMIT"),
    (tx(T::TypeNotSupported), "INVALID_TRANSACTION_FORMAT"),
    (tx(T::Type3TxZeroBlobs), "Blob transaction must have at least one versioned hash"),
    (tx(T::Type3TxBlobCountExceeded), "TOTAL_BLOB_GAS_TOO_HIGH"),
    (tx(T::Type3TxInvalidBlobVersionedHash), "INVALID_BLOBS"),
    (tx(T::Type3TxContractCreation), "Blob transaction must have a to address"),
    (tx(T::Type4EmptyAuthorizationList), "EMPTY_CODE_DELEGATION"),
    (tx(T::Type4TxContractCreation), "Code delegation transaction must have a to address"),
    (block(B::RlpStructuresEncoding), "Failed to decode"),
    (block(B::IncorrectBlobGasUsed), "Payload BlobGasUsed does not match calculated BlobGasUsed"),
    (block(B::IncorrectExcessBlobGas), "Payload excessBlobGas does not match calculated excessBlobGas"),
    (block(B::InvalidRequests), "Invalid execution requests"),
    (block(B::InvalidStateRoot), "World State Root does not match expected value"),
];

const BESU_REGEX: &[Entry] = &[
    (tx(T::Type3TxMaxBlobGasAllowanceExceeded), r"blob gas usage \d+ exceeds the limit \d+"),
    (block(B::InvalidGaslimit), r"Invalid gas limit: \d+"),
];

// ==================== nethermind ====================

const NETHERMIND: &[Entry] = &[
    (tx(T::InsufficientAccountFunds), "insufficient sender balance"),
    (tx(T::IntrinsicGasTooLow), "intrinsic gas too low"),
    (tx(T::IntrinsicGasBelowFloorGasCost), "gas limit below floor data gas cost"),
    (tx(T::NonceMismatchTooHigh), "nonce too high"),
    (tx(T::NonceMismatchTooLow), "nonce too low"),
    (tx(T::NonceIsMax), "nonce overflow"),
    (tx(T::InsufficientMaxFeePerGas), "miner premium is negative"),
    (tx(T::PriorityGreaterThanMaxFeePerGas), "max priority fee per gas is higher than max fee per gas"),
    (tx(T::InsufficientMaxFeePerBlobGas), "insufficient MaxFeePerBlobGas"),
    (tx(T::SenderNotEoa), "sender has deployed code"),
    (tx(T::InitcodeSizeExceeded), "transaction size over max initcode size"),
    (tx(T::GasAllowanceExceeded), "block gas limit exceeded"),
    (tx(T::TypeNotSupported), "InvalidTxType"),
    (tx(T::Type3TxZeroBlobs), "blob transaction must have at least 1 blob"),
    (tx(T::Type3TxBlobCountExceeded), "TooManyBlobs"),
    (tx(T::Type3TxInvalidBlobVersionedHash), "InvalidBlobVersionedHashVersion"),
    (tx(T::Type3TxContractCreation), "blob transaction cannot be a contract creation"),
    (tx(T::Type4EmptyAuthorizationList), "MissingAuthorizationList"),
    (tx(T::Type4TxContractCreation), "set code transaction cannot be a contract creation"),
    (block(B::RlpStructuresEncoding), "RlpException"),
    (block(B::IncorrectBlobGasUsed), "HeaderBlobGasMismatch"),
    (block(B::IncorrectExcessBlobGas), "HeaderExcessBlobGasMismatch"),
    (block(B::InvalidRequests), "InvalidRequestsHash"),
];

const NETHERMIND_REGEX: &[Entry] = &[
    (block(B::InvalidGasUsed), r"HeaderGasUsedMismatch.*"),
    (tx(T::Type3TxMaxBlobGasAllowanceExceeded), r"BlockBlobGasExceeded: .*"),
];

// ==================== reth ====================

const RETH: &[Entry] = &[
    (tx(T::InsufficientAccountFunds), "lack of funds"),
    (tx(T::IntrinsicGasTooLow), "call gas cost exceeds the gas limit"),
    (tx(T::IntrinsicGasBelowFloorGasCost), "gas floor exceeds the gas limit"),
    (tx(T::NonceIsMax), "nonce has max value"),
    (tx(T::InsufficientMaxFeePerGas), "gas price is less than basefee"),
    (tx(T::PriorityGreaterThanMaxFeePerGas), "priority fee is greater than max fee"),
    (tx(T::InsufficientMaxFeePerBlobGas), "blob gas price is greater than max fee per blob gas"),
    (tx(T::InitcodeSizeExceeded), "create initcode size limit"),
    (tx(T::SenderNotEoa), "reject transactions from senders with deployed code"),
    (tx(T::GasAllowanceExceeded), "caller gas limit exceeds the block gas limit"),
    (tx(T::TypeNotSupported), "transaction type not supported"),
    (tx(T::Type3TxZeroBlobs), "empty blobs"),
    (tx(T::Type3TxInvalidBlobVersionedHash), "blob version not supported"),
    (tx(T::Type3TxContractCreation), "blob create transaction"),
    (tx(T::Type4EmptyAuthorizationList), "empty authorization list"),
    (block(B::IncorrectBlobGasUsed), "blob gas used mismatch"),
    (block(B::IncorrectExcessBlobGas), "excess blob gas mismatch"),
    (block(B::InvalidRequests), "mismatched block requests hash"),
    (block(B::InvalidStateRoot), "mismatched block state root"),
    (block(B::RlpStructuresEncoding), "failed to decode"),
];

const RETH_REGEX: &[Entry] = &[
    (tx(T::NonceMismatchTooHigh), r"nonce \d+ too high, expected \d+"),
    (tx(T::NonceMismatchTooLow), r"nonce \d+ too low, expected \d+"),
    (tx(T::Type3TxBlobCountExceeded), r"too many blobs, have \d+, max \d+"),
];
