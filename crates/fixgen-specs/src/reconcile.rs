//! Transaction outcomes against expectations

use crate::error::{SpecError, SpecResult};
use fixgen_exceptions::ExceptionMapper;
use fixgen_tools::TransitionResult;
use fixgen_types::{Receipt, Transaction};

/// Check every transaction's rejection against its expected exceptions.
///
/// A rejection is classified with `mapper`; it must be one of the expected
/// kinds. An expected failure the tool did not report is an error too.
pub fn reconcile_transactions(
    mapper: &ExceptionMapper,
    txs: &[Transaction],
    result: &TransitionResult,
) -> SpecResult<()> {
    for (index, tx) in txs.iter().enumerate() {
        match (tx.error.as_ref(), result.rejection(index)) {
            (None, None) => {}
            (Some(expected), None) => {
                return Err(SpecError::UnexpectedSuccess {
                    index,
                    nonce: tx.nonce,
                    expected: expected.clone(),
                });
            }
            (None, Some(message)) => {
                return Err(SpecError::UnexpectedFailure {
                    index,
                    nonce: tx.nonce,
                    kind: mapper.classify(message),
                    message: message.to_string(),
                });
            }
            (Some(expected), Some(message)) => {
                let got = mapper.classify(message);
                if !expected.contains(&got) {
                    return Err(SpecError::ExceptionMismatch {
                        index,
                        nonce: tx.nonce,
                        expected: expected.clone(),
                        got,
                        message: message.to_string(),
                    });
                }
                tracing::debug!(index, %got, "transaction rejected as expected");
            }
        }
    }
    Ok(())
}

/// Check expected receipt fields of the included transactions.
///
/// `included[i]` is the request position of the transaction whose receipt is
/// `receipts[i]`.
pub fn check_receipts(txs: &[Transaction], included: &[usize], receipts: &[Receipt]) -> SpecResult<()> {
    for (receipt, &index) in receipts.iter().zip(included) {
        let tx = &txs[index];
        if let Some(expected) = &tx.expected_receipt {
            expected.check(receipt).map_err(|source| SpecError::Receipt {
                index,
                nonce: tx.nonce,
                source,
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixgen_exceptions::{ClientKind, ExceptionKind, TransactionException};
    use fixgen_primitives::H256;
    use fixgen_tools::RejectedTx;
    use fixgen_types::{Bloom, TransactionReceipt};

    fn result(rejected: Vec<RejectedTx>) -> TransitionResult {
        TransitionResult {
            state_root: H256::ZERO,
            tx_root: None,
            receipts_root: H256::ZERO,
            logs_hash: H256::ZERO,
            logs_bloom: Bloom::ZERO,
            receipts: Vec::new(),
            rejected,
            difficulty: None,
            gas_used: 0,
            base_fee_per_gas: None,
            excess_blob_gas: None,
            blob_gas_used: None,
            withdrawals_root: None,
            requests: None,
            requests_hash: None,
        }
    }

    fn nonce_too_low() -> RejectedTx {
        RejectedTx {
            index: 0,
            error: "nonce too low: address 0x.., tx: 0 state: 1".into(),
        }
    }

    fn expecting(kind: TransactionException) -> Transaction {
        Transaction {
            nonce: 7,
            error: Some(ExceptionKind::from(kind).into()),
            ..Default::default()
        }
    }

    fn geth() -> ExceptionMapper {
        ExceptionMapper::for_client(ClientKind::Geth).unwrap()
    }

    // ==================== Outcomes ====================

    #[test]
    fn test_expected_rejection() {
        let txs = [expecting(TransactionException::NonceMismatchTooLow)];
        reconcile_transactions(&geth(), &txs, &result(vec![nonce_too_low()])).unwrap();
    }

    #[test]
    fn test_unexpected_success() {
        let txs = [expecting(TransactionException::NonceMismatchTooLow)];
        assert!(matches!(
            reconcile_transactions(&geth(), &txs, &result(vec![])),
            Err(SpecError::UnexpectedSuccess { index: 0, nonce: 7, .. })
        ));
    }

    #[test]
    fn test_unexpected_failure() {
        let txs = [Transaction::default()];
        match reconcile_transactions(&geth(), &txs, &result(vec![nonce_too_low()])) {
            Err(SpecError::UnexpectedFailure { kind, .. }) => {
                assert_eq!(kind, TransactionException::NonceMismatchTooLow.into());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_wrong_kind() {
        let txs = [expecting(TransactionException::IntrinsicGasTooLow)];
        assert!(matches!(
            reconcile_transactions(&geth(), &txs, &result(vec![nonce_too_low()])),
            Err(SpecError::ExceptionMismatch { .. })
        ));
    }

    // ==================== Receipts ====================

    #[test]
    fn test_receipt_mismatch_names_tx() {
        let txs = [
            Transaction::default(),
            Transaction {
                nonce: 1,
                expected_receipt: Some(TransactionReceipt {
                    gas_used: Some(50_000),
                    ..Default::default()
                }),
                ..Default::default()
            },
        ];
        let receipts = [
            Receipt { gas_used: 21_000, ..Default::default() },
            Receipt { gas_used: 21_000, ..Default::default() },
        ];
        match check_receipts(&txs, &[0, 1], &receipts) {
            Err(SpecError::Receipt { index, nonce, source }) => {
                assert_eq!((index, nonce), (1, 1));
                assert_eq!(source.field, "gasUsed");
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
