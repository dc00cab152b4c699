//! Shared test helpers: an in-process transition tool and a context around it

#![allow(dead_code)]

use fixgen_exceptions::{ClientKind, ExceptionMapper};
use fixgen_forks::Fork;
use fixgen_primitives::{Address, U256};
use fixgen_specs::FillContext;
use fixgen_tools::{
    BuiltinEofValidator, RejectedTx, ToolResult, TransitionOutput, TransitionRequest,
    TransitionResult, TransitionTool,
};
use fixgen_types::{logs_hash, receipts_root, Account, Alloc, Bloom, Receipt, Transaction};
use std::sync::Arc;

/// Gas every accepted transaction is charged in receipts
pub const TX_GAS: u64 = 21_000;

/// Value transfers with free gas, rejecting in geth's wording
pub struct MockT8n;

fn apply(alloc: &mut Alloc, tx: &Transaction, fork: Fork) -> Result<(), String> {
    let sender = tx.sender().unwrap();
    let intrinsic = tx.intrinsic_gas(fork);
    if tx.gas_limit < intrinsic {
        return Err(format!(
            "intrinsic gas too low: have {}, want {}",
            tx.gas_limit, intrinsic
        ));
    }
    let mut account = alloc.get(&sender).cloned().unwrap_or_default();
    if tx.nonce < account.nonce {
        return Err(format!(
            "nonce too low: address {}, tx: {} state: {}",
            sender, tx.nonce, account.nonce
        ));
    }
    if tx.nonce > account.nonce {
        return Err(format!(
            "nonce too high: address {}, tx: {} state: {}",
            sender, tx.nonce, account.nonce
        ));
    }
    if account.balance < tx.value {
        return Err(format!(
            "insufficient funds for gas * price + value: address {} have {} want {}",
            sender, account.balance, tx.value
        ));
    }
    account.nonce += 1;
    account.balance -= tx.value;
    alloc.insert(sender, account);
    if let Some(to) = tx.to {
        let mut recipient = alloc.get(&to).cloned().unwrap_or_default();
        recipient.balance += tx.value;
        alloc.insert(to, recipient);
    }
    Ok(())
}

impl TransitionTool for MockT8n {
    fn name(&self) -> &str {
        "mock"
    }

    fn version(&self) -> String {
        "mock-t8n 1.0.0".to_string()
    }

    fn evaluate(&self, request: &TransitionRequest) -> ToolResult<TransitionOutput> {
        let mut alloc = request.alloc.clone();
        let mut receipts = Vec::new();
        let mut rejected = Vec::new();
        let mut cumulative = 0;
        for (index, tx) in request.txs.iter().enumerate() {
            match apply(&mut alloc, tx, request.fork) {
                Ok(()) => {
                    cumulative += TX_GAS;
                    receipts.push(Receipt {
                        tx_type: Some(tx.tx_type() as u64),
                        status: Some(1),
                        cumulative_gas_used: cumulative,
                        gas_used: TX_GAS,
                        logs: Some(Vec::new()),
                        transaction_hash: tx.hash()?,
                        ..Default::default()
                    });
                }
                Err(error) => rejected.push(RejectedTx {
                    index: index as u64,
                    error,
                }),
            }
        }
        let result = TransitionResult {
            state_root: alloc.state_root(),
            tx_root: None,
            receipts_root: receipts_root(&receipts),
            logs_hash: logs_hash(&[]),
            logs_bloom: Bloom::ZERO,
            receipts,
            rejected,
            difficulty: None,
            gas_used: cumulative,
            base_fee_per_gas: None,
            excess_blob_gas: None,
            blob_gas_used: None,
            withdrawals_root: None,
            requests: None,
            requests_hash: None,
        };
        Ok(TransitionOutput { alloc, result })
    }
}

/// Mock tool with the geth mapper, builtin validator with the evmone mapper
pub fn context() -> FillContext {
    FillContext::new(
        Arc::new(MockT8n),
        ExceptionMapper::for_client(ClientKind::Geth).unwrap(),
        Arc::new(BuiltinEofValidator),
        ExceptionMapper::for_client(ClientKind::Evmone).unwrap(),
    )
}

/// Address of the default signing key
pub fn sender() -> Address {
    Transaction::default().sign().unwrap().sender().unwrap()
}

/// Recipient of default transactions
pub fn recipient() -> Address {
    Transaction::default().to.unwrap()
}

/// Pre-state funding the default sender
pub fn funded_pre() -> Alloc {
    let mut alloc = Alloc::new();
    alloc.insert(sender(), Account::with_balance(U256::from(1_000_000u64)));
    alloc
}
