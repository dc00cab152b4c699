//! Transaction validity tests

use crate::error::{SpecError, SpecResult};
use crate::spec::TransactionTestSpec;
use crate::state::single_fork;
use fixgen_fixtures::{FixtureInfo, TransactionFixture, TransactionFixtureResult};
use fixgen_forks::Network;
use fixgen_primitives::Bytes;
use std::collections::BTreeMap;

/// Fill a `transaction_test` fixture.
///
/// A transaction expected to be valid must fit the fork and cover its
/// intrinsic gas; no tool is involved.
pub fn fill_transaction_test(
    network: Network,
    spec: &TransactionTestSpec,
    info: FixtureInfo,
) -> SpecResult<TransactionFixture> {
    let fork = single_fork("TransactionTest", network)?;
    let tx = spec.tx.clone().sign()?;
    let intrinsic_gas = tx.intrinsic_gas(fork);

    let result = match &tx.error {
        Some(exception) => TransactionFixtureResult {
            hash: None,
            intrinsic_gas,
            sender: None,
            exception: Some(exception.clone()),
        },
        None => {
            tx.check_fork(fork)?;
            if tx.gas_limit < intrinsic_gas {
                return Err(SpecError::InvalidSpec(format!(
                    "gas limit {} below intrinsic gas {}",
                    tx.gas_limit, intrinsic_gas
                )));
            }
            TransactionFixtureResult {
                hash: Some(tx.hash()?),
                intrinsic_gas,
                sender: Some(tx.sender()?),
                exception: None,
            }
        }
    };

    Ok(TransactionFixture {
        result: BTreeMap::from([(fork.name().to_string(), result)]),
        txbytes: Bytes::from(tx.encode()?),
        info,
    })
}
