//! EOF container tests

use crate::context::FillContext;
use crate::error::{SpecError, SpecResult};
use crate::spec::{EofStateTestSpec, EofTestSpec, EofVectorSpec, StateTestSpec};
use crate::state::single_fork;
use fixgen_eof::ContainerKind;
use fixgen_exceptions::ExceptionList;
use fixgen_fixtures::{EofFixture, EofVector, EofVectorResult, FixtureInfo};
use fixgen_forks::{Fork, Network};
use fixgen_primitives::Address;
use fixgen_tools::EofVerdict;
use fixgen_types::{Account, AccountExpectation, ExpectedAlloc, Transaction};
use std::collections::BTreeMap;

/// Address the container of an `EOFStateTest` is deployed at
pub const CONTAINER_ADDRESS: Address = Address::from_bytes([
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x10, 0x00,
]);

/// Balance given to the calling account when the pre-state lacks it
pub const SENDER_BALANCE: u64 = 1_000_000_000_000_000_000;

fn eof_fork(spec: &'static str, network: Network) -> SpecResult<Fork> {
    let fork = single_fork(spec, network)?;
    if !fork.supports_eof() {
        return Err(SpecError::UnsupportedFork {
            spec,
            fork,
            reason: "no EOF support".into(),
        });
    }
    Ok(fork)
}

/// Validate one container and compare with `expected`.
///
/// A directly reported kind wins over classifying the validator's message.
pub fn check_vector(
    ctx: &FillContext,
    vector: usize,
    code: &[u8],
    kind: ContainerKind,
    expected: Option<&ExceptionList>,
) -> SpecResult<EofVectorResult> {
    let got = match ctx.eof().validate(code, kind)? {
        EofVerdict::Valid => None,
        EofVerdict::Invalid { message, exception } => {
            Some(exception.unwrap_or_else(|| ctx.eof_mapper().classify(&message)))
        }
    };
    let matches = match (expected, got) {
        (None, None) => true,
        (Some(list), Some(kind)) => list.contains(&kind),
        _ => false,
    };
    if !matches {
        return Err(SpecError::EofMismatch {
            vector,
            expected: expected.cloned(),
            got,
        });
    }
    tracing::debug!(vector, valid = got.is_none(), "container checked");
    Ok(EofVectorResult {
        result: got.is_none(),
        exception: got,
    })
}

/// Fill an `eof_test` fixture
pub fn fill_eof_test(
    ctx: &FillContext,
    network: Network,
    spec: &EofTestSpec,
    info: FixtureInfo,
) -> SpecResult<EofFixture> {
    let fork = eof_fork("EOFTest", network)?;
    let vectors = spec
        .vectors
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let result = check_vector(ctx, i, &v.code, v.container_kind, v.expect_exception.as_ref())?;
            Ok((
                i.to_string(),
                EofVector {
                    code: v.code.clone(),
                    container_kind: v.container_kind,
                    results: BTreeMap::from([(fork.name().to_string(), result)]),
                },
            ))
        })
        .collect::<SpecResult<BTreeMap<_, _>>>()?;
    Ok(EofFixture { vectors, info })
}

impl EofStateTestSpec {
    /// The container as a one-vector [`EofTestSpec`]
    pub fn as_eof_test(&self) -> EofTestSpec {
        EofTestSpec {
            vectors: vec![EofVectorSpec {
                code: self.container.clone(),
                container_kind: self.container_kind,
                expect_exception: self.expect_exception.clone(),
            }],
        }
    }
}

/// Rewrite an EOF state test as a call into the deployed container.
///
/// The container is validated first; only a valid one can be executed.
pub fn lower_eof_state_test(
    ctx: &FillContext,
    network: Network,
    spec: &EofStateTestSpec,
) -> SpecResult<StateTestSpec> {
    eof_fork("EOFStateTest", network)?;
    if spec.expect_exception.is_some() {
        return Err(SpecError::InvalidSpec(
            "an invalid container cannot be executed".into(),
        ));
    }
    check_vector(ctx, 0, &spec.container, spec.container_kind, None)?;

    let mut pre = spec.pre.clone();
    pre.insert(
        CONTAINER_ADDRESS,
        Account {
            code: spec.container.clone(),
            ..Default::default()
        },
    );
    let tx = Transaction {
        to: Some(CONTAINER_ADDRESS),
        gas_limit: spec.gas_limit,
        data: spec.data.clone(),
        ..Default::default()
    };
    let sender = tx.clone().sign()?.sender()?;
    if pre.get(&sender).is_none() {
        pre.insert(sender, Account::with_balance(SENDER_BALANCE));
    }

    let mut post = ExpectedAlloc::new();
    post.insert(
        CONTAINER_ADDRESS,
        AccountExpectation::Matches(spec.container_post.clone()),
    );
    Ok(StateTestSpec {
        env: spec.env.clone(),
        pre,
        tx,
        post,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Conversion ====================

    #[test]
    fn test_as_eof_test() {
        let spec: EofStateTestSpec = serde_json::from_value(serde_json::json!({
            "container": "0xef00",
            "containerKind": "INITCODE",
            "expectException": "EOFException.INVALID_MAGIC"
        }))
        .unwrap();
        let test = spec.as_eof_test();
        assert_eq!(test.vectors.len(), 1);
        assert_eq!(test.vectors[0].container_kind, ContainerKind::Initcode);
        assert_eq!(test.vectors[0].expect_exception, spec.expect_exception);
    }

    #[test]
    fn test_container_address() {
        assert_eq!(CONTAINER_ADDRESS, Address::from_low_u64(0x1000));
    }
}
