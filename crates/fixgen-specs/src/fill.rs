//! One test, one network, one format

use crate::chain::generate_chain;
use crate::context::FillContext;
use crate::eof::{fill_eof_test, lower_eof_state_test};
use crate::error::{SpecError, SpecResult};
use crate::groups::PreAllocGroups;
use crate::spec::{BlockchainTestSpec, TestCase, TestSpec};
use crate::state::{fill_state_test, lower_state_test, single_fork};
use crate::transaction::fill_transaction_test;
use fixgen_fixtures::{Fixture, FixtureFormat, FixtureInfo};
use fixgen_forks::{Fork, Network};
use fixgen_types::{Alloc, Environment};

/// Fixture id of a test for one network and format
pub fn fixture_id(name: &str, network: Network, format: FixtureFormat) -> String {
    format!("{}[fork_{}-{}]", name, network.name(), format.name())
}

/// Pre-allocation grouping for one fill
#[derive(Debug, Clone, Copy)]
pub struct GroupTarget<'a> {
    /// Group map
    pub groups: &'a PreAllocGroups,
    /// Id recorded in the group
    pub test_id: &'a str,
}

/// Produce one sealed fixture.
///
/// Blockchain formats register the genesis with `group` when given, once the
/// fixture has rendered and sealed.
pub fn fill(
    ctx: &FillContext,
    case: &TestCase,
    network: Network,
    format: FixtureFormat,
    group: Option<GroupTarget<'_>>,
) -> SpecResult<Fixture> {
    let tool = match format {
        FixtureFormat::EofTest => ctx.eof_version(),
        _ => ctx.t8n_version(),
    };
    let info = FixtureInfo::new(format)
        .with_tool(tool)
        .with_source(case.description.as_str(), case.url.as_str());

    let mut genesis = None;
    let fixture: Fixture = match (&case.spec, format) {
        (TestSpec::StateTest(spec), FixtureFormat::StateTest) => {
            fill_state_test(ctx, network, spec, info)?.into()
        }
        (TestSpec::StateTest(spec), FixtureFormat::BlockchainTest | FixtureFormat::BlockchainTestEngine) => {
            let fork = single_fork("StateTest", network)?;
            let (fixture, chain_genesis) = fill_chain(ctx, network, &lower_state_test(spec, fork), format, info)?;
            genesis = Some(chain_genesis);
            fixture
        }
        (TestSpec::BlockchainTest(spec), FixtureFormat::BlockchainTest | FixtureFormat::BlockchainTestEngine)
        | (TestSpec::BlockchainTestEngine(spec), FixtureFormat::BlockchainTestEngine) => {
            let (fixture, chain_genesis) = fill_chain(ctx, network, spec, format, info)?;
            genesis = Some(chain_genesis);
            fixture
        }
        (TestSpec::EofTest(spec), FixtureFormat::EofTest) => {
            fill_eof_test(ctx, network, spec, info)?.into()
        }
        (TestSpec::EofStateTest(spec), FixtureFormat::EofTest) => {
            fill_eof_test(ctx, network, &spec.as_eof_test(), info)?.into()
        }
        (TestSpec::EofStateTest(spec), FixtureFormat::StateTest) => {
            let state = lower_eof_state_test(ctx, network, spec)?;
            fill_state_test(ctx, network, &state, info)?.into()
        }
        (TestSpec::EofStateTest(spec), FixtureFormat::BlockchainTest | FixtureFormat::BlockchainTestEngine) => {
            let state = lower_eof_state_test(ctx, network, spec)?;
            let fork = single_fork("EOFStateTest", network)?;
            let (fixture, chain_genesis) = fill_chain(ctx, network, &lower_state_test(&state, fork), format, info)?;
            genesis = Some(chain_genesis);
            fixture
        }
        (TestSpec::TransactionTest(spec), FixtureFormat::TransactionTest) => {
            fill_transaction_test(network, spec, info)?.into()
        }
        (spec, format) => {
            return Err(SpecError::UnsupportedFormat {
                spec: spec.kind(),
                format,
            })
        }
    };
    let fixture = fixture.seal()?;

    if let (Some(target), Some(genesis)) = (group, genesis) {
        target
            .groups
            .add(target.test_id, genesis.fork, &genesis.environment, &genesis.pre)?;
    }
    Ok(fixture)
}

/// Genesis of a rendered chain, for pre-allocation grouping
struct ChainGenesis {
    fork: Fork,
    environment: Environment,
    pre: Alloc,
}

fn fill_chain(
    ctx: &FillContext,
    network: Network,
    spec: &BlockchainTestSpec,
    format: FixtureFormat,
    info: FixtureInfo,
) -> SpecResult<(Fixture, ChainGenesis)> {
    let chain = generate_chain(ctx, network, spec)?;
    let fixture = match format {
        FixtureFormat::BlockchainTestEngine => chain.to_engine_fixture(ctx.chain_id, info)?.into(),
        _ => chain.to_blockchain_fixture(ctx.chain_id, info)?.into(),
    };
    let genesis = ChainGenesis {
        fork: network.genesis_fork(),
        environment: chain.genesis_environment,
        pre: chain.pre,
    };
    Ok((fixture, genesis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixgen_forks::TransitionFork;

    #[test]
    fn test_fixture_id() {
        assert_eq!(
            fixture_id("transfer", Fork::Cancun.into(), FixtureFormat::StateTest),
            "transfer[fork_Cancun-state_test]"
        );
        assert_eq!(
            fixture_id(
                "switch",
                Network::Transition(TransitionFork::ShanghaiToCancunAtTime15k),
                FixtureFormat::BlockchainTestEngine
            ),
            "switch[fork_ShanghaiToCancunAtTime15k-blockchain_test_engine]"
        );
    }
}
