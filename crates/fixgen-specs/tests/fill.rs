//! End-to-end fills against an in-process transition tool

mod common;

use common::*;
use fixgen_block::FixtureBlockEntry;
use fixgen_eof::{wrap_code, ContainerKind};
use fixgen_exceptions::{EofException, ExceptionKind, ExceptionList, TransactionException};
use fixgen_fixtures::{verify_fixture, Fixture, FixtureFormat};
use fixgen_forks::{Fork, Network, TransitionFork};
use fixgen_primitives::{Address, Bytes, U256};
use fixgen_specs::*;
use fixgen_types::{
    Account, AccountExpectation, Environment, ExpectedAccount, ExpectedAlloc, Transaction,
};

fn transfer(value: u64) -> Transaction {
    Transaction {
        value: U256::from(value),
        ..Default::default()
    }
}

fn expect_balance(address: Address, balance: u64) -> ExpectedAlloc {
    let mut post = ExpectedAlloc::new();
    post.insert(
        address,
        AccountExpectation::Matches(ExpectedAccount {
            balance: Some(U256::from(balance)),
            ..Default::default()
        }),
    );
    post
}

fn state_case(tx: Transaction, post: ExpectedAlloc) -> TestCase {
    TestCase {
        networks: vec![Fork::Shanghai.into()],
        formats: Vec::new(),
        description: "value transfer".into(),
        url: String::new(),
        spec: TestSpec::StateTest(StateTestSpec {
            env: Environment::default(),
            pre: funded_pre(),
            tx,
            post,
        }),
    }
}

fn chain_case(blocks: Vec<BlockSpec>) -> BlockchainTestSpec {
    BlockchainTestSpec {
        genesis_environment: Environment {
            number: 0,
            timestamp: 0,
            ..Default::default()
        },
        pre: funded_pre(),
        blocks,
        post: ExpectedAlloc::new(),
    }
}

fn nonce_too_high() -> ExceptionList {
    ExceptionKind::from(TransactionException::NonceMismatchTooHigh).into()
}

// ============================================================
// State tests
// ============================================================

mod state {
    use super::*;

    #[test]
    fn test_transfer_state_fixture() {
        let ctx = context();
        let case = state_case(transfer(10), expect_balance(recipient(), 10));
        let fixture = fill(&ctx, &case, Fork::Shanghai.into(), FixtureFormat::StateTest, None).unwrap();

        verify_fixture(&fixture.to_value().unwrap()).unwrap();
        assert_eq!(fixture.info().filling_transition_tool, "mock-t8n 1.0.0");
        assert_eq!(fixture.info().description, "value transfer");
        let Fixture::State(state) = fixture else {
            panic!("wrong format");
        };
        let post = &state.post["Shanghai"][0];
        assert!(post.expect_exception.is_none());
        assert_eq!(post.hash, post.state.state_root());
        assert_eq!(post.state.get(&recipient()).unwrap().balance, U256::from(10));
        assert_eq!(post.state.get(&sender()).unwrap().nonce, 1);
    }

    #[test]
    fn test_small_balance_transfer() {
        let ctx = context();
        let mut case = state_case(transfer(10), ExpectedAlloc::new());
        let TestSpec::StateTest(spec) = &mut case.spec else {
            unreachable!();
        };
        spec.pre = [(sender(), Account::with_balance(100u64))].into_iter().collect();
        spec.post = expect_balance(recipient(), 10);
        spec.post.insert(
            sender(),
            AccountExpectation::Matches(ExpectedAccount {
                nonce: Some(1),
                ..Default::default()
            }),
        );

        let fixture = fill(&ctx, &case, Fork::Shanghai.into(), FixtureFormat::StateTest, None).unwrap();
        let value = fixture.to_value().unwrap();
        verify_fixture(&value).unwrap();
        assert_eq!(fixture.compute_hash().unwrap(), fixture.info().hash);

        let Fixture::State(state) = fixture else {
            panic!("wrong format");
        };
        let post = &state.post["Shanghai"][0].state;
        assert!(post.get(&sender()).unwrap().balance < U256::from(100u64));
        assert_eq!(post.get(&recipient()).unwrap().balance, U256::from(10u64));
    }

    #[test]
    fn test_expected_rejection_recorded() {
        let ctx = context();
        let tx = Transaction {
            nonce: 1,
            error: Some(nonce_too_high()),
            ..transfer(10)
        };
        let case = state_case(tx, ExpectedAlloc::new());
        let fixture = fill(&ctx, &case, Fork::Shanghai.into(), FixtureFormat::StateTest, None).unwrap();
        let Fixture::State(state) = fixture else {
            panic!("wrong format");
        };
        let post = &state.post["Shanghai"][0];
        assert_eq!(post.expect_exception, Some(nonce_too_high()));
        assert_eq!(post.state, funded_pre());
    }

    #[test]
    fn test_unexpected_rejection_fails() {
        let ctx = context();
        let tx = Transaction {
            nonce: 1,
            ..transfer(10)
        };
        match fill(&ctx, &state_case(tx, ExpectedAlloc::new()), Fork::Shanghai.into(), FixtureFormat::StateTest, None) {
            Err(SpecError::UnexpectedFailure { kind, .. }) => {
                assert_eq!(kind, TransactionException::NonceMismatchTooHigh.into());
            }
            other => panic!("unexpected {:?}", other.map(|f| f.format())),
        }
    }

    #[test]
    fn test_wrong_exception_fails() {
        let ctx = context();
        let tx = Transaction {
            value: U256::from(10_000_000u64),
            error: Some(nonce_too_high()),
            ..Default::default()
        };
        assert!(matches!(
            fill(&ctx, &state_case(tx, ExpectedAlloc::new()), Fork::Shanghai.into(), FixtureFormat::StateTest, None),
            Err(SpecError::ExceptionMismatch { .. })
        ));
    }

    #[test]
    fn test_post_state_mismatch_fails() {
        let ctx = context();
        let case = state_case(transfer(10), expect_balance(recipient(), 11));
        assert!(matches!(
            fill(&ctx, &case, Fork::Shanghai.into(), FixtureFormat::StateTest, None),
            Err(SpecError::PostState(_))
        ));
    }

    #[test]
    fn test_lowered_to_blockchain() {
        let ctx = context();
        let case = state_case(transfer(10), expect_balance(recipient(), 10));
        let fixture = fill(&ctx, &case, Fork::Shanghai.into(), FixtureFormat::BlockchainTest, None).unwrap();
        verify_fixture(&fixture.to_value().unwrap()).unwrap();

        let Fixture::Blockchain(chain) = fixture else {
            panic!("wrong format");
        };
        assert_eq!(chain.network, "Shanghai");
        assert_eq!(chain.blocks.len(), 1);
        let FixtureBlockEntry::Valid(block) = &chain.blocks[0] else {
            panic!("block should be valid");
        };
        assert_eq!(block.body.block_header.header.number, 1);
        assert_eq!(block.body.block_header.header.timestamp, 1000);
        assert_eq!(block.body.transactions.len(), 1);
        assert_eq!(chain.last_block_hash, block.body.block_header.hash);
        let post = chain.post_state.unwrap();
        assert_eq!(post.get(&recipient()).unwrap().balance, U256::from(10));
    }

    #[test]
    fn test_lowered_to_engine() {
        let ctx = context();
        let case = state_case(transfer(10), expect_balance(recipient(), 10));
        let fixture = fill(&ctx, &case, Fork::Shanghai.into(), FixtureFormat::BlockchainTestEngine, None).unwrap();
        verify_fixture(&fixture.to_value().unwrap()).unwrap();
        let Fixture::BlockchainEngine(engine) = fixture else {
            panic!("wrong format");
        };
        assert_eq!(engine.engine_new_payloads.len(), 1);
    }

    #[test]
    fn test_unrendered_fixture_not_grouped() {
        let ctx = context();
        let case = state_case(transfer(10), ExpectedAlloc::new());
        let groups = PreAllocGroups::new("salt");

        let failing = GroupTarget { groups: &groups, test_id: "pre_merge" };
        assert!(matches!(
            fill(&ctx, &case, Fork::London.into(), FixtureFormat::BlockchainTestEngine, Some(failing)),
            Err(SpecError::UnsupportedFork { .. })
        ));
        assert!(groups.is_empty());

        let ok = GroupTarget { groups: &groups, test_id: "shanghai" };
        fill(&ctx, &case, Fork::Shanghai.into(), FixtureFormat::BlockchainTest, Some(ok)).unwrap();
        let files = groups.into_files();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].1.test_ids, vec!["shanghai".to_string()]);
    }

    #[test]
    fn test_transition_network_rejected() {
        let ctx = context();
        let case = state_case(transfer(10), ExpectedAlloc::new());
        let network = Network::Transition(TransitionFork::ShanghaiToCancunAtTime15k);
        assert!(matches!(
            fill(&ctx, &case, network, FixtureFormat::StateTest, None),
            Err(SpecError::UnsupportedFork { .. })
        ));
    }
}

// ============================================================
// Blockchain tests
// ============================================================

mod chain {
    use super::*;

    #[test]
    fn test_invalid_block_stays_off_chain() {
        let ctx = context();
        let spec = chain_case(
            vec![
                BlockSpec {
                    txs: vec![Transaction {
                        nonce: 1,
                        error: Some(nonce_too_high()),
                        ..transfer(5)
                    }],
                    exception: Some(nonce_too_high()),
                    ..Default::default()
                },
                BlockSpec {
                    txs: vec![transfer(5)],
                    ..Default::default()
                },
            ],
        );
        let chain = generate_chain(&ctx, Fork::Shanghai.into(), &spec).unwrap();

        let invalid = &chain.blocks[0].block;
        let valid = &chain.blocks[1].block;
        // rejected transaction stays in the body
        assert_eq!(invalid.transactions.len(), 1);
        assert_eq!(invalid.header.header().number, 1);
        assert_eq!(valid.header.header().number, 1);
        assert_eq!(valid.header.header().parent_hash, chain.genesis.hash());
        assert_eq!(chain.head, valid.hash());
        assert_eq!(chain.post.get(&recipient()).unwrap().balance, U256::from(5));

        let fixture = chain
            .to_blockchain_fixture(1, fixgen_fixtures::FixtureInfo::new(FixtureFormat::BlockchainTest))
            .unwrap();
        assert!(fixture.blocks[0].is_invalid());
        assert!(!fixture.blocks[1].is_invalid());
        verify_fixture(&Fixture::from(fixture).seal().unwrap().to_value().unwrap()).unwrap();
    }

    #[test]
    fn test_header_patch_and_verify() {
        let ctx = context();
        let patched: BlockSpec = serde_json::from_value(serde_json::json!({
            "headerPatch": {"extraData": "0x0102"},
            "headerVerify": {"extraData": "0x0102", "number": "0x01"}
        }))
        .unwrap();
        let spec = chain_case(vec![patched]);
        let chain = generate_chain(&ctx, Fork::Shanghai.into(), &spec).unwrap();
        assert_eq!(
            chain.blocks[0].block.header.header().extra_data,
            Bytes::from(vec![1, 2])
        );

        let wrong: BlockSpec = serde_json::from_value(serde_json::json!({
            "headerVerify": {"extraData": "0x0102"}
        }))
        .unwrap();
        let spec = chain_case(vec![wrong]);
        assert!(matches!(
            generate_chain(&ctx, Fork::Shanghai.into(), &spec),
            Err(SpecError::Block(_))
        ));
    }

    #[test]
    fn test_fork_transition_by_timestamp() {
        let ctx = context();
        let network = Network::Transition(TransitionFork::ShanghaiToCancunAtTime15k);
        let spec = chain_case(
            vec![
                BlockSpec {
                    timestamp: Some(14_999),
                    ..Default::default()
                },
                BlockSpec {
                    timestamp: Some(15_000),
                    ..Default::default()
                },
            ],
        );
        let chain = generate_chain(&ctx, network, &spec).unwrap();
        assert_eq!(chain.genesis.header.fork(), Fork::Shanghai);
        assert_eq!(chain.blocks[0].block.header.fork(), Fork::Shanghai);
        assert_eq!(chain.blocks[1].block.header.fork(), Fork::Cancun);
        assert_eq!(chain.blocks[0].block.header.header().excess_blob_gas, None);
        assert_eq!(chain.blocks[1].block.header.header().excess_blob_gas, Some(0));

        let fixture = chain
            .to_blockchain_fixture(1, fixgen_fixtures::FixtureInfo::new(FixtureFormat::BlockchainTest))
            .unwrap();
        assert_eq!(fixture.network, "ShanghaiToCancunAtTime15k");
        verify_fixture(&Fixture::from(fixture).seal().unwrap().to_value().unwrap()).unwrap();
    }

    #[test]
    fn test_raw_rlp_needs_exception() {
        let ctx = context();
        let spec = chain_case(
            vec![BlockSpec {
                rlp: Some(Bytes::from(vec![0xf9, 0x00])),
                ..Default::default()
            }],
        );
        assert!(matches!(
            generate_chain(&ctx, Fork::Shanghai.into(), &spec),
            Err(SpecError::InvalidSpec(_))
        ));
    }
}

// ============================================================
// EOF tests
// ============================================================

mod eof {
    use super::*;

    fn eof_case(vectors: Vec<EofVectorSpec>) -> TestCase {
        TestCase {
            networks: vec![Fork::Osaka.into()],
            formats: Vec::new(),
            description: String::new(),
            url: String::new(),
            spec: TestSpec::EofTest(EofTestSpec { vectors }),
        }
    }

    fn valid_container() -> Bytes {
        wrap_code(&[0x00]).unwrap()
    }

    #[test]
    fn test_vectors_filled() {
        let ctx = context();
        let case = eof_case(vec![
            EofVectorSpec {
                code: valid_container(),
                container_kind: ContainerKind::Runtime,
                expect_exception: None,
            },
            EofVectorSpec {
                code: Bytes::from(vec![0xef, 0x00, 0x02]),
                container_kind: ContainerKind::Runtime,
                expect_exception: Some(ExceptionKind::from(EofException::InvalidVersion).into()),
            },
        ]);
        let fixture = fill(&ctx, &case, Fork::Osaka.into(), FixtureFormat::EofTest, None).unwrap();
        assert!(fixture.info().filling_transition_tool.starts_with("fixgen-eof"));
        let Fixture::Eof(eof) = fixture else {
            panic!("wrong format");
        };
        assert!(eof.vectors["0"].results["Osaka"].result);
        let invalid = &eof.vectors["1"].results["Osaka"];
        assert!(!invalid.result);
        assert_eq!(invalid.exception, Some(EofException::InvalidVersion.into()));
    }

    #[test]
    fn test_verdict_mismatch() {
        let ctx = context();
        let case = eof_case(vec![EofVectorSpec {
            code: valid_container(),
            container_kind: ContainerKind::Runtime,
            expect_exception: Some(ExceptionKind::from(EofException::InvalidMagic).into()),
        }]);
        match fill(&ctx, &case, Fork::Osaka.into(), FixtureFormat::EofTest, None) {
            Err(SpecError::EofMismatch { vector, got, .. }) => {
                assert_eq!(vector, 0);
                assert_eq!(got, None);
            }
            other => panic!("unexpected {:?}", other.map(|f| f.format())),
        }
    }

    #[test]
    fn test_pre_eof_fork_rejected() {
        let ctx = context();
        let case = eof_case(Vec::new());
        assert!(matches!(
            fill(&ctx, &case, Fork::Prague.into(), FixtureFormat::EofTest, None),
            Err(SpecError::UnsupportedFork { fork: Fork::Prague, .. })
        ));
    }

    #[test]
    fn test_eof_state_test_executes_container() {
        let ctx = context();
        let case = TestCase {
            networks: vec![Fork::Osaka.into()],
            formats: Vec::new(),
            description: String::new(),
            url: String::new(),
            spec: TestSpec::EofStateTest(EofStateTestSpec {
                container: valid_container(),
                container_kind: ContainerKind::Runtime,
                expect_exception: None,
                pre: Default::default(),
                env: Environment::default(),
                data: Bytes::new(),
                gas_limit: 100_000,
                container_post: ExpectedAccount {
                    code: Some(valid_container()),
                    ..Default::default()
                },
            }),
        };
        assert_eq!(case.selected_formats().len(), 4);

        let fixture = fill(&ctx, &case, Fork::Osaka.into(), FixtureFormat::StateTest, None).unwrap();
        let Fixture::State(state) = fixture else {
            panic!("wrong format");
        };
        assert_eq!(state.pre.get(&CONTAINER_ADDRESS).unwrap().code, valid_container());
        assert_eq!(
            state.pre.get(&sender()),
            Some(&Account::with_balance(SENDER_BALANCE))
        );
        assert_eq!(state.transaction.to, Some(CONTAINER_ADDRESS));
    }
}

// ============================================================
// Transaction tests
// ============================================================

mod transaction {
    use super::*;

    #[test]
    fn test_transaction_fixture() {
        let ctx = context();
        let case = TestCase {
            networks: vec![Fork::Cancun.into()],
            formats: Vec::new(),
            description: String::new(),
            url: String::new(),
            spec: TestSpec::TransactionTest(TransactionTestSpec { tx: transfer(1) }),
        };
        let fixture = fill(&ctx, &case, Fork::Cancun.into(), FixtureFormat::TransactionTest, None).unwrap();
        verify_fixture(&fixture.to_value().unwrap()).unwrap();
        let Fixture::Transaction(tx) = fixture else {
            panic!("wrong format");
        };
        assert_eq!(tx.result["Cancun"].sender, Some(sender()));
    }

    #[test]
    fn test_format_not_supported() {
        let ctx = context();
        let case = TestCase {
            networks: vec![Fork::Cancun.into()],
            formats: Vec::new(),
            description: String::new(),
            url: String::new(),
            spec: TestSpec::TransactionTest(TransactionTestSpec { tx: transfer(1) }),
        };
        assert!(matches!(
            fill(&ctx, &case, Fork::Cancun.into(), FixtureFormat::StateTest, None),
            Err(SpecError::UnsupportedFormat { spec: "TransactionTest", .. })
        ));
    }
}

// ============================================================
// Runner
// ============================================================

mod runner {
    use super::*;

    fn job(name: &str, case: TestCase) -> FillJob {
        FillJob {
            source: "transfers".into(),
            name: name.into(),
            case,
        }
    }

    #[test]
    fn test_all_formats_filled() {
        let runner = FillRunner::new(context()).with_workers(2);
        let jobs = vec![job("ok", state_case(transfer(10), expect_balance(recipient(), 10)))];
        let report = runner.run(&jobs).unwrap();
        assert_eq!(report.stats.total, 3);
        assert_eq!(report.stats.filled, 3);
        assert_eq!(report.stats.pass_rate(), 100.0);
        assert!(report.groups.is_none());

        let ids: Vec<_> = report.fixtures.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "ok[fork_Shanghai-state_test]",
                "ok[fork_Shanghai-blockchain_test]",
                "ok[fork_Shanghai-blockchain_test_engine]",
            ]
        );
    }

    #[test]
    fn test_stop_on_first_error() {
        let runner = FillRunner::new(context())
            .with_workers(1)
            .stop_on_first_error(true);
        let mut broken = state_case(transfer(10), expect_balance(recipient(), 11));
        broken.formats = vec![FixtureFormat::StateTest];
        let mut ok = state_case(transfer(10), expect_balance(recipient(), 10));
        ok.formats = vec![FixtureFormat::StateTest];
        let jobs = vec![job("broken", broken), job("ok1", ok.clone()), job("ok2", ok)];

        let report = runner.run(&jobs).unwrap();
        assert_eq!(report.stats.failed, 1);
        assert_eq!(report.stats.skipped, 2);
        assert_eq!(report.stats.failures[0].0, "broken[fork_Shanghai-state_test]");
        assert!(report.fixtures.is_empty());
    }

    #[test]
    fn test_failures_do_not_stop_by_default() {
        let runner = FillRunner::new(context()).with_workers(2);
        let mut broken = state_case(transfer(10), expect_balance(recipient(), 11));
        broken.formats = vec![FixtureFormat::StateTest];
        let mut ok = state_case(transfer(10), expect_balance(recipient(), 10));
        ok.formats = vec![FixtureFormat::StateTest];
        let report = runner.run(&[job("broken", broken), job("ok", ok)]).unwrap();
        assert_eq!(report.stats.failed, 1);
        assert_eq!(report.stats.filled, 1);
        assert_eq!(report.stats.skipped, 0);
    }

    #[test]
    fn test_pre_alloc_groups() {
        let runner = FillRunner::new(context()).with_pre_alloc_groups("salt");
        let mut first = state_case(transfer(10), ExpectedAlloc::new());
        first.formats = vec![FixtureFormat::BlockchainTest];
        let mut second = first.clone();
        if let TestSpec::StateTest(spec) = &mut second.spec {
            spec.pre.insert(Address::from_low_u64(0x42), Account::with_balance(1u64));
        }

        let report = runner.run(&[job("first", first), job("second", second)]).unwrap();
        assert_eq!(report.stats.filled, 2);
        let files = report.groups.unwrap().into_files();
        assert_eq!(files.len(), 1);
        let (_, group) = &files[0];
        assert_eq!(group.fork, Fork::Shanghai);
        assert_eq!(
            group.test_ids,
            vec![
                "first[fork_Shanghai-blockchain_test]".to_string(),
                "second[fork_Shanghai-blockchain_test]".to_string(),
            ]
        );
        assert!(group.pre.get(&Address::from_low_u64(0x42)).is_some());
        assert!(group.pre.get(&sender()).is_some());
    }
}
