//! Transaction signing and state-root properties

use fixgen_forks::Fork;
use fixgen_primitives::{Address, Bytes, H256, U256};
use fixgen_types::*;
use proptest::prelude::*;

// ============================================================
// Signing
// ============================================================

mod signing {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn sender_survives_signing(
            nonce in 0u64..1_000,
            value in 0u64..u64::MAX,
            data in proptest::collection::vec(any::<u8>(), 0..64),
            ty in 0u64..3,
        ) {
            let tx = Transaction {
                ty: Some(ty),
                nonce,
                value: U256::from(value),
                data: Bytes::from(data),
                ..Default::default()
            };
            let mut signed = tx.sign().unwrap();
            let expected = signed.sender().unwrap();
            signed.secret_key = None;
            prop_assert_eq!(signed.sender().unwrap(), expected);
        }
    }

    #[test]
    fn test_hash_changes_with_nonce() {
        let a = Transaction::default().sign().unwrap();
        let b = Transaction { nonce: 1, ..Default::default() }.sign().unwrap();
        assert_ne!(a.hash().unwrap(), b.hash().unwrap());
    }

    #[test]
    fn test_given_signature_is_kept() {
        let signed = Transaction::default().sign().unwrap();
        let again = signed.clone().sign().unwrap();
        assert_eq!(signed, again);
    }
}

// ============================================================
// Post-state
// ============================================================

mod post_state {
    use super::*;

    #[test]
    fn test_transfer_post_state() {
        let sender = Address::from_hex("0xa94f5374fce5edbc8e2a8697c15331677e6ebf0b").unwrap();
        let recipient = DEFAULT_RECIPIENT;

        let mut post = Alloc::new();
        let mut from = Account::with_balance(90u64);
        from.nonce = 1;
        post.insert(sender, from);
        post.insert(recipient, Account::with_balance(10u64));

        let expected: ExpectedAlloc = serde_json::from_value(serde_json::json!({
            recipient.to_hex(): { "balance": "0x0a" },
            sender.to_hex(): { "nonce": "0x01" },
            Address::from_low_u64(0xdead).to_hex(): null,
        }))
        .unwrap();
        expected.verify(&post).unwrap();
        assert_ne!(post.state_root(), H256::ZERO);
    }

    #[test]
    fn test_environment_round_trip() {
        let env = Environment::default().set_fork_requirements(Fork::Prague);
        let json = serde_json::to_string(&env).unwrap();
        let back: Environment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, env);
    }
}
