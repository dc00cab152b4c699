//! Builtin client tables

use fixgen_exceptions::{
    ClientKind, EofException, ExceptionKind, ExceptionMapper, TransactionException,
};

// =============================================================================
// Table consistency
// =============================================================================

mod tables {
    use super::*;

    #[test]
    fn every_builtin_table_constructs() {
        for client in ClientKind::ALL {
            let mapper = ExceptionMapper::for_client(client).unwrap();
            assert_eq!(mapper.client(), client.name());
        }
    }

    #[test]
    fn representative_messages_classify_back() {
        for client in ClientKind::ALL {
            let mapper = ExceptionMapper::for_client(client).unwrap();
            for kind in mapper.mapped_kinds() {
                let message = mapper.message_for(kind).unwrap();
                assert_eq!(mapper.classify(message), kind, "{}: {}", client, message);
            }
        }
    }

    #[test]
    fn evmone_covers_every_eof_exception() {
        let mapper = ExceptionMapper::for_client(ClientKind::Evmone).unwrap();
        for e in EofException::ALL {
            assert!(
                mapper.message_for(ExceptionKind::Eof(*e)).is_some(),
                "no message for {}",
                e
            );
        }
    }
}

// =============================================================================
// Classification
// =============================================================================

mod classify {
    use super::*;

    #[test]
    fn geth_messages_with_context() {
        let mapper = ExceptionMapper::for_client(ClientKind::Geth).unwrap();
        assert_eq!(
            mapper.classify(
                "insufficient funds for gas * price + value: address 0xa94f have 100 want 121000"
            ),
            ExceptionKind::from(TransactionException::InsufficientAccountFunds)
        );
        assert_eq!(
            mapper.classify("blob 0 has invalid hash version"),
            ExceptionKind::from(TransactionException::Type3TxInvalidBlobVersionedHash)
        );
    }

    #[test]
    fn reth_nonce_regexes() {
        let mapper = ExceptionMapper::for_client(ClientKind::Reth).unwrap();
        assert_eq!(
            mapper.classify("transaction nonce 3 too high, expected 1"),
            ExceptionKind::from(TransactionException::NonceMismatchTooHigh)
        );
    }

    #[test]
    fn unknown_text_is_undefined_and_stable() {
        let mapper = ExceptionMapper::for_client(ClientKind::Besu).unwrap();
        let first = mapper.classify("the tool crashed in an unexpected way");
        assert_eq!(first, ExceptionKind::Undefined);
        assert_eq!(mapper.classify("the tool crashed in an unexpected way"), first);
        assert_eq!(mapper.classify(""), ExceptionKind::Undefined);
    }

    #[test]
    fn evmone_eof_mnemonics() {
        let mapper = ExceptionMapper::for_client(ClientKind::Evmone).unwrap();
        assert_eq!(
            mapper.classify("err: no_terminating_instruction"),
            ExceptionKind::from(EofException::MissingStopOpcode)
        );
        assert_eq!(
            mapper.classify("err: unreferenced_subcontainer"),
            ExceptionKind::from(EofException::OrphanSubcontainer)
        );
    }
}
