//! Shared pre-allocation groups.
//!
//! Tests whose genesis differs only in fields that do not affect execution
//! share one group. Each group accumulates the union of its tests'
//! pre-states, so a client can load the state once for all of them.

use crate::error::SpecResult;
use dashmap::DashMap;
use fixgen_crypto::sha256;
use fixgen_fixtures::PreAllocGroupFile;
use fixgen_forks::Fork;
use fixgen_primitives::H256;
use fixgen_types::{Alloc, Environment};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug)]
struct PreAllocGroup {
    fork: Fork,
    environment: Environment,
    pre: Alloc,
    test_ids: Vec<String>,
}

/// Concurrent map of pre-allocation groups
#[derive(Debug, Default)]
pub struct PreAllocGroups {
    salt: String,
    groups: DashMap<H256, Arc<Mutex<PreAllocGroup>>>,
}

impl PreAllocGroups {
    /// Groups keyed with `salt`, so separate runs never share files
    pub fn new(salt: impl Into<String>) -> Self {
        Self {
            salt: salt.into(),
            groups: DashMap::new(),
        }
    }

    /// Group key of a genesis
    pub fn key(&self, fork: Fork, env: &Environment) -> H256 {
        let mut input = Vec::new();
        input.extend_from_slice(fork.name().as_bytes());
        input.extend_from_slice(env.grouping_fingerprint().as_bytes());
        input.extend_from_slice(self.salt.as_bytes());
        sha256(&input)
    }

    /// Add a test's genesis to its group.
    ///
    /// Fails when the test's pre-state conflicts with accounts already in the
    /// group.
    pub fn add(&self, test_id: &str, fork: Fork, env: &Environment, pre: &Alloc) -> SpecResult<H256> {
        let key = self.key(fork, env);
        let group = self
            .groups
            .entry(key)
            .or_insert_with(|| {
                Arc::new(Mutex::new(PreAllocGroup {
                    fork,
                    environment: env.clone(),
                    pre: Alloc::new(),
                    test_ids: Vec::new(),
                }))
            })
            .clone();

        let mut group = group.lock();
        group.pre.merge(pre.clone(), false)?;
        group.test_ids.push(test_id.to_string());
        tracing::trace!(%key, test = test_id, "added to pre-alloc group");
        Ok(key)
    }

    /// Number of groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// No groups yet
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Group files in key order, test ids sorted
    pub fn into_files(self) -> Vec<(H256, PreAllocGroupFile)> {
        let mut files: Vec<_> = self
            .groups
            .into_iter()
            .map(|(key, group)| {
                let group = group.lock();
                let mut test_ids = group.test_ids.clone();
                test_ids.sort();
                (
                    key,
                    PreAllocGroupFile {
                        fork: group.fork,
                        environment: group.environment.clone(),
                        pre: group.pre.clone(),
                        test_ids,
                    },
                )
            })
            .collect();
        files.sort_by(|a, b| a.0.cmp(&b.0));
        files
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpecError;
    use fixgen_primitives::{Address, Bytes};
    use fixgen_types::{Account, TypesError};

    fn pre(address: u64, balance: u64) -> Alloc {
        let mut alloc = Alloc::new();
        alloc.insert(Address::from_low_u64(address), Account::with_balance(balance));
        alloc
    }

    // ==================== Keys ====================

    #[test]
    fn test_ungrouped_fields_share_a_group() {
        let groups = PreAllocGroups::new("run");
        let base = Environment::default();
        let other = Environment {
            fee_recipient: Address::from_low_u64(9),
            prev_randao: Some(H256::from_low_u64(1)),
            timestamp: 77,
            extra_data: Bytes::from(vec![1, 2]),
            ..Default::default()
        };
        assert_eq!(groups.key(Fork::Cancun, &base), groups.key(Fork::Cancun, &other));
    }

    #[test]
    fn test_execution_fields_split_groups() {
        let groups = PreAllocGroups::new("run");
        let base = Environment::default();
        for env in [
            Environment { gas_limit: 1, ..Default::default() },
            Environment { number: 9, ..Default::default() },
            Environment { base_fee_per_gas: Some(1), ..Default::default() },
            Environment { excess_blob_gas: Some(1), ..Default::default() },
        ] {
            assert_ne!(groups.key(Fork::Cancun, &base), groups.key(Fork::Cancun, &env));
        }
        assert_ne!(groups.key(Fork::Cancun, &base), groups.key(Fork::Prague, &base));
        assert_ne!(
            groups.key(Fork::Cancun, &base),
            PreAllocGroups::new("other").key(Fork::Cancun, &base)
        );
    }

    // ==================== Merging ====================

    #[test]
    fn test_pre_states_accumulate() {
        let groups = PreAllocGroups::new("");
        let env = Environment::default();
        let a = groups.add("b_test", Fork::Cancun, &env, &pre(1, 10)).unwrap();
        let b = groups.add("a_test", Fork::Cancun, &env, &pre(2, 20)).unwrap();
        assert_eq!(a, b);
        assert_eq!(groups.len(), 1);

        let files = groups.into_files();
        let (_, file) = &files[0];
        assert_eq!(file.test_ids, vec!["a_test".to_string(), "b_test".to_string()]);
        assert_eq!(file.pre.iter().count(), 2);
    }

    #[test]
    fn test_conflicting_pre_state() {
        let groups = PreAllocGroups::new("");
        let env = Environment::default();
        groups.add("one", Fork::Cancun, &env, &pre(1, 10)).unwrap();
        assert!(matches!(
            groups.add("two", Fork::Cancun, &env, &pre(1, 11)),
            Err(SpecError::Types(TypesError::AllocCollision { .. }))
        ));
    }

    #[test]
    fn test_conflicting_pre_state_leaves_group_untouched() {
        let groups = PreAllocGroups::new("");
        let env = Environment::default();
        groups.add("one", Fork::Cancun, &env, &pre(5, 10)).unwrap();

        let mut conflicting = pre(1, 1);
        conflicting.insert(Address::from_low_u64(5), Account::with_balance(11u64));
        assert!(groups.add("two", Fork::Cancun, &env, &conflicting).is_err());

        let files = groups.into_files();
        let (_, file) = &files[0];
        assert_eq!(file.pre.len(), 1);
        assert_eq!(file.test_ids, vec!["one".to_string()]);
    }
}
