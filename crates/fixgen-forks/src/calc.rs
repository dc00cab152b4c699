//! Fee and gas calculators

use crate::fork::Fork;
use fixgen_primitives::U256;

/// Base fee of the first London block
pub const INITIAL_BASE_FEE: u64 = 1_000_000_000;

const ELASTICITY_MULTIPLIER: u64 = 2;
const BASE_FEE_MAX_CHANGE_DENOMINATOR: u128 = 8;

const TX_BASE_COST: u64 = 21_000;
const TX_CREATE_COST: u64 = 32_000;
const TX_DATA_ZERO_COST: u64 = 4;
const TX_DATA_NONZERO_COST_FRONTIER: u64 = 68;
const TX_DATA_NONZERO_COST_ISTANBUL: u64 = 16;
const INITCODE_WORD_COST: u64 = 2;
const ACCESS_LIST_ADDRESS_COST: u64 = 2_400;
const ACCESS_LIST_STORAGE_KEY_COST: u64 = 1_900;
const PER_AUTHORIZATION_COST: u64 = 25_000;
const FLOOR_COST_PER_TOKEN: u64 = 10;
const TOKENS_PER_NONZERO_BYTE: u64 = 4;

/// EIP-1559 base fee of a child block
pub fn calc_base_fee(parent_gas_limit: u64, parent_gas_used: u64, parent_base_fee: u64) -> u64 {
    let target = parent_gas_limit / ELASTICITY_MULTIPLIER;
    if target == 0 || parent_gas_used == target {
        return parent_base_fee;
    }
    let base = parent_base_fee as u128;
    if parent_gas_used > target {
        let delta = (parent_gas_used - target) as u128;
        let increase = (base * delta / target as u128 / BASE_FEE_MAX_CHANGE_DENOMINATOR).max(1);
        u64::try_from(base + increase).unwrap_or(u64::MAX)
    } else {
        let delta = (target - parent_gas_used) as u128;
        let decrease = base * delta / target as u128 / BASE_FEE_MAX_CHANGE_DENOMINATOR;
        (base - decrease) as u64
    }
}

/// EIP-4844 excess blob gas of a child block
pub fn calc_excess_blob_gas(fork: Fork, parent_excess_blob_gas: u64, parent_blob_gas_used: u64) -> u64 {
    parent_excess_blob_gas
        .saturating_add(parent_blob_gas_used)
        .saturating_sub(fork.target_blob_gas_per_block())
}

/// Blob base fee for the given excess blob gas
pub fn blob_base_fee(fork: Fork, excess_blob_gas: u64) -> U256 {
    let fraction = fork
        .blob_schedule()
        .map(|s| s.base_fee_update_fraction)
        .unwrap_or(1);
    fake_exponential(U256::one(), U256::from(excess_blob_gas), U256::from(fraction))
}

/// Integer approximation of `factor * e ** (numerator / denominator)`
fn fake_exponential(factor: U256, numerator: U256, denominator: U256) -> U256 {
    let mut i = U256::one();
    let mut output = U256::zero();
    let mut accum = factor.saturating_mul(denominator);
    while !accum.is_zero() {
        output = output.saturating_add(accum);
        accum = accum.saturating_mul(numerator) / denominator.saturating_mul(i);
        i += U256::one();
    }
    output / denominator
}

/// Inputs of the intrinsic gas computation
#[derive(Debug, Clone, Default)]
pub struct IntrinsicGasInput<'a> {
    /// Call data or init code
    pub data: &'a [u8],
    /// Whether the transaction deploys a contract
    pub contract_creation: bool,
    /// Addresses in the access list
    pub access_list_addresses: u64,
    /// Storage keys over all access list entries
    pub access_list_storage_keys: u64,
    /// Set-code authorizations
    pub authorizations: u64,
}

fn calldata_tokens(data: &[u8]) -> (u64, u64) {
    let zeros = data.iter().filter(|b| **b == 0).count() as u64;
    (zeros, data.len() as u64 - zeros)
}

/// Gas charged before execution starts
pub fn intrinsic_gas(fork: Fork, input: &IntrinsicGasInput<'_>) -> u64 {
    let (zeros, nonzeros) = calldata_tokens(input.data);
    let nonzero_cost = if fork.is_at_least(Fork::Istanbul) {
        TX_DATA_NONZERO_COST_ISTANBUL
    } else {
        TX_DATA_NONZERO_COST_FRONTIER
    };
    let mut gas = TX_BASE_COST + zeros * TX_DATA_ZERO_COST + nonzeros * nonzero_cost;

    if input.contract_creation {
        if fork.is_at_least(Fork::Homestead) {
            gas += TX_CREATE_COST;
        }
        if fork.is_at_least(Fork::Shanghai) {
            gas += INITCODE_WORD_COST * (input.data.len() as u64).div_ceil(32);
        }
    }
    if fork.is_at_least(Fork::Berlin) {
        gas += input.access_list_addresses * ACCESS_LIST_ADDRESS_COST
            + input.access_list_storage_keys * ACCESS_LIST_STORAGE_KEY_COST;
    }
    if fork.is_at_least(Fork::Prague) {
        gas += input.authorizations * PER_AUTHORIZATION_COST;
    }
    gas
}

/// EIP-7623 calldata floor, zero before Prague
pub fn calldata_floor_gas(fork: Fork, data: &[u8]) -> u64 {
    if !fork.is_at_least(Fork::Prague) {
        return 0;
    }
    let (zeros, nonzeros) = calldata_tokens(data);
    TX_BASE_COST + FLOOR_COST_PER_TOKEN * (zeros + nonzeros * TOKENS_PER_NONZERO_BYTE)
}

/// Smallest gas limit a transaction may declare
pub fn min_gas_required(fork: Fork, input: &IntrinsicGasInput<'_>) -> u64 {
    intrinsic_gas(fork, input).max(calldata_floor_gas(fork, input.data))
}
