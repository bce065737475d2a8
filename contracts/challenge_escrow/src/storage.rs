//! # Storage
//!
//! Provides typed helpers over Soroban's two storage tiers used by the escrow:
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key       | Type           | Description                          |
//! |-----------|----------------|--------------------------------------|
//! | `Config`  | `EscrowConfig` | Owner, beneficiary, token            |
//! | `State`   | `EscrowState`  | Status, pause flag, totals, refresh  |
//! | `Oracle`  | `Address`      | Current oracle transport identity    |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                | Type   | Description                     |
//! |--------------------|--------|---------------------------------|
//! | `Donation(donor)`  | `i128` | Remaining claim of one donor    |
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days remaining.
//! Donation entries are never removed, only zeroed.

use soroban_sdk::{contracttype, panic_with_error, Address, Env};

use crate::types::{EscrowConfig, EscrowState};
use crate::Error;

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

/// Instance storage: bump by 7 days when below 1 day remaining.
const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

/// Persistent storage: bump by 30 days when below 7 days remaining.
const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Immutable escrow configuration (Instance).
    Config,
    /// Mutable escrow state (Instance).
    State,
    /// Oracle transport identity (Instance).
    Oracle,
    /// Per-donor balance (Persistent).
    Donation(Address),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

/// Write the configuration, initial state and oracle in one go.
pub fn save_new_escrow(env: &Env, config: &EscrowConfig, state: &EscrowState, oracle: &Address) {
    let storage = env.storage().instance();
    storage.set(&DataKey::Config, config);
    storage.set(&DataKey::State, state);
    storage.set(&DataKey::Oracle, oracle);
    bump_instance(env);
}

/// Load the immutable configuration.
/// Panics with `Error::NotInitialized` before `init`.
pub fn load_config(env: &Env) -> EscrowConfig {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .unwrap_or_else(|| panic_with_error!(env, Error::NotInitialized))
}

/// Load the mutable state.
/// Panics with `Error::NotInitialized` before `init`.
pub fn load_state(env: &Env) -> EscrowState {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::State)
        .unwrap_or_else(|| panic_with_error!(env, Error::NotInitialized))
}

/// Load config and state together (the common read pattern of mutating calls).
pub fn load_pair(env: &Env) -> (EscrowConfig, EscrowState) {
    (load_config(env), load_state(env))
}

pub fn save_state(env: &Env, state: &EscrowState) {
    env.storage().instance().set(&DataKey::State, state);
    bump_instance(env);
}

pub fn get_oracle(env: &Env) -> Address {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Oracle)
        .unwrap_or_else(|| panic_with_error!(env, Error::NotInitialized))
}

pub fn set_oracle(env: &Env, oracle: &Address) {
    env.storage().instance().set(&DataKey::Oracle, oracle);
    bump_instance(env);
}

// ── Persistent Storage Helpers ───────────────────────────────────────

fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

/// Stored balance of `donor`, or `None` if the donor never deposited.
pub fn get_donation(env: &Env, donor: &Address) -> Option<i128> {
    let key = DataKey::Donation(donor.clone());
    let balance: Option<i128> = env.storage().persistent().get(&key);
    // extend_ttl traps on a missing entry.
    if balance.is_some() {
        bump_persistent(env, &key);
    }
    balance
}

pub fn set_donation(env: &Env, donor: &Address, balance: i128) {
    let key = DataKey::Donation(donor.clone());
    env.storage().persistent().set(&key, &balance);
    bump_persistent(env, &key);
}

/// Zero out the balance of `donor` and return what it was.
/// Called by `withdraw_own` before the refund leaves the contract.
pub fn drain_donation(env: &Env, donor: &Address) -> i128 {
    let balance = get_donation(env, donor).unwrap_or(0);
    if balance > 0 {
        set_donation(env, donor, 0);
    }
    balance
}
