//! Event payloads published by the escrow.
//!
//! The watcher backend decodes these by their leading topic symbol.

use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

use crate::types::ChallengeStatus;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EscrowInitialized {
    pub owner: Address,
    pub beneficiary: Address,
    pub oracle: Address,
    pub token: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DonationReceived {
    pub donor: Address,
    pub amount: i128,
    pub total_donation: i128,
}

/// The query the oracle transport listens for.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RefreshRequested {
    pub request_id: u64,
    pub requested_by: Address,
}

/// Published once per applied oracle callback.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChallengeStatusRefreshed {
    pub request_id: u64,
    pub status: ChallengeStatus,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DonationRefunded {
    pub donor: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FundsSwept {
    pub beneficiary: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OracleUpdated {
    pub oracle: Address,
    pub by: Address,
}

pub fn refresh_requested_topic(env: &Env) -> Symbol {
    Symbol::new(env, "refresh_requested")
}

pub fn emit_initialized(env: &Env, owner: Address, beneficiary: Address, oracle: Address, token: Address) {
    let data = EscrowInitialized {
        owner,
        beneficiary,
        oracle,
        token,
    };
    env.events().publish((symbol_short!("init"),), data);
}

pub fn emit_donation_received(env: &Env, donor: Address, amount: i128, total_donation: i128) {
    let topics = (symbol_short!("donated"), donor.clone());
    let data = DonationReceived {
        donor,
        amount,
        total_donation,
    };
    env.events().publish(topics, data);
}

pub fn emit_refresh_requested(env: &Env, request_id: u64, requested_by: Address) {
    let data = RefreshRequested {
        request_id,
        requested_by,
    };
    env.events().publish((refresh_requested_topic(env),), data);
}

pub fn emit_status_refreshed(env: &Env, request_id: u64, status: ChallengeStatus) {
    let data = ChallengeStatusRefreshed { request_id, status };
    env.events().publish((symbol_short!("refreshed"),), data);
}

pub fn emit_donation_refunded(env: &Env, donor: Address, amount: i128) {
    let topics = (symbol_short!("refunded"), donor.clone());
    env.events().publish(topics, DonationRefunded { donor, amount });
}

pub fn emit_funds_swept(env: &Env, beneficiary: Address, amount: i128) {
    env.events()
        .publish((symbol_short!("swept"),), FundsSwept { beneficiary, amount });
}

pub fn emit_paused(env: &Env, caller: Address) {
    env.events().publish((symbol_short!("paused"),), caller);
}

pub fn emit_unpaused(env: &Env, caller: Address) {
    env.events().publish((symbol_short!("unpaused"),), caller);
}

pub fn emit_oracle_updated(env: &Env, oracle: Address, by: Address) {
    env.events()
        .publish((symbol_short!("oracle"),), OracleUpdated { oracle, by });
}
