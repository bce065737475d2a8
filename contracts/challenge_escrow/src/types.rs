//! # Types
//!
//! Shared data structures used across all modules of the escrow contract.
//!
//! ## Design decisions
//!
//! ### Config / State split
//!
//! The escrow instance is internally stored as two separate ledger entries:
//!
//! - [`EscrowConfig`] — written once at `init`; never mutated.
//! - [`EscrowState`] — written on every deposit, refresh, withdrawal and sweep.
//!
//! The public API exposes the reconstructed [`Escrow`] struct for convenience.
//!
//! ### Status as a Finite-State Machine
//!
//! [`ChallengeStatus`] enforces a strict forward-only lifecycle:
//!
//! ```text
//! Ongoing ──► Accomplished ──► Closed
//!    │
//!    └──────► Failed
//! ```
//!
//! `Ongoing → Ongoing` is the only self-loop (a refresh that reports no
//! outcome yet). `Failed` and `Closed` are absorbing.

use soroban_sdk::{contracttype, Address};

/// Outcome of the challenge as known to the contract.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChallengeStatus {
    /// Challenge still running; deposits accepted.
    Ongoing,
    /// Oracle reported success; funds may be swept to the beneficiary.
    Accomplished,
    /// Oracle reported failure; donors may reclaim their own balance.
    Failed,
    /// Beneficiary sweep done. Never reported by the oracle.
    Closed,
}

impl ChallengeStatus {
    /// `true` once no further refresh can change the status.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ChallengeStatus::Ongoing)
    }

    /// Values the oracle transport is allowed to deliver.
    pub fn is_oracle_reportable(&self) -> bool {
        matches!(
            self,
            ChallengeStatus::Ongoing | ChallengeStatus::Accomplished | ChallengeStatus::Failed
        )
    }
}

/// Immutable escrow configuration, written once at `init`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EscrowConfig {
    pub owner: Address,
    pub beneficiary: Address,
    /// Stellar Asset Contract the pool is denominated in.
    pub token: Address,
}

/// Mutable escrow state.
///
/// Kept small so that frequent writes (deposits) are cheap.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EscrowState {
    pub status: ChallengeStatus,
    pub paused: bool,
    /// Sum of every donor balance still carrying a claim.
    pub total_donation: i128,
    /// Number of distinct addresses that ever donated.
    pub donor_count: u32,
    /// Id of the refresh query awaiting its oracle callback.
    pub pending_request: Option<u64>,
    /// Id handed to the next refresh query.
    pub next_request_id: u64,
}

impl EscrowState {
    pub fn initial() -> Self {
        EscrowState {
            status: ChallengeStatus::Ongoing,
            paused: false,
            total_donation: 0,
            donor_count: 0,
            pending_request: None,
            next_request_id: 0,
        }
    }
}

/// Full on-chain representation of the escrow.
///
/// Used as the public API return type; reconstructed internally from
/// the split `EscrowConfig` + `EscrowState` storage entries plus the
/// current oracle identity.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Escrow {
    /// Deployer; privileged.
    pub owner: Address,
    /// Receives the sweep on success; privileged.
    pub beneficiary: Address,
    /// Only identity allowed to deliver refresh callbacks.
    pub oracle: Address,
    /// Asset the pool is held in.
    pub token: Address,
    pub status: ChallengeStatus,
    pub paused: bool,
    pub total_donation: i128,
    pub donor_count: u32,
    pub pending_request: Option<u64>,
}
