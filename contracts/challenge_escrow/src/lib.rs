//! # Challenge Escrow Contract
//!
//! A custodial donation pool whose payout depends on the outcome of an
//! off-chain challenge, reported asynchronously by an oracle. It exposes the
//! single Soroban contract `ChallengeEscrow` whose entry points cover the full
//! lifecycle of one challenge:
//!
//! | Phase        | Entry Point(s)                                        |
//! |--------------|-------------------------------------------------------|
//! | Bootstrap    | [`ChallengeEscrow::init`]                             |
//! | Admin        | `pause`, `unpause`, `set_oracle`                      |
//! | Funding      | [`ChallengeEscrow::deposit`]                          |
//! | Refresh      | `request_refresh`, `fulfill_refresh` (oracle only)    |
//! | Payout       | `sweep_to_beneficiary`, `withdraw_own`                |
//! | Queries      | `get_escrow`, `status`, `balance_of`, `role_of`, ...  |
//!
//! ## Refresh protocol
//!
//! The challenge outcome lives off-chain, so a refresh is two calls separated
//! by unbounded latency:
//!
//! 1. `request_refresh` records a pending request id and publishes a
//!    `refresh_requested` event. It returns immediately.
//! 2. The oracle transport observes the event and calls `fulfill_refresh`
//!    with the same id and the outcome it found.
//!
//! At most one request is pending at a time. Asking again while one is
//! pending re-announces the same id, so a dropped query can always be
//! retried. Callbacks that arrive for an unknown id or after the status
//! became terminal are ignored.
//!
//! ## Architecture
//!
//! Authorization is delegated to [`rbac`]. Storage access is delegated to
//! [`storage`]. Event payloads live in [`events`].

#![no_std]

use soroban_sdk::{contract, contracterror, contractimpl, panic_with_error, token, Address, Env};

pub mod events;
pub mod rbac;
mod storage;
mod types;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_events;

pub use rbac::Role;
use storage::{load_config, load_pair, load_state, save_state};
pub use types::{ChallengeStatus, Escrow, EscrowConfig, EscrowState};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    DepositRejected = 4,
    RefreshRejected = 5,
    WithdrawalRejected = 6,
    PayoutRejected = 7,
    InvalidOracleStatus = 8,
    LedgerMismatch = 9,
    Overflow = 10,
}

#[contract]
pub struct ChallengeEscrow;

#[contractimpl]
impl ChallengeEscrow {
    // ─────────────────────────────────────────────────────────
    // Initialisation
    // ─────────────────────────────────────────────────────────

    /// Initialise the escrow for one challenge.
    ///
    /// Must be called exactly once immediately after deployment.
    /// Subsequent calls panic with `Error::AlreadyInitialized`.
    ///
    /// - `owner` must sign the transaction.
    /// - `oracle` may be neither the owner nor the beneficiary.
    /// - `token` is the Stellar Asset Contract the pool is held in.
    pub fn init(env: Env, owner: Address, beneficiary: Address, oracle: Address, token: Address) {
        owner.require_auth();
        if storage::is_initialized(&env) {
            panic_with_error!(&env, Error::AlreadyInitialized);
        }
        rbac::require_distinct_oracle(&env, &owner, &beneficiary, &oracle);

        let config = EscrowConfig {
            owner: owner.clone(),
            beneficiary: beneficiary.clone(),
            token: token.clone(),
        };
        storage::save_new_escrow(&env, &config, &EscrowState::initial(), &oracle);

        events::emit_initialized(&env, owner, beneficiary, oracle, token);
    }

    // ─────────────────────────────────────────────────────────
    // Emergency control
    // ─────────────────────────────────────────────────────────

    /// Stop accepting deposits. Refreshes and withdrawals keep working.
    ///
    /// - `caller` must be the owner or the beneficiary.
    /// - Pausing an already paused escrow is a no-op.
    pub fn pause(env: Env, caller: Address) {
        rbac::require_privileged(&env, &caller);
        let mut state = load_state(&env);
        if !state.paused {
            state.paused = true;
            save_state(&env, &state);
            events::emit_paused(&env, caller);
        }
    }

    /// Resume accepting deposits.
    ///
    /// - `caller` must be the owner or the beneficiary.
    /// - Unpausing an escrow that is not paused is a no-op.
    pub fn unpause(env: Env, caller: Address) {
        rbac::require_privileged(&env, &caller);
        let mut state = load_state(&env);
        if state.paused {
            state.paused = false;
            save_state(&env, &state);
            events::emit_unpaused(&env, caller);
        }
    }

    /// Rotate the oracle transport identity.
    ///
    /// A pending refresh stays pending and can be fulfilled by the new oracle.
    pub fn set_oracle(env: Env, caller: Address, oracle: Address) {
        rbac::require_privileged(&env, &caller);
        let config = load_config(&env);
        rbac::require_distinct_oracle(&env, &config.owner, &config.beneficiary, &oracle);
        storage::set_oracle(&env, &oracle);
        events::emit_oracle_updated(&env, oracle, caller);
    }

    // ─────────────────────────────────────────────────────────
    // Donation ledger
    // ─────────────────────────────────────────────────────────

    /// Deposit `amount` of the escrow token from `donor`.
    ///
    /// Accepted only while the challenge is `Ongoing` and the escrow is not
    /// paused; otherwise `Error::DepositRejected`.
    pub fn deposit(env: Env, donor: Address, amount: i128) {
        donor.require_auth();

        let (config, mut state) = load_pair(&env);
        if amount <= 0 || state.paused || state.status != ChallengeStatus::Ongoing {
            panic_with_error!(&env, Error::DepositRejected);
        }

        // Pull the funds first; the ledger is only credited for tokens held.
        let token_client = token::Client::new(&env, &config.token);
        token_client.transfer(&donor, &env.current_contract_address(), &amount);

        let previous = storage::get_donation(&env, &donor);
        if previous.is_none() {
            state.donor_count = state
                .donor_count
                .checked_add(1)
                .unwrap_or_else(|| panic_with_error!(&env, Error::Overflow));
        }
        let balance = previous
            .unwrap_or(0)
            .checked_add(amount)
            .unwrap_or_else(|| panic_with_error!(&env, Error::Overflow));
        state.total_donation = state
            .total_donation
            .checked_add(amount)
            .unwrap_or_else(|| panic_with_error!(&env, Error::Overflow));

        storage::set_donation(&env, &donor, balance);
        save_state(&env, &state);

        events::emit_donation_received(&env, donor, amount, state.total_donation);
    }

    /// Refund the caller's own balance after the challenge failed.
    ///
    /// The balance is zeroed and the total debited before the tokens leave
    /// the contract. Returns the refunded amount.
    pub fn withdraw_own(env: Env, donor: Address) -> i128 {
        donor.require_auth();

        let (config, mut state) = load_pair(&env);
        if state.status != ChallengeStatus::Failed {
            panic_with_error!(&env, Error::WithdrawalRejected);
        }

        let amount = storage::drain_donation(&env, &donor);
        if amount <= 0 {
            panic_with_error!(&env, Error::WithdrawalRejected);
        }
        state.total_donation = state
            .total_donation
            .checked_sub(amount)
            .unwrap_or_else(|| panic_with_error!(&env, Error::Overflow));
        save_state(&env, &state);

        let token_client = token::Client::new(&env, &config.token);
        token_client.transfer(&env.current_contract_address(), &donor, &amount);

        events::emit_donation_refunded(&env, donor, amount);
        amount
    }

    // ─────────────────────────────────────────────────────────
    // Challenge state machine
    // ─────────────────────────────────────────────────────────

    /// Ask the oracle for the current challenge outcome.
    ///
    /// Returns the id the oracle must echo back in `fulfill_refresh`. When a
    /// request is already pending its id is re-announced instead of opening
    /// a second one.
    ///
    /// - `caller` must be the owner or the beneficiary.
    /// - Rejected with `Error::RefreshRejected` once the status is terminal.
    pub fn request_refresh(env: Env, caller: Address) -> u64 {
        rbac::require_privileged(&env, &caller);

        let mut state = load_state(&env);
        if state.status != ChallengeStatus::Ongoing {
            panic_with_error!(&env, Error::RefreshRejected);
        }

        let request_id = match state.pending_request {
            Some(id) => id,
            None => {
                let id = state.next_request_id;
                state.next_request_id = id
                    .checked_add(1)
                    .unwrap_or_else(|| panic_with_error!(&env, Error::Overflow));
                state.pending_request = Some(id);
                save_state(&env, &state);
                id
            }
        };

        events::emit_refresh_requested(&env, request_id, caller);
        request_id
    }

    /// Apply the oracle's answer to request `request_id`.
    ///
    /// Returns `true` when the answer was applied. Stale deliveries (no
    /// pending request, a different id, or an already terminal status) change
    /// nothing and return `false`.
    ///
    /// - `oracle` must be the configured oracle identity.
    /// - `Closed` is never a valid answer: `Error::InvalidOracleStatus`.
    pub fn fulfill_refresh(
        env: Env,
        oracle: Address,
        request_id: u64,
        new_status: ChallengeStatus,
    ) -> bool {
        rbac::require_oracle(&env, &oracle);

        if !new_status.is_oracle_reportable() {
            panic_with_error!(&env, Error::InvalidOracleStatus);
        }

        let mut state = load_state(&env);
        if state.status.is_terminal() || state.pending_request != Some(request_id) {
            return false;
        }

        state.status = new_status;
        state.pending_request = None;
        save_state(&env, &state);

        events::emit_status_refreshed(&env, request_id, new_status);
        true
    }

    // ─────────────────────────────────────────────────────────
    // Payout
    // ─────────────────────────────────────────────────────────

    /// Send the whole pool to the beneficiary and close the escrow.
    ///
    /// - `caller` must be the owner or the beneficiary.
    /// - Only possible once, while the status is `Accomplished`.
    /// - Fails with `Error::LedgerMismatch` if the contract holds less than
    ///   the recorded total.
    ///
    /// Returns the amount transferred.
    pub fn sweep_to_beneficiary(env: Env, caller: Address) -> i128 {
        rbac::require_privileged(&env, &caller);

        let (config, mut state) = load_pair(&env);
        if state.status != ChallengeStatus::Accomplished {
            panic_with_error!(&env, Error::PayoutRejected);
        }

        let token_client = token::Client::new(&env, &config.token);
        let contract = env.current_contract_address();
        let held = token_client.balance(&contract);
        if held < state.total_donation {
            panic_with_error!(&env, Error::LedgerMismatch);
        }

        state.status = ChallengeStatus::Closed;
        state.total_donation = 0;
        save_state(&env, &state);

        if held > 0 {
            token_client.transfer(&contract, &config.beneficiary, &held);
        }

        events::emit_funds_swept(&env, config.beneficiary, held);
        held
    }

    // ─────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────

    /// Full snapshot of the escrow.
    pub fn get_escrow(env: Env) -> Escrow {
        let (config, state) = load_pair(&env);
        Escrow {
            owner: config.owner,
            beneficiary: config.beneficiary,
            oracle: storage::get_oracle(&env),
            token: config.token,
            status: state.status,
            paused: state.paused,
            total_donation: state.total_donation,
            donor_count: state.donor_count,
            pending_request: state.pending_request,
        }
    }

    pub fn owner(env: Env) -> Address {
        load_config(&env).owner
    }

    pub fn beneficiary(env: Env) -> Address {
        load_config(&env).beneficiary
    }

    pub fn oracle(env: Env) -> Address {
        storage::get_oracle(&env)
    }

    pub fn token(env: Env) -> Address {
        load_config(&env).token
    }

    pub fn status(env: Env) -> ChallengeStatus {
        load_state(&env).status
    }

    pub fn is_paused(env: Env) -> bool {
        load_state(&env).paused
    }

    pub fn total_donation(env: Env) -> i128 {
        load_state(&env).total_donation
    }

    /// Number of distinct addresses that ever donated.
    pub fn donor_count(env: Env) -> u32 {
        load_state(&env).donor_count
    }

    /// Remaining claim of `donor`. Reads 0 once the pool has been swept.
    pub fn balance_of(env: Env, donor: Address) -> i128 {
        if load_state(&env).status == ChallengeStatus::Closed {
            return 0;
        }
        storage::get_donation(&env, &donor).unwrap_or(0)
    }

    /// Id of the refresh awaiting its oracle callback, if any.
    pub fn pending_refresh(env: Env) -> Option<u64> {
        load_state(&env).pending_request
    }

    /// Return the role held by `address`, or `None`.
    pub fn role_of(env: Env, address: Address) -> Option<Role> {
        rbac::role_of(&env, &address)
    }

    /// `true` if `address` is the owner or the beneficiary.
    pub fn is_privileged(env: Env, address: Address) -> bool {
        rbac::is_privileged(&env, &address)
    }
}
