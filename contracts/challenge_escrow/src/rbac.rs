//! # RBAC — Role-Based Access Control
//!
//! The escrow has three fixed identities, all chosen at `init`:
//!
//! ```text
//! Owner ─────────┐
//!                ├── privileged: refresh, pause/unpause, sweep, set_oracle
//! Beneficiary ───┘
//! Oracle ─────────── capability: deliver refresh callbacks only
//! ```
//!
//! Roles are derived from the stored configuration rather than granted, so
//! there is no role storage of its own and nothing to revoke.
//!
//! ## Threat model notes
//!
//! - The oracle is not privileged: it cannot pause, refresh or sweep.
//! - Owner and beneficiary can never be the oracle; `init` and `set_oracle`
//!   reject that combination, so no single key both asks and answers.
//! - Every guard calls `require_auth` on the claimed identity before
//!   comparing it, so passing someone else's address does not help.

use soroban_sdk::{contracttype, panic_with_error, Address, Env};

use crate::storage;
use crate::Error;

/// The role an address plays in this escrow.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Role {
    /// Deployer of the escrow.
    Owner,
    /// Receives the pool if the challenge is accomplished.
    Beneficiary,
    /// Oracle transport identity; may only fulfill refreshes.
    Oracle,
}

// ─────────────────────────────────────────────────────────
// Access guards (called from lib.rs handlers)
// ─────────────────────────────────────────────────────────

/// Assert that `caller` authorised the call and is the owner or the beneficiary.
/// Panics with `Error::Unauthorized` on failure.
pub fn require_privileged(env: &Env, caller: &Address) {
    caller.require_auth();
    if !is_privileged(env, caller) {
        panic_with_error!(env, Error::Unauthorized);
    }
}

/// Assert that `caller` authorised the call and is the current oracle.
/// Panics with `Error::Unauthorized` on failure.
pub fn require_oracle(env: &Env, caller: &Address) {
    caller.require_auth();
    if storage::get_oracle(env) != *caller {
        panic_with_error!(env, Error::Unauthorized);
    }
}

/// Reject an oracle identity that collides with a privileged one.
pub fn require_distinct_oracle(env: &Env, owner: &Address, beneficiary: &Address, oracle: &Address) {
    if oracle == owner || oracle == beneficiary {
        panic_with_error!(env, Error::Unauthorized);
    }
}

// ─────────────────────────────────────────────────────────
// Queries
// ─────────────────────────────────────────────────────────

/// `true` iff `address` is the owner or the beneficiary.
pub fn is_privileged(env: &Env, address: &Address) -> bool {
    matches!(
        role_of(env, address),
        Some(Role::Owner) | Some(Role::Beneficiary)
    )
}

/// Returns the role held by `address`, or `None`.
///
/// When owner and beneficiary are the same address, `Owner` wins.
pub fn role_of(env: &Env, address: &Address) -> Option<Role> {
    let config = storage::load_config(env);
    if config.owner == *address {
        Some(Role::Owner)
    } else if config.beneficiary == *address {
        Some(Role::Beneficiary)
    } else if storage::get_oracle(env) == *address {
        Some(Role::Oracle)
    } else {
        None
    }
}
