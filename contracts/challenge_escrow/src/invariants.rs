#![allow(dead_code)]

extern crate std;

use soroban_sdk::Address;

use crate::types::{ChallengeStatus, Escrow};
use crate::{ChallengeEscrowClient, Error};

/// The host error a `try_*` call reports when an entry point panics with `e`.
pub fn contract_error(e: Error) -> soroban_sdk::Error {
    soroban_sdk::Error::from_contract_error(e as u32)
}

/// INV-1: The recorded total must never be negative.
pub fn assert_total_non_negative(escrow: &Escrow) {
    assert!(
        escrow.total_donation >= 0,
        "INV-1 violated: negative total_donation ({})",
        escrow.total_donation
    );
}

/// INV-2: total_donation equals the sum of every donor's remaining claim.
pub fn assert_total_matches_ledger(client: &ChallengeEscrowClient, donors: &[Address]) {
    let sum: i128 = donors.iter().map(|d| client.balance_of(d)).sum();
    let total = client.total_donation();
    assert_eq!(
        total, sum,
        "INV-2 violated: total_donation {} != sum of balances {}",
        total, sum
    );
}

/// INV-3: Deposit invariant — after a deposit of `amount`, a balance
/// increases by exactly `amount`.
pub fn assert_deposit_invariant(balance_before: i128, balance_after: i128, amount: i128) {
    assert_eq!(
        balance_after,
        balance_before + amount,
        "INV-3 violated: deposit invariant broken: {} + {} != {}",
        balance_before,
        amount,
        balance_after
    );
}

/// INV-4: Status only moves forward:
///   Ongoing      -> Ongoing | Accomplished | Failed
///   Accomplished -> Closed
///   Failed       -> (none)
///   Closed       -> (none)
pub fn assert_valid_status_transition(from: &ChallengeStatus, to: &ChallengeStatus) {
    let valid = matches!(
        (from, to),
        (ChallengeStatus::Ongoing, ChallengeStatus::Ongoing)
            | (ChallengeStatus::Ongoing, ChallengeStatus::Accomplished)
            | (ChallengeStatus::Ongoing, ChallengeStatus::Failed)
            | (ChallengeStatus::Accomplished, ChallengeStatus::Closed)
    );

    assert!(
        valid,
        "INV-4 violated: invalid status transition from {:?} to {:?}",
        from, to
    );
}

/// INV-5: Owner, beneficiary and token never change after init.
pub fn assert_escrow_immutable_fields(original: &Escrow, current: &Escrow) {
    assert_eq!(original.owner, current.owner, "INV-5 violated: owner changed");
    assert_eq!(
        original.beneficiary, current.beneficiary,
        "INV-5 violated: beneficiary changed"
    );
    assert_eq!(original.token, current.token, "INV-5 violated: token changed");
}

/// INV-6: A closed escrow holds no ledgered funds and no pending refresh.
pub fn assert_closed_is_drained(escrow: &Escrow) {
    if escrow.status == ChallengeStatus::Closed {
        assert_eq!(
            escrow.total_donation, 0,
            "INV-6 violated: closed escrow still records {}",
            escrow.total_donation
        );
        assert_eq!(
            escrow.pending_request, None,
            "INV-6 violated: closed escrow has a pending refresh"
        );
    }
}

/// INV-7: A pending refresh only exists while the challenge is ongoing.
pub fn assert_pending_only_while_ongoing(escrow: &Escrow) {
    if escrow.pending_request.is_some() {
        assert_eq!(
            escrow.status,
            ChallengeStatus::Ongoing,
            "INV-7 violated: pending refresh in status {:?}",
            escrow.status
        );
    }
}

/// Run all stateless escrow invariants.
pub fn assert_all_escrow_invariants(escrow: &Escrow) {
    assert_total_non_negative(escrow);
    assert_closed_is_drained(escrow);
    assert_pending_only_while_ongoing(escrow);
}
