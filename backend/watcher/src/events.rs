//! Canonical event types emitted by the challenge escrow contract.
//!
//! These mirror the Soroban contract events defined in
//! `contracts/challenge_escrow/src/events.rs`.

use serde::{Deserialize, Serialize};

/// All recognised event kinds from the escrow contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// The escrow was initialised (`init` topic).
    EscrowInitialized,
    /// A donor deposited funds (`donated` topic).
    DonationReceived,
    /// A refresh query was issued to the oracle (`refresh_requested` topic).
    RefreshRequested,
    /// The oracle callback was applied (`refreshed` topic).
    ChallengeRefreshed,
    /// A donor reclaimed their balance (`refunded` topic).
    DonationRefunded,
    /// The pool was swept to the beneficiary (`swept` topic).
    FundsSwept,
    /// Deposits were paused (`paused` topic).
    EscrowPaused,
    /// Deposits were resumed (`unpaused` topic).
    EscrowUnpaused,
    /// The oracle identity was rotated (`oracle` topic).
    OracleUpdated,
    /// An event from this contract that we don't recognise yet.
    Unknown,
}

impl EventKind {
    /// Parse the leading topic symbol string produced by Soroban into an [`EventKind`].
    pub fn from_topic(topic: &str) -> Self {
        match topic {
            "init" => Self::EscrowInitialized,
            "donated" => Self::DonationReceived,
            "refresh_requested" => Self::RefreshRequested,
            "refreshed" => Self::ChallengeRefreshed,
            "refunded" => Self::DonationRefunded,
            "swept" => Self::FundsSwept,
            "paused" => Self::EscrowPaused,
            "unpaused" => Self::EscrowUnpaused,
            "oracle" => Self::OracleUpdated,
            _ => Self::Unknown,
        }
    }

    /// Return a short identifier string suitable for storage in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EscrowInitialized => "escrow_initialized",
            Self::DonationReceived => "donation_received",
            Self::RefreshRequested => "refresh_requested",
            Self::ChallengeRefreshed => "challenge_refreshed",
            Self::DonationRefunded => "donation_refunded",
            Self::FundsSwept => "funds_swept",
            Self::EscrowPaused => "escrow_paused",
            Self::EscrowUnpaused => "escrow_unpaused",
            Self::OracleUpdated => "oracle_updated",
            Self::Unknown => "unknown",
        }
    }
}

/// Challenge status as reported in `refreshed` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeStatus {
    Ongoing,
    Accomplished,
    Failed,
    Closed,
}

impl ChallengeStatus {
    /// Accepts the contract's variant names as well as lowercase spellings.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ongoing" => Some(Self::Ongoing),
            "accomplished" => Some(Self::Accomplished),
            "failed" => Some(Self::Failed),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ongoing => "ongoing",
            Self::Accomplished => "accomplished",
            Self::Failed => "failed",
            Self::Closed => "closed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Ongoing)
    }
}

/// A fully decoded escrow event, ready to be stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscrowEvent {
    /// RPC event id; unique per contract event.
    pub event_id: String,
    pub event_type: String,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub request_id: Option<i64>,
    pub status: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
}

/// A raw event record as stored in / read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_id: String,
    pub event_type: String,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub request_id: Option<i64>,
    pub status: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
    pub created_at: i64,
}
