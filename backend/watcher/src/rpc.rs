//! Soroban RPC client — polls `getEvents` and decodes escrow events.
//!
//! ## Resilience
//!
//! * Exponential back-off is applied when the RPC returns an error or rate-limit
//!   response, up to [`MAX_BACKOFF_SECS`] seconds.
//! * Transient network errors (connection reset, timeout) are retried silently.
//! * JSON-RPC codes -32600 / -32601 mean the request itself is wrong and are
//!   returned as errors instead of retried.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::{Result, WatcherError};
use crate::events::{ChallengeStatus, EscrowEvent, EventKind};

const MAX_BACKOFF_SECS: u64 = 60;
const INITIAL_BACKOFF_SECS: u64 = 2;

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub result: Option<EventsResult>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    fn is_hard(&self) -> bool {
        self.code == -32600 || self.code == -32601
    }
}

#[derive(Debug, Deserialize)]
pub struct EventsResult {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    #[serde(rename = "latestLedger")]
    pub latest_ledger: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
#[allow(dead_code)]
pub struct RawEvent {
    /// XDR-decoded topic list
    pub topic: Vec<String>,
    /// XDR-decoded event value / data
    pub value: Value,
    #[serde(rename = "contractId")]
    pub contract_id: Option<String>,
    #[serde(rename = "txHash")]
    pub tx_hash: Option<String>,
    pub id: Option<String>,
    pub ledger: Option<u64>,
    #[serde(rename = "ledgerClosedAt")]
    pub ledger_closed_at: Option<String>,
    #[serde(rename = "inSuccessfulContractCall")]
    pub in_successful_contract_call: Option<bool>,
    #[serde(rename = "pagingToken")]
    pub paging_token: Option<String>,
}

/// One page of `getEvents` results.
#[derive(Debug, Default)]
pub struct EventsPage {
    pub events: Vec<RawEvent>,
    /// Opaque cursor to continue from, if the RPC returned one.
    pub cursor: Option<String>,
    pub latest_ledger: Option<u64>,
}

/// Doubling delay between retries, capped at [`MAX_BACKOFF_SECS`].
struct Backoff {
    secs: u64,
}

impl Backoff {
    fn new() -> Self {
        Backoff {
            secs: INITIAL_BACKOFF_SECS,
        }
    }

    fn current(&self) -> u64 {
        self.secs
    }

    async fn wait(&mut self) {
        tokio::time::sleep(Duration::from_secs(self.secs)).await;
        self.secs = (self.secs * 2).min(MAX_BACKOFF_SECS);
    }
}

// ─────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────

/// Fetch a page of events for `contract_id` from the RPC.
///
/// * `start_ledger` — the ledger sequence to scan from (inclusive); ignored
///   when `cursor` is given.
/// * `cursor`       — optional opaque pagination cursor from a previous page.
/// * `limit`        — maximum number of events to return.
pub async fn fetch_events(
    client: &Client,
    rpc_url: &str,
    contract_id: &str,
    start_ledger: u32,
    cursor: Option<&str>,
    limit: u32,
) -> Result<EventsPage> {
    let mut backoff = Backoff::new();
    let body = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "getEvents",
        "params": build_params(contract_id, start_ledger, cursor, limit),
    });

    loop {
        let resp = match client.post(rpc_url).json(&body).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("RPC request failed (will retry in {}s): {e}", backoff.current());
                backoff.wait().await;
                continue;
            }
        };

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Rate-limited by RPC (will retry in {}s)", backoff.current());
            backoff.wait().await;
            continue;
        }

        let parsed: RpcResponse = resp.json().await?;

        if let Some(err) = parsed.error {
            if err.is_hard() {
                return Err(WatcherError::EventParse(format!(
                    "RPC hard error {}: {}",
                    err.code, err.message
                )));
            }
            warn!(
                "RPC soft error (will retry in {}s): {} {}",
                backoff.current(),
                err.code,
                err.message
            );
            backoff.wait().await;
            continue;
        }

        let result = parsed.result.ok_or_else(|| {
            WatcherError::EventParse("Empty result from getEvents".to_string())
        })?;

        debug!(
            events = result.events.len(),
            latest_ledger = ?result.latest_ledger,
            "fetched events page"
        );

        return Ok(EventsPage {
            events: result.events,
            cursor: result.cursor,
            latest_ledger: result.latest_ledger,
        });
    }
}

fn build_params(contract_id: &str, start_ledger: u32, cursor: Option<&str>, limit: u32) -> Value {
    let mut params = json!({
        "filters": [
            {
                "type": "contract",
                "contractIds": [contract_id]
            }
        ],
        "pagination": {
            "limit": limit
        }
    });

    match cursor {
        Some(cur) => params["pagination"]["cursor"] = json!(cur),
        None => params["startLedger"] = json!(start_ledger),
    }

    params
}

// ─────────────────────────────────────────────────────────
// Event decoding
// ─────────────────────────────────────────────────────────

/// Decode a list of raw RPC events into [`EscrowEvent`] structs.
///
/// Events from failed contract calls are dropped: their effects were rolled
/// back, so they must not show up as refreshes or payouts.
pub fn decode_events(raw: &[RawEvent], contract_id: &str) -> Vec<EscrowEvent> {
    raw.iter()
        .filter(|e| e.in_successful_contract_call != Some(false))
        .filter_map(|e| decode_single(e, contract_id))
        .collect()
}

fn decode_single(raw: &RawEvent, contract_id: &str) -> Option<EscrowEvent> {
    let first_topic = raw.topic.first()?;
    let kind = EventKind::from_topic(&extract_symbol(first_topic));

    let ledger = raw.ledger.unwrap_or(0) as i64;
    let timestamp = raw
        .ledger_closed_at
        .as_deref()
        .and_then(parse_iso_to_unix)
        .unwrap_or(0);

    // The id is the dedup key; anything derived from page position would
    // change when the same ledger range is paged differently.
    let Some(event_id) = raw.id.clone().or_else(|| raw.paging_token.clone()) else {
        warn!(ledger, tx_hash = ?raw.tx_hash, "skipping event without an id");
        return None;
    };

    let data = decode_data(&raw.value, kind);
    // Donor-scoped events also carry the donor as the second topic.
    let actor = data
        .actor
        .or_else(|| raw.topic.get(1).map(|t| extract_scalar(t)));

    Some(EscrowEvent {
        event_id,
        event_type: kind.as_str().to_string(),
        actor,
        amount: data.amount,
        request_id: data.request_id,
        status: data.status.map(|s| s.as_str().to_string()),
        ledger,
        timestamp,
        contract_id: raw
            .contract_id
            .clone()
            .unwrap_or_else(|| contract_id.to_string()),
        tx_hash: raw.tx_hash.clone(),
    })
}

#[derive(Debug, Default)]
struct DecodedData {
    actor: Option<String>,
    amount: Option<String>,
    request_id: Option<i64>,
    status: Option<ChallengeStatus>,
}

/// Pull apart the JSON `value` blob that Soroban returns for event data.
fn decode_data(value: &Value, kind: EventKind) -> DecodedData {
    match kind {
        EventKind::EscrowInitialized => DecodedData {
            actor: extract_field(value, &["owner"]),
            ..Default::default()
        },
        EventKind::DonationReceived | EventKind::DonationRefunded => DecodedData {
            actor: extract_field(value, &["donor"]),
            amount: extract_field(value, &["amount"]),
            ..Default::default()
        },
        EventKind::RefreshRequested => DecodedData {
            actor: extract_field(value, &["requested_by"]),
            request_id: extract_int(value, "request_id"),
            ..Default::default()
        },
        EventKind::ChallengeRefreshed => DecodedData {
            request_id: extract_int(value, "request_id"),
            status: value.get("status").and_then(extract_status),
            ..Default::default()
        },
        EventKind::FundsSwept => DecodedData {
            actor: extract_field(value, &["beneficiary"]),
            amount: extract_field(value, &["amount"]),
            ..Default::default()
        },
        EventKind::OracleUpdated => DecodedData {
            actor: extract_field(value, &["oracle"]),
            ..Default::default()
        },
        EventKind::EscrowPaused | EventKind::EscrowUnpaused => DecodedData {
            // The data is the caller address itself.
            actor: value
                .as_str()
                .map(String::from)
                .or_else(|| extract_field(value, &["address", "value"])),
            ..Default::default()
        },
        EventKind::Unknown => DecodedData::default(),
    }
}

fn extract_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match value.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        nested => nested.get("value").and_then(scalar_to_string),
    })
}

fn scalar_to_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn extract_int(value: &Value, key: &str) -> Option<i64> {
    extract_field(value, &[key]).and_then(|s| s.parse::<i64>().ok())
}

/// A contract enum variant arrives as a plain string, a one-element list of
/// symbols, or a typed `{"type":…, "value":…}` wrapper around either.
fn extract_status(v: &Value) -> Option<ChallengeStatus> {
    match v {
        Value::String(s) => ChallengeStatus::parse(s),
        Value::Array(items) => items.first().and_then(extract_status),
        Value::Object(map) => map.get("value").and_then(extract_status),
        _ => None,
    }
}

/// Extract a Soroban Symbol from the XDR-decoded topic string.
/// The RPC may return `{"type":"symbol","value":"refreshed"}` or just the raw string.
fn extract_symbol(raw: &str) -> String {
    extract_scalar(raw)
}

/// Unwrap a `{"type":…, "value":…}` topic entry into its scalar value.
fn extract_scalar(raw: &str) -> String {
    serde_json::from_str::<Value>(raw)
        .ok()
        .and_then(|v| v.get("value").and_then(scalar_to_string))
        .unwrap_or_else(|| raw.to_string())
}

/// Parse an ISO-8601 timestamp string into a Unix epoch (seconds).
fn parse_iso_to_unix(s: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp())
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
