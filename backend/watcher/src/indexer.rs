//! Long-running background task that polls the Soroban RPC and writes
//! decoded escrow events to the database.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use sqlx::SqlitePool;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::db;
use crate::errors::Result;
use crate::events::{ChallengeStatus, EscrowEvent, EventKind};
use crate::rpc;

pub struct IndexerState {
    pub pool: SqlitePool,
    pub config: Config,
    pub client: Client,
}

/// Where the next poll should start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub ledger: u32,
    pub cursor: Option<String>,
}

/// Run the polling loop forever; meant to be handed to [`tokio::spawn`].
pub async fn run(state: Arc<IndexerState>) {
    info!("Watcher starting — contract: {}", state.config.contract_id);

    let mut position = match resume_position(&state.pool, state.config.start_ledger).await {
        Ok(position) => position,
        Err(e) => {
            warn!("Could not read saved cursor, starting over: {e}");
            Position {
                ledger: state.config.start_ledger,
                cursor: None,
            }
        }
    };

    info!("Resuming from ledger {}", position.ledger);

    loop {
        match poll_once(&state.pool, &state.client, &state.config, &position).await {
            Ok(next) => position = next,
            Err(e) => error!("Watcher poll error: {e}"),
        }

        tokio::time::sleep(Duration::from_secs(state.config.poll_interval_secs)).await;
    }
}

/// Load the persisted cursor; falls back to `start_ledger` on a fresh database.
pub async fn resume_position(pool: &SqlitePool, start_ledger: u32) -> Result<Position> {
    let last_ledger = db::get_last_ledger(pool).await?;
    let cursor = db::get_cursor_string(pool).await?;
    let ledger = if last_ledger > 0 {
        last_ledger as u32
    } else {
        start_ledger
    };
    Ok(Position { ledger, cursor })
}

/// Perform a single poll iteration and return the position for the next one.
async fn poll_once(
    pool: &SqlitePool,
    client: &Client,
    config: &Config,
    position: &Position,
) -> Result<Position> {
    let page = rpc::fetch_events(
        client,
        &config.rpc_url,
        &config.contract_id,
        position.ledger,
        position.cursor.as_deref(),
        config.events_per_page,
    )
    .await?;

    if !page.events.is_empty() {
        let decoded = rpc::decode_events(&page.events, &config.contract_id);
        let inserted = db::insert_events(pool, &decoded).await?;
        log_resolutions(&decoded);
        info!(
            "Polled {} raw events → {} new records stored",
            page.events.len(),
            inserted
        );
    }

    let next = advance(position, page.latest_ledger, page.cursor);
    db::save_cursor(pool, next.ledger as i64, next.cursor.as_deref()).await?;
    Ok(next)
}

/// Compute the next position.
///
/// A returned cursor keeps paging within the current range; the ledger only
/// moves forward, never back.
fn advance(position: &Position, latest_ledger: Option<u64>, cursor: Option<String>) -> Position {
    let ledger = latest_ledger
        .map(|l| (l as u32).max(position.ledger))
        .unwrap_or(position.ledger);
    Position {
        ledger,
        cursor: cursor.or_else(|| position.cursor.clone()),
    }
}

fn log_resolutions(events: &[EscrowEvent]) {
    for ev in events {
        if ev.event_type != EventKind::ChallengeRefreshed.as_str() {
            continue;
        }
        let status = ev.status.as_deref().and_then(ChallengeStatus::parse);
        match status {
            Some(s) if s.is_terminal() => info!(
                request_id = ?ev.request_id,
                status = s.as_str(),
                "challenge resolved"
            ),
            Some(s) => info!(request_id = ?ev.request_id, status = s.as_str(), "challenge still ongoing"),
            None => warn!(event_id = %ev.event_id, "refresh event without a readable status"),
        }
    }
}
