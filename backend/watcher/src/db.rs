//! Database layer — migrations, queries, and cursor management.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::errors::Result;
use crate::events::{EscrowEvent, EventKind, EventRecord};

const EVENT_COLUMNS: &str = "id, event_id, event_type, actor, amount, request_id, status, \
                             ledger, timestamp, contract_id, tx_hash, created_at";

/// Establish a SQLite connection pool and run pending migrations.
///
/// The database file is created on first start.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };

    let options = SqliteConnectOptions::from_str(&url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations applied successfully");
    Ok(())
}

// ─────────────────────────────────────────────────────────
// Cursor helpers
// ─────────────────────────────────────────────────────────

/// Read the last-seen ledger from the cursor row.
/// Returns `0` when no cursor has been persisted yet.
pub async fn get_last_ledger(pool: &SqlitePool) -> Result<i64> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT last_ledger FROM indexer_cursor WHERE id = 1")
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|(v,)| v).unwrap_or(0))
}

/// Persist the last-seen ledger and the pagination cursor, if any.
pub async fn save_cursor(
    pool: &SqlitePool,
    last_ledger: i64,
    last_cursor: Option<&str>,
) -> Result<()> {
    sqlx::query("UPDATE indexer_cursor SET last_ledger = ?1, last_cursor = ?2 WHERE id = 1")
        .bind(last_ledger)
        .bind(last_cursor)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn get_cursor_string(pool: &SqlitePool) -> Result<Option<String>> {
    let row: Option<(Option<String>,)> =
        sqlx::query_as("SELECT last_cursor FROM indexer_cursor WHERE id = 1")
            .fetch_optional(pool)
            .await?;
    Ok(row.and_then(|(v,)| v))
}

// ─────────────────────────────────────────────────────────
// Event writes
// ─────────────────────────────────────────────────────────

/// Persist a batch of decoded events in one transaction.
///
/// Rows are keyed on the RPC event id, so re-polling an overlapping ledger
/// range stores nothing twice. Returns the number of new rows.
pub async fn insert_events(pool: &SqlitePool, events: &[EscrowEvent]) -> Result<usize> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;
    for ev in events {
        let rows_affected = sqlx::query(
            r#"
            INSERT OR IGNORE INTO events
                (event_id, event_type, actor, amount, request_id, status,
                 ledger, timestamp, contract_id, tx_hash)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&ev.event_id)
        .bind(&ev.event_type)
        .bind(&ev.actor)
        .bind(&ev.amount)
        .bind(ev.request_id)
        .bind(&ev.status)
        .bind(ev.ledger)
        .bind(ev.timestamp)
        .bind(&ev.contract_id)
        .bind(&ev.tx_hash)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        count += rows_affected as usize;
    }
    tx.commit().await?;
    Ok(count)
}

// ─────────────────────────────────────────────────────────
// Event reads
// ─────────────────────────────────────────────────────────

/// Fetch all events, ordered by ledger ascending.
pub async fn get_all_events(pool: &SqlitePool) -> Result<Vec<EventRecord>> {
    let sql = format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY ledger ASC, id ASC");
    let rows = sqlx::query_as::<_, EventRecord>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Fetch every event whose actor is `address` (deposits, refunds, requests…).
pub async fn get_events_for_actor(pool: &SqlitePool, address: &str) -> Result<Vec<EventRecord>> {
    let sql = format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE actor = ?1 ORDER BY ledger ASC, id ASC"
    );
    let rows = sqlx::query_as::<_, EventRecord>(&sql)
        .bind(address)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

async fn latest_of_kind(pool: &SqlitePool, kind: EventKind) -> Result<Option<EventRecord>> {
    let sql = format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE event_type = ?1 \
         ORDER BY ledger DESC, id DESC LIMIT 1"
    );
    let row = sqlx::query_as::<_, EventRecord>(&sql)
        .bind(kind.as_str())
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// The most recent applied oracle answer.
pub async fn latest_refresh(pool: &SqlitePool) -> Result<Option<EventRecord>> {
    latest_of_kind(pool, EventKind::ChallengeRefreshed).await
}

/// The most recent refresh request (or re-announcement of a pending one).
pub async fn latest_request(pool: &SqlitePool) -> Result<Option<EventRecord>> {
    latest_of_kind(pool, EventKind::RefreshRequested).await
}

/// The sweep that closed the escrow, if it has happened.
pub async fn latest_sweep(pool: &SqlitePool) -> Result<Option<EventRecord>> {
    latest_of_kind(pool, EventKind::FundsSwept).await
}

/// Refresh resolutions stored after row `after_id`, oldest first.
pub async fn get_refreshes_after(pool: &SqlitePool, after_id: i64) -> Result<Vec<EventRecord>> {
    let sql = format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE event_type = ?1 AND id > ?2 ORDER BY id ASC"
    );
    let rows = sqlx::query_as::<_, EventRecord>(&sql)
        .bind(EventKind::ChallengeRefreshed.as_str())
        .bind(after_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// The resolution of one refresh request, or `None` while it is outstanding.
pub async fn get_refresh(pool: &SqlitePool, request_id: i64) -> Result<Option<EventRecord>> {
    let sql = format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE event_type = ?1 AND request_id = ?2 LIMIT 1"
    );
    let row = sqlx::query_as::<_, EventRecord>(&sql)
        .bind(EventKind::ChallengeRefreshed.as_str())
        .bind(request_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}
