//! Append-only log of per-cycle records.
//!
//! Field policy: on write, counts and score must fit SQLite INTEGER and
//! `score`/`mode` must match the counts; on read, a malformed timestamp,
//! unknown mode or negative integer fails the whole query. Nothing is
//! coerced to a default.

use anyhow::{Context, Result};
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    helpers::{parse_datetime, parse_mode, to_i64, to_u64},
    models::InteractionRecord,
};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_debug;

fn row_to_record(row: &Row) -> Result<InteractionRecord> {
    let timestamp: String = row.get("timestamp")?;
    let mode: String = row.get("mode")?;

    Ok(InteractionRecord {
        id: Some(row.get("id")?),
        timestamp: parse_datetime(&timestamp, "timestamp")?,
        click_count: to_u64(row.get("click_count")?, "click_count")?,
        key_count: to_u64(row.get("key_count")?, "key_count")?,
        focus_count: to_u64(row.get("focus_count")?, "focus_count")?,
        score: to_u64(row.get("score")?, "score")?,
        mode: parse_mode(&mode)?,
    })
}

impl Database {
    /// Persists `record` and returns it with its assigned id.
    pub async fn append_interaction_record(
        &self,
        record: &InteractionRecord,
    ) -> Result<InteractionRecord> {
        record.validate().context("rejected interaction record")?;

        let mut record = record.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO interaction_summary
                    (timestamp, click_count, key_count, focus_count, score, mode)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.timestamp.to_rfc3339(),
                    to_i64(record.click_count, "click_count")?,
                    to_i64(record.key_count, "key_count")?,
                    to_i64(record.focus_count, "focus_count")?,
                    to_i64(record.score, "score")?,
                    record.mode.as_str(),
                ],
            )
            .context("failed to insert interaction record")?;

            record.id = Some(conn.last_insert_rowid());
            log_debug!(
                "Stored interaction record {:?} ({} / score {})",
                record.id,
                record.mode,
                record.score
            );
            Ok(record)
        })
        .await
    }

    /// Newest first. A `limit` of zero is treated as one.
    pub async fn recent_interaction_records(&self, limit: u32) -> Result<Vec<InteractionRecord>> {
        let limit = i64::from(limit.max(1));
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, timestamp, click_count, key_count, focus_count, score, mode
                 FROM interaction_summary
                 ORDER BY id DESC
                 LIMIT ?1",
            )?;

            let mut rows = stmt.query(params![limit])?;
            let mut records = Vec::new();
            while let Some(row) = rows.next()? {
                records.push(row_to_record(row)?);
            }
            Ok(records)
        })
        .await
    }

    /// Removes every record in one statement.
    pub async fn clear_interaction_records(&self) -> Result<usize> {
        self.execute(|conn| {
            let removed = conn
                .execute("DELETE FROM interaction_summary", [])
                .context("failed to clear interaction records")?;
            Ok(removed)
        })
        .await
    }

    pub async fn count_interaction_records(&self) -> Result<u64> {
        self.execute(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM interaction_summary", [], |row| {
                    row.get(0)
                })?;
            to_u64(count, "count")
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::analysis::Mode;
    use crate::tracking::InteractionCounters;

    fn record(minute: i64, clicks: u64) -> InteractionRecord {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap() + Duration::minutes(minute);
        InteractionRecord::from_counters(ts, InteractionCounters::new(clicks, 3, 1))
    }

    #[tokio::test]
    async fn append_then_recent_one_returns_it() {
        let db = Database::in_memory().unwrap();
        let stored = db.append_interaction_record(&record(0, 12)).await.unwrap();
        assert!(stored.id.is_some());

        let recent = db.recent_interaction_records(1).await.unwrap();
        assert_eq!(recent, vec![stored]);
    }

    #[tokio::test]
    async fn recent_returns_newest_first_and_respects_limit() {
        let db = Database::in_memory().unwrap();
        for i in 0..7 {
            db.append_interaction_record(&record(i, i as u64)).await.unwrap();
        }

        let recent = db.recent_interaction_records(4).await.unwrap();
        let clicks: Vec<u64> = recent.iter().map(|r| r.click_count).collect();
        assert_eq!(clicks, vec![6, 5, 4, 3]);

        let ids: Vec<i64> = recent.iter().filter_map(|r| r.id).collect();
        assert!(ids.windows(2).all(|pair| pair[0] > pair[1]));

        assert_eq!(db.recent_interaction_records(100).await.unwrap().len(), 7);
    }

    #[tokio::test]
    async fn zero_limit_is_treated_as_one() {
        let db = Database::in_memory().unwrap();
        db.append_interaction_record(&record(0, 1)).await.unwrap();
        db.append_interaction_record(&record(1, 2)).await.unwrap();

        let recent = db.recent_interaction_records(0).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].click_count, 2);
    }

    #[tokio::test]
    async fn empty_store_returns_nothing() {
        let db = Database::in_memory().unwrap();
        assert!(db.recent_interaction_records(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let db = Database::in_memory().unwrap();
        for i in 0..3 {
            db.append_interaction_record(&record(i, 40)).await.unwrap();
        }

        assert_eq!(db.clear_interaction_records().await.unwrap(), 3);
        assert!(db.recent_interaction_records(5).await.unwrap().is_empty());
        assert_eq!(db.count_interaction_records().await.unwrap(), 0);

        let stored = db.append_interaction_record(&record(9, 0)).await.unwrap();
        assert_eq!(db.recent_interaction_records(5).await.unwrap(), vec![stored]);
    }

    #[tokio::test]
    async fn rejects_inconsistent_record() {
        let db = Database::in_memory().unwrap();
        let mut bad = record(0, 1);
        bad.mode = Mode::Aggressive;

        assert!(db.append_interaction_record(&bad).await.is_err());
        assert_eq!(db.count_interaction_records().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn malformed_row_fails_the_read() {
        let db = Database::in_memory().unwrap();
        db.execute(|conn| {
            conn.execute(
                "INSERT INTO interaction_summary
                    (timestamp, click_count, key_count, focus_count, score, mode)
                 VALUES ('yesterday', 0, 0, 0, 0, 'Calm')",
                [],
            )?;
            Ok(())
        })
        .await
        .unwrap();

        assert!(db.recent_interaction_records(5).await.is_err());
    }
}
