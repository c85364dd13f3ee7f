use rusqlite::{Connection, OptionalExtension};
use chrono::{DateTime, Utc};
use crate::models::{FeedbackEvent, Feeling};
use anyhow::{Context, Result};

/// Feedback log repository for database operations
///
/// Events are append-only; there is no update or delete of past entries.
pub struct FeedbackRepo;

fn from_ts(idx: usize, ts: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, ts))
}

fn row_to_event(row: &rusqlite::Row) -> rusqlite::Result<FeedbackEvent> {
    let start: Option<i64> = row.get(1)?;
    let feeling: String = row.get(3)?;
    Ok(FeedbackEvent {
        id: Some(row.get(0)?),
        start: start.map(|ts| from_ts(1, ts)).transpose()?,
        end: from_ts(2, row.get(2)?)?,
        feeling: Feeling::from_str(&feeling).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                3,
                rusqlite::types::Type::Text,
                format!("Unknown feeling: {}", feeling).into(),
            )
        })?,
    })
}

impl FeedbackRepo {
    /// Append one event to the log
    pub fn append(conn: &Connection, start: Option<DateTime<Utc>>, end: DateTime<Utc>, feeling: Feeling) -> Result<FeedbackEvent> {
        let now = Utc::now().timestamp();

        conn.execute(
            "INSERT INTO feedback_events (start_ts, end_ts, feeling, created_ts) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![start.map(|s| s.timestamp()), end.timestamp(), feeling.as_str(), now],
        )
        .context("Failed to append feedback event")?;

        let id = conn.last_insert_rowid();
        Ok(FeedbackEvent {
            id: Some(id),
            start,
            end,
            feeling,
        })
    }

    /// All events in the order they were recorded
    pub fn list_all(conn: &Connection) -> Result<Vec<FeedbackEvent>> {
        let mut stmt = conn.prepare(
            "SELECT id, start_ts, end_ts, feeling FROM feedback_events ORDER BY id"
        )?;

        let rows = stmt.query_map([], row_to_event)?;

        let mut events = Vec::new();
        for row in rows {
            events.push(row?);
        }
        Ok(events)
    }

    /// Record (or overwrite) the provisional start instant
    pub fn set_pending_start(conn: &Connection, start: DateTime<Utc>) -> Result<()> {
        let now = Utc::now().timestamp();
        conn.execute(
            "INSERT INTO pending_start (id, start_ts, created_ts) VALUES (1, ?1, ?2)
             ON CONFLICT(id) DO UPDATE SET start_ts = excluded.start_ts, created_ts = excluded.created_ts",
            rusqlite::params![start.timestamp(), now],
        )
        .context("Failed to record timer start")?;
        Ok(())
    }

    /// Get the provisional start instant (if any)
    pub fn get_pending_start(conn: &Connection) -> Result<Option<DateTime<Utc>>> {
        conn.query_row(
            "SELECT start_ts FROM pending_start WHERE id = 1",
            [],
            |row| from_ts(0, row.get(0)?),
        )
        .optional()
        .context("Failed to query timer start")
    }

    /// Discard the provisional start. Returns true if one existed.
    pub fn clear_pending_start(conn: &Connection) -> Result<bool> {
        let removed = conn.execute("DELETE FROM pending_start WHERE id = 1", [])?;
        Ok(removed > 0)
    }

    /// Consume the provisional start and append the paired event in one
    /// transaction. Returns `None` when there was no start to consume.
    pub fn complete_pending(conn: &Connection, end: DateTime<Utc>, feeling: Feeling) -> Result<Option<FeedbackEvent>> {
        let tx = conn.unchecked_transaction()?;
        let Some(start) = Self::get_pending_start(&tx)? else {
            return Ok(None);
        };
        Self::clear_pending_start(&tx)?;
        let event = Self::append(&tx, Some(start), end, feeling)?;
        tx.commit()?;
        Ok(Some(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConnection;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, h, m, 0).unwrap()
    }

    #[test]
    fn test_append_and_list() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let first = FeedbackRepo::append(&conn, Some(at(9, 0)), at(9, 30), Feeling::Happy).unwrap();
        FeedbackRepo::append(&conn, None, at(10, 0), Feeling::Sad).unwrap();

        let events = FeedbackRepo::list_all(&conn).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], first);
        assert_eq!(events[1].start, None);
        assert_eq!(events[1].feeling, Feeling::Sad);
    }

    #[test]
    fn test_pending_start_overwrites() {
        let conn = DbConnection::connect_in_memory().unwrap();
        assert_eq!(FeedbackRepo::get_pending_start(&conn).unwrap(), None);

        FeedbackRepo::set_pending_start(&conn, at(9, 0)).unwrap();
        FeedbackRepo::set_pending_start(&conn, at(9, 5)).unwrap();
        assert_eq!(FeedbackRepo::get_pending_start(&conn).unwrap(), Some(at(9, 5)));

        assert!(FeedbackRepo::clear_pending_start(&conn).unwrap());
        assert!(!FeedbackRepo::clear_pending_start(&conn).unwrap());
    }

    #[test]
    fn test_complete_pending_consumes_start() {
        let conn = DbConnection::connect_in_memory().unwrap();
        assert!(FeedbackRepo::complete_pending(&conn, at(9, 30), Feeling::Happy).unwrap().is_none());

        FeedbackRepo::set_pending_start(&conn, at(9, 0)).unwrap();
        let event = FeedbackRepo::complete_pending(&conn, at(9, 30), Feeling::Happy)
            .unwrap()
            .unwrap();
        assert_eq!(event.start, Some(at(9, 0)));
        assert_eq!(event.end, at(9, 30));
        assert_eq!(FeedbackRepo::get_pending_start(&conn).unwrap(), None);
        assert!(FeedbackRepo::complete_pending(&conn, at(9, 31), Feeling::Sad).unwrap().is_none());
        assert_eq!(FeedbackRepo::list_all(&conn).unwrap().len(), 1);
    }
}
