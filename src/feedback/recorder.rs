//! Session feedback recorder
//!
//! `start` leaves a provisional start instant; `record_feedback` pairs it
//! with the end instant and a feeling, appends one event and consumes the
//! start. Feedback without an unconsumed start is a no-op.

use crate::models::{FeedbackEvent, Feeling};
use crate::repo::FeedbackRepo;
use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::Connection;

pub struct FeedbackRecorder<'c> {
    conn: &'c Connection,
}

impl<'c> FeedbackRecorder<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn start(&self) -> Result<DateTime<Utc>> {
        let now = Utc::now();
        self.start_at(now)?;
        Ok(now)
    }

    /// Record a provisional start; a later start replaces an unconsumed one
    pub fn start_at(&self, now: DateTime<Utc>) -> Result<()> {
        FeedbackRepo::set_pending_start(self.conn, now)?;
        log::debug!("Timer started at {}", now);
        Ok(())
    }

    pub fn pending_start(&self) -> Result<Option<DateTime<Utc>>> {
        FeedbackRepo::get_pending_start(self.conn)
    }

    pub fn record_feedback(&self, feeling: Feeling) -> Result<Option<FeedbackEvent>> {
        self.record_feedback_at(feeling, Utc::now())
    }

    pub fn record_feedback_at(&self, feeling: Feeling, now: DateTime<Utc>) -> Result<Option<FeedbackEvent>> {
        let event = FeedbackRepo::complete_pending(self.conn, now, feeling)?;
        match &event {
            Some(e) => log::info!("Recorded {} feedback ({:?} .. {})", feeling.as_str(), e.start, e.end),
            None => log::debug!("Feedback '{}' ignored: no timer start to pair with", feeling.as_str()),
        }
        Ok(event)
    }

    /// Discard an in-progress start without logging anything
    pub fn reset(&self) -> Result<bool> {
        FeedbackRepo::clear_pending_start(self.conn)
    }

    pub fn events(&self) -> Result<Vec<FeedbackEvent>> {
        FeedbackRepo::list_all(self.conn)
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
    fn test_start_then_feedback_appends_once() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let recorder = FeedbackRecorder::new(&conn);

        recorder.start_at(at(9, 0)).unwrap();
        let event = recorder.record_feedback_at(Feeling::Happy, at(9, 30)).unwrap().unwrap();
        assert_eq!(event.start, Some(at(9, 0)));
        assert_eq!(event.feeling, Feeling::Happy);

        // Second feedback without a new start is a no-op
        assert!(recorder.record_feedback_at(Feeling::Sad, at(9, 31)).unwrap().is_none());
        assert_eq!(recorder.events().unwrap().len(), 1);
    }

    #[test]
    fn test_reset_discards_start() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let recorder = FeedbackRecorder::new(&conn);

        recorder.start_at(at(9, 0)).unwrap();
        assert!(recorder.reset().unwrap());
        assert_eq!(recorder.pending_start().unwrap(), None);
        assert!(recorder.record_feedback_at(Feeling::Happy, at(9, 30)).unwrap().is_none());
        assert!(recorder.events().unwrap().is_empty());
    }

    #[test]
    fn test_restart_replaces_start() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let recorder = FeedbackRecorder::new(&conn);

        recorder.start_at(at(9, 0)).unwrap();
        recorder.start_at(at(9, 10)).unwrap();
        let event = recorder.record_feedback_at(Feeling::Sad, at(9, 40)).unwrap().unwrap();
        assert_eq!(event.start, Some(at(9, 10)));
        assert_eq!(event.end, at(9, 40));
    }
}
