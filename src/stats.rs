use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::clock::Clock;
use crate::session::PhaseMode;
use crate::storage::{KeyValueStore, STATS_BACKUP_KEY, STATS_KEY};
use crate::streak::compute_streaks;
use crate::util::rounded_mean;

/// One completed practice session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Session end time
    pub date: DateTime<Utc>,
    /// Wall-clock minutes from start to finish
    pub duration: u32,
    pub wpm: u32,
    pub accuracy: u32,
    /// Phase active when the session finished
    pub mode: PhaseMode,
    #[serde(default)]
    pub error_keys: Vec<char>,
}

/// Aggregate statistics plus the full history they are derived from.
/// This is the exact JSON shape persisted under [`STATS_KEY`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatsSnapshot {
    pub session_history: Vec<SessionRecord>,
    pub average_wpm: u32,
    pub average_accuracy: u32,
    pub total_practice_minutes: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
}

impl StatsSnapshot {
    /// Derive every aggregate from `history`
    pub fn from_history(
        session_history: Vec<SessionRecord>,
        previous_longest: u32,
        today: NaiveDate,
    ) -> Self {
        let wpms: Vec<u32> = session_history.iter().map(|r| r.wpm).collect();
        let accuracies: Vec<u32> = session_history.iter().map(|r| r.accuracy).collect();
        let total_practice_minutes = session_history.iter().map(|r| r.duration).sum();
        let streaks = compute_streaks(&session_history, previous_longest, today);

        Self {
            average_wpm: rounded_mean(&wpms),
            average_accuracy: rounded_mean(&accuracies),
            total_practice_minutes,
            current_streak: streaks.current,
            longest_streak: streaks.longest,
            session_history,
        }
    }

    pub fn total_sessions(&self) -> usize {
        self.session_history.len()
    }

    /// Most recent `n` sessions, newest first
    pub fn recent_sessions(&self, n: usize) -> impl Iterator<Item = &SessionRecord> {
        self.session_history.iter().rev().take(n)
    }
}

/// Persisted snapshot with history entries left undecoded
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StoredSnapshot {
    session_history: Vec<serde_json::Value>,
    average_wpm: Option<u32>,
    average_accuracy: Option<u32>,
    total_practice_minutes: Option<u32>,
    current_streak: Option<u32>,
    longest_streak: Option<u32>,
}

impl StoredSnapshot {
    /// Decoded snapshot and the number of history entries dropped
    fn into_snapshot(self, today: NaiveDate) -> (StatsSnapshot, usize) {
        let total = self.session_history.len();
        let session_history: Vec<SessionRecord> = self
            .session_history
            .into_iter()
            .enumerate()
            .filter_map(|(idx, value)| match serde_json::from_value(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!("skipping unreadable session #{}: {}", idx, e);
                    None
                }
            })
            .collect();
        let skipped = total - session_history.len();
        let longest = self.longest_streak.unwrap_or(0);

        let snapshot = match (
            self.average_wpm,
            self.average_accuracy,
            self.total_practice_minutes,
            self.current_streak,
        ) {
            (
                Some(average_wpm),
                Some(average_accuracy),
                Some(total_practice_minutes),
                Some(current_streak),
            ) if skipped == 0 => StatsSnapshot {
                session_history,
                average_wpm,
                average_accuracy,
                total_practice_minutes,
                current_streak,
                longest_streak: longest,
            },
            _ => StatsSnapshot::from_history(session_history, longest, today),
        };
        (snapshot, skipped)
    }
}

/// Owns the aggregate statistics and is the only writer of [`STATS_KEY`].
///
/// Storage failures never reach the caller: they are logged and the engine
/// carries on with an empty or freshly computed in-memory snapshot.
#[derive(Debug)]
pub struct StatsEngine<S: KeyValueStore, C: Clock> {
    store: S,
    clock: C,
}

impl<S: KeyValueStore, C: Clock> StatsEngine<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    /// Read the persisted snapshot, or a zeroed one when absent or unreadable.
    ///
    /// History entries that fail to decode are dropped one by one and the
    /// aggregates recomputed from what is left. Whenever anything is dropped
    /// the raw document is copied to [`STATS_BACKUP_KEY`] first.
    pub fn load(&self) -> StatsSnapshot {
        let raw = match self.store.get(STATS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return StatsSnapshot::default(),
            Err(e) => {
                tracing::warn!("failed to read stats, starting empty: {}", e);
                return StatsSnapshot::default();
            }
        };

        match serde_json::from_str::<StoredSnapshot>(&raw) {
            Ok(stored) => {
                let (snapshot, skipped) = stored.into_snapshot(self.clock.today());
                if skipped > 0 {
                    self.back_up(&raw);
                }
                snapshot
            }
            Err(e) => {
                tracing::warn!("stored stats are malformed, starting empty: {}", e);
                self.back_up(&raw);
                StatsSnapshot::default()
            }
        }
    }

    fn back_up(&self, raw: &str) {
        if let Err(e) = self.store.set(STATS_BACKUP_KEY, raw) {
            tracing::warn!("failed to back up stored stats: {}", e);
        }
    }

    /// Append `record`, recompute every aggregate and persist the whole
    /// snapshot in a single write.
    pub fn record_session(&self, record: SessionRecord, previous: &StatsSnapshot) -> StatsSnapshot {
        let mut history = previous.session_history.clone();
        history.push(record);

        let snapshot =
            StatsSnapshot::from_history(history, previous.longest_streak, self.clock.today());

        tracing::debug!(
            sessions = snapshot.total_sessions(),
            average_wpm = snapshot.average_wpm,
            current_streak = snapshot.current_streak,
            "recorded session"
        );

        if let Err(e) = self.persist(&snapshot) {
            tracing::warn!("failed to persist stats, keeping them in memory: {}", e);
        }

        snapshot
    }

    fn persist(&self, snapshot: &StatsSnapshot) -> Result<(), crate::error::StorageError> {
        let raw = serde_json::to_string(snapshot)?;
        self.store.set(STATS_KEY, &raw)
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

/// Write the session history as CSV, oldest first
pub fn export_history_csv<W: Write>(history: &[SessionRecord], out: W) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["date", "duration", "wpm", "accuracy", "mode", "error_keys"])?;

    for record in history {
        let error_keys: String = record.error_keys.iter().collect();
        writer.write_record([
            record.date.to_rfc3339_opts(SecondsFormat::Secs, true),
            record.duration.to_string(),
            record.wpm.to_string(),
            record.accuracy.to_string(),
            record.mode.to_string(),
            error_keys,
        ])?;
    }

    writer.flush()?;
    Ok(())
}
