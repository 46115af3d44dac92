use crate::clock::Clock;
use crate::remote::StatsApi;
use crate::stats::{SessionRecord, StatsEngine, StatsSnapshot};
use crate::storage::KeyValueStore;

/// Picks between the remote API and the local stats engine.
///
/// With no API configured everything goes through the engine. With an API,
/// any failure is logged and the call is served from the local store.
pub struct StatsProvider<S: KeyValueStore, C: Clock, A: StatsApi> {
    engine: StatsEngine<S, C>,
    api: Option<A>,
}

impl<S: KeyValueStore, C: Clock, A: StatsApi> StatsProvider<S, C, A> {
    pub fn local(engine: StatsEngine<S, C>) -> Self {
        Self { engine, api: None }
    }

    pub fn with_api(engine: StatsEngine<S, C>, api: A) -> Self {
        Self {
            engine,
            api: Some(api),
        }
    }

    pub fn uses_api(&self) -> bool {
        self.api.is_some()
    }

    pub fn engine(&self) -> &StatsEngine<S, C> {
        &self.engine
    }

    pub fn load(&self) -> StatsSnapshot {
        if let Some(api) = &self.api {
            match fetch_snapshot(api) {
                Ok(snapshot) => return snapshot,
                Err(e) => {
                    tracing::warn!("failed to fetch stats from API, using local store: {}", e)
                }
            }
        }
        self.engine.load()
    }

    pub fn save(&self, record: SessionRecord, current: &StatsSnapshot) -> StatsSnapshot {
        if let Some(api) = &self.api {
            let saved = api.add_session(&record).and_then(|_| fetch_snapshot(api));
            match saved {
                Ok(snapshot) => return snapshot,
                Err(e) => tracing::warn!("failed to save session to API, using local store: {}", e),
            }
        }
        self.engine.record_session(record, current)
    }
}

fn fetch_snapshot<A: StatsApi>(api: &A) -> Result<StatsSnapshot, crate::error::ApiError> {
    let session_history = api.fetch_sessions()?;
    let stats = api.fetch_stats()?;
    Ok(StatsSnapshot {
        session_history,
        average_wpm: stats.average_wpm,
        average_accuracy: stats.average_accuracy,
        total_practice_minutes: stats.total_practice_minutes,
        current_streak: stats.current_streak,
        longest_streak: stats.longest_streak,
    })
}
