// End-to-end: a full six-phase session driven on a manual clock, handed to
// the stats engine and read back from the store.

use chrono::{DateTime, Duration, Utc};
use typespark::{
    clock::ManualClock,
    coordinator::{Coordinator, CoordinatorEvent, COMPLETION_DELAY_SECS},
    session::{PhaseMode, PHASE_COUNT},
    stats::{SessionRecord, StatsEngine},
    storage::{InMemoryStore, KeyValueStore, STATS_KEY},
};

const SOURCE: &str = "a b c d e f g h i j k l";

fn start_of_session() -> DateTime<Utc> {
    "2024-03-10T09:00:00Z".parse().unwrap()
}

/// Type `typed` for the active phase, taking `secs` between the first and last keystroke
fn type_phase(
    coordinator: &mut Coordinator<ManualClock>,
    clock: &ManualClock,
    typed: &str,
    secs: i64,
) -> Option<CoordinatorEvent> {
    let first: String = typed.chars().take(1).collect();
    coordinator.on_input(&first);
    clock.advance_secs(secs);
    coordinator.on_input(typed)
}

fn run_session(clock: &ManualClock) -> (SessionRecord, Vec<CoordinatorEvent>) {
    let mut coordinator = Coordinator::new(clock.clone());
    assert!(coordinator.start(SOURCE));

    let texts: Vec<String> = coordinator.phases().iter().map(|p| p.text.clone()).collect();
    assert_eq!(texts, vec!["a b", "c d", "e f", "g h", "i j", "k l"]);

    let mut events = Vec::new();
    for (idx, text) in texts.iter().enumerate() {
        // 2 words in 3 seconds is 40 wpm; the last phase has one typo
        let typed = if idx == PHASE_COUNT - 1 { "k x" } else { text.as_str() };
        let completed = type_phase(&mut coordinator, clock, typed, 3);
        events.extend(completed);

        clock.advance_secs(COMPLETION_DELAY_SECS);
        events.extend(coordinator.on_tick());
    }

    let record = coordinator.record().cloned().expect("session should be complete");
    (record, events)
}

#[test]
fn full_session_produces_one_record_from_last_phase() {
    let clock = ManualClock::new(start_of_session());
    let (record, events) = run_session(&clock);

    let completed: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            CoordinatorEvent::PhaseCompleted(result) => Some(result.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(completed.len(), PHASE_COUNT);
    assert!(completed.iter().all(|r| r.wpm == 40));
    assert!(completed[..PHASE_COUNT - 1].iter().all(|r| r.accuracy == 100));

    let advances = events
        .iter()
        .filter(|e| matches!(e, CoordinatorEvent::PhaseAdvanced { .. }))
        .count();
    assert_eq!(advances, PHASE_COUNT - 1);

    let finished: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, CoordinatorEvent::SessionCompleted(_)))
        .collect();
    assert_eq!(finished.len(), 1);

    // last phase, not an average
    assert_eq!(record.wpm, 40);
    assert_eq!(record.accuracy, 67);
    assert_eq!(record.error_keys, vec!['l']);
    assert_eq!(record.mode, PhaseMode::Spaced);
    assert_eq!(record.date, start_of_session() + Duration::seconds(30));
    assert_eq!(record.duration, 1);
}

#[test]
fn recorded_session_updates_persisted_stats() {
    let clock = ManualClock::new(start_of_session());
    let store = InMemoryStore::new();
    let engine = StatsEngine::new(&store, clock.clone());

    let before = engine.load();
    assert_eq!(before.total_sessions(), 0);

    let (record, _) = run_session(&clock);
    let after = engine.record_session(record.clone(), &before);

    assert_eq!(after.session_history, vec![record]);
    assert_eq!(after.average_wpm, 40);
    assert_eq!(after.average_accuracy, 67);
    assert_eq!(after.total_practice_minutes, 1);
    assert_eq!(after.current_streak, 1);
    assert_eq!(after.longest_streak, 1);

    assert!(store.get(STATS_KEY).unwrap().is_some());
    assert_eq!(engine.load(), after);
}

#[test]
fn sessions_on_consecutive_days_build_a_streak() {
    let clock = ManualClock::new(start_of_session());
    let store = InMemoryStore::new();
    let engine = StatsEngine::new(&store, clock.clone());

    let mut snapshot = engine.load();
    for _ in 0..3 {
        let (record, _) = run_session(&clock);
        snapshot = engine.record_session(record, &snapshot);
        clock.advance(Duration::days(1));
    }

    assert_eq!(snapshot.total_sessions(), 3);
    assert_eq!(snapshot.current_streak, 3);
    assert_eq!(snapshot.longest_streak, 3);

    // skip a day, the current streak resets but the best is kept
    clock.advance(Duration::days(1));
    let (record, _) = run_session(&clock);
    snapshot = engine.record_session(record, &snapshot);

    assert_eq!(snapshot.current_streak, 1);
    assert_eq!(snapshot.longest_streak, 3);
    assert_eq!(engine.load(), snapshot);
}
