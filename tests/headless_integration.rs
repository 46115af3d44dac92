use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use typespark::{
    clock::ManualClock,
    coordinator::{Coordinator, CoordinatorEvent, CoordinatorState},
    runtime::{AppEvent, Runner},
    session::PhaseMode,
};

fn key(c: char) -> AppEvent {
    AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

fn start_clock() -> ManualClock {
    ManualClock::new("2024-05-01T18:30:00Z".parse().unwrap())
}

// Headless integration using the runtime and Coordinator without a TTY.
// Every idle tick moves the manual clock forward by one second.
#[test]
fn headless_phase_completes_and_advances() {
    let clock = start_clock();
    let mut coordinator = Coordinator::new(clock.clone());
    coordinator.start("hi there you are doing well today friend");

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(rx, Duration::from_millis(5));

    let target = coordinator.current_phase().unwrap().text.clone();
    assert_eq!(target, "hi");
    for c in target.chars() {
        tx.send(key(c)).unwrap();
    }

    let mut typed = String::new();
    let mut events = Vec::new();
    for _ in 0..100u32 {
        let event = match runner.step() {
            AppEvent::Tick => {
                clock.advance_secs(1);
                coordinator.on_tick()
            }
            AppEvent::Resize => None,
            AppEvent::Key(key) => match key.code {
                KeyCode::Char(c) => {
                    typed.push(c);
                    coordinator.on_input(&typed)
                }
                _ => None,
            },
        };
        if let Some(event) = event {
            let advanced = matches!(event, CoordinatorEvent::PhaseAdvanced { .. });
            events.push(event);
            if advanced {
                break;
            }
        }
    }

    assert!(matches!(events[0], CoordinatorEvent::PhaseCompleted(ref r) if r.accuracy == 100));
    assert_eq!(events[1], CoordinatorEvent::PhaseAdvanced { phase_index: 1 });
    assert_eq!(coordinator.current_phase().unwrap().mode, PhaseMode::Drill);
    assert_eq!(coordinator.current_phase().unwrap().text, "there");
}

#[test]
fn headless_countdown_runs_out_without_input() {
    let clock = start_clock();
    let mut coordinator = Coordinator::new(clock.clone());
    coordinator.start("one two three four five six");

    let (_tx, rx) = mpsc::channel::<AppEvent>();
    let runner = Runner::new(rx, Duration::from_millis(1));

    let mut advanced_at = None;
    for step in 1..=200u32 {
        if let AppEvent::Tick = runner.step() {
            clock.advance_secs(1);
            if let Some(CoordinatorEvent::PhaseAdvanced { phase_index }) = coordinator.on_tick() {
                advanced_at = Some((step, phase_index));
                break;
            }
        }
    }

    // warm-up lasts two minutes
    assert_eq!(advanced_at, Some((120, 1)));
    assert_eq!(
        coordinator.state(),
        CoordinatorState::InProgress {
            phase_index: 1,
            seconds_remaining: 300
        }
    );
}

#[test]
fn headless_finish_early_completes_session() {
    let clock = start_clock();
    let mut coordinator = Coordinator::new(clock.clone());
    coordinator.start("one two three four five six");

    clock.advance_secs(45);
    coordinator.on_tick();
    assert_eq!(coordinator.seconds_remaining(), Some(75));

    match coordinator.finish() {
        Some(CoordinatorEvent::SessionCompleted(record)) => {
            assert_eq!(record.mode, PhaseMode::WarmUp);
            assert_eq!(record.wpm, 0);
            assert_eq!(record.accuracy, 0);
            assert_eq!(record.duration, 1);
        }
        other => panic!("expected session completion, got {other:?}"),
    }
    assert!(coordinator.is_completed());
    assert_eq!(coordinator.on_tick(), None);
}
