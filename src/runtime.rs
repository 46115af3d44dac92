use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

/// How often the front end polls the coordinator's timer
pub const TICK_RATE: Duration = Duration::from_millis(250);

/// Input to the app loop: a key press, a resize, or an idle tick
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Anything the runner can wait on for the next [`AppEvent`]
pub trait EventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// A plain channel is the event source for headless runs
impl EventSource for Receiver<AppEvent> {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        Receiver::recv_timeout(self, timeout)
    }
}

/// Forward terminal input from a background thread. Key releases are
/// dropped so each keystroke arrives once on every platform.
pub fn terminal_events() -> Receiver<AppEvent> {
    let (tx, rx) = mpsc::channel();

    std::thread::spawn(move || loop {
        let evt = match event::read() {
            Ok(CtEvent::Key(key)) if key.kind != KeyEventKind::Release => AppEvent::Key(key),
            Ok(CtEvent::Resize(_, _)) => AppEvent::Resize,
            Ok(_) => continue,
            Err(e) => {
                tracing::warn!("terminal event stream closed: {}", e);
                break;
            }
        };
        if tx.send(evt).is_err() {
            break;
        }
    });

    rx
}

/// Hands the app one event at a time, yielding `Tick` whenever a tick
/// interval passes without input
pub struct Runner<E: EventSource> {
    events: E,
    tick: Duration,
}

impl Runner<Receiver<AppEvent>> {
    /// Runner over real terminal input at [`TICK_RATE`]
    pub fn terminal() -> Self {
        Self::new(terminal_events(), TICK_RATE)
    }
}

impl<E: EventSource> Runner<E> {
    pub fn new(events: E, tick: Duration) -> Self {
        Self { events, tick }
    }

    /// A closed source keeps ticking so session timers still run out
    pub fn step(&self) -> AppEvent {
        self.events.recv_timeout(self.tick).unwrap_or(AppEvent::Tick)
    }
}
