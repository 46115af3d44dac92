use chrono::{DateTime, Utc};

use crate::clock::Clock;
use crate::scoring::{Attempt, TypingAttemptResult};
use crate::session::{SessionPhase, Sequencer, Step};
use crate::stats::SessionRecord;

/// Pause between finishing a phase's text and moving to the next phase
pub const COMPLETION_DELAY_SECS: i64 = 2;

/// How many of the latest result's error keys are highlighted as problem keys
pub const PROBLEM_KEY_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    InProgress {
        phase_index: usize,
        seconds_remaining: u32,
    },
    Completed,
}

/// The single timer a coordinator can have armed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Timer {
    /// One-second countdown for the active phase
    Countdown { next_tick_at: DateTime<Utc> },
    /// Post-completion delay; replaces the countdown when a phase is finished early
    Advance { at: DateTime<Utc> },
}

impl Timer {
    fn countdown_from(now: DateTime<Utc>) -> Self {
        Timer::Countdown {
            next_tick_at: now + chrono::Duration::seconds(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorEvent {
    /// The active phase's text was fully typed and scored
    PhaseCompleted(TypingAttemptResult),
    PhaseAdvanced { phase_index: usize },
    /// The session is over; the record is ready for the stats engine
    SessionCompleted(SessionRecord),
}

/// Drives one practice session from start to completion.
///
/// The coordinator owns the sequencer and exactly one timer. Every phase
/// change disarms the current timer before arming the next, so each phase
/// advances once: either its countdown runs out or, if the text was finished
/// first, the completion delay fires. Time only moves when [`on_tick`] is
/// called; dropping the coordinator leaves nothing scheduled.
///
/// A finished coordinator is not reusable; build a new one per session.
///
/// [`on_tick`]: Coordinator::on_tick
#[derive(Debug)]
pub struct Coordinator<C: Clock> {
    clock: C,
    state: CoordinatorState,
    sequencer: Option<Sequencer>,
    attempt: Option<Attempt>,
    timer: Option<Timer>,
    started_at: Option<DateTime<Utc>>,
    last_result: Option<TypingAttemptResult>,
    record: Option<SessionRecord>,
}

impl<C: Clock> Coordinator<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            state: CoordinatorState::Idle,
            sequencer: None,
            attempt: None,
            timer: None,
            started_at: None,
            last_result: None,
            record: None,
        }
    }

    /// Build the phases from `source_text` and start the first countdown.
    /// Returns false if this coordinator already ran a session.
    pub fn start(&mut self, source_text: &str) -> bool {
        if self.state != CoordinatorState::Idle {
            tracing::warn!(state = ?self.state, "session already started");
            return false;
        }

        let now = self.clock.now();
        let sequencer = Sequencer::new(source_text);
        let first = sequencer.current();

        self.attempt = Some(Attempt::new(&first.text));
        self.state = CoordinatorState::InProgress {
            phase_index: 0,
            seconds_remaining: first.duration_secs,
        };
        self.timer = Some(Timer::countdown_from(now));
        self.started_at = Some(now);
        tracing::debug!(mode = %first.mode, "session started");
        self.sequencer = Some(sequencer);
        true
    }

    /// Feed the current contents of the input box for the active phase
    pub fn on_input(&mut self, typed: &str) -> Option<CoordinatorEvent> {
        if !self.is_in_progress() || self.awaiting_advance() {
            return None;
        }

        let now = self.clock.now();
        let result = self.attempt.as_mut()?.update(typed, now)?.clone();

        tracing::debug!(wpm = result.wpm, accuracy = result.accuracy, "phase text completed");
        self.last_result = Some(result.clone());
        self.timer = Some(Timer::Advance {
            at: now + chrono::Duration::seconds(COMPLETION_DELAY_SECS),
        });

        Some(CoordinatorEvent::PhaseCompleted(result))
    }

    /// Restart typing the active phase's text; the countdown keeps running
    pub fn retry_phase(&mut self) -> bool {
        if !self.is_in_progress() || self.awaiting_advance() {
            return false;
        }
        match self.attempt.as_mut() {
            Some(attempt) => {
                attempt.reset();
                true
            }
            None => false,
        }
    }

    /// Let the armed timer catch up with the clock
    pub fn on_tick(&mut self) -> Option<CoordinatorEvent> {
        let now = self.clock.now();

        match self.timer? {
            Timer::Countdown { mut next_tick_at } => {
                let CoordinatorState::InProgress {
                    phase_index,
                    mut seconds_remaining,
                } = self.state
                else {
                    return None;
                };

                while now >= next_tick_at && seconds_remaining > 0 {
                    seconds_remaining -= 1;
                    next_tick_at += chrono::Duration::seconds(1);
                }
                self.state = CoordinatorState::InProgress {
                    phase_index,
                    seconds_remaining,
                };

                if seconds_remaining == 0 {
                    tracing::debug!(phase_index, "phase timed out");
                    self.advance(now)
                } else {
                    self.timer = Some(Timer::Countdown { next_tick_at });
                    None
                }
            }
            Timer::Advance { at } if now >= at => self.advance(now),
            Timer::Advance { .. } => None,
        }
    }

    /// End the session on the current phase
    pub fn finish(&mut self) -> Option<CoordinatorEvent> {
        if !self.is_in_progress() {
            return None;
        }
        self.sequencer.as_mut()?.finish();
        self.complete(self.clock.now())
    }

    fn advance(&mut self, now: DateTime<Utc>) -> Option<CoordinatorEvent> {
        self.timer = None;

        match self.sequencer.as_mut()?.advance() {
            Step::Phase(phase_index) => {
                let phase = self.sequencer.as_ref()?.current();
                self.attempt = Some(Attempt::new(&phase.text));
                self.state = CoordinatorState::InProgress {
                    phase_index,
                    seconds_remaining: phase.duration_secs,
                };
                tracing::debug!(phase_index, mode = %phase.mode, "advanced to next phase");
                self.timer = Some(Timer::countdown_from(now));
                Some(CoordinatorEvent::PhaseAdvanced { phase_index })
            }
            Step::Finished => self.complete(now),
        }
    }

    fn complete(&mut self, now: DateTime<Utc>) -> Option<CoordinatorEvent> {
        let mode = self.sequencer.as_ref()?.current().mode;
        let result = self.last_result.clone().unwrap_or_default();
        let duration = self.started_at.map_or(0, |start| {
            let secs = (now - start).num_seconds().max(0);
            (secs as f64 / 60.0).round() as u32
        });

        let record = SessionRecord {
            date: now,
            duration,
            wpm: result.wpm,
            accuracy: result.accuracy,
            mode,
            error_keys: result.errors,
        };

        self.timer = None;
        self.attempt = None;
        self.state = CoordinatorState::Completed;
        self.record = Some(record.clone());
        tracing::info!(
            wpm = record.wpm,
            accuracy = record.accuracy,
            minutes = record.duration,
            mode = %record.mode,
            "session completed"
        );

        Some(CoordinatorEvent::SessionCompleted(record))
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self.state, CoordinatorState::InProgress { .. })
    }

    pub fn is_completed(&self) -> bool {
        self.state == CoordinatorState::Completed
    }

    /// True between finishing a phase's text and the delayed advance
    pub fn awaiting_advance(&self) -> bool {
        matches!(self.timer, Some(Timer::Advance { .. }))
    }

    pub fn seconds_remaining(&self) -> Option<u32> {
        match self.state {
            CoordinatorState::InProgress {
                seconds_remaining, ..
            } => Some(seconds_remaining),
            _ => None,
        }
    }

    pub fn current_phase_index(&self) -> Option<usize> {
        match self.state {
            CoordinatorState::InProgress { phase_index, .. } => Some(phase_index),
            _ => None,
        }
    }

    pub fn phases(&self) -> &[SessionPhase] {
        self.sequencer.as_ref().map_or(&[][..], |s| s.phases())
    }

    pub fn current_phase(&self) -> Option<&SessionPhase> {
        self.sequencer.as_ref().map(|s| s.current())
    }

    pub fn attempt(&self) -> Option<&Attempt> {
        self.attempt.as_ref()
    }

    pub fn last_result(&self) -> Option<&TypingAttemptResult> {
        self.last_result.as_ref()
    }

    pub fn problem_keys(&self) -> &[char] {
        self.last_result.as_ref().map_or(&[][..], |r| {
            &r.errors[..r.errors.len().min(PROBLEM_KEY_LIMIT)]
        })
    }

    pub fn progress_percent(&self) -> u32 {
        self.sequencer.as_ref().map_or(0, |s| s.progress_percent())
    }

    /// Record of the finished session, once completed
    pub fn record(&self) -> Option<&SessionRecord> {
        self.record.as_ref()
    }
}
