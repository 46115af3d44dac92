use serde::{Deserialize, Serialize};

pub const PHASE_COUNT: usize = 6;

/// The fixed practice modes of a session, in the order they are played
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum PhaseMode {
    WarmUp,
    Drill,
    Challenge,
    ErrorFocus,
    Review,
    Spaced,
}

impl PhaseMode {
    pub const ALL: [PhaseMode; PHASE_COUNT] = [
        PhaseMode::WarmUp,
        PhaseMode::Drill,
        PhaseMode::Challenge,
        PhaseMode::ErrorFocus,
        PhaseMode::Review,
        PhaseMode::Spaced,
    ];

    pub fn duration_secs(&self) -> u32 {
        match self {
            PhaseMode::WarmUp => 120,
            PhaseMode::Drill => 300,
            PhaseMode::Challenge => 300,
            PhaseMode::ErrorFocus => 180,
            PhaseMode::Review => 180,
            PhaseMode::Spaced => 120,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PhaseMode::WarmUp => "Warm-up",
            PhaseMode::Drill => "Targeted Drill",
            PhaseMode::Challenge => "Adaptive Challenge",
            PhaseMode::ErrorFocus => "Error Focus",
            PhaseMode::Review => "Review",
            PhaseMode::Spaced => "Spaced Repetition",
        }
    }

    /// Text used when the source material leaves this phase without words
    pub fn fallback_text(&self) -> &'static str {
        match self {
            PhaseMode::WarmUp => {
                "The quick brown fox jumps over the lazy dog. Simple words help build rhythm and get fingers moving."
            }
            PhaseMode::Drill => {
                "Typing practice builds muscle memory through repetition. Focus on these letter combinations: th, ing, and, ion, ent."
            }
            PhaseMode::Challenge => {
                "Mastering typing requires consistent practice and focused attention on both speed and accuracy rather than just one aspect alone."
            }
            PhaseMode::ErrorFocus => {
                "The five boxing wizards jump quickly. Pack my box with five dozen liquor jugs. How vexingly quick daft zebras jump!"
            }
            PhaseMode::Review => {
                "Review your progress and identify areas for improvement. Slower typing with perfect form builds better habits than rushed errors."
            }
            PhaseMode::Spaced => {
                "Recall what you've practiced. The quick brown fox jumps over the lazy dog while five boxing wizards watch quickly."
            }
        }
    }
}

/// One timed segment of a practice session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPhase {
    pub mode: PhaseMode,
    pub text: String,
    pub duration_secs: u32,
}

/// Split `source_text` into the six phases of a session.
///
/// Words are dealt into contiguous chunks of `floor(words / 6)`; the last
/// chunk takes whatever remains. Empty chunks get the mode's fallback text.
pub fn build_session(source_text: &str) -> [SessionPhase; PHASE_COUNT] {
    let words: Vec<&str> = source_text.split_whitespace().collect();
    let word_count = words.len();
    let chunk_size = word_count / PHASE_COUNT;

    std::array::from_fn(|idx| {
        let mode = PhaseMode::ALL[idx];
        let start = (idx * chunk_size).min(word_count);
        let end = if idx == PHASE_COUNT - 1 {
            word_count
        } else {
            (start + chunk_size).min(word_count)
        };

        let text = if start < end {
            words[start..end].join(" ")
        } else {
            mode.fallback_text().to_string()
        };

        SessionPhase {
            mode,
            text,
            duration_secs: mode.duration_secs(),
        }
    })
}

/// What happened when the sequencer was asked to move on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Phase(usize),
    Finished,
}

/// Owns the phases of one session and tracks which one is active
#[derive(Debug, Clone)]
pub struct Sequencer {
    phases: [SessionPhase; PHASE_COUNT],
    index: usize,
    finished: bool,
}

impl Sequencer {
    pub fn new(source_text: &str) -> Self {
        Self {
            phases: build_session(source_text),
            index: 0,
            finished: false,
        }
    }

    pub fn phases(&self) -> &[SessionPhase] {
        &self.phases
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &SessionPhase {
        &self.phases[self.index]
    }

    pub fn is_last(&self) -> bool {
        self.index == PHASE_COUNT - 1
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Move to the next phase, or finish when the last one is done
    pub fn advance(&mut self) -> Step {
        if self.finished {
            return Step::Finished;
        }
        if self.is_last() {
            self.finished = true;
            Step::Finished
        } else {
            self.index += 1;
            Step::Phase(self.index)
        }
    }

    /// End the session on the current phase
    pub fn finish(&mut self) {
        self.finished = true;
    }

    /// Share of phases already passed, as a whole percentage
    pub fn progress_percent(&self) -> u32 {
        if self.finished {
            100
        } else {
            (self.index * 100 / PHASE_COUNT) as u32
        }
    }
}
