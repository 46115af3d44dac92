use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of scoring one phase's typed input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingAttemptResult {
    pub wpm: u32,
    pub accuracy: u32,
    /// Distinct target characters that were mistyped, in first-mistake order
    pub errors: Vec<char>,
}

/// Rendering status of a single prompt character
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharStatus {
    Correct,
    Incorrect,
    Current,
    Pending,
}

/// Number of words in `text`, counted the way the trainer always has:
/// tokens between single spaces, so stray leading/trailing spaces count.
pub fn word_count(text: &str) -> usize {
    text.split(' ').count()
}

/// Score a completed attempt.
///
/// An empty target or a non-positive elapsed time yields `wpm = 0`, and an
/// empty target yields `accuracy = 0`, so no NaN or infinity can escape.
pub fn score(target: &str, typed: &str, elapsed_ms: i64) -> TypingAttemptResult {
    let target_chars: Vec<char> = target.chars().collect();

    let wpm = if target_chars.is_empty() || elapsed_ms <= 0 {
        0
    } else {
        let minutes = elapsed_ms as f64 / 60_000.0;
        (word_count(target) as f64 / minutes).round() as u32
    };

    let mut correct = 0usize;
    let mut errors: Vec<char> = Vec::new();
    for (expected, actual) in target_chars.iter().zip(typed.chars()) {
        if *expected == actual {
            correct += 1;
        } else if !errors.contains(expected) {
            errors.push(*expected);
        }
    }

    let accuracy = if target_chars.is_empty() {
        0
    } else {
        ((correct as f64 / target_chars.len() as f64) * 100.0).round() as u32
    };

    TypingAttemptResult {
        wpm,
        accuracy,
        errors,
    }
}

/// Typing state for a single phase.
///
/// Consumes the full typed string after every keystroke, starts timing on
/// the first keystroke and collects every mistake made along the way, even
/// ones later fixed with backspace.
#[derive(Debug, Clone)]
pub struct Attempt {
    prompt: Vec<char>,
    input: Vec<char>,
    mistakes: Vec<char>,
    started_at: Option<DateTime<Utc>>,
    result: Option<TypingAttemptResult>,
}

impl Attempt {
    pub fn new(prompt: &str) -> Self {
        Self {
            prompt: prompt.chars().collect(),
            input: Vec::new(),
            mistakes: Vec::new(),
            started_at: None,
            result: None,
        }
    }

    /// Feed the current contents of the input box.
    /// Returns the result the moment the input reaches the prompt length.
    pub fn update(&mut self, typed: &str, now: DateTime<Utc>) -> Option<&TypingAttemptResult> {
        if self.result.is_some() {
            return None;
        }

        if self.started_at.is_none() && !typed.is_empty() {
            self.started_at = Some(now);
        }

        let mut next: Vec<char> = typed.chars().collect();
        next.truncate(self.prompt.len());

        if next.len() > self.input.len() {
            for idx in self.input.len()..next.len() {
                let expected = self.prompt[idx];
                if next[idx] != expected && !self.mistakes.contains(&expected) {
                    self.mistakes.push(expected);
                }
            }
        }
        self.input = next;

        if !self.prompt.is_empty() && self.input.len() == self.prompt.len() {
            let elapsed_ms = self
                .started_at
                .map_or(0, |start| (now - start).num_milliseconds());
            let typed: String = self.input.iter().collect();
            let prompt: String = self.prompt.iter().collect();

            let mut result = score(&prompt, &typed, elapsed_ms);
            for c in &result.errors {
                if !self.mistakes.contains(c) {
                    self.mistakes.push(*c);
                }
            }
            result.errors = self.mistakes.clone();
            self.result = Some(result);
            return self.result.as_ref();
        }

        None
    }

    /// Clear input, mistakes and timing so the phase text can be retried
    pub fn reset(&mut self) {
        self.input.clear();
        self.mistakes.clear();
        self.started_at = None;
        self.result = None;
    }

    pub fn status_at(&self, idx: usize) -> CharStatus {
        match self.input.get(idx) {
            Some(c) if Some(c) == self.prompt.get(idx) => CharStatus::Correct,
            Some(_) => CharStatus::Incorrect,
            None if idx == self.input.len() => CharStatus::Current,
            None => CharStatus::Pending,
        }
    }

    pub fn prompt(&self) -> &[char] {
        &self.prompt
    }

    pub fn input(&self) -> &[char] {
        &self.input
    }

    pub fn cursor_pos(&self) -> usize {
        self.input.len()
    }

    pub fn mistakes(&self) -> &[char] {
        &self.mistakes
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn is_complete(&self) -> bool {
        self.result.is_some()
    }

    pub fn result(&self) -> Option<&TypingAttemptResult> {
        self.result.as_ref()
    }
}
