use std::time::{Duration, Instant};

use crate::render::first_diff_index;

/// Why a session reached its terminal state
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum FinishReason {
    #[strum(serialize = "Text completed.")]
    Completed,
    #[strum(serialize = "Time's up.")]
    TimeUp,
    #[strum(serialize = "Session abandoned.")]
    Abandoned,
}

/// Outer lifecycle label; pausing does not change it
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    Idle,
    Running,
    Finished,
}

/// Result of feeding the full current input into a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeystrokeOutcome {
    /// The input replaced the typed text. Cells before `diff_index` keep their render state.
    Accepted {
        diff_index: usize,
        finished: Option<FinishReason>,
    },
    /// The session is finished; `typed` is the last accepted text to put back into the input.
    Rejected { typed: String },
}

/// A single timed typing attempt against a fixed target text
#[derive(Debug, Clone)]
pub struct Session {
    target: Vec<char>,
    typed: Vec<char>,
    timer_seconds: u64,
    started_at: Option<Instant>,
    paused_at: Option<Instant>,
    finished_at: Option<Instant>,
    finish_reason: Option<FinishReason>,
}

impl Session {
    pub fn new(content: &str, timer_seconds: u64) -> Self {
        Self {
            target: crate::source::normalize_text(content).chars().collect(),
            typed: Vec::new(),
            timer_seconds: timer_seconds.max(1),
            started_at: None,
            paused_at: None,
            finished_at: None,
            finish_reason: None,
        }
    }

    pub fn target(&self) -> &[char] {
        &self.target
    }

    pub fn typed(&self) -> &[char] {
        &self.typed
    }

    pub fn typed_string(&self) -> String {
        self.typed.iter().collect()
    }

    pub fn target_string(&self) -> String {
        self.target.iter().collect()
    }

    pub fn timer_seconds(&self) -> u64 {
        self.timer_seconds
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.finish_reason.is_some()
    }

    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.finish_reason
    }

    pub fn phase(&self) -> Phase {
        match (self.started_at, self.finish_reason) {
            (_, Some(_)) => Phase::Finished,
            (Some(_), None) => Phase::Running,
            (None, None) => Phase::Idle,
        }
    }

    /// Wall-clock time since the first keystroke minus paused time.
    /// Frozen at the finish instant once the session is over.
    pub fn effective_elapsed(&self, now: Instant) -> Duration {
        let Some(started_at) = self.started_at else {
            return Duration::ZERO;
        };
        let end = self.finished_at.unwrap_or(now);
        let mut elapsed = end.saturating_duration_since(started_at);
        if let Some(paused_at) = self.paused_at {
            elapsed = elapsed.saturating_sub(end.saturating_duration_since(paused_at));
        }
        elapsed
    }

    pub fn remaining_seconds(&self, now: Instant) -> f64 {
        (self.timer_seconds as f64 - self.effective_elapsed(now).as_secs_f64()).max(0.0)
    }

    pub fn apply_update(&mut self, next_typed: &str, now: Instant) -> KeystrokeOutcome {
        if self.is_finished() {
            return KeystrokeOutcome::Rejected {
                typed: self.typed_string(),
            };
        }

        let next: Vec<char> = next_typed.chars().take(self.target.len()).collect();

        if !next.is_empty() && self.started_at.is_none() {
            self.started_at = Some(now);
        }

        let diff_index = first_diff_index(&self.typed, &next);
        self.typed = next;

        // an empty target clamps every update to nothing, so the clock never starts
        // and there is no keystroke to credit a completion to
        if self.started_at.is_some() && self.typed.len() == self.target.len() {
            self.finish(FinishReason::Completed, now);
        }

        KeystrokeOutcome::Accepted {
            diff_index,
            finished: self.finish_reason,
        }
    }

    /// Marks the session finished. The first reason wins.
    pub fn finish(&mut self, reason: FinishReason, now: Instant) -> bool {
        if self.is_finished() {
            return false;
        }
        self.finished_at = Some(now);
        self.finish_reason = Some(reason);
        true
    }

    /// Returns false when there is nothing to pause (idle, finished or already paused).
    pub fn pause(&mut self, now: Instant) -> bool {
        if self.phase() != Phase::Running || self.is_paused() {
            return false;
        }
        self.paused_at = Some(now);
        true
    }

    /// Shifts the start forward by the paused span so it never counts as elapsed.
    pub fn resume(&mut self, now: Instant) -> bool {
        let Some(paused_at) = self.paused_at.take() else {
            return false;
        };
        if let Some(started_at) = self.started_at {
            self.started_at = Some(started_at + now.saturating_duration_since(paused_at));
        }
        true
    }
}
