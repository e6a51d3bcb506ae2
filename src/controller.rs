use std::fmt;
use std::time::Instant;

use crate::render::{classes_from, CharClass};
use crate::runtime::TickSchedule;
use crate::session::{FinishReason, KeystrokeOutcome, Phase, Session};
use crate::source::TextSource;
use crate::stats::Stats;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Ready,
    TimeUp,
    Completed,
    Restarted,
    TimeUpdated,
    Importing,
    Imported,
    ImportFailed(String),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ready => write!(f, "Ready to type."),
            Status::TimeUp => write!(f, "Time's up."),
            Status::Completed => write!(f, "Text completed."),
            Status::Restarted => write!(f, "Training restarted."),
            Status::TimeUpdated => write!(f, "Time updated."),
            Status::Importing => write!(f, "Importing file..."),
            Status::Imported => write!(f, "File imported successfully."),
            Status::ImportFailed(reason) => write!(f, "Import failed: {reason}"),
        }
    }
}

impl From<FinishReason> for Status {
    fn from(reason: FinishReason) -> Self {
        match reason {
            FinishReason::TimeUp => Status::TimeUp,
            FinishReason::Completed => Status::Completed,
            FinishReason::Abandoned => Status::Ready,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub expired: bool,
}

/// Owns the active session and drives it through keystrokes, ticks and focus changes
#[derive(Debug)]
pub struct SessionController {
    session: Session,
    timer_seconds: u64,
    schedule: TickSchedule,
    status: Status,
}

impl SessionController {
    pub fn new(timer_seconds: u64) -> Self {
        let timer_seconds = timer_seconds.max(1);
        Self {
            session: Session::new("", timer_seconds),
            timer_seconds,
            schedule: TickSchedule::default(),
            status: Status::Ready,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    pub fn timer_seconds(&self) -> u64 {
        self.timer_seconds
    }

    pub fn is_ticking(&self) -> bool {
        self.schedule.is_armed()
    }

    /// Replaces the active session. A session still in progress is abandoned.
    pub fn start_session(&mut self, content: &str) -> &Session {
        if self.session.phase() == Phase::Running {
            let now = Instant::now();
            self.session.finish(FinishReason::Abandoned, now);
            tracing::debug!(
                typed = self.session.typed().len(),
                target = self.session.target().len(),
                "abandoned running session"
            );
        }
        self.schedule.cancel();
        self.session = Session::new(content, self.timer_seconds);
        tracing::debug!(
            chars = self.session.target().len(),
            timer_secs = self.timer_seconds,
            "session started"
        );
        &self.session
    }

    pub fn select_source(&mut self, source: &TextSource) -> &Session {
        tracing::info!(id = %source.id, name = %source.name, "source selected");
        self.start_session(&source.content);
        self.status = Status::Ready;
        &self.session
    }

    /// Same text, fresh attempt. Ignored when there is nothing to type.
    pub fn restart(&mut self) -> bool {
        if self.session.target().is_empty() {
            return false;
        }
        let content = self.session.target_string();
        self.start_session(&content);
        self.status = Status::Restarted;
        true
    }

    pub fn set_duration(&mut self, secs: u64) {
        self.timer_seconds = secs.max(1);
        tracing::info!(secs = self.timer_seconds, "session duration changed");
        if !self.session.target().is_empty() {
            let content = self.session.target_string();
            self.start_session(&content);
            self.status = Status::TimeUpdated;
        }
    }

    /// Keystrokes landing after the deadline expire the session first and are rejected,
    /// even when no tick has fired since the deadline passed.
    pub fn apply_keystroke_update(&mut self, next_typed: &str, now: Instant) -> KeystrokeOutcome {
        if self.expire_if_due(now) {
            return KeystrokeOutcome::Rejected {
                typed: self.session.typed_string(),
            };
        }

        let was_started = self.session.has_started();
        let outcome = self.session.apply_update(next_typed, now);

        if !was_started && self.session.has_started() {
            self.schedule.arm();
            tracing::debug!("first keystroke, clock started");
        }

        if let KeystrokeOutcome::Accepted {
            finished: Some(reason),
            ..
        } = outcome
        {
            self.on_finished(reason);
        }
        outcome
    }

    pub fn compute_stats(&self, now: Instant) -> Stats {
        Stats::compute(&self.session, now)
    }

    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        TickOutcome {
            expired: self.expire_if_due(now),
        }
    }

    pub fn pause(&mut self, now: Instant) {
        if self.session.pause(now) {
            self.schedule.cancel();
            tracing::debug!("session paused");
        }
    }

    pub fn resume(&mut self, now: Instant) {
        if self.session.resume(now) && !self.session.is_finished() {
            self.schedule.arm();
            tracing::debug!("session resumed");
        }
    }

    pub fn classes_from(&self, from: usize) -> Vec<(usize, CharClass)> {
        classes_from(self.session.target(), self.session.typed(), from)
    }

    /// Only an armed schedule can expire: started, not paused, not finished.
    fn expire_if_due(&mut self, now: Instant) -> bool {
        if !self.schedule.is_armed() || self.session.remaining_seconds(now) > 0.0 {
            return false;
        }
        if self.session.finish(FinishReason::TimeUp, now) {
            self.on_finished(FinishReason::TimeUp);
            return true;
        }
        false
    }

    fn on_finished(&mut self, reason: FinishReason) {
        self.schedule.cancel();
        self.status = reason.into();
        tracing::info!(reason = %reason, "session finished");
    }
}
