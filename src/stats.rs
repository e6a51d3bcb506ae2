use std::time::Instant;

use crate::session::Session;

/// Shortest elapsed time used for rate calculations (one second's sixtieth)
pub const MIN_ELAPSED_SECS: f64 = 1.0 / 60.0;

/// Characters per word for the wpm convention
pub const CHARS_PER_WORD: f64 = 5.0;

/// Live statistics for a typing session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub wpm: u32,
    pub accuracy: f64,
    pub progress: f64,
    pub remaining_seconds: f64,
    pub correct_count: usize,
    pub typed_len: usize,
    pub target_len: usize,
}

impl Stats {
    pub fn compute(session: &Session, now: Instant) -> Self {
        let typed = session.typed();
        let target = session.target();

        let correct_count = correct_count(target, typed);
        let elapsed = session
            .effective_elapsed(now)
            .as_secs_f64()
            .max(MIN_ELAPSED_SECS);

        let wpm = (correct_count as f64 / CHARS_PER_WORD / (elapsed / 60.0)).round();
        let wpm = if wpm.is_finite() { wpm as u32 } else { 0 };

        let accuracy = if typed.is_empty() {
            100.0
        } else {
            correct_count as f64 / typed.len() as f64 * 100.0
        };

        let progress = if target.is_empty() {
            0.0
        } else {
            (typed.len() as f64 / target.len() as f64 * 100.0).min(100.0)
        };

        Self {
            wpm,
            accuracy,
            progress,
            remaining_seconds: session.remaining_seconds(now),
            correct_count,
            typed_len: typed.len(),
            target_len: target.len(),
        }
    }

    /// Whole seconds left, rounded up for display
    pub fn remaining_display_secs(&self) -> u64 {
        self.remaining_seconds.ceil() as u64
    }

    pub fn wpm_label(&self) -> String {
        self.wpm.to_string()
    }

    pub fn accuracy_label(&self) -> String {
        format!("{:.1}%", self.accuracy)
    }

    pub fn progress_label(&self) -> String {
        format!("{:.1}%", self.progress)
    }

    pub fn remaining_label(&self) -> String {
        format!("{}s", self.remaining_display_secs())
    }
}

pub fn correct_count(target: &[char], typed: &[char]) -> usize {
    typed
        .iter()
        .zip(target.iter())
        .filter(|(t, e)| t == e)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_fresh_session_defaults() {
        let now = Instant::now();
        let session = Session::new("hello", 30);

        let stats = Stats::compute(&session, now);

        assert_eq!(stats.wpm, 0);
        assert_eq!(stats.accuracy, 100.0);
        assert_eq!(stats.progress, 0.0);
        assert_eq!(stats.remaining_seconds, 30.0);
        assert_eq!(stats.remaining_label(), "30s");
    }

    #[test]
    fn test_empty_target_defaults() {
        let now = Instant::now();
        let session = Session::new("", 30);

        let stats = Stats::compute(&session, now);

        assert_eq!(stats.wpm, 0);
        assert_eq!(stats.accuracy_label(), "100.0%");
        assert_eq!(stats.progress_label(), "0.0%");
    }

    #[test]
    fn test_accuracy_cat_cot() {
        let t0 = Instant::now();
        let mut session = Session::new("cat", 30);
        session.apply_update("cot", t0);

        let stats = Stats::compute(&session, t0);

        assert_eq!(stats.correct_count, 2);
        assert!((stats.accuracy - 66.666).abs() < 0.01);
        assert_eq!(stats.accuracy_label(), "66.7%");
        assert_eq!(stats.progress_label(), "100.0%");
    }

    #[test]
    fn test_wpm_uses_five_char_words() {
        let t0 = Instant::now();
        let mut session = Session::new("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", 120);
        session.apply_update("a", t0);
        session.apply_update("aaaaaaaaaa", t0 + Duration::from_secs(6));

        // 10 correct chars = 2 words in 0.1 minutes
        let stats = Stats::compute(&session, t0 + Duration::from_secs(6));
        assert_eq!(stats.wpm, 20);
    }

    #[test]
    fn test_elapsed_is_clamped_on_first_keystroke() {
        let t0 = Instant::now();
        let mut session = Session::new("hello", 30);
        session.apply_update("h", t0);

        // 1 char / 5 / (1/3600) = 720
        let stats = Stats::compute(&session, t0);
        assert_eq!(stats.wpm, 720);
    }

    #[test]
    fn test_remaining_rounds_up() {
        let t0 = Instant::now();
        let mut session = Session::new("hello", 10);
        session.apply_update("h", t0);

        let stats = Stats::compute(&session, t0 + Duration::from_millis(2500));
        assert_eq!(stats.remaining_seconds, 7.5);
        assert_eq!(stats.remaining_display_secs(), 8);
    }

    #[test]
    fn test_remaining_never_negative() {
        let t0 = Instant::now();
        let mut session = Session::new("hello", 1);
        session.apply_update("h", t0);

        let stats = Stats::compute(&session, t0 + Duration::from_secs(5));
        assert_eq!(stats.remaining_seconds, 0.0);
        assert_eq!(stats.remaining_label(), "0s");
    }

    #[test]
    fn test_compute_is_idempotent() {
        let t0 = Instant::now();
        let mut session = Session::new("hello world", 30);
        session.apply_update("hellp", t0);

        let now = t0 + Duration::from_millis(1234);
        assert_eq!(Stats::compute(&session, now), Stats::compute(&session, now));
    }

    #[test]
    fn test_progress_monotonic_when_typing_forward() {
        let t0 = Instant::now();
        let target = "the quick brown fox";
        let mut session = Session::new(target, 60);
        let mut last = 0.0;

        for n in 1..=target.len() {
            let now = t0 + Duration::from_millis(100 * n as u64);
            session.apply_update(&target[..n], now);
            let progress = Stats::compute(&session, now).progress;
            assert!(progress >= last);
            last = progress;
        }
        assert_eq!(last, 100.0);
    }

    #[test]
    fn test_correct_count_ignores_extra_typed() {
        let target: Vec<char> = "ab".chars().collect();
        let typed: Vec<char> = "abc".chars().collect();
        assert_eq!(correct_count(&target, &typed), 2);
    }
}
