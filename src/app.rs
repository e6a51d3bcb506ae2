use std::path::Path;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::Config;
use crate::controller::{SessionController, Status};
use crate::render::CharClass;
use crate::runtime::TrainerEvent;
use crate::session::KeystrokeOutcome;
use crate::source::{normalize_text, SourceRegistry, TextSource};
use crate::stats::Stats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Terminal front end state: the text field, the source picker and the cached stats
#[derive(Debug)]
pub struct App {
    pub controller: SessionController,
    pub sources: SourceRegistry,
    pub active: usize,
    pub input: String,
    pub stats: Stats,
    /// Render class per target cell, patched from the first changed index on each update
    pub classes: Vec<CharClass>,
    pub config: Config,
    config_changed: bool,
}

impl App {
    pub fn new(config: Config, sources: SourceRegistry) -> Self {
        let controller = SessionController::new(config.duration_secs);
        let stats = controller.compute_stats(Instant::now());
        let active = config
            .last_source
            .as_deref()
            .and_then(|name| sources.position_by_name(name))
            .unwrap_or(0);

        let mut app = Self {
            controller,
            sources,
            active,
            input: String::new(),
            stats,
            classes: Vec::new(),
            config,
            config_changed: false,
        };
        app.select(active);
        app
    }

    pub fn active_source(&self) -> Option<&TextSource> {
        self.sources.get(self.active)
    }

    pub fn select(&mut self, index: usize) {
        let Some(source) = self.sources.get(index).cloned() else {
            return;
        };
        self.active = index;
        self.controller.select_source(&source);
        if self.config.last_source.as_deref() != Some(source.name.as_str()) {
            self.config.last_source = Some(source.name);
            self.config_changed = true;
        }
        self.reset_view();
    }

    pub fn next_source(&mut self) {
        self.select(self.sources.next_index(self.active));
    }

    pub fn previous_source(&mut self) {
        self.select(self.sources.previous_index(self.active));
    }

    /// Imports a file and makes it the active source. Failures only change the status line.
    pub fn import<P: AsRef<Path>>(&mut self, path: P) {
        self.controller.set_status(Status::Importing);
        let imported = self.sources.import_path(path.as_ref()).map(|_| ());
        match imported {
            Ok(()) => {
                self.select(0);
                self.controller.set_status(Status::Imported);
            }
            Err(err) => {
                tracing::warn!(error = %err, "file import failed");
                self.controller
                    .set_status(Status::ImportFailed(err.to_string()));
            }
        }
    }

    pub fn restart(&mut self) {
        if self.controller.restart() {
            self.reset_view();
        }
    }

    pub fn cycle_duration(&mut self) -> u64 {
        let secs = self.config.next_duration(self.controller.timer_seconds());
        self.controller.set_duration(secs);
        self.config.duration_secs = secs;
        self.config_changed = true;
        self.reset_view();
        secs
    }

    /// Feeds the whole text field to the controller, then mirrors what it accepted.
    pub fn set_input(&mut self, next: String, now: Instant) {
        match self.controller.apply_keystroke_update(&next, now) {
            KeystrokeOutcome::Accepted { diff_index, .. } => {
                self.input = self.controller.session().typed_string();
                self.refresh_classes(diff_index);
            }
            KeystrokeOutcome::Rejected { typed } => {
                self.input = typed;
            }
        }
        self.refresh_stats(now);
    }

    pub fn push_char(&mut self, c: char, now: Instant) {
        let mut next = self.input.clone();
        next.push(c);
        self.set_input(next, now);
    }

    pub fn pop_char(&mut self, now: Instant) {
        let mut next = self.input.clone();
        next.pop();
        self.set_input(next, now);
    }

    pub fn paste(&mut self, text: &str, now: Instant) {
        let next = format!("{}{}", self.input, normalize_text(text));
        self.set_input(next, now);
    }

    pub fn refresh_stats(&mut self, now: Instant) {
        self.stats = self.controller.compute_stats(now);
    }

    /// Cells before `from` keep their cached class.
    fn refresh_classes(&mut self, from: usize) {
        let from = from.min(self.classes.len());
        self.classes.truncate(from);
        self.classes.extend(
            self.controller
                .classes_from(from)
                .into_iter()
                .map(|(_, class)| class),
        );
    }

    /// True once since the last call if the persisted settings changed
    pub fn take_config_changed(&mut self) -> bool {
        std::mem::take(&mut self.config_changed)
    }

    pub fn handle_event(&mut self, event: TrainerEvent, now: Instant) -> Control {
        // the deadline is checked on every event, so a busy queue cannot outrun it
        let ticking = self.controller.is_ticking();
        if ticking && self.controller.tick(now).expired {
            self.refresh_stats(now);
        }

        match event {
            TrainerEvent::Tick => {
                if ticking {
                    self.refresh_stats(now);
                }
            }
            TrainerEvent::FocusLost => {
                self.controller.pause(now);
                self.refresh_stats(now);
            }
            TrainerEvent::FocusGained => {
                self.controller.resume(now);
                self.refresh_stats(now);
            }
            TrainerEvent::Paste(text) => self.paste(&text, now),
            TrainerEvent::Resize => {}
            TrainerEvent::Key(key) => return self.handle_key(key, now),
        }
        Control::Continue
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Control {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => return Control::Quit,
                KeyCode::Char('r') => self.restart(),
                KeyCode::Char('n') => self.next_source(),
                KeyCode::Char('p') => self.previous_source(),
                KeyCode::Char('t') => {
                    self.cycle_duration();
                }
                _ => {}
            }
            return Control::Continue;
        }

        match key.code {
            KeyCode::Esc => return Control::Quit,
            KeyCode::Backspace => self.pop_char(now),
            KeyCode::Enter => self.push_char('\n', now),
            KeyCode::Tab => self.push_char('\t', now),
            KeyCode::Char(c) => self.push_char(c, now),
            _ => {}
        }
        Control::Continue
    }

    fn reset_view(&mut self) {
        self.input.clear();
        self.refresh_classes(0);
        self.refresh_stats(Instant::now());
    }
}
