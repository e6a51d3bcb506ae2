use std::{
    io::{self, stdin},
    path::PathBuf,
    time::Instant,
};

use anyhow::Context;
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{
        DisableBracketedPaste, DisableFocusChange, EnableBracketedPaste, EnableFocusChange,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use typeblock::{
    app::{App, Control},
    config::{Config, ConfigStore, FileConfigStore},
    logging,
    runtime::{CrosstermEventSource, EventSource, FixedTicker, Runner, Ticker, TrainerEvent},
    source::SourceRegistry,
};

/// timed typing trainer for prose and source code
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type a sample or one of your own files against the clock, with live words per minute, accuracy and progress."
)]
pub struct Cli {
    /// number of seconds per session (defaults to the saved setting)
    #[clap(short = 'd', long)]
    duration: Option<u64>,

    /// text file to practice on; repeat to import several
    #[clap(short = 'f', long = "file")]
    files: Vec<PathBuf>,

    /// built-in sample to start with, by file name
    #[clap(short = 's', long)]
    sample: Option<String>,

    /// milliseconds between stat refreshes while typing
    #[clap(long)]
    tick_ms: Option<u64>,

    /// print the built-in samples and exit
    #[clap(long)]
    list_samples: bool,
}

impl Cli {
    /// Command line values win over the saved config for this run
    fn apply_to(&self, config: &mut Config) {
        if let Some(secs) = self.duration {
            config.duration_secs = secs.max(1);
        }
        if let Some(ms) = self.tick_ms {
            config.tick_ms = ms;
        }
        if let Some(sample) = &self.sample {
            config.last_source = Some(sample.clone());
        }
    }
}

fn build_app(cli: &Cli, mut config: Config) -> App {
    cli.apply_to(&mut config);
    let mut app = App::new(config, SourceRegistry::with_samples());
    for path in &cli.files {
        app.import(path);
    }
    app
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.list_samples {
        for source in SourceRegistry::with_samples().sources() {
            println!("{}", source.info());
        }
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let _logging = logging::init();
    let store = FileConfigStore::new();
    let mut app = build_app(&cli, store.load());

    enable_raw_mode().context("failed to enable raw mode")?;

    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableFocusChange,
        EnableBracketedPaste
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app, &store);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        DisableFocusChange,
        LeaveAlternateScreen,
    )?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    store: &impl ConfigStore,
) -> anyhow::Result<()> {
    let ticker = FixedTicker::from_millis(app.config.tick_ms);
    let tick_ms = ticker.interval().as_millis() as u64;
    tracing::info!(tick_ms, "starting event loop");
    let runner = Runner::new(CrosstermEventSource::new(), ticker);

    run_loop(terminal, app, store, &runner)
}

fn run_loop<B: Backend, E: EventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    store: &impl ConfigStore,
    runner: &Runner<E, T>,
) -> anyhow::Result<()> {
    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        let event = runner.step();
        let is_tick = matches!(event, TrainerEvent::Tick);
        let was_ticking = app.controller.is_ticking();

        if app.handle_event(event, Instant::now()) == Control::Quit {
            break;
        }

        if app.take_config_changed() {
            if let Err(err) = store.save(&app.config) {
                tracing::warn!(error = %err, "could not save config");
            }
        }

        // idle ticks change nothing on screen
        if !is_tick || was_ticking {
            terminal.draw(|f| f.render_widget(&*app, f.area()))?;
        }
    }

    Ok(())
}
