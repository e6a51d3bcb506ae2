use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use typeblock::app::{App, Control};
use typeblock::config::Config;
use typeblock::controller::Status;
use typeblock::runtime::{FixedTicker, Runner, TestEventSource, TrainerEvent};
use typeblock::source::{SourceRegistry, TextSource};

fn app_with_text(text: &str, duration_secs: u64) -> App {
    let mut sources = SourceRegistry::default();
    sources.insert_front(TextSource {
        id: "inline".into(),
        name: "inline.txt".into(),
        language: "txt".into(),
        content: text.into(),
    });
    let config = Config {
        duration_secs,
        ..Config::default()
    };
    App::new(config, sources)
}

fn press(c: char) -> TrainerEvent {
    TrainerEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

// Headless integration using the runtime + App without a TTY
#[test]
fn headless_typing_flow_completes() {
    let mut app = app_with_text("hi", 60);

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );

    tx.send(press('h')).unwrap();
    tx.send(press('i')).unwrap();

    for _ in 0..100u32 {
        app.handle_event(runner.step(), Instant::now());
        if app.controller.session().is_finished() {
            break;
        }
    }

    assert_eq!(app.controller.status(), &Status::Completed);
    assert_eq!(app.stats.progress, 100.0);
    assert_eq!(app.stats.accuracy, 100.0);
    assert!(app.stats.wpm > 0);
}

#[test]
fn headless_timed_session_finishes_by_time() {
    let mut app = app_with_text("hello world", 1);

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(10)),
    );
    tx.send(press('h')).unwrap();

    // up to ~3s of ticks
    for _ in 0..300u32 {
        app.handle_event(runner.step(), Instant::now());
        if app.controller.session().is_finished() {
            break;
        }
    }

    assert_eq!(app.controller.status(), &Status::TimeUp);
    assert_eq!(app.stats.remaining_display_secs(), 0);
    assert!(app.stats.progress < 100.0);
}

#[test]
fn headless_events_apply_in_order() {
    let mut app = app_with_text("abc", 60);

    // long interval so no tick lands between the queued keys
    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_secs(1)),
    );
    for ev in [
        press('a'),
        press('x'),
        TrainerEvent::Key(KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE)),
        press('b'),
    ] {
        tx.send(ev).unwrap();
    }

    for _ in 0..4u32 {
        assert_eq!(
            app.handle_event(runner.step(), Instant::now()),
            Control::Continue
        );
    }

    assert_eq!(app.input, "ab");
    assert_eq!(app.stats.correct_count, 2);
}

#[test]
fn headless_steady_typing_cannot_outrun_the_timer() {
    let mut app = app_with_text(&"a".repeat(200), 1);

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(TestEventSource::new(rx), FixedTicker::from_millis(120));

    // a key every 50ms for 2.4s, faster than the 120ms tick
    let typist = std::thread::spawn(move || {
        for _ in 0..48u32 {
            if tx.send(press('a')).is_err() {
                break;
            }
            std::thread::sleep(Duration::from_millis(50));
        }
    });

    let started = Instant::now();
    while started.elapsed() < Duration::from_secs(4) {
        app.handle_event(runner.step(), Instant::now());
        if app.controller.session().is_finished() {
            break;
        }
    }
    drop(runner);
    typist.join().unwrap();

    assert_eq!(app.controller.status(), &Status::TimeUp);
    assert_eq!(app.stats.remaining_display_secs(), 0);
    // about 20 keys fit in one second; nothing typed after expiry counts
    assert!(app.input.len() <= 25, "typed {} chars", app.input.len());
}

#[test]
fn headless_focus_loss_freezes_clock() {
    let mut app = app_with_text("hello world", 1);
    let t0 = Instant::now();

    app.handle_event(press('h'), t0);
    app.handle_event(TrainerEvent::FocusLost, t0 + Duration::from_millis(200));

    // ticks while hidden never expire the session
    app.handle_event(TrainerEvent::Tick, t0 + Duration::from_secs(5));
    assert!(!app.controller.session().is_finished());

    app.handle_event(TrainerEvent::FocusGained, t0 + Duration::from_secs(10));
    app.handle_event(TrainerEvent::Tick, t0 + Duration::from_millis(10_500));
    assert!(!app.controller.session().is_finished());

    app.handle_event(TrainerEvent::Tick, t0 + Duration::from_millis(10_800));
    assert_eq!(app.controller.status(), &Status::TimeUp);
}
