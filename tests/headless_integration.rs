use std::time::Duration;

use assert_matches::assert_matches;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use whackavo::app::{App, Flow};
use whackavo::clock::ManualClock;
use whackavo::engine::{Engine, ScoreReporter};
use whackavo::runtime::{FixedTicker, GameEvent, Runner, TestEventSource};
use whackavo::session::{DifficultyCurve, GamePhase};
use whackavo::spawner::Spawner;

struct Collect(std::sync::mpsc::Sender<u32>);

impl ScoreReporter for Collect {
    fn report(&mut self, score: u32) {
        let _ = self.0.send(score);
    }
}

fn key(code: KeyCode) -> GameEvent {
    GameEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn headless_app(clock: &ManualClock) -> (App<ManualClock>, std::sync::mpsc::Receiver<u32>) {
    let (tx, rx) = std::sync::mpsc::channel();
    let engine = Engine::new(
        DifficultyCurve::default(),
        clock.clone(),
        Spawner::seeded(42),
        Box::new(Collect(tx)),
    );
    (App::new(engine), rx)
}

// Plays a round through Runner/TestEventSource: whack every avocado that
// shows up for a while, then let one sink.
#[test]
fn headless_round_hits_then_times_out() {
    let clock = ManualClock::new(10_000);
    let (mut app, scores) = headless_app(&clock);

    let (es, tx) = TestEventSource::new();
    let runner = Runner::new(es, FixedTicker::new(Duration::from_millis(1)));

    tx.send(key(KeyCode::Enter)).unwrap();
    assert_eq!(app.handle_event(runner.step()), Flow::Continue);
    assert_eq!(app.phase(), GamePhase::Playing);

    let mut hits = 0;
    while hits < 6 {
        // jump straight to the next job
        let wait = app.time_to_next_job().expect("a spawn is always armed");
        clock.advance(wait.as_millis() as u64);
        assert_matches!(runner.step(), GameEvent::Tick);
        app.handle_event(GameEvent::Tick);

        let label = app
            .engine
            .session()
            .active_targets
            .iter()
            .find(|t| t.visible)
            .map(|t| t.label);
        if let Some(label) = label {
            tx.send(key(KeyCode::Char(label.to_ascii_lowercase()))).unwrap();
            app.handle_event(runner.step());
            hits += 1;
        }
    }
    assert_eq!(app.engine.session().score, 6);
    assert_eq!(app.engine.session().spawn_interval, 1400);

    // stop typing: the next avocado sinks and ends the round
    for _ in 0..10 {
        if app.phase() == GamePhase::GameOver {
            break;
        }
        let wait = app.time_to_next_job().unwrap_or_default();
        clock.advance(wait.as_millis() as u64);
        app.handle_event(runner.step());
    }

    assert_eq!(app.phase(), GamePhase::GameOver);
    assert_eq!(scores.try_recv(), Ok(6));
    assert!(scores.try_recv().is_err());
    assert_eq!(app.personal_best, 6);
    assert_eq!(app.engine.pending_jobs(), 0);
}

#[test]
fn headless_wrong_key_then_restart() {
    let clock = ManualClock::new(0);
    let (mut app, scores) = headless_app(&clock);

    app.handle_event(key(KeyCode::Enter));
    app.engine.spawn_target(4, 'K');
    app.handle_event(key(KeyCode::Char('j')));
    assert_eq!(app.phase(), GamePhase::GameOver);
    assert_eq!(scores.try_recv(), Ok(0));

    // a stale expiry from the last round must not touch the new one
    app.handle_event(key(KeyCode::Enter));
    assert_eq!(app.phase(), GamePhase::Playing);
    clock.advance(5_000);
    app.handle_event(GameEvent::Tick);
    assert_eq!(app.phase(), GamePhase::Playing);
    assert_eq!(app.engine.session().active_targets.len(), 1);
}

#[test]
fn headless_high_score_events_reach_the_app() {
    let clock = ManualClock::new(0);
    let (mut app, _) = headless_app(&clock);

    let (es, _tx) = TestEventSource::new();
    let runner = Runner::new(es, FixedTicker::new(Duration::from_millis(5)));
    runner.sender().send(GameEvent::HighScore(120)).unwrap();

    app.handle_event(runner.step());
    assert_eq!(app.world_best, Some(120));
}
