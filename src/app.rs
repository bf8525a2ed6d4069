use std::time::Duration;

use crossterm::event::KeyEvent;

use crate::clock::{Clock, SystemClock};
use crate::engine::Engine;
use crate::input::{map_key, InputAction};
use crate::runtime::GameEvent;
use crate::session::GamePhase;

/// Whether the loop should keep going after an event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Everything the terminal front end shows: the engine plus a couple of
/// display-only values.
pub struct App<C: Clock = SystemClock> {
    pub engine: Engine<C>,
    /// Last value seen from the high-score service
    pub world_best: Option<u64>,
    /// Best score of this process, never persisted
    pub personal_best: u32,
}

impl<C: Clock> App<C> {
    pub fn new(engine: Engine<C>) -> Self {
        Self {
            engine,
            world_best: None,
            personal_best: 0,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.engine.phase()
    }

    pub fn handle_event(&mut self, event: GameEvent) -> Flow {
        let flow = match event {
            GameEvent::Key(key) => self.on_key(key),
            GameEvent::Tick => {
                self.engine.tick();
                Flow::Continue
            }
            GameEvent::HighScore(best) => {
                self.world_best = Some(best);
                Flow::Continue
            }
            GameEvent::Resize => Flow::Continue,
        };
        self.personal_best = self.personal_best.max(self.engine.session().score);
        flow
    }

    fn on_key(&mut self, key: KeyEvent) -> Flow {
        match map_key(key, self.phase()) {
            InputAction::Hit(c) => {
                // a job may have come due since the last tick
                self.engine.tick();
                if self.phase() == GamePhase::Playing {
                    self.engine.check_hit(c);
                }
            }
            InputAction::Start => self.engine.start_game(),
            InputAction::Reset => self.engine.reset_game(),
            InputAction::Quit => {
                if self.phase() == GamePhase::Playing {
                    self.engine.reset_game();
                }
                return Flow::Quit;
            }
            InputAction::Ignore => {}
        }
        Flow::Continue
    }

    /// How long the loop may block before a scheduled job needs running
    pub fn time_to_next_job(&mut self) -> Option<Duration> {
        let now = self.engine.now();
        self.engine
            .next_due()
            .map(|due| Duration::from_millis(due.saturating_sub(now)))
    }
}
