use std::collections::HashMap;

use tracing::{debug, info};

use crate::clock::{Clock, SystemClock, Timestamp};
use crate::scheduler::{Scheduler, TaskHandle};
use crate::session::{DifficultyCurve, GamePhase, GameSession, Target, TargetId};
use crate::spawner::Spawner;

/// Receives the final score whenever a session ends
pub trait ScoreReporter {
    fn report(&mut self, score: u32);
}

/// Reporter for offline play
#[derive(Debug, Default)]
pub struct NoopReporter;

impl ScoreReporter for NoopReporter {
    fn report(&mut self, _score: u32) {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Job {
    Spawn,
    Expire(TargetId),
}

#[derive(Clone, Copy, Debug)]
struct Scheduled {
    epoch: u64,
    job: Job,
}

/// Owns a [`GameSession`] and the timers that drive it.
///
/// Everything runs on the caller's thread: the owner polls [`Engine::tick`]
/// (or [`Engine::advance`]) and forwards key presses to
/// [`Engine::check_hit`]. Scheduled work is stamped with the session epoch
/// and re-checks `is_playing` when it fires, so callbacks that outlive their
/// session do nothing even if cancellation missed them.
pub struct Engine<C: Clock = SystemClock> {
    session: GameSession,
    clock: C,
    scheduler: Scheduler<Scheduled>,
    expiries: HashMap<TargetId, TaskHandle>,
    spawner: Spawner,
    reporter: Box<dyn ScoreReporter>,
    epoch: u64,
    next_target_id: u64,
}

impl Engine<SystemClock> {
    pub fn with_reporter(curve: DifficultyCurve, reporter: Box<dyn ScoreReporter>) -> Self {
        Self::new(curve, SystemClock::new(), Spawner::new(), reporter)
    }
}

impl<C: Clock> Engine<C> {
    pub fn new(
        curve: DifficultyCurve,
        clock: C,
        spawner: Spawner,
        reporter: Box<dyn ScoreReporter>,
    ) -> Self {
        Self {
            session: GameSession::new(curve),
            clock,
            scheduler: Scheduler::new(),
            expiries: HashMap::new(),
            spawner,
            reporter,
            epoch: 0,
            next_target_id: 0,
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn phase(&self) -> GamePhase {
        self.session.phase()
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn start_game(&mut self) {
        self.cancel_pending();
        let now = self.clock.now();
        self.session.start(now);
        self.arm_spawn(now);
        info!(start_time = now, "game started");
    }

    pub fn reset_game(&mut self) {
        self.cancel_pending();
        self.session.reset();
        debug!("game reset");
    }

    pub fn end_game(&mut self) {
        self.cancel_pending();
        if self.session.end() {
            let score = self.session.score;
            info!(score, "game over");
            self.reporter.report(score);
        }
    }

    pub fn update_timer(&mut self, now: Timestamp) {
        self.session.update_timer(now);
    }

    /// Put a target up in `slot` and arm its expiry check
    pub fn spawn_target(&mut self, slot: u8, label: char) -> TargetId {
        let now = self.clock.now();
        self.spawn_at(slot, label, now)
    }

    pub fn remove_target(&mut self, id: TargetId) {
        self.session.remove_target(id);
        if let Some(handle) = self.expiries.remove(&id) {
            self.scheduler.cancel(handle);
        }
    }

    pub fn update_difficulty(&mut self) {
        self.session.update_difficulty();
    }

    /// Try to whack the first visible target labelled `key`.
    ///
    /// A key that matches nothing ends the game.
    pub fn check_hit(&mut self, key: char) -> bool {
        match self.session.find_match(key) {
            Some(id) => {
                self.session.register_hit(id);
                if let Some(handle) = self.expiries.remove(&id) {
                    self.scheduler.cancel(handle);
                }
                debug!(
                    key = %key,
                    score = self.session.score,
                    spawn_interval = self.session.spawn_interval,
                    "hit"
                );
                true
            }
            None => {
                debug!(key = %key, "miss");
                self.end_game();
                false
            }
        }
    }

    /// Expiry path for `id`: an avocado left standing ends the game.
    /// Returns true if this call ended it.
    pub fn expire_target(&mut self, id: TargetId) -> bool {
        self.expiries.remove(&id);
        if !self.session.expire(id) {
            return false;
        }
        debug!(target_id = id.0, "avocado expired");
        self.end_game();
        true
    }

    /// Timer tick: refresh the game clock and run whatever came due
    pub fn tick(&mut self) -> usize {
        let now = self.clock.now();
        self.update_timer(now);
        self.advance(now)
    }

    /// Run every scheduled job due at or before `now`, in due order.
    /// Returns how many jobs actually did something.
    pub fn advance(&mut self, now: Timestamp) -> usize {
        let mut ran = 0;
        while let Some(due) = self.scheduler.pop_due(now) {
            let Scheduled { epoch, job } = due.payload;
            if epoch != self.epoch || !self.session.is_playing {
                continue;
            }
            match job {
                Job::Spawn => {
                    self.run_spawn(now);
                    ran += 1;
                }
                Job::Expire(id) => {
                    if self.expire_target(id) {
                        ran += 1;
                    }
                }
            }
        }
        ran
    }

    /// When the next scheduled job falls due
    pub fn next_due(&mut self) -> Option<Timestamp> {
        self.scheduler.next_due()
    }

    pub fn pending_jobs(&self) -> usize {
        self.scheduler.len()
    }

    fn spawn_at(&mut self, slot: u8, label: char, now: Timestamp) -> TargetId {
        let id = TargetId(self.next_target_id);
        self.next_target_id += 1;

        let lifetime = self.session.target_lifetime;
        self.session.add_target(Target {
            id,
            slot,
            label,
            spawned_at: now,
            lifetime,
            visible: true,
        });

        let handle = self.scheduler.schedule(
            now + lifetime,
            Scheduled {
                epoch: self.epoch,
                job: Job::Expire(id),
            },
        );
        self.expiries.insert(id, handle);
        debug!(target_id = id.0, slot, label = %label, "avocado spawned");
        id
    }

    fn run_spawn(&mut self, now: Timestamp) {
        let occupied = self.session.occupied_slots();
        match self.spawner.pick(&occupied) {
            Some((slot, label)) => {
                self.spawn_at(slot, label, now);
            }
            None => debug!("all slots taken, skipping spawn"),
        }
        self.arm_spawn(now);
    }

    // Reads the interval now, so a difficulty bump applies to the next spawn
    // but not to one already queued.
    fn arm_spawn(&mut self, now: Timestamp) {
        self.scheduler.schedule(
            now + self.session.spawn_interval,
            Scheduled {
                epoch: self.epoch,
                job: Job::Spawn,
            },
        );
    }

    fn cancel_pending(&mut self) {
        self.epoch += 1;
        self.scheduler.cancel_all();
        self.expiries.clear();
    }
}
