use serde::{Deserialize, Serialize};

use crate::clock::Timestamp;

pub const SLOT_COUNT: u8 = 7;

/// Tuning for spawn pacing. Defaults are the shipped game's values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DifficultyCurve {
    pub initial_spawn_interval_ms: u64,
    pub min_spawn_interval_ms: u64,
    pub spawn_interval_step_ms: u64,
    pub hits_per_step: u32,
    pub target_lifetime_ms: u64,
}

impl Default for DifficultyCurve {
    fn default() -> Self {
        Self {
            initial_spawn_interval_ms: 1500,
            min_spawn_interval_ms: 500,
            spawn_interval_step_ms: 100,
            hits_per_step: 5,
            target_lifetime_ms: 3500,
        }
    }
}

impl DifficultyCurve {
    /// Curve with a spawn interval of at least 1 ms that never has to rise:
    /// the floor is raised to 1 and the start is raised to the floor.
    pub fn normalized(self) -> Self {
        let min_spawn_interval_ms = self.min_spawn_interval_ms.max(1);
        Self {
            min_spawn_interval_ms,
            initial_spawn_interval_ms: self.initial_spawn_interval_ms.max(min_spawn_interval_ms),
            hits_per_step: self.hits_per_step.max(1),
            ..self
        }
    }

    /// Spawn interval after `score` successful hits
    pub fn spawn_interval_for(&self, score: u32) -> u64 {
        let reductions = (score / self.hits_per_step.max(1)) as u64;
        self.initial_spawn_interval_ms
            .saturating_sub(reductions.saturating_mul(self.spawn_interval_step_ms))
            .max(self.min_spawn_interval_ms)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub u64);

/// An avocado popped up in one of the slots
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    pub id: TargetId,
    pub slot: u8,
    pub label: char,
    pub spawned_at: Timestamp,
    pub lifetime: u64,
    pub visible: bool,
}

impl Target {
    pub fn expires_at(&self) -> Timestamp {
        self.spawned_at + self.lifetime
    }

    /// Milliseconds of life left at `now`
    pub fn remaining(&self, now: Timestamp) -> u64 {
        self.expires_at().saturating_sub(now)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum GamePhase {
    Idle,
    Playing,
    GameOver,
}

/// All mutable state of one play-through.
///
/// Transitions here are pure bookkeeping; timers live in
/// [`crate::engine::Engine`].
#[derive(Clone, Debug, PartialEq)]
pub struct GameSession {
    pub is_playing: bool,
    pub is_game_over: bool,
    pub score: u32,
    pub start_time: Option<Timestamp>,
    pub current_time: Timestamp,
    pub difficulty_level: u32,
    pub spawn_interval: u64,
    pub target_lifetime: u64,
    pub active_targets: Vec<Target>,
    curve: DifficultyCurve,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(DifficultyCurve::default())
    }
}

impl GameSession {
    pub fn new(curve: DifficultyCurve) -> Self {
        let curve = curve.normalized();
        Self {
            is_playing: false,
            is_game_over: false,
            score: 0,
            start_time: None,
            current_time: 0,
            difficulty_level: 1,
            spawn_interval: curve.spawn_interval_for(0),
            target_lifetime: curve.target_lifetime_ms,
            active_targets: Vec::new(),
            curve,
        }
    }

    pub fn curve(&self) -> &DifficultyCurve {
        &self.curve
    }

    pub fn phase(&self) -> GamePhase {
        match (self.is_playing, self.is_game_over) {
            (true, _) => GamePhase::Playing,
            (false, true) => GamePhase::GameOver,
            (false, false) => GamePhase::Idle,
        }
    }

    pub fn start(&mut self, now: Timestamp) {
        *self = Self::new(self.curve);
        self.is_playing = true;
        self.start_time = Some(now);
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.curve);
    }

    /// Flip to game over. Returns true only on the transition into it.
    pub fn end(&mut self) -> bool {
        let entered = !self.is_game_over;
        self.is_playing = false;
        self.is_game_over = true;
        self.active_targets.clear();
        entered
    }

    pub fn update_timer(&mut self, now: Timestamp) {
        if self.is_playing {
            self.current_time = now;
        }
    }

    /// Milliseconds played so far, as of the last timer tick
    pub fn elapsed(&self) -> u64 {
        self.start_time
            .map(|start| self.current_time.saturating_sub(start))
            .unwrap_or(0)
    }

    pub fn add_target(&mut self, target: Target) {
        self.active_targets.push(target);
    }

    /// Drop the target with `id`; absent ids are a no-op
    pub fn remove_target(&mut self, id: TargetId) {
        self.active_targets.retain(|t| t.id != id);
    }

    pub fn target(&self, id: TargetId) -> Option<&Target> {
        self.active_targets.iter().find(|t| t.id == id)
    }

    pub fn occupied_slots(&self) -> Vec<u8> {
        self.active_targets
            .iter()
            .filter(|t| t.visible)
            .map(|t| t.slot)
            .collect()
    }

    /// First visible target whose label matches `key`, ignoring case
    pub fn find_match(&self, key: char) -> Option<TargetId> {
        self.active_targets
            .iter()
            .find(|t| t.visible && t.label.eq_ignore_ascii_case(&key))
            .map(|t| t.id)
    }

    /// Score a hit on `id`. Returns false if the target is already gone.
    pub fn register_hit(&mut self, id: TargetId) -> bool {
        if !self.take_visible(id) {
            return false;
        }
        self.score += 1;
        self.remove_target(id);
        self.update_difficulty();
        true
    }

    /// Expire `id` if it is still up. Returns true when the caller must end
    /// the game.
    pub fn expire(&mut self, id: TargetId) -> bool {
        if !self.take_visible(id) {
            return false;
        }
        self.remove_target(id);
        true
    }

    pub fn update_difficulty(&mut self) {
        self.spawn_interval = self.curve.spawn_interval_for(self.score);
        // a hit counter in practice; pacing is derived from score alone
        self.difficulty_level += 1;
    }

    // Clears `visible` so whichever of hit/expiry comes second sees nothing.
    fn take_visible(&mut self, id: TargetId) -> bool {
        match self
            .active_targets
            .iter_mut()
            .find(|t| t.id == id && t.visible)
        {
            Some(target) => {
                target.visible = false;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(id: u64, slot: u8, label: char) -> Target {
        Target {
            id: TargetId(id),
            slot,
            label,
            spawned_at: 0,
            lifetime: 3500,
            visible: true,
        }
    }

    #[test]
    fn new_session_is_idle_with_defaults() {
        let s = GameSession::default();

        assert_eq!(s.phase(), GamePhase::Idle);
        assert_eq!(s.score, 0);
        assert_eq!(s.start_time, None);
        assert_eq!(s.difficulty_level, 1);
        assert_eq!(s.spawn_interval, 1500);
        assert_eq!(s.target_lifetime, 3500);
        assert!(s.active_targets.is_empty());
    }

    #[test]
    fn spawn_interval_curve() {
        let curve = DifficultyCurve::default();

        assert_eq!(curve.spawn_interval_for(0), 1500);
        assert_eq!(curve.spawn_interval_for(4), 1500);
        assert_eq!(curve.spawn_interval_for(5), 1400);
        assert_eq!(curve.spawn_interval_for(49), 700);
        assert_eq!(curve.spawn_interval_for(50), 500);
        assert_eq!(curve.spawn_interval_for(10_000), 500);
    }

    #[test]
    fn start_records_time_and_clears_previous_run() {
        let mut s = GameSession::default();
        s.score = 12;
        s.add_target(target(1, 3, 'Q'));
        s.end();

        s.start(42);

        assert_eq!(s.phase(), GamePhase::Playing);
        assert_eq!(s.start_time, Some(42));
        assert_eq!(s.current_time, 0);
        assert_eq!(s.score, 0);
        assert!(!s.is_game_over);
    }

    #[test]
    fn start_below_floor_never_slows_down() {
        let curve = DifficultyCurve {
            initial_spawn_interval_ms: 300,
            ..DifficultyCurve::default()
        };
        let mut s = GameSession::new(curve);
        s.start(0);
        assert_eq!(s.spawn_interval, 500);

        let mut previous = s.spawn_interval;
        for id in 0..12 {
            s.add_target(target(id, 1, 'A'));
            assert!(s.register_hit(TargetId(id)));
            assert!(s.spawn_interval <= previous);
            previous = s.spawn_interval;
        }
    }

    #[test]
    fn zero_curve_is_raised_to_one_ms() {
        let curve = DifficultyCurve {
            initial_spawn_interval_ms: 0,
            min_spawn_interval_ms: 0,
            hits_per_step: 0,
            ..DifficultyCurve::default()
        }
        .normalized();

        assert_eq!(curve.min_spawn_interval_ms, 1);
        assert_eq!(curve.initial_spawn_interval_ms, 1);
        assert_eq!(curve.hits_per_step, 1);
        assert_eq!(GameSession::new(curve).spawn_interval, 1);
        assert_eq!(DifficultyCurve::default().normalized(), DifficultyCurve::default());
    }

    #[test]
    fn end_reports_transition_once() {
        let mut s = GameSession::default();
        s.start(0);
        s.add_target(target(1, 1, 'A'));

        assert!(s.end());
        assert!(!s.end());
        assert!(!s.is_playing);
        assert!(s.active_targets.is_empty());
    }

    #[test]
    fn timer_only_moves_while_playing() {
        let mut s = GameSession::default();
        s.update_timer(500);
        assert_eq!(s.current_time, 0);

        s.start(1_000);
        s.update_timer(1_700);
        assert_eq!(s.current_time, 1_700);
        assert_eq!(s.elapsed(), 700);
    }

    #[test]
    fn find_match_is_case_insensitive_and_takes_first() {
        let mut s = GameSession::default();
        s.add_target(target(1, 1, 'K'));
        s.add_target(target(2, 5, 'K'));

        assert_eq!(s.find_match('k'), Some(TargetId(1)));
        assert_eq!(s.find_match('K'), Some(TargetId(1)));
        assert_eq!(s.find_match('z'), None);
    }

    #[test]
    fn hit_then_expire_is_a_noop() {
        let mut s = GameSession::default();
        s.start(0);
        s.add_target(target(7, 2, 'B'));

        assert!(s.register_hit(TargetId(7)));
        assert!(!s.expire(TargetId(7)));
        assert!(!s.register_hit(TargetId(7)));
        assert_eq!(s.score, 1);
    }

    #[test]
    fn remove_absent_target_is_noop() {
        let mut s = GameSession::default();
        s.add_target(target(1, 1, 'A'));
        s.remove_target(TargetId(99));
        assert_eq!(s.active_targets.len(), 1);
    }

    #[test]
    fn difficulty_level_counts_every_hit() {
        let mut s = GameSession::default();
        s.start(0);
        for i in 0..3 {
            s.add_target(target(i, 1, 'A'));
            s.register_hit(TargetId(i));
        }
        assert_eq!(s.difficulty_level, 4);
        assert_eq!(s.spawn_interval, 1500);
        assert_eq!(s.target_lifetime, 3500);
    }
}
