//! Per-run game state. One `GameSession` is created when a mode is entered and dropped
//! when it is left or restarted; only the live mode controller mutates it.

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::catalog::Catalog;
use crate::domain::{Difficulty, MapKind, ModeId};

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct RegionProgress {
    pub region: String,
    pub color: String,
    pub found: usize,
    pub total: usize,
}

/// Found vs total per region (continent or state region) for celebratory feedback.
#[derive(Clone, Debug, Default)]
pub struct RegionTracker {
    regions: BTreeMap<String, RegionProgress>,
    completed: BTreeSet<String>,
}

impl RegionTracker {
    pub fn for_pool<'a>(catalog: &Catalog, kind: MapKind, ids: impl IntoIterator<Item = &'a String>) -> Self {
        let mut t = RegionTracker::default();
        for id in ids {
            if let Some(e) = catalog.entity(kind, id) {
                t.regions
                    .entry(e.region.to_string())
                    .or_insert_with(|| RegionProgress {
                        region: e.region.to_string(),
                        color: e.color.to_string(),
                        found: 0,
                        total: 0,
                    })
                    .total += 1;
            }
        }
        t
    }

    /// Count one more found entity in `region`. Returns the region name the first time
    /// it becomes complete.
    pub fn record(&mut self, region: &str) -> Option<String> {
        let p = self.regions.get_mut(region)?;
        p.found = (p.found + 1).min(p.total);
        if p.found == p.total && self.completed.insert(region.to_string()) {
            return Some(region.to_string());
        }
        None
    }

    pub fn progress(&self) -> Vec<RegionProgress> {
        self.regions.values().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct GameSession {
    pub mode: ModeId,
    pub difficulty: Option<Difficulty>,
    /// Identifiers credited to the player.
    pub found: HashSet<String>,
    /// Identifiers shown without credit (skips, misses, give up).
    pub shown: HashSet<String>,
    pub queue: VecDeque<String>,
    pub game_over: bool,
    pub correct: u32,
    pub incorrect: u32,
    pub skipped: u32,
    pub streak: u32,
    pub best_streak: u32,
    pub regions: RegionTracker,
    /// Set once the run has been handed off for persistence.
    pub saved: bool,
    started: Instant,
    frozen: Option<Duration>,
}

impl GameSession {
    pub fn new(mode: ModeId, difficulty: Option<Difficulty>) -> Self {
        Self {
            mode,
            difficulty,
            found: HashSet::new(),
            shown: HashSet::new(),
            queue: VecDeque::new(),
            game_over: false,
            correct: 0,
            incorrect: 0,
            skipped: 0,
            streak: 0,
            best_streak: 0,
            regions: RegionTracker::default(),
            saved: false,
            started: Instant::now(),
            frozen: None,
        }
    }

    pub fn is_hard(&self) -> bool {
        self.difficulty == Some(Difficulty::Hard)
    }

    /// Already credited or already shown.
    pub fn is_known(&self, id: &str) -> bool {
        self.found.contains(id) || self.shown.contains(id)
    }

    pub fn hit_streak(&mut self) {
        self.correct += 1;
        self.streak += 1;
        self.best_streak = self.best_streak.max(self.streak);
    }

    pub fn break_streak(&mut self) {
        self.incorrect += 1;
        self.streak = 0;
    }

    /// End the run and freeze the stopwatch. Later calls keep the first frozen value.
    pub fn finish(&mut self) {
        if !self.game_over {
            self.game_over = true;
            self.frozen = Some(self.started.elapsed());
        }
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.frozen.unwrap_or_else(|| self.started.elapsed()).as_secs()
    }

    /// A run counts as in flight once the player has done anything.
    pub fn has_progress(&self) -> bool {
        self.correct + self.incorrect + self.skipped > 0 || !self.found.is_empty()
    }

    #[cfg(test)]
    pub fn backdate(&mut self, by: Duration) {
        if let Some(t) = self.started.checked_sub(by) {
            self.started = t;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopwatch_freezes_on_finish() {
        let mut s = GameSession::new(ModeId::WorldType, None);
        s.backdate(Duration::from_secs(42));
        assert_eq!(s.elapsed_secs(), 42);
        s.finish();
        s.backdate(Duration::from_secs(100));
        assert_eq!(s.elapsed_secs(), 42);
    }

    #[test]
    fn streak_bookkeeping() {
        let mut s = GameSession::new(ModeId::WorldFlagsGame, Some(Difficulty::Easy));
        s.hit_streak();
        s.hit_streak();
        s.break_streak();
        s.hit_streak();
        assert_eq!((s.streak, s.best_streak, s.correct, s.incorrect), (1, 2, 3, 1));
    }

    #[test]
    fn region_completion_fires_once() {
        let cat = Catalog::builtin();
        let ids = vec!["188".to_string(), "591".to_string()];
        let mut t = RegionTracker::for_pool(&cat, MapKind::World, &ids);
        assert_eq!(t.record("Central America"), None);
        assert_eq!(t.record("Central America"), Some("Central America".to_string()));
        assert_eq!(t.record("Central America"), None);
        assert_eq!(t.record("Atlantis"), None);
        assert_eq!(t.progress()[0].found, 2);
    }
}
