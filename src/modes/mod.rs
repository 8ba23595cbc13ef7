//! Mode controllers. Each quiz variant is a small state machine behind `ModeController`;
//! `controller_for` is the registry from mode identifier to implementation.
//!
//! Controllers never own shared state: everything they touch arrives through
//! `ModeContext`, which the orchestrator builds fresh for every call.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::{Catalog, Metric};
use crate::config::Tunables;
use crate::domain::{ControllerKind, Difficulty, ModeId};
use crate::error::GameError;
use crate::map::MapView;
use crate::session::{GameSession, RegionProgress};
use crate::util::make_hint;

pub mod click;
pub mod comparison;
pub mod elimination;
pub mod free_text;
pub mod languages;
pub mod walk;
pub mod where_is;

/// Everything a controller may read or write during one call.
pub struct ModeContext<'a> {
    pub catalog: &'a Catalog,
    pub session: &'a mut GameSession,
    pub map: &'a mut MapView,
    pub rng: &'a mut StdRng,
    pub tunables: &'a Tunables,
}

impl ModeContext<'_> {
    /// Credit `id` to the player: found-set, map paint (with flash) and region counters.
    /// Returns the region name if this completed it.
    pub fn credit(&mut self, id: &str) -> Option<String> {
        if !self.session.found.insert(id.to_string()) {
            return None;
        }
        let kind = self.map.kind;
        let entity = self.catalog.entity(kind, id)?;
        let flag = self.flag_overlay(id);
        self.map.reveal(id, entity.color, flag, true);
        self.session.regions.record(entity.region)
    }

    /// Reveal `id` without credit.
    pub fn show(&mut self, id: &str) {
        if self.session.found.contains(id) {
            return;
        }
        self.session.shown.insert(id.to_string());
        if let Some(e) = self.catalog.entity(self.map.kind, id) {
            let flag = self.flag_overlay(id);
            self.map.reveal(id, e.color, flag, false);
        }
    }

    /// Flag texture for modes that paint flags over revealed countries.
    fn flag_overlay(&self, id: &str) -> Option<String> {
        match self.session.mode {
            ModeId::WorldFlags | ModeId::FlagClickGame => self.catalog.flag_url(id),
            _ => None,
        }
    }

    /// End the run and reveal every still-unknown identifier from `pool` west to east.
    pub fn give_up(&mut self, pool: impl IntoIterator<Item = String>) -> Feedback {
        let mut remaining: Vec<String> = pool
            .into_iter()
            .filter(|id| !self.session.is_known(id) && self.map.has_shape(id))
            .collect();
        remaining.dedup();
        self.map.order_west_to_east(&mut remaining);
        for id in &remaining {
            self.show(id);
        }
        self.session.finish();
        Feedback::GaveUp { revealed: remaining }
    }

    /// Name mask for an unfound shape; nothing on hard or once the shape is known.
    pub fn hint_for(&self, id: &str, capital: bool) -> Feedback {
        if self.session.is_hard() || self.session.game_over || self.session.is_known(id) {
            return Feedback::Ignored;
        }
        match self.catalog.entity(self.map.kind, id) {
            Some(e) => Feedback::Hint { mask: make_hint(if capital { e.capital } else { e.name }) },
            None => Feedback::Ignored,
        }
    }

    pub fn name_of(&self, id: &str) -> String {
        self.catalog
            .entity(self.map.kind, id)
            .map(|e| e.name.to_string())
            .unwrap_or_else(|| id.to_string())
    }
}

/// Player input routed to the live controller.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Guess { text: String },
    ClickShape { id: String },
    ClickPoint { lon: f64, lat: f64 },
    Pick { index: usize },
    Skip,
    GiveUp,
}

/// Outcome of one action. Input rejections are values here, never errors.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Feedback {
    Correct {
        id: String,
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        region_completed: Option<String>,
    },
    NotFound,
    Duplicate { name: String },
    Wrong {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        errors_left: Option<u32>,
    },
    /// Wrong pick forgiven; the option is now disabled.
    Forgiven { disabled: usize },
    /// Wrong pick in learning: answer shown, run goes on.
    Missed { answer: String },
    RunOver { answer: String },
    Skipped { answer: String },
    Points {
        points: u32,
        total: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        distance_km: Option<f64>,
    },
    GaveUp { revealed: Vec<String> },
    Hint { mask: String },
    MapUnavailable { message: String },
    Ignored,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ChoiceOption {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub disabled: bool,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Card {
    pub label: String,
    pub flag: Option<String>,
    /// Only filled once the pair has been answered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<u64>,
    /// Ruled out by a forgiven miss.
    pub disabled: bool,
}

/// What the player is currently asked. Never contains the answer of an open question.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Prompt {
    /// Name any entity of the pool.
    Open { found: usize, total: usize, regions: Vec<RegionProgress> },
    /// Answer about one highlighted target.
    Target {
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        image: Option<String>,
        position: usize,
        total: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        errors_left: Option<u32>,
    },
    Language { language: String, index: usize, count: usize, remaining: usize, found: usize, total: usize },
    Choice {
        #[serde(skip_serializing_if = "Option::is_none")]
        question: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        image: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        outline: Option<Vec<Vec<[f64; 2]>>>,
        options: Vec<ChoiceOption>,
        streak: u32,
        best_streak: u32,
    },
    Compare { metric: Metric, left: Card, right: Card, streak: u32, best_streak: u32 },
    FlagGrid { target: String, flags: Vec<ChoiceOption>, errors_left: Option<u32> },
    Where { round: usize, rounds: usize, target: String, score: u32 },
    Walk { start: String, end: String, placed: Vec<String>, steps: u32, min_steps: u32 },
    Finished,
}

/// Final figures handed to scoring and record persistence.
#[derive(Clone, Debug, PartialEq)]
pub struct RunResult {
    pub score: u32,
    pub total: u32,
    pub extra: Option<Value>,
}

pub trait ModeController: Send {
    /// Build the first prompt. The session is freshly created and the map freshly reset.
    fn start(&mut self, cx: &mut ModeContext<'_>) -> Result<(), GameError>;

    fn handle(&mut self, cx: &mut ModeContext<'_>, action: Action) -> Feedback;

    fn prompt(&self, catalog: &Catalog, session: &GameSession) -> Prompt;

    fn result(&self, session: &GameSession) -> RunResult;

    /// Release anything outside the session before the mode is left.
    fn teardown(&mut self, _cx: &mut ModeContext<'_>) {}
}

/// Registry: mode identifier -> controller.
pub fn controller_for(mode: ModeId) -> Box<dyn ModeController> {
    match mode.controller() {
        ControllerKind::FreeText => Box::new(free_text::FreeText::new(mode)),
        ControllerKind::LanguageGroup => Box::new(languages::LanguageGroups::default()),
        ControllerKind::Elimination => Box::new(elimination::Elimination::new(mode)),
        ControllerKind::Comparison => Box::new(comparison::Comparison::new(mode)),
        ControllerKind::Click => Box::new(click::Click::new(mode)),
        ControllerKind::ClickNearest => Box::new(where_is::WhereIs::default()),
        ControllerKind::Walk => Box::new(walk::Walk::default()),
    }
}

/// How a wrong pick in a streak mode is treated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MissOutcome {
    /// Option disabled, same prompt stays open.
    Forgiven,
    /// Answer revealed, streak reset, next prompt.
    Missed,
    RunOver,
}

/// One forgiven wrong pick per prompt outside `hard`; after that `learning` reveals and
/// moves on while everything else ends the run.
pub fn miss_outcome(difficulty: Option<Difficulty>, already_forgiven: bool) -> MissOutcome {
    match difficulty {
        Some(Difficulty::Hard) => MissOutcome::RunOver,
        _ if !already_forgiven => MissOutcome::Forgiven,
        Some(Difficulty::Learning) => MissOutcome::Missed,
        _ => MissOutcome::RunOver,
    }
}

/// Cumulative error budget of the flag grid; `None` is unlimited.
pub fn error_budget(difficulty: Option<Difficulty>) -> Option<u32> {
    match difficulty {
        Some(Difficulty::Hard) => Some(1),
        Some(Difficulty::Learning) => None,
        _ => Some(2),
    }
}

/// `distractors` ids sampled without replacement from `pool` (never `correct`), with the
/// correct id inserted at a uniformly random slot. Returns (ids, correct index).
pub fn choice_set(rng: &mut StdRng, correct: &str, pool: &[String], distractors: usize) -> (Vec<String>, usize) {
    let others: Vec<&String> = pool.iter().filter(|id| id.as_str() != correct).collect();
    let mut ids: Vec<String> = others.choose_multiple(rng, distractors).map(|s| s.to_string()).collect();
    let at = rng.gen_range(0..=ids.len());
    ids.insert(at, correct.to_string());
    (ids, at)
}

pub fn shuffled(rng: &mut StdRng, mut ids: Vec<String>) -> Vec<String> {
    ids.shuffle(rng);
    ids
}

#[cfg(test)]
pub(crate) mod testkit {
    use rand::SeedableRng;

    use super::*;
    use crate::domain::MapKind;

    /// Owned pieces behind a `ModeContext`, for driving controllers in tests.
    pub struct Rig {
        pub catalog: Catalog,
        pub session: GameSession,
        pub map: MapView,
        pub rng: StdRng,
        pub tunables: Tunables,
    }

    impl Rig {
        pub fn new(mode: ModeId, difficulty: Option<Difficulty>) -> Self {
            let catalog = Catalog::builtin();
            let map = MapView::schematic(mode.map_kind().unwrap_or(MapKind::World), &catalog);
            Self {
                catalog,
                session: GameSession::new(mode, difficulty),
                map,
                rng: StdRng::seed_from_u64(7),
                tunables: Tunables::default(),
            }
        }

        pub fn cx(&mut self) -> ModeContext<'_> {
            ModeContext {
                catalog: &self.catalog,
                session: &mut self.session,
                map: &mut self.map,
                rng: &mut self.rng,
                tunables: &self.tunables,
            }
        }

        pub fn started(mode: ModeId, difficulty: Option<Difficulty>) -> (Self, Box<dyn ModeController>) {
            let mut rig = Self::new(mode, difficulty);
            let mut ctl = controller_for(mode);
            ctl.start(&mut rig.cx()).unwrap();
            (rig, ctl)
        }

        pub fn act(&mut self, ctl: &mut Box<dyn ModeController>, action: Action) -> Feedback {
            ctl.handle(&mut self.cx(), action)
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn miss_policy_by_difficulty() {
        assert_eq!(miss_outcome(Some(Difficulty::Hard), false), MissOutcome::RunOver);
        assert_eq!(miss_outcome(Some(Difficulty::Easy), false), MissOutcome::Forgiven);
        assert_eq!(miss_outcome(Some(Difficulty::Easy), true), MissOutcome::RunOver);
        assert_eq!(miss_outcome(Some(Difficulty::Learning), false), MissOutcome::Forgiven);
        assert_eq!(miss_outcome(Some(Difficulty::Learning), true), MissOutcome::Missed);
    }

    #[test]
    fn choice_set_has_one_correct_and_distinct_distractors() {
        let mut rng = StdRng::seed_from_u64(1);
        let pool: Vec<String> = (0..30).map(|i| i.to_string()).collect();
        for _ in 0..50 {
            let (ids, at) = choice_set(&mut rng, "7", &pool, 5);
            assert_eq!(ids.len(), 6);
            assert_eq!(ids[at], "7");
            assert_eq!(ids.iter().filter(|i| *i == "7").count(), 1);
            let mut d = ids.clone();
            d.sort();
            d.dedup();
            assert_eq!(d.len(), 6);
        }
        let (ids, at) = choice_set(&mut rng, "a", &["a".to_string(), "b".to_string()], 5);
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[at], "a");
    }

    #[test]
    fn every_mode_has_a_controller() {
        for m in ModeId::ALL {
            let _ = controller_for(m);
        }
    }
}
