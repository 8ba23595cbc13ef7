//! Typed-answer modes. `Open` accepts any not-yet-found entity of the pool; `Flags` and
//! `Capitals` walk a shuffled queue of single targets.

use serde_json::json;
use tracing::debug;

use super::{shuffled, Action, Feedback, ModeContext, ModeController, Prompt, RunResult};
use crate::catalog::{Catalog, Lookup, Metric};
use crate::domain::{MapKind, ModeId};
use crate::error::GameError;
use crate::map::Mark;
use crate::session::{GameSession, RegionTracker};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Style {
    Open,
    Flags,
    Capitals,
}

pub struct FreeText {
    mode: ModeId,
    style: Style,
    kind: MapKind,
    lookup: Lookup,
    pool: Vec<String>,
    current: Option<String>,
    /// Wrong answers since the last correct one; skips don't clear them.
    wrong: u32,
}

impl FreeText {
    pub fn new(mode: ModeId) -> Self {
        let kind = mode.map_kind().unwrap_or(MapKind::World);
        let (style, lookup) = match mode {
            ModeId::WorldFlags => (Style::Flags, Lookup::CountryNames),
            ModeId::WorldCapitals => (Style::Capitals, Lookup::CountryCapitals),
            ModeId::BrCapitals | ModeId::UsCapitals => (Style::Open, Lookup::SubdivisionCapitals(kind)),
            ModeId::BrStates | ModeId::UsStates => (Style::Open, Lookup::SubdivisionNames(kind)),
            _ => (Style::Open, Lookup::CountryNames),
        };
        Self { mode, style, kind, lookup, pool: Vec::new(), current: None, wrong: 0 }
    }

    fn asks_capitals(&self) -> bool {
        matches!(self.lookup, Lookup::CountryCapitals | Lookup::SubdivisionCapitals(_))
    }

    /// Flags allow two wrong names in a row (one on hard), learning included.
    fn budget(&self, session: &GameSession) -> Option<u32> {
        match self.style {
            Style::Flags if session.is_hard() => Some(1),
            Style::Flags => Some(2),
            _ => None,
        }
    }

    fn advance(&mut self, cx: &mut ModeContext<'_>) {
        cx.map.clear_marks(Mark::Target);
        self.current = cx.session.queue.pop_front();
        match &self.current {
            Some(id) if self.style == Style::Capitals => cx.map.mark(id, Mark::Target),
            Some(_) => {}
            None => cx.session.finish(),
        }
    }

    fn guess_open(&mut self, cx: &mut ModeContext<'_>, text: &str) -> Feedback {
        let Some(id) = cx.catalog.resolve(self.lookup, text).map(str::to_string) else {
            return Feedback::NotFound;
        };
        if !self.pool.contains(&id) {
            return Feedback::Wrong { name: cx.name_of(&id), errors_left: None };
        }
        if cx.session.is_known(&id) {
            return Feedback::Duplicate { name: cx.name_of(&id) };
        }
        cx.session.correct += 1;
        let region_completed = cx.credit(&id);
        if cx.session.found.len() >= self.pool.len() {
            cx.session.finish();
        }
        Feedback::Correct { name: cx.name_of(&id), id, region_completed }
    }

    fn guess_target(&mut self, cx: &mut ModeContext<'_>, text: &str) -> Feedback {
        let Some(current) = self.current.clone() else {
            return Feedback::Ignored;
        };
        let Some(id) = cx.catalog.resolve(self.lookup, text).map(str::to_string) else {
            return Feedback::NotFound;
        };
        if id == current {
            cx.session.correct += 1;
            self.wrong = 0;
            let region_completed = cx.credit(&id);
            self.advance(cx);
            return Feedback::Correct { name: cx.name_of(&id), id, region_completed };
        }
        if self.style == Style::Flags && cx.session.is_known(&id) {
            return Feedback::Duplicate { name: cx.name_of(&id) };
        }
        cx.session.incorrect += 1;
        self.wrong += 1;
        match self.budget(cx.session) {
            Some(max) if self.wrong >= max => {
                cx.map.mark(&current, Mark::Missed);
                cx.show(&current);
                cx.session.finish();
                debug!(target: "game", mode = %self.mode, wrong = self.wrong, "Error budget exhausted");
                Feedback::RunOver { answer: cx.name_of(&current) }
            }
            budget => Feedback::Wrong { name: cx.name_of(&id), errors_left: budget.map(|m| m - self.wrong) },
        }
    }
}

impl ModeController for FreeText {
    fn start(&mut self, cx: &mut ModeContext<'_>) -> Result<(), GameError> {
        if !cx.map.is_ready() {
            return Err(GameError::MapUnavailable(format!("{:?} map is not loaded", self.kind)));
        }
        let ids = match self.mode {
            ModeId::TopPopulationMap => cx.catalog.top_by(Metric::Population, cx.tunables.top_n),
            ModeId::TopAreaMap => cx.catalog.top_by(Metric::Area, cx.tunables.top_n),
            _ => cx.catalog.entity_ids(self.kind),
        };
        self.pool = ids.into_iter().filter(|id| cx.map.has_shape(id)).collect();
        if self.pool.is_empty() {
            return Err(GameError::EmptyCatalog("free-text pool"));
        }
        cx.session.regions = RegionTracker::for_pool(cx.catalog, self.kind, &self.pool);
        if self.style != Style::Open {
            cx.session.queue = shuffled(cx.rng, self.pool.clone()).into();
            self.advance(cx);
        }
        Ok(())
    }

    fn handle(&mut self, cx: &mut ModeContext<'_>, action: Action) -> Feedback {
        if cx.session.game_over {
            return Feedback::Ignored;
        }
        match action {
            Action::Guess { text } if text.trim().is_empty() => Feedback::Ignored,
            Action::Guess { text } => match self.style {
                Style::Open => self.guess_open(cx, &text),
                _ => self.guess_target(cx, &text),
            },
            Action::Skip if self.style != Style::Open => {
                let Some(current) = self.current.clone() else {
                    return Feedback::Ignored;
                };
                cx.session.skipped += 1;
                cx.show(&current);
                self.advance(cx);
                Feedback::Skipped { answer: cx.name_of(&current) }
            }
            Action::GiveUp => {
                let pool: Vec<String> = match self.style {
                    Style::Open => self.pool.clone(),
                    _ => self.current.iter().cloned().chain(cx.session.queue.iter().cloned()).collect(),
                };
                self.current = None;
                cx.map.clear_marks(Mark::Target);
                cx.give_up(pool)
            }
            Action::ClickShape { id } => cx.hint_for(&id, self.asks_capitals()),
            _ => Feedback::Ignored,
        }
    }

    fn prompt(&self, catalog: &Catalog, session: &GameSession) -> Prompt {
        if session.game_over {
            return Prompt::Finished;
        }
        let position = session.found.len() + session.skipped as usize + 1;
        match (self.style, &self.current) {
            (Style::Open, _) => Prompt::Open {
                found: session.found.len(),
                total: self.pool.len(),
                regions: session.regions.progress(),
            },
            (Style::Flags, Some(id)) => Prompt::Target {
                label: None,
                image: catalog.flag_url(id),
                position,
                total: self.pool.len(),
                errors_left: self.budget(session).map(|m| m.saturating_sub(self.wrong)),
            },
            (Style::Capitals, Some(id)) => Prompt::Target {
                label: catalog.entity(self.kind, id).map(|e| e.name.to_string()),
                image: catalog.flag_url(id),
                position,
                total: self.pool.len(),
                errors_left: None,
            },
            (_, None) => Prompt::Finished,
        }
    }

    fn result(&self, session: &GameSession) -> RunResult {
        let extra = match self.style {
            Style::Open => None,
            _ => Some(json!({ "skipped": session.skipped, "incorrect": session.incorrect })),
        };
        RunResult { score: session.found.len() as u32, total: self.pool.len() as u32, extra }
    }

    fn teardown(&mut self, cx: &mut ModeContext<'_>) {
        cx.map.clear_marks(Mark::Target);
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::super::testkit::Rig;
    use super::*;
    use crate::domain::Difficulty;

    fn guess(text: &str) -> Action {
        Action::Guess { text: text.into() }
    }

    #[test]
    fn world_type_accepts_any_new_country_and_rejects_repeats() {
        let (mut rig, mut ctl) = Rig::started(ModeId::WorldType, Some(Difficulty::Easy));
        assert!(matches!(rig.act(&mut ctl, guess("brasil")), Feedback::Correct { ref id, .. } if id == "76"));
        assert!(matches!(rig.act(&mut ctl, guess("Brazil")), Feedback::Duplicate { .. }));
        assert_eq!(rig.act(&mut ctl, guess("Wakanda")), Feedback::NotFound);
        assert_eq!(rig.act(&mut ctl, guess("   ")), Feedback::Ignored);
        assert!(rig.map.is_revealed("76"));
        assert_eq!(rig.session.found.len(), 1);
    }

    #[test]
    fn naming_every_country_finishes_the_run() {
        let (mut rig, mut ctl) = Rig::started(ModeId::WorldType, None);
        let names: Vec<String> = rig.catalog.countries().map(|c| c.name.clone()).collect();
        let mut completed = Vec::new();
        for n in &names {
            if let Feedback::Correct { region_completed: Some(r), .. } = rig.act(&mut ctl, guess(n)) {
                completed.push(r);
            }
        }
        assert!(rig.session.game_over);
        assert_eq!(completed.len(), 7);
        let r = ctl.result(&rig.session);
        assert_eq!(r.score, r.total);
    }

    #[test]
    fn flags_map_hard_ends_on_first_wrong_name() {
        let (mut rig, mut ctl) = Rig::started(ModeId::WorldFlags, Some(Difficulty::Hard));
        let target = ctl_current(&rig);
        let wrong = rig.catalog.countries().find(|c| c.id != target).unwrap().name.clone();
        assert!(matches!(rig.act(&mut ctl, guess(&wrong)), Feedback::RunOver { .. }));
        assert!(rig.session.game_over);
        assert_eq!(rig.act(&mut ctl, guess(&wrong)), Feedback::Ignored);
    }

    #[test]
    fn flags_map_easy_allows_one_wrong_per_target() {
        let (mut rig, mut ctl) = Rig::started(ModeId::WorldFlags, Some(Difficulty::Easy));
        let target = ctl_current(&rig);
        let wrong = rig.catalog.countries().find(|c| c.id != target).unwrap().name.clone();
        assert!(matches!(rig.act(&mut ctl, guess(&wrong)), Feedback::Wrong { errors_left: Some(1), .. }));
        let name = rig.catalog.country(&target).unwrap().name.clone();
        assert!(matches!(rig.act(&mut ctl, guess(&name)), Feedback::Correct { .. }));
        assert!(!rig.session.game_over);
    }

    #[test]
    fn flags_map_skip_keeps_earlier_mistakes() {
        let (mut rig, mut ctl) = Rig::started(ModeId::WorldFlags, Some(Difficulty::Easy));
        let first = ctl_current(&rig);
        let wrong = unknown_other(&rig, &first);
        assert!(matches!(rig.act(&mut ctl, guess(&wrong)), Feedback::Wrong { errors_left: Some(1), .. }));
        assert!(matches!(rig.act(&mut ctl, Action::Skip), Feedback::Skipped { .. }));
        let Prompt::Target { errors_left, .. } = ctl.prompt(&rig.catalog, &rig.session) else {
            panic!("expected the next flag");
        };
        assert_eq!(errors_left, Some(1));
        let next = ctl.current.clone().unwrap();
        let wrong = unknown_other(&rig, &next);
        assert!(matches!(rig.act(&mut ctl, guess(&wrong)), Feedback::RunOver { .. }));
        assert!(rig.session.game_over);
    }

    #[test]
    fn flags_map_learning_still_ends_after_two_wrong_names() {
        let (mut rig, mut ctl) = Rig::started(ModeId::WorldFlags, Some(Difficulty::Learning));
        let target = ctl_current(&rig);
        let wrong = unknown_other(&rig, &target);
        assert!(matches!(rig.act(&mut ctl, guess(&wrong)), Feedback::Wrong { errors_left: Some(1), .. }));
        assert!(!rig.session.game_over);
        let wrong = rig
            .catalog
            .countries()
            .filter(|c| c.id != target && !rig.session.is_known(&c.id))
            .nth(1)
            .unwrap()
            .name
            .clone();
        assert!(matches!(rig.act(&mut ctl, guess(&wrong)), Feedback::RunOver { .. }));
        assert!(rig.session.game_over);
    }

    #[test]
    fn flags_map_correct_answer_clears_mistakes() {
        let (mut rig, mut ctl) = Rig::started(ModeId::WorldFlags, Some(Difficulty::Easy));
        let target = ctl_current(&rig);
        let wrong = unknown_other(&rig, &target);
        rig.act(&mut ctl, guess(&wrong));
        let name = rig.catalog.country(&target).unwrap().name.clone();
        assert!(matches!(rig.act(&mut ctl, guess(&name)), Feedback::Correct { .. }));
        let next = ctl.current.clone().unwrap();
        let wrong = unknown_other(&rig, &next);
        assert!(matches!(rig.act(&mut ctl, guess(&wrong)), Feedback::Wrong { errors_left: Some(1), .. }));
        assert!(!rig.session.game_over);
    }

    #[test]
    fn capitals_map_wrong_answers_never_end_and_skip_advances() {
        let (mut rig, mut ctl) = Rig::started(ModeId::WorldCapitals, Some(Difficulty::Hard));
        let target = ctl_current(&rig);
        assert_eq!(rig.map.mark_of(&target), Some(Mark::Target));
        let other = rig.catalog.countries().find(|c| c.id != target).unwrap().capital.clone();
        for _ in 0..5 {
            assert!(matches!(rig.act(&mut ctl, guess(&other)), Feedback::Wrong { errors_left: None, .. }));
        }
        assert!(matches!(rig.act(&mut ctl, Action::Skip), Feedback::Skipped { .. }));
        assert_eq!(rig.session.skipped, 1);
        assert!(rig.map.is_revealed(&target));
        assert!(!rig.session.found.contains(&target));
        assert!(!rig.session.game_over);
    }

    #[test]
    fn give_up_reveals_the_rest_west_to_east() {
        let (mut rig, mut ctl) = Rig::started(ModeId::WorldType, None);
        rig.act(&mut ctl, guess("Japan"));
        let Feedback::GaveUp { revealed } = rig.act(&mut ctl, Action::GiveUp) else {
            panic!("expected give up");
        };
        assert_eq!(revealed.len(), rig.catalog.country_count() - 1);
        assert!(!revealed.contains(&"392".to_string()));
        let xs: Vec<f64> = revealed.iter().map(|id| rig.map.shape(id).unwrap().bbox.unwrap().centre()[0]).collect();
        assert!(xs.windows(2).all(|w| w[0] <= w[1]));
        assert!(rig.session.game_over);
    }

    #[test]
    fn click_gives_a_hint_except_on_hard() {
        let (mut rig, mut ctl) = Rig::started(ModeId::BrCapitals, Some(Difficulty::Easy));
        assert_eq!(
            rig.act(&mut ctl, Action::ClickShape { id: "31".into() }),
            Feedback::Hint { mask: "B _ _ _  H _ _ _ _ _ _ _ _".into() }
        );
        assert!(matches!(rig.act(&mut ctl, guess("BH")), Feedback::Correct { ref id, .. } if id == "31"));
        assert_eq!(rig.act(&mut ctl, Action::ClickShape { id: "31".into() }), Feedback::Ignored);

        let (mut rig, mut ctl) = Rig::started(ModeId::UsStates, Some(Difficulty::Hard));
        assert_eq!(rig.act(&mut ctl, Action::ClickShape { id: "06".into() }), Feedback::Ignored);
    }

    #[test]
    fn top_map_only_counts_ranked_countries() {
        let (mut rig, mut ctl) = Rig::started(ModeId::TopAreaMap, None);
        assert!(matches!(rig.act(&mut ctl, guess("Canada")), Feedback::Correct { .. }));
        assert!(matches!(rig.act(&mut ctl, guess("Luxembourg")), Feedback::Wrong { .. }));
    }

    /// Name of some country that is neither `target` nor already found or shown.
    fn unknown_other(rig: &Rig, target: &str) -> String {
        rig.catalog
            .countries()
            .find(|c| c.id != target && !rig.session.is_known(&c.id))
            .unwrap()
            .name
            .clone()
    }

    /// Current target as seen through the map highlight or the queue head.
    fn ctl_current(rig: &Rig) -> String {
        // The queue was popped once at start; the target is the pool member missing from it.
        rig.catalog
            .entity_ids(MapKind::World)
            .into_iter()
            .find(|id| !rig.session.queue.contains(id))
            .unwrap()
    }
}
