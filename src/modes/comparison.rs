//! "Which is bigger?" streak modes over population or area.

use serde_json::json;

use super::{miss_outcome, shuffled, Action, Card, Feedback, MissOutcome, ModeContext, ModeController, Prompt, RunResult};
use crate::catalog::{Catalog, Metric};
use crate::domain::ModeId;
use crate::error::GameError;
use crate::session::GameSession;

pub struct Comparison {
    metric: Metric,
    pairs: Vec<(String, String)>,
    index: usize,
    /// Card ruled out by a forgiven miss on the current pair.
    disabled: Option<usize>,
}

impl Comparison {
    pub fn new(mode: ModeId) -> Self {
        let metric = if mode == ModeId::WorldAreaGame { Metric::Area } else { Metric::Population };
        Self { metric, pairs: Vec::new(), index: 0, disabled: None }
    }

    /// Index (0 = left, 1 = right) of the card with the larger figure. Ties favour the left.
    fn winner(&self, catalog: &Catalog, pair: &(String, String)) -> usize {
        if catalog.metric(&pair.0, self.metric) >= catalog.metric(&pair.1, self.metric) {
            0
        } else {
            1
        }
    }

    fn advance(&mut self, session: &mut GameSession) {
        self.index += 1;
        self.disabled = None;
        if self.index >= self.pairs.len() {
            session.finish();
        }
    }

    fn card(&self, catalog: &Catalog, id: &str, slot: usize, show_value: bool) -> Card {
        Card {
            label: catalog.country(id).map(|c| c.name.clone()).unwrap_or_else(|| id.to_string()),
            flag: catalog.flag_url(id),
            value: show_value.then(|| catalog.metric(id, self.metric)),
            disabled: self.disabled == Some(slot),
        }
    }
}

impl ModeController for Comparison {
    fn start(&mut self, cx: &mut ModeContext<'_>) -> Result<(), GameError> {
        let ids: Vec<String> = cx
            .catalog
            .countries()
            .filter(|c| cx.catalog.metric(&c.id, self.metric) > 0)
            .map(|c| c.id.clone())
            .collect();
        let ids = shuffled(cx.rng, ids);
        self.pairs = ids.chunks_exact(2).map(|p| (p[0].clone(), p[1].clone())).collect();
        if self.pairs.is_empty() {
            return Err(GameError::EmptyCatalog("comparison pairs"));
        }
        Ok(())
    }

    fn handle(&mut self, cx: &mut ModeContext<'_>, action: Action) -> Feedback {
        if cx.session.game_over {
            return Feedback::Ignored;
        }
        match action {
            Action::Pick { index } if index < 2 && self.disabled != Some(index) => {
                let Some(pair) = self.pairs.get(self.index).cloned() else {
                    return Feedback::Ignored;
                };
                let win = self.winner(cx.catalog, &pair);
                let win_id = if win == 0 { pair.0 } else { pair.1 };
                let answer = cx.name_of(&win_id);
                if index == win {
                    cx.session.hit_streak();
                    self.advance(cx.session);
                    return Feedback::Correct { id: win_id, name: answer, region_completed: None };
                }
                match miss_outcome(cx.session.difficulty, self.disabled.is_some()) {
                    MissOutcome::Forgiven => {
                        self.disabled = Some(index);
                        Feedback::Forgiven { disabled: index }
                    }
                    MissOutcome::Missed => {
                        cx.session.break_streak();
                        self.advance(cx.session);
                        Feedback::Missed { answer }
                    }
                    MissOutcome::RunOver => {
                        cx.session.break_streak();
                        cx.session.finish();
                        Feedback::RunOver { answer }
                    }
                }
            }
            Action::GiveUp => {
                cx.session.finish();
                Feedback::GaveUp { revealed: Vec::new() }
            }
            _ => Feedback::Ignored,
        }
    }

    fn prompt(&self, catalog: &Catalog, session: &GameSession) -> Prompt {
        match self.pairs.get(self.index) {
            // A lost run keeps the deciding pair on screen with its figures.
            Some((a, b)) => Prompt::Compare {
                metric: self.metric,
                left: self.card(catalog, a, 0, session.game_over),
                right: self.card(catalog, b, 1, session.game_over),
                streak: session.streak,
                best_streak: session.best_streak,
            },
            None => Prompt::Finished,
        }
    }

    fn result(&self, session: &GameSession) -> RunResult {
        RunResult {
            score: session.best_streak,
            total: session.correct + session.incorrect,
            extra: Some(json!({ "pairs": self.pairs.len() })),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::super::testkit::Rig;
    use super::*;
    use crate::domain::Difficulty;

    fn started(mode: ModeId, d: Difficulty) -> (Rig, Comparison) {
        let mut rig = Rig::new(mode, Some(d));
        let mut ctl = Comparison::new(mode);
        ctl.start(&mut rig.cx()).unwrap();
        (rig, ctl)
    }

    fn right(rig: &Rig, ctl: &Comparison) -> usize {
        ctl.winner(&rig.catalog, &ctl.pairs[ctl.index])
    }

    #[test]
    fn pairs_are_disjoint() {
        let (rig, ctl) = started(ModeId::WorldPopulation, Difficulty::Easy);
        let mut seen = HashSet::new();
        for (a, b) in &ctl.pairs {
            assert!(seen.insert(a.clone()));
            assert!(seen.insert(b.clone()));
        }
        assert_eq!(ctl.pairs.len(), rig.catalog.country_count() / 2);
    }

    #[test]
    fn ties_favour_the_left_card() {
        let cat = Catalog::builtin();
        let ctl = Comparison::new(ModeId::WorldPopulation);
        // India and China share the same population label.
        assert_eq!(ctl.winner(&cat, &("356".into(), "156".into())), 0);
        assert_eq!(ctl.winner(&cat, &("156".into(), "356".into())), 0);
        let area = Comparison::new(ModeId::WorldAreaGame);
        assert_eq!(area.winner(&cat, &("442".into(), "124".into())), 1);
    }

    #[test]
    fn values_stay_hidden_until_the_run_ends() {
        let (mut rig, mut ctl) = started(ModeId::WorldAreaGame, Difficulty::Hard);
        let Prompt::Compare { left, .. } = ctl.prompt(&rig.catalog, &rig.session) else {
            panic!("expected a pair");
        };
        assert!(left.value.is_none());
        let wrong = 1 - right(&rig, &ctl);
        assert!(matches!(ctl.handle(&mut rig.cx(), Action::Pick { index: wrong }), Feedback::RunOver { .. }));
        let Prompt::Compare { left, right, .. } = ctl.prompt(&rig.catalog, &rig.session) else {
            panic!("expected the deciding pair");
        };
        assert!(left.value.is_some() && right.value.is_some());
    }

    #[test]
    fn streak_counts_and_learning_never_ends() {
        let (mut rig, mut ctl) = started(ModeId::WorldPopulation, Difficulty::Learning);
        for _ in 0..3 {
            let at = right(&rig, &ctl);
            ctl.handle(&mut rig.cx(), Action::Pick { index: at });
        }
        assert_eq!(rig.session.streak, 3);
        let wrong = 1 - right(&rig, &ctl);
        assert!(matches!(ctl.handle(&mut rig.cx(), Action::Pick { index: wrong }), Feedback::Forgiven { .. }));
        let at = right(&rig, &ctl);
        assert!(matches!(ctl.handle(&mut rig.cx(), Action::Pick { index: at }), Feedback::Correct { .. }));
        assert_eq!(rig.session.streak, 4);
        assert!(!rig.session.game_over);
        assert_eq!(ctl.handle(&mut rig.cx(), Action::Pick { index: 2 }), Feedback::Ignored);
    }

    #[test]
    fn forgiven_card_is_disabled_until_the_next_pair() {
        for d in [Difficulty::Easy, Difficulty::Learning] {
            let (mut rig, mut ctl) = started(ModeId::WorldPopulation, d);
            let wrong = 1 - right(&rig, &ctl);
            assert_eq!(ctl.handle(&mut rig.cx(), Action::Pick { index: wrong }), Feedback::Forgiven { disabled: wrong });
            assert_eq!(ctl.handle(&mut rig.cx(), Action::Pick { index: wrong }), Feedback::Ignored);
            assert!(!rig.session.game_over);
            assert_eq!(rig.session.incorrect, 0);
            let Prompt::Compare { left, right: other, .. } = ctl.prompt(&rig.catalog, &rig.session) else {
                panic!("expected a pair");
            };
            assert_eq!((left.disabled, other.disabled), (wrong == 0, wrong == 1));

            let at = right(&rig, &ctl);
            assert!(matches!(ctl.handle(&mut rig.cx(), Action::Pick { index: at }), Feedback::Correct { .. }));
            let Prompt::Compare { left, right: other, .. } = ctl.prompt(&rig.catalog, &rig.session) else {
                panic!("expected the next pair");
            };
            assert!(!left.disabled && !other.disabled);
        }
    }

    #[test]
    fn each_pair_forgives_once() {
        let (mut rig, mut ctl) = started(ModeId::WorldAreaGame, Difficulty::Learning);
        let wrong = 1 - right(&rig, &ctl);
        ctl.handle(&mut rig.cx(), Action::Pick { index: wrong });
        let at = right(&rig, &ctl);
        ctl.handle(&mut rig.cx(), Action::Pick { index: at });
        // A fresh pair forgives again.
        let wrong = 1 - right(&rig, &ctl);
        assert!(matches!(ctl.handle(&mut rig.cx(), Action::Pick { index: wrong }), Feedback::Forgiven { .. }));
    }
}
