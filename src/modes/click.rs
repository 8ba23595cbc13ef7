//! Click-the-named-thing modes: countries on the world map and flags in a grid.

use serde_json::json;

use super::{error_budget, shuffled, Action, ChoiceOption, Feedback, ModeContext, ModeController, Prompt, RunResult};
use crate::catalog::Catalog;
use crate::domain::{MapKind, ModeId};
use crate::error::GameError;
use crate::map::Mark;
use crate::session::{GameSession, RegionTracker};

pub struct Click {
    /// Flag grid instead of the map.
    grid: bool,
    pool: Vec<String>,
    current: Option<String>,
    /// Cumulative wrong clicks, counted against the grid's error budget.
    errors: u32,
}

impl Click {
    pub fn new(mode: ModeId) -> Self {
        Self { grid: mode == ModeId::FlagClickGame, pool: Vec::new(), current: None, errors: 0 }
    }

    fn advance(&mut self, cx: &mut ModeContext<'_>) {
        self.current = cx.session.queue.pop_front();
        if self.current.is_none() {
            cx.session.finish();
        }
    }

    fn clicked(&mut self, cx: &mut ModeContext<'_>, id: String) -> Feedback {
        let Some(target) = self.current.clone() else {
            return Feedback::Ignored;
        };
        if cx.session.is_known(&id) || !self.pool.contains(&id) {
            return Feedback::Ignored;
        }
        if id == target {
            cx.session.correct += 1;
            let region_completed = if self.grid {
                cx.session.found.insert(id.clone());
                None
            } else {
                cx.map.unmark(&id);
                cx.credit(&id)
            };
            self.advance(cx);
            return Feedback::Correct { name: cx.catalog_name(&id), id, region_completed };
        }
        cx.session.incorrect += 1;
        self.errors += 1;
        if !self.grid {
            return Feedback::Wrong { name: cx.catalog_name(&id), errors_left: None };
        }
        match error_budget(cx.session.difficulty) {
            Some(max) if self.errors >= max => {
                cx.session.finish();
                Feedback::RunOver { answer: cx.catalog_name(&target) }
            }
            budget => Feedback::Wrong { name: cx.catalog_name(&id), errors_left: budget.map(|m| m - self.errors) },
        }
    }
}

impl ModeContext<'_> {
    /// Country name regardless of which map is attached.
    fn catalog_name(&self, id: &str) -> String {
        self.catalog.country(id).map(|c| c.name.clone()).unwrap_or_else(|| id.to_string())
    }
}

impl ModeController for Click {
    fn start(&mut self, cx: &mut ModeContext<'_>) -> Result<(), GameError> {
        let ids: Vec<String> = cx.catalog.countries().map(|c| c.id.clone()).collect();
        if self.grid {
            let mut ids = shuffled(cx.rng, ids);
            ids.truncate(cx.tunables.flag_grid);
            self.pool = ids;
        } else {
            if !cx.map.is_ready() {
                return Err(GameError::MapUnavailable("world map is not loaded".into()));
            }
            self.pool = ids.into_iter().filter(|id| cx.map.has_shape(id)).collect();
            cx.session.regions = RegionTracker::for_pool(cx.catalog, MapKind::World, &self.pool);
        }
        if self.pool.is_empty() {
            return Err(GameError::EmptyCatalog("click pool"));
        }
        cx.session.queue = shuffled(cx.rng, self.pool.clone()).into();
        self.advance(cx);
        Ok(())
    }

    fn handle(&mut self, cx: &mut ModeContext<'_>, action: Action) -> Feedback {
        if cx.session.game_over {
            return Feedback::Ignored;
        }
        match action {
            Action::ClickShape { id } if !self.grid => self.clicked(cx, id),
            Action::ClickPoint { lon, lat } if !self.grid => match cx.map.shape_containing([lon, lat]) {
                Some(id) => {
                    let id = id.to_string();
                    self.clicked(cx, id)
                }
                None => Feedback::Ignored,
            },
            Action::Pick { index } if self.grid => match self.pool.get(index).cloned() {
                Some(id) => self.clicked(cx, id),
                None => Feedback::Ignored,
            },
            Action::Skip => {
                let Some(target) = self.current.clone() else {
                    return Feedback::Ignored;
                };
                cx.session.skipped += 1;
                if self.grid {
                    cx.session.shown.insert(target.clone());
                } else {
                    cx.map.mark(&target, Mark::Missed);
                    cx.show(&target);
                }
                self.advance(cx);
                Feedback::Skipped { answer: cx.catalog_name(&target) }
            }
            Action::GiveUp => {
                let rest: Vec<String> = self.current.take().into_iter().chain(cx.session.queue.drain(..)).collect();
                if self.grid {
                    cx.session.finish();
                    Feedback::GaveUp { revealed: rest }
                } else {
                    cx.give_up(rest)
                }
            }
            _ => Feedback::Ignored,
        }
    }

    fn prompt(&self, catalog: &Catalog, session: &GameSession) -> Prompt {
        let Some(target) = self.current.as_ref().filter(|_| !session.game_over) else {
            return Prompt::Finished;
        };
        let name = catalog.country(target).map(|c| c.name.clone()).unwrap_or_default();
        if self.grid {
            return Prompt::FlagGrid {
                target: name,
                flags: self
                    .pool
                    .iter()
                    .map(|id| ChoiceOption {
                        label: id.clone(),
                        image: catalog.flag_url(id),
                        disabled: session.is_known(id),
                    })
                    .collect(),
                errors_left: error_budget(session.difficulty).map(|m| m.saturating_sub(self.errors)),
            };
        }
        Prompt::Target {
            label: Some(name),
            image: None,
            position: (session.correct + session.skipped) as usize + 1,
            total: self.pool.len(),
            errors_left: None,
        }
    }

    fn result(&self, session: &GameSession) -> RunResult {
        RunResult {
            score: session.correct,
            total: self.pool.len() as u32,
            extra: Some(json!({ "incorrect": session.incorrect, "skipped": session.skipped })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testkit::Rig;
    use super::*;
    use crate::domain::Difficulty;

    fn started(mode: ModeId, d: Difficulty) -> (Rig, Click) {
        let mut rig = Rig::new(mode, Some(d));
        let mut ctl = Click::new(mode);
        ctl.start(&mut rig.cx()).unwrap();
        (rig, ctl)
    }

    #[test]
    fn clicking_the_target_credits_and_advances() {
        let (mut rig, mut ctl) = started(ModeId::WorldClick, Difficulty::Easy);
        let target = ctl.current.clone().unwrap();
        let other = ctl.pool.iter().find(|id| **id != target).unwrap().clone();
        assert!(matches!(
            ctl.handle(&mut rig.cx(), Action::ClickShape { id: other }),
            Feedback::Wrong { errors_left: None, .. }
        ));
        let c = rig.map.shape(&target).unwrap().centroid.unwrap();
        assert!(matches!(
            ctl.handle(&mut rig.cx(), Action::ClickPoint { lon: c[0], lat: c[1] }),
            Feedback::Correct { ref id, .. } if *id == target
        ));
        assert!(rig.map.is_revealed(&target));
        assert_ne!(ctl.current.as_ref(), Some(&target));
        // Found shapes are inert.
        assert_eq!(ctl.handle(&mut rig.cx(), Action::ClickShape { id: target }), Feedback::Ignored);
    }

    #[test]
    fn skip_reveals_target_without_credit() {
        let (mut rig, mut ctl) = started(ModeId::WorldClick, Difficulty::Easy);
        let target = ctl.current.clone().unwrap();
        assert!(matches!(ctl.handle(&mut rig.cx(), Action::Skip), Feedback::Skipped { .. }));
        assert!(rig.map.is_revealed(&target));
        assert_eq!(rig.map.mark_of(&target), Some(Mark::Missed));
        assert_eq!(ctl.result(&rig.session).score, 0);
    }

    #[test]
    fn flag_grid_budget_is_cumulative() {
        let (mut rig, mut ctl) = started(ModeId::FlagClickGame, Difficulty::Easy);
        assert_eq!(ctl.pool.len(), 30);
        let wrong_index = |ctl: &Click| {
            let t = ctl.current.clone().unwrap();
            ctl.pool.iter().position(|id| *id != t).unwrap()
        };
        let at = wrong_index(&ctl);
        assert!(matches!(ctl.handle(&mut rig.cx(), Action::Pick { index: at }), Feedback::Wrong { errors_left: Some(1), .. }));
        let right = ctl.pool.iter().position(|id| Some(id) == ctl.current.as_ref()).unwrap();
        assert!(matches!(ctl.handle(&mut rig.cx(), Action::Pick { index: right }), Feedback::Correct { .. }));
        let at = (0..ctl.pool.len())
            .find(|i| Some(&ctl.pool[*i]) != ctl.current.as_ref() && !rig.session.is_known(&ctl.pool[*i]))
            .unwrap();
        assert!(matches!(ctl.handle(&mut rig.cx(), Action::Pick { index: at }), Feedback::RunOver { .. }));
        assert!(rig.session.game_over);
        assert_eq!(ctl.result(&rig.session).score, 1);
    }

    #[test]
    fn flag_grid_disables_found_flags() {
        let (mut rig, mut ctl) = started(ModeId::FlagClickGame, Difficulty::Learning);
        let right = ctl.pool.iter().position(|id| Some(id) == ctl.current.as_ref()).unwrap();
        ctl.handle(&mut rig.cx(), Action::Pick { index: right });
        let Prompt::FlagGrid { flags, errors_left, .. } = ctl.prompt(&rig.catalog, &rig.session) else {
            panic!("expected the grid");
        };
        assert!(flags[right].disabled);
        assert_eq!(errors_left, None);
        assert_eq!(ctl.handle(&mut rig.cx(), Action::Pick { index: right }), Feedback::Ignored);
    }
}
