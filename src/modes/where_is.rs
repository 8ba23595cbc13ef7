//! "Where is it?": click as close as possible to a named country, points fall off with distance.

use serde_json::json;
use tracing::debug;

use super::{shuffled, Action, Feedback, ModeContext, ModeController, Prompt, RunResult};
use crate::catalog::Catalog;
use crate::config::Tunables;
use crate::error::GameError;
use crate::geo::{self, Point};
use crate::session::GameSession;

#[derive(Default)]
pub struct WhereIs {
    targets: Vec<String>,
    round: usize,
    points: u32,
    max_points: u32,
}

/// Full points inside the target or within `where_full_km` of its centroid, nothing beyond
/// `where_zero_km`, linear in between.
pub fn points_for(inside: bool, distance_km: f64, t: &Tunables) -> u32 {
    if inside || distance_km <= t.where_full_km {
        return t.where_points;
    }
    if distance_km >= t.where_zero_km {
        return 0;
    }
    (t.where_points as f64 * (1.0 - distance_km / t.where_zero_km)).round() as u32
}

impl WhereIs {
    fn current(&self) -> Option<&String> {
        self.targets.get(self.round)
    }

    fn next_round(&mut self, cx: &mut ModeContext<'_>) {
        self.round += 1;
        if self.round >= self.targets.len() {
            cx.session.finish();
        }
    }
}

impl ModeController for WhereIs {
    fn start(&mut self, cx: &mut ModeContext<'_>) -> Result<(), GameError> {
        if !cx.map.is_ready() {
            return Err(GameError::MapUnavailable("world map is not loaded".into()));
        }
        let ids: Vec<String> = cx
            .catalog
            .countries()
            .map(|c| c.id.clone())
            .filter(|id| cx.map.shape(id).map_or(false, |s| s.centroid.is_some()))
            .collect();
        let mut ids = shuffled(cx.rng, ids);
        ids.truncate(cx.tunables.where_rounds);
        if ids.is_empty() {
            return Err(GameError::EmptyCatalog("where-is targets"));
        }
        self.max_points = cx.tunables.where_points * ids.len() as u32;
        self.targets = ids;
        Ok(())
    }

    fn handle(&mut self, cx: &mut ModeContext<'_>, action: Action) -> Feedback {
        if cx.session.game_over {
            return Feedback::Ignored;
        }
        let Some(target) = self.current().cloned() else {
            return Feedback::Ignored;
        };
        match action {
            Action::ClickPoint { lon, lat } => {
                let click: Point = [lon, lat];
                let Some(shape) = cx.map.shape(&target) else {
                    self.next_round(cx);
                    return Feedback::Ignored;
                };
                let inside = geo::contains(&shape.feature, click);
                let distance = match (inside, shape.centroid) {
                    (true, _) => 0.0,
                    (false, Some(c)) => geo::haversine_km(click, c),
                    (false, None) => f64::INFINITY,
                };
                let points = points_for(inside, distance, cx.tunables);
                self.points += points;
                if points > 0 {
                    cx.session.correct += 1;
                    cx.credit(&target);
                } else {
                    cx.session.incorrect += 1;
                    cx.show(&target);
                }
                debug!(target: "game", %target, distance_km = distance, points, "Where-is click scored");
                self.next_round(cx);
                Feedback::Points { points, total: self.points, distance_km: (!inside).then_some(distance.round()) }
            }
            Action::Skip => {
                cx.session.skipped += 1;
                cx.show(&target);
                self.next_round(cx);
                Feedback::Skipped { answer: cx.name_of(&target) }
            }
            Action::GiveUp => {
                let rest: Vec<String> = self.targets[self.round..].to_vec();
                self.round = self.targets.len();
                cx.give_up(rest)
            }
            _ => Feedback::Ignored,
        }
    }

    fn prompt(&self, catalog: &Catalog, session: &GameSession) -> Prompt {
        match self.current() {
            Some(id) if !session.game_over => Prompt::Where {
                round: self.round + 1,
                rounds: self.targets.len(),
                target: catalog.country(id).map(|c| c.name.clone()).unwrap_or_default(),
                score: self.points,
            },
            _ => Prompt::Finished,
        }
    }

    fn result(&self, _session: &GameSession) -> RunResult {
        RunResult {
            score: self.points,
            total: self.max_points,
            extra: Some(json!({ "rounds": self.targets.len() })),
        }
    }
}
