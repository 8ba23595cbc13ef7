//! Border walk: connect two countries by naming neighbours.

use std::collections::{HashMap, HashSet, VecDeque};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde_json::json;
use tracing::{debug, warn};

use super::{Action, Feedback, ModeContext, ModeController, Prompt, RunResult};
use crate::catalog::{Catalog, Lookup};
use crate::config::Tunables;
use crate::error::GameError;
use crate::map::Mark;
use crate::session::GameSession;

/// Shortest path (inclusive of both ends) over the border graph.
pub fn shortest_path(catalog: &Catalog, start: &str, end: &str) -> Option<Vec<String>> {
    if start == end {
        return Some(vec![start.to_string()]);
    }
    let mut parent: HashMap<&str, &str> = HashMap::new();
    let mut queue = VecDeque::from([start]);
    parent.insert(start, start);
    while let Some(node) = queue.pop_front() {
        for next in catalog.neighbours(node) {
            if parent.contains_key(next.as_str()) {
                continue;
            }
            parent.insert(next.as_str(), node);
            if next == end {
                let mut path = vec![end.to_string()];
                let mut at = node;
                while at != start {
                    path.push(at.to_string());
                    at = parent[at];
                }
                path.push(start.to_string());
                path.reverse();
                return Some(path);
            }
            queue.push_back(next.as_str());
        }
    }
    None
}

/// Whether `end` is reachable from `start` stepping only on `placed` countries.
pub fn connects(catalog: &Catalog, start: &str, end: &str, placed: &HashSet<String>) -> bool {
    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(node) = queue.pop_front() {
        if node == end {
            return true;
        }
        for next in catalog.neighbours(node) {
            if placed.contains(next) && seen.insert(next.as_str()) {
                queue.push_back(next.as_str());
            }
        }
    }
    false
}

/// Random start/end pair whose shortest path length falls in the preferred node range,
/// then in the fallback range.
pub fn pick_pair(rng: &mut StdRng, catalog: &Catalog, ids: &[String], t: &Tunables) -> Option<Vec<String>> {
    let tiers = [
        (t.walk_preferred_attempts, t.walk_preferred),
        (t.walk_fallback_attempts, t.walk_fallback),
    ];
    for (attempts, (min, max)) in tiers {
        for _ in 0..attempts {
            let (Some(a), Some(b)) = (ids.choose(rng), ids.choose(rng)) else {
                return None;
            };
            if a == b {
                continue;
            }
            if let Some(path) = shortest_path(catalog, a, b) {
                if (min..=max).contains(&path.len()) {
                    return Some(path);
                }
            }
        }
    }
    None
}

#[derive(Default)]
pub struct Walk {
    /// Shortest route for the chosen pair; first and last are the endpoints.
    route: Vec<String>,
    /// Player-placed countries in order, endpoints excluded.
    placed: Vec<String>,
    members: HashSet<String>,
    connected: bool,
}

impl Walk {
    fn start_id(&self) -> &str {
        self.route.first().map(String::as_str).unwrap_or_default()
    }

    fn end_id(&self) -> &str {
        self.route.last().map(String::as_str).unwrap_or_default()
    }

    fn min_steps(&self) -> u32 {
        self.route.len().saturating_sub(2) as u32
    }

    fn on_frontier(&self, catalog: &Catalog, id: &str) -> bool {
        self.members.iter().any(|m| catalog.neighbours(m).iter().any(|n| n == id))
    }
}

impl ModeController for Walk {
    fn start(&mut self, cx: &mut ModeContext<'_>) -> Result<(), GameError> {
        if !cx.map.is_ready() {
            return Err(GameError::MapUnavailable("world map is not loaded".into()));
        }
        let ids: Vec<String> = cx.catalog.countries().map(|c| c.id.clone()).filter(|id| cx.map.has_shape(id)).collect();
        let Some(route) = pick_pair(cx.rng, cx.catalog, &ids, cx.tunables) else {
            warn!(target: "game", candidates = ids.len(), "No border-walk pair found");
            return Err(GameError::NoWalkPair);
        };
        self.route = route;
        let (start, end) = (self.start_id().to_string(), self.end_id().to_string());
        self.members = HashSet::from([start.clone(), end.clone()]);
        cx.show(&start);
        cx.show(&end);
        cx.map.mark(&start, Mark::Start);
        cx.map.mark(&end, Mark::End);
        debug!(target: "game", %start, %end, min_steps = self.min_steps(), "Border walk ready");
        Ok(())
    }

    fn handle(&mut self, cx: &mut ModeContext<'_>, action: Action) -> Feedback {
        if cx.session.game_over {
            return Feedback::Ignored;
        }
        match action {
            Action::Guess { text } if text.trim().is_empty() => Feedback::Ignored,
            Action::Guess { text } => {
                let Some(id) = cx.catalog.resolve(Lookup::CountryNames, &text).map(str::to_string) else {
                    return Feedback::NotFound;
                };
                if self.members.contains(&id) {
                    return Feedback::Duplicate { name: cx.name_of(&id) };
                }
                if !self.on_frontier(cx.catalog, &id) {
                    cx.session.incorrect += 1;
                    return Feedback::Wrong { name: cx.name_of(&id), errors_left: None };
                }
                self.members.insert(id.clone());
                self.placed.push(id.clone());
                cx.session.correct += 1;
                cx.credit(&id);
                if connects(cx.catalog, self.start_id(), self.end_id(), &self.members) {
                    self.connected = true;
                    cx.session.finish();
                }
                Feedback::Correct { name: cx.name_of(&id), id, region_completed: None }
            }
            Action::GiveUp => {
                let interior: Vec<String> = self.route[1..self.route.len() - 1].to_vec();
                for id in &interior {
                    cx.map.mark(id, Mark::Missed);
                    cx.show(id);
                }
                cx.session.finish();
                Feedback::GaveUp { revealed: interior }
            }
            _ => Feedback::Ignored,
        }
    }

    fn prompt(&self, catalog: &Catalog, session: &GameSession) -> Prompt {
        if session.game_over && !self.connected {
            return Prompt::Finished;
        }
        let name = |id: &str| catalog.country(id).map(|c| c.name.clone()).unwrap_or_default();
        Prompt::Walk {
            start: name(self.start_id()),
            end: name(self.end_id()),
            placed: self.placed.iter().map(|id| name(id)).collect(),
            steps: self.placed.len() as u32,
            min_steps: self.min_steps(),
        }
    }

    fn result(&self, _session: &GameSession) -> RunResult {
        let steps = self.placed.len() as u32;
        RunResult {
            score: if self.connected { steps } else { 0 },
            total: self.min_steps(),
            extra: Some(json!({ "connected": self.connected, "steps": steps, "route": self.route })),
        }
    }

    fn teardown(&mut self, cx: &mut ModeContext<'_>) {
        cx.map.clear_marks(Mark::Start);
        cx.map.clear_marks(Mark::End);
    }
}
