//! Navigation: owns the current screen, the selected mode and the single live controller.
//!
//! Every mode entry gets a fresh `GameSession` and a fresh copy of the map template, so
//! nothing painted by a previous mode can leak into the next one. Leaving a mode hands off
//! at most one `RecordSubmission` per session.
//!
//! `epoch` is bumped on every entry and exit. Delayed work (flash settling) captures it and
//! is dropped if the orchestrator has moved on by the time it runs.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::catalog::Catalog;
use crate::config::Tunables;
use crate::domain::{ControllerKind, Difficulty, MapKind, ModeId, ModeInfo, Screen};
use crate::error::GameError;
use crate::map::{MapSnapshot, MapStatus, MapView, Tooltip, ZOOM_STEP};
use crate::modes::{controller_for, Action, Feedback, ModeContext, ModeController, Prompt};
use crate::records::RecordSubmission;
use crate::scoring;
use crate::session::GameSession;

/// Loaded (or failed, or still loading) maps shared by every orchestrator.
pub type MapTemplates = Arc<RwLock<HashMap<MapKind, MapView>>>;

struct Live {
    controller: Box<dyn ModeController>,
    session: GameSession,
}

/// Result of one player action.
#[derive(Debug)]
pub struct Acted {
    pub feedback: Feedback,
    /// Present when this action ended the run.
    pub submission: Option<RecordSubmission>,
    /// Epoch to pass to `settle` after the flash delay, when something is flashing.
    pub settle_epoch: Option<u64>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Progress {
    pub correct: u32,
    pub incorrect: u32,
    pub skipped: u32,
    pub found: usize,
    pub streak: u32,
    pub best_streak: u32,
    pub elapsed_secs: u64,
    pub game_over: bool,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ResultView {
    pub score: u32,
    pub total: u32,
    pub time_seconds: u64,
    /// Client-side estimate; the records API answers with the authoritative figure.
    pub xp: u32,
}

/// Everything the front end needs to draw the current state.
#[derive(Clone, Debug, Serialize)]
pub struct View {
    pub screen: Screen,
    pub epoch: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<ModeInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    pub awaiting_difficulty: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<Prompt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<Progress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map: Option<MapSnapshot>,
}

pub struct Orchestrator {
    catalog: Arc<Catalog>,
    templates: MapTemplates,
    tunables: Tunables,
    rng: StdRng,
    screen: Screen,
    mode: Option<ModeId>,
    difficulty: Option<Difficulty>,
    awaiting_difficulty: bool,
    live: Option<Live>,
    map: MapView,
    /// Set when the selected mode could not start (map failed or still loading).
    notice: Option<String>,
    epoch: u64,
}

impl Orchestrator {
    pub fn new(catalog: Arc<Catalog>, templates: MapTemplates, tunables: Tunables, rng: StdRng) -> Self {
        Self {
            catalog,
            templates,
            tunables,
            rng,
            screen: Screen::Home,
            mode: None,
            difficulty: None,
            awaiting_difficulty: false,
            live: None,
            map: MapView::loading(MapKind::World),
            notice: None,
            epoch: 0,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn flash_ms(&self) -> u64 {
        self.tunables.flash_ms
    }

    #[instrument(level = "info", skip(self), fields(from = ?self.screen))]
    pub fn navigate(&mut self, to: Screen) -> Result<Option<RecordSubmission>, GameError> {
        match to {
            Screen::Home | Screen::Select => {
                let sub = self.leave();
                self.mode = None;
                self.difficulty = None;
                self.awaiting_difficulty = false;
                self.screen = to;
                Ok(sub)
            }
            Screen::Game => self.restart(),
            Screen::Results => match &self.live {
                Some(live) if live.session.game_over => {
                    self.screen = Screen::Results;
                    Ok(None)
                }
                _ => Err(GameError::NoLiveMode),
            },
        }
    }

    /// Enter `mode`. Modes with difficulty tiers wait for `choose_difficulty`.
    #[instrument(level = "info", skip(self))]
    pub fn select_mode(&mut self, mode: ModeId) -> Option<RecordSubmission> {
        let sub = self.leave();
        self.mode = Some(mode);
        self.difficulty = None;
        self.screen = Screen::Game;
        if mode.uses_difficulty() {
            self.awaiting_difficulty = true;
            self.map = self.template(mode.map_kind().unwrap_or(MapKind::World));
            self.map.reset();
        } else {
            self.start(None);
        }
        sub
    }

    /// Pick a tier for the selected mode. Choosing again mid-run restarts with the new tier.
    #[instrument(level = "info", skip(self))]
    pub fn choose_difficulty(&mut self, difficulty: Difficulty) -> Result<Option<RecordSubmission>, GameError> {
        let mode = self.mode.ok_or(GameError::NoLiveMode)?;
        let sub = self.leave();
        self.screen = Screen::Game;
        self.start(mode.uses_difficulty().then_some(difficulty));
        Ok(sub)
    }

    /// Replay the selected mode with the same tier.
    #[instrument(level = "info", skip(self))]
    pub fn restart(&mut self) -> Result<Option<RecordSubmission>, GameError> {
        self.mode.ok_or(GameError::NoLiveMode)?;
        let sub = self.leave();
        self.screen = Screen::Game;
        if !self.awaiting_difficulty {
            self.start(self.difficulty);
        }
        Ok(sub)
    }

    pub fn act(&mut self, action: Action) -> Result<Acted, GameError> {
        if let (true, Some(mode)) = (self.awaiting_difficulty, self.mode) {
            return Err(GameError::AwaitingDifficulty(mode));
        }
        if let Some(message) = &self.notice {
            return Ok(Acted {
                feedback: Feedback::MapUnavailable { message: message.clone() },
                submission: None,
                settle_epoch: None,
            });
        }
        let live = self.live.as_mut().ok_or(GameError::NoLiveMode)?;
        let mut cx = ModeContext {
            catalog: &self.catalog,
            session: &mut live.session,
            map: &mut self.map,
            rng: &mut self.rng,
            tunables: &self.tunables,
        };
        let feedback = live.controller.handle(&mut cx, action);
        debug!(target: "game", mode = %live.session.mode, ?feedback, "Action handled");
        let finished = live.session.game_over;
        let settle_epoch = self.map.has_pending_flash().then_some(self.epoch);
        let submission = if finished {
            self.screen = Screen::Results;
            self.hand_off()
        } else {
            None
        };
        Ok(Acted { feedback, submission, settle_epoch })
    }

    /// Click in screen pixels, hit-tested against the current pan/zoom. Click-nearest
    /// modes always get the geographic point.
    pub fn click_screen(&mut self, x: f64, y: f64) -> Result<Acted, GameError> {
        let nearest = self.mode.map_or(false, |m| m.controller() == ControllerKind::ClickNearest);
        let action = match self.map.shape_at([x, y]) {
            Some(id) if !nearest => Action::ClickShape { id: id.to_string() },
            _ => {
                let [lon, lat] = self.map.viewport.invert([x, y]);
                Action::ClickPoint { lon, lat }
            }
        };
        self.act(action)
    }

    /// Hover details for a shape; identity stays hidden until found, shown or game over.
    pub fn inspect(&self, id: &str) -> Tooltip {
        let game_over = self.live.as_ref().map_or(false, |l| l.session.game_over);
        self.map.tooltip(&self.catalog, id, game_over)
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.map.viewport.pan(dx, dy);
    }

    /// Wheel zoom: negative `delta` zooms in around the cursor.
    pub fn zoom(&mut self, delta: f64, cursor: [f64; 2]) {
        let factor = if delta < 0.0 { ZOOM_STEP } else { 1.0 / ZOOM_STEP };
        self.map.viewport.zoom(factor, cursor);
    }

    /// Apply pending flashes if nothing changed since `epoch` was handed out.
    pub fn settle(&mut self, epoch: u64) -> bool {
        if epoch != self.epoch {
            debug!(target: "map", epoch, current = self.epoch, "Stale settle dropped");
            return false;
        }
        self.map.settle() > 0
    }

    pub fn view(&self) -> View {
        let in_game = matches!(self.screen, Screen::Game | Screen::Results) && self.mode.is_some();
        let live = self.live.as_ref();
        View {
            screen: self.screen,
            epoch: self.epoch,
            mode: self.mode.map(ModeId::info),
            difficulty: self.difficulty,
            awaiting_difficulty: self.awaiting_difficulty,
            notice: self.notice.clone(),
            prompt: live.map(|l| l.controller.prompt(&self.catalog, &l.session)),
            progress: live.map(|l| {
                let s = &l.session;
                Progress {
                    correct: s.correct,
                    incorrect: s.incorrect,
                    skipped: s.skipped,
                    found: s.found.len(),
                    streak: s.streak,
                    best_streak: s.best_streak,
                    elapsed_secs: s.elapsed_secs(),
                    game_over: s.game_over,
                }
            }),
            result: live.filter(|l| l.session.game_over).map(|l| {
                let r = l.controller.result(&l.session);
                let time_seconds = l.session.elapsed_secs();
                ResultView {
                    score: r.score,
                    total: r.total,
                    time_seconds,
                    xp: scoring::xp(l.session.mode, r.score, r.total, time_seconds, l.session.difficulty),
                }
            }),
            map: in_game.then(|| self.map.snapshot()),
        }
    }

    fn template(&self, kind: MapKind) -> MapView {
        self.templates
            .read()
            .ok()
            .and_then(|maps| maps.get(&kind).cloned())
            .unwrap_or_else(|| MapView::loading(kind))
    }

    fn start(&mut self, difficulty: Option<Difficulty>) {
        let Some(mode) = self.mode else {
            return;
        };
        self.awaiting_difficulty = false;
        self.difficulty = difficulty;
        self.map = self.template(mode.map_kind().unwrap_or(MapKind::World));
        self.map.reset();
        self.epoch += 1;

        let mut session = GameSession::new(mode, difficulty);
        let mut controller = controller_for(mode);
        let mut cx = ModeContext {
            catalog: &self.catalog,
            session: &mut session,
            map: &mut self.map,
            rng: &mut self.rng,
            tunables: &self.tunables,
        };
        match controller.start(&mut cx) {
            Ok(()) => {
                info!(target: "game", %mode, ?difficulty, epoch = self.epoch, "Mode started");
                self.live = Some(Live { controller, session });
            }
            Err(e) => {
                let notice = match (&e, self.map.status()) {
                    (GameError::MapUnavailable(_), MapStatus::Failed { message }) => {
                        format!("Map failed to load: {message}")
                    }
                    (GameError::MapUnavailable(_), MapStatus::Loading) => {
                        "The map is still loading, try again in a moment".to_string()
                    }
                    _ => e.to_string(),
                };
                warn!(target: "game", %mode, error = %e, "Mode could not start");
                self.notice = Some(notice);
            }
        }
    }

    /// Tear the live mode down, returning its record if one is due.
    fn leave(&mut self) -> Option<RecordSubmission> {
        let sub = self.hand_off();
        if let Some(mut live) = self.live.take() {
            let mut cx = ModeContext {
                catalog: &self.catalog,
                session: &mut live.session,
                map: &mut self.map,
                rng: &mut self.rng,
                tunables: &self.tunables,
            };
            live.controller.teardown(&mut cx);
            debug!(target: "game", mode = %live.session.mode, "Mode torn down");
        }
        self.map.reset();
        self.notice = None;
        self.epoch += 1;
        sub
    }

    fn hand_off(&mut self) -> Option<RecordSubmission> {
        let live = self.live.as_mut()?;
        let s = &mut live.session;
        if s.saved || !s.has_progress() {
            return None;
        }
        s.saved = true;
        let r = live.controller.result(s);
        info!(target: "records", mode = %s.mode, score = r.score, total = r.total, finished = s.game_over, "Run handed off");
        Some(RecordSubmission {
            game_mode: s.mode,
            score: r.score,
            total: r.total,
            time_seconds: s.elapsed_secs(),
            difficulty: s.difficulty,
            extra_data: r.extra,
        })
    }
}
