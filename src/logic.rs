//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Routing client commands into the orchestrator and collecting the replies
//!   - Best-effort record persistence of handed-off runs
//!   - Delayed flash settling guarded by the orchestrator epoch
//!   - Pure XP / level computations and the player profile

use std::sync::Arc;
use std::time::Duration;

use axum::http::{header::COOKIE, HeaderMap};
use chrono::Utc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, instrument, warn};

use crate::error::GameError;
use crate::modes::Action;
use crate::orchestrator::{Acted, Orchestrator};
use crate::protocol::{ClientWsMessage, LevelsOut, ProfileOut, ServerWsMessage, XpIn, XpOut};
use crate::records::{RecordSubmission, RecordsClient};
use crate::scoring::{self, RecordStats, LEVEL_THRESHOLDS};
use crate::state::AppState;
use crate::util::trunc_for_log;

/// Everything one command produced.
#[derive(Debug, Default)]
pub struct Reply {
  pub messages: Vec<ServerWsMessage>,
  pub submission: Option<RecordSubmission>,
  pub settle_epoch: Option<u64>,
}

impl Reply {
  fn one(msg: ServerWsMessage) -> Self {
    Self { messages: vec![msg], ..Self::default() }
  }

  fn view(orch: &Orchestrator, submission: Option<RecordSubmission>) -> Self {
    Self { messages: vec![ServerWsMessage::View { view: orch.view() }], submission, settle_epoch: None }
  }
}

fn error(e: impl std::fmt::Display) -> Reply {
  Reply::one(ServerWsMessage::Error { message: e.to_string() })
}

#[instrument(level = "debug", skip_all)]
pub fn handle_command(orch: &mut Orchestrator, msg: ClientWsMessage) -> Reply {
  let action = match msg {
    ClientWsMessage::Ping => return Reply::one(ServerWsMessage::Pong),
    ClientWsMessage::Snapshot => return Reply::view(orch, None),
    ClientWsMessage::Navigate { screen } => {
      return match orch.navigate(screen) {
        Ok(sub) => Reply::view(orch, sub),
        Err(e) => error(e),
      };
    }
    ClientWsMessage::SelectMode { mode } => {
      let sub = orch.select_mode(mode);
      return Reply::view(orch, sub);
    }
    ClientWsMessage::ChooseDifficulty { difficulty } => {
      return match orch.choose_difficulty(difficulty) {
        Ok(sub) => Reply::view(orch, sub),
        Err(e) => error(e),
      };
    }
    ClientWsMessage::Restart => {
      return match orch.restart() {
        Ok(sub) => Reply::view(orch, sub),
        Err(e) => error(e),
      };
    }
    ClientWsMessage::Inspect { id } => {
      let tooltip = orch.inspect(&id);
      return Reply::one(ServerWsMessage::Tooltip { id, tooltip });
    }
    ClientWsMessage::Pan { dx, dy } => {
      orch.pan(dx, dy);
      return Reply::view(orch, None);
    }
    ClientWsMessage::Zoom { delta, x, y } => {
      orch.zoom(delta, [x, y]);
      return Reply::view(orch, None);
    }
    ClientWsMessage::ClickScreen { x, y } => return acted(orch, |o| o.click_screen(x, y)),
    ClientWsMessage::Guess { text } => {
      debug!(target: "game", text = %trunc_for_log(&text, 40), "Guess");
      Action::Guess { text }
    }
    ClientWsMessage::ClickShape { id } => Action::ClickShape { id },
    ClientWsMessage::ClickPoint { lon, lat } => Action::ClickPoint { lon, lat },
    ClientWsMessage::Pick { index } => Action::Pick { index },
    ClientWsMessage::Skip => Action::Skip,
    ClientWsMessage::GiveUp => Action::GiveUp,
  };
  acted(orch, |o| o.act(action))
}

fn acted(orch: &mut Orchestrator, f: impl FnOnce(&mut Orchestrator) -> Result<Acted, GameError>) -> Reply {
  match f(orch) {
    Ok(acted) => Reply {
      messages: vec![
        ServerWsMessage::Feedback { feedback: acted.feedback },
        ServerWsMessage::View { view: orch.view() },
      ],
      submission: acted.submission,
      settle_epoch: acted.settle_epoch,
    },
    Err(e) => error(e),
  }
}

/// Submit a handed-off run. Guests and failures produce nothing.
#[instrument(level = "info", skip_all, fields(mode = %sub.game_mode))]
pub async fn persist(records: &RecordsClient, cookie: Option<&str>, sub: RecordSubmission) -> Option<ServerWsMessage> {
  let xp_earned = records.submit(cookie, &sub).await?;
  Some(ServerWsMessage::RecordSaved { game_mode: sub.game_mode, xp_earned })
}

/// After `delay`, settle flashing shapes if the orchestrator is still on `epoch`. The new
/// view goes to `notify` when a listener is attached; a closed channel is ignored.
pub fn schedule_settle(
  orch: Arc<Mutex<Orchestrator>>,
  epoch: u64,
  delay: Duration,
  notify: Option<mpsc::UnboundedSender<ServerWsMessage>>,
) {
  tokio::spawn(async move {
    tokio::time::sleep(delay).await;
    let mut o = orch.lock().await;
    if !o.settle(epoch) {
      return;
    }
    if let Some(tx) = notify {
      let sent = tx.send(ServerWsMessage::MapSettled { epoch })
        .and_then(|_| tx.send(ServerWsMessage::View { view: o.view() }));
      if sent.is_err() {
        debug!(target: "map", epoch, "Settle finished after the connection closed");
      }
    }
  });
}

/// Raw `Cookie` header, forwarded to the records API.
pub fn cookie_from(headers: &HeaderMap) -> Option<String> {
  headers.get(COOKIE)?.to_str().ok().map(str::to_string).filter(|c| !c.is_empty())
}

pub fn compute_xp(body: &XpIn) -> XpOut {
  XpOut { xp: scoring::xp(body.game_mode, body.score, body.total, body.time_seconds, body.difficulty) }
}

pub fn levels_for(xp: u64) -> LevelsOut {
  LevelsOut { progress: scoring::level_progress(xp), thresholds: &LEVEL_THRESHOLDS }
}

#[instrument(level = "info", skip_all)]
pub async fn build_profile(state: &AppState, cookie: Option<&str>) -> ProfileOut {
  let user = state.records.me(cookie).await;
  let (stats, records) = if user.is_some() {
    let stats = state.records.stats(cookie).await.unwrap_or_else(|| {
      warn!(target: "records", "Stats unavailable for signed-in user");
      RecordStats::default()
    });
    (stats, state.records.best_records(cookie).await)
  } else {
    (RecordStats::default(), Default::default())
  };
  let today = Utc::now().date_naive();
  ProfileOut {
    user,
    level: scoring::level_progress(stats.total_xp),
    achievements: scoring::achievements(&stats, state.catalog.country_count() as u64, today),
    skills: scoring::skills(&stats),
    records,
    play_streak: scoring::play_streak(&stats.play_dates, today),
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;
  use std::sync::RwLock;

  use rand::rngs::StdRng;
  use rand::SeedableRng;

  use super::*;
  use crate::catalog::Catalog;
  use crate::config::Tunables;
  use crate::domain::{Difficulty, MapKind, ModeId, Screen};
  use crate::map::MapView;
  use crate::modes::Feedback;

  fn orchestrator() -> Orchestrator {
    let catalog = Arc::new(Catalog::builtin());
    let world = MapView::schematic(MapKind::World, &catalog);
    let maps = Arc::new(RwLock::new(HashMap::from([(MapKind::World, world)])));
    Orchestrator::new(catalog, maps, Tunables::default(), StdRng::seed_from_u64(11))
  }

  #[test]
  fn commands_produce_feedback_then_view() {
    let mut o = orchestrator();
    let r = handle_command(&mut o, ClientWsMessage::Ping);
    assert!(matches!(r.messages.as_slice(), [ServerWsMessage::Pong]));

    handle_command(&mut o, ClientWsMessage::SelectMode { mode: ModeId::WorldType });
    handle_command(&mut o, ClientWsMessage::ChooseDifficulty { difficulty: Difficulty::Easy });
    let r = handle_command(&mut o, ClientWsMessage::Guess { text: "Brazil".into() });
    assert!(matches!(
      r.messages.as_slice(),
      [ServerWsMessage::Feedback { feedback: Feedback::Correct { .. } }, ServerWsMessage::View { .. }]
    ));
    assert!(r.settle_epoch.is_some());
    assert!(r.submission.is_none());

    let r = handle_command(&mut o, ClientWsMessage::Navigate { screen: Screen::Home });
    assert_eq!(r.submission.map(|s| s.score), Some(1));
  }

  #[test]
  fn errors_become_messages() {
    let mut o = orchestrator();
    let r = handle_command(&mut o, ClientWsMessage::Skip);
    assert!(matches!(r.messages.as_slice(), [ServerWsMessage::Error { .. }]));
    let r = handle_command(&mut o, ClientWsMessage::Restart);
    assert!(matches!(r.messages.as_slice(), [ServerWsMessage::Error { .. }]));
  }

  #[test]
  fn cookies_and_pure_endpoints() {
    let mut h = HeaderMap::new();
    assert_eq!(cookie_from(&h), None);
    h.insert(COOKIE, "connect.sid=s%3Aabc".parse().unwrap());
    assert_eq!(cookie_from(&h).as_deref(), Some("connect.sid=s%3Aabc"));

    let body = XpIn { game_mode: ModeId::WorldWhere, score: 3500, total: 7000, time_seconds: 60, difficulty: None };
    assert_eq!(compute_xp(&body).xp, 50);
    let l = levels_for(1000);
    assert_eq!((l.progress.level, l.progress.title), (6, "Student"));
    assert_eq!(l.thresholds.len(), 50);
  }

  #[tokio::test]
  async fn settle_reaches_a_live_listener() {
    let mut o = orchestrator();
    o.select_mode(ModeId::WorldType);
    o.choose_difficulty(Difficulty::Learning).unwrap();
    let epoch = o.act(Action::Guess { text: "Japan".into() }).unwrap().settle_epoch.unwrap();
    let shared = Arc::new(Mutex::new(o));
    let (tx, mut rx) = mpsc::unbounded_channel();
    schedule_settle(shared.clone(), epoch, Duration::from_millis(5), Some(tx));
    assert!(matches!(rx.recv().await, Some(ServerWsMessage::MapSettled { epoch: e }) if e == epoch));
    assert!(matches!(rx.recv().await, Some(ServerWsMessage::View { .. })));
    assert!(!shared.lock().await.settle(epoch));
  }
}
