//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs its parameters and basic result info.

use std::sync::Arc;
use std::time::Duration;

use axum::{
  extract::{Path, Query, State},
  http::{HeaderMap, StatusCode},
  response::IntoResponse,
  Json,
};
use tracing::{info, instrument};

use crate::domain::ModeId;
use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut { ok: true, records: state.records.enabled() })
}

#[instrument(level = "info")]
pub async fn http_get_modes() -> impl IntoResponse {
  Json(ModesOut { modes: ModeId::ALL.iter().map(|m| m.info()).collect() })
}

#[instrument(level = "info", skip(state))]
pub async fn http_create_session(
  State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<SessionOut>), StatusCode> {
  let (id, orch) = state.create_session().await.map_err(|_| StatusCode::SERVICE_UNAVAILABLE)?;
  let view = orch.lock().await.view();
  Ok((StatusCode::CREATED, Json(SessionOut { id, view })))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_session(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<SessionOut>, StatusCode> {
  let orch = state.session(&id).await.ok_or(StatusCode::NOT_FOUND)?;
  let view = orch.lock().await.view();
  Ok(Json(SessionOut { id, view }))
}

/// Ends the session; a run still in flight is handed off first.
#[instrument(level = "info", skip(state, headers))]
pub async fn http_delete_session(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  headers: HeaderMap,
) -> StatusCode {
  let Some(orch) = state.remove_session(&id).await else {
    return StatusCode::NOT_FOUND;
  };
  let sub = orch.lock().await.navigate(crate::domain::Screen::Home).ok().flatten();
  if let Some(sub) = sub {
    let cookie = cookie_from(&headers);
    persist(&state.records, cookie.as_deref(), sub).await;
  }
  info!(target: "game", %id, "Session closed");
  StatusCode::NO_CONTENT
}

#[instrument(level = "info", skip(state, headers, msg), fields(%id))]
pub async fn http_post_command(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  headers: HeaderMap,
  Json(msg): Json<ClientWsMessage>,
) -> Result<Json<CommandOut>, StatusCode> {
  let orch = state.session(&id).await.ok_or(StatusCode::NOT_FOUND)?;
  let reply = {
    let mut o = orch.lock().await;
    let reply = handle_command(&mut o, msg);
    if let Some(epoch) = reply.settle_epoch {
      schedule_settle(orch.clone(), epoch, Duration::from_millis(o.flash_ms()), None);
    }
    reply
  };
  let mut messages = reply.messages;
  if let Some(sub) = reply.submission {
    let cookie = cookie_from(&headers);
    messages.extend(persist(&state.records, cookie.as_deref(), sub).await);
  }
  Ok(Json(CommandOut { messages }))
}

#[instrument(level = "info", skip(body), fields(mode = %body.game_mode, score = body.score, total = body.total))]
pub async fn http_post_xp(Json(body): Json<XpIn>) -> impl IntoResponse {
  Json(compute_xp(&body))
}

#[instrument(level = "info")]
pub async fn http_get_levels(Query(q): Query<LevelsQuery>) -> impl IntoResponse {
  Json(levels_for(q.xp.unwrap_or(0)))
}

#[instrument(level = "info", skip(state, headers))]
pub async fn http_get_profile(State(state): State<Arc<AppState>>, headers: HeaderMap) -> impl IntoResponse {
  let cookie = cookie_from(&headers);
  Json(build_profile(&state, cookie.as_deref()).await)
}
