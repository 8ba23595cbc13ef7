//! WebSocket upgrade + message loop. Each connection owns one orchestrator. Client messages
//! are parsed as JSON and forwarded to core logic; replies, delayed map settles and record
//! confirmations all flow back through one outbound channel.

use std::sync::Arc;
use std::time::Duration;

use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  http::HeaderMap,
  response::IntoResponse,
};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, instrument};

use crate::domain::Screen;
use crate::logic::*;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::records::RecordSubmission;
use crate::state::AppState;

#[instrument(level = "info", skip(ws, state, headers))]
pub async fn ws_upgrade(
  ws: WebSocketUpgrade,
  State(state): State<Arc<AppState>>,
  headers: HeaderMap,
) -> impl IntoResponse {
  info!(target: "terra_quest", "WebSocket upgrade requested");
  let cookie = cookie_from(&headers);
  ws.on_upgrade(move |socket| handle_ws(socket, state, cookie))
}

#[instrument(level = "info", skip_all)]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>, cookie: Option<String>) {
  info!(target: "terra_quest", signed_in = cookie.is_some(), "WebSocket connected");
  let orch = Arc::new(Mutex::new(state.new_orchestrator()));
  let (tx, mut rx) = mpsc::unbounded_channel::<ServerWsMessage>();

  loop {
    tokio::select! {
      incoming = socket.recv() => {
        let Some(Ok(msg)) = incoming else { break };
        match msg {
          Message::Text(txt) => {
            let reply = match serde_json::from_str::<ClientWsMessage>(&txt) {
              Ok(parsed) => {
                debug!(target: "game", "WS received: {:?}", &parsed);
                let mut o = orch.lock().await;
                let reply = handle_command(&mut o, parsed);
                if let Some(epoch) = reply.settle_epoch {
                  schedule_settle(orch.clone(), epoch, Duration::from_millis(o.flash_ms()), Some(tx.clone()));
                }
                reply
              }
              Err(e) => Reply { messages: vec![ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) }], ..Reply::default() },
            };
            if let Some(sub) = reply.submission {
              spawn_persist(&state, cookie.clone(), sub, tx.clone());
            }
            if !send_all(&mut socket, reply.messages).await {
              break;
            }
          }
          Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
          Message::Close(_) => break,
          _ => {}
        }
      }
      Some(out) = rx.recv() => {
        if !send_all(&mut socket, vec![out]).await {
          break;
        }
      }
    }
  }

  // A run left mid-flight by a dropped connection still counts.
  let sub = orch.lock().await.navigate(Screen::Home).ok().flatten();
  if let Some(sub) = sub {
    persist(&state.records, cookie.as_deref(), sub).await;
  }
  info!(target: "terra_quest", "WebSocket disconnected");
}

fn spawn_persist(state: &Arc<AppState>, cookie: Option<String>, sub: RecordSubmission, tx: mpsc::UnboundedSender<ServerWsMessage>) {
  let state = state.clone();
  tokio::spawn(async move {
    if let Some(saved) = persist(&state.records, cookie.as_deref(), sub).await {
      let _ = tx.send(saved);
    }
  });
}

async fn send_all(socket: &mut WebSocket, messages: Vec<ServerWsMessage>) -> bool {
  for m in messages {
    let out = serde_json::to_string(&m).unwrap_or_else(|e| {
      serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
    });
    if let Err(e) = socket.send(Message::Text(out)).await {
      error!(target: "terra_quest", error = %e, "WS send error");
      return false;
    }
  }
  true
}
