//! Client for the auth/records REST API.
//!
//! Every public call degrades instead of failing: no cookie, no configured base URL, a
//! transport error or a non-2xx answer all turn into "guest" / empty results. The failure
//! is logged under the `records` target and the game goes on.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, COOKIE, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::RecordsConfig;
use crate::domain::{Difficulty, ModeId};
use crate::error::RecordError;
use crate::scoring::RecordStats;

const UA: &str = "terra-quest-backend/0.1";

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct User {
  pub id: Value,
  pub name: String,
  #[serde(default)]
  pub email: Option<String>,
  #[serde(default)]
  pub picture: Option<String>,
}

#[derive(Deserialize)]
struct MeOut {
  user: Option<User>,
}

/// Best attempt for one mode.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct BestRecord {
  pub score: u32,
  pub total: u32,
  #[serde(default)]
  pub time_seconds: u64,
}

#[derive(Deserialize)]
struct RecordsOut {
  #[serde(default)]
  records: HashMap<String, BestRecord>,
}

/// One finished (or abandoned) run, as posted to `POST /api/records`.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct RecordSubmission {
  pub game_mode: ModeId,
  pub score: u32,
  pub total: u32,
  pub time_seconds: u64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub difficulty: Option<Difficulty>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub extra_data: Option<Value>,
}

#[derive(Deserialize)]
struct SaveOut {
  #[serde(default)]
  xp_earned: u32,
}

#[derive(Clone)]
pub struct RecordsClient {
  client: reqwest::Client,
  base_url: Option<String>,
}

impl RecordsClient {
  pub fn from_config(cfg: &RecordsConfig) -> Self {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(cfg.timeout_secs.max(1)))
      .build()
      .unwrap_or_else(|e| {
        warn!(target: "records", error = %e, "Falling back to default HTTP client");
        reqwest::Client::new()
      });
    let base_url = cfg.base_url.as_ref().map(|u| u.trim_end_matches('/').to_string());
    Self { client, base_url }
  }

  pub fn enabled(&self) -> bool {
    self.base_url.is_some()
  }

  fn url(&self, path: &str) -> Result<String, RecordError> {
    let base = self.base_url.as_deref().ok_or(RecordError::Disabled)?;
    Ok(format!("{base}{path}"))
  }

  async fn get_json<T: DeserializeOwned>(&self, path: &str, cookie: &str) -> Result<T, RecordError> {
    let res = self.client.get(self.url(path)?)
      .header(USER_AGENT, UA)
      .header(COOKIE, cookie)
      .send().await?;
    Self::decode(res).await
  }

  async fn decode<T: DeserializeOwned>(res: reqwest::Response) -> Result<T, RecordError> {
    if !res.status().is_success() {
      let status = res.status().as_u16();
      let body = res.text().await.unwrap_or_default();
      let message = extract_error(&body).unwrap_or(body);
      return Err(RecordError::Status { status, message });
    }
    Ok(res.json::<T>().await?)
  }

  /// Signed-in user behind `cookie`, or None for guests.
  #[instrument(level = "debug", skip_all)]
  pub async fn me(&self, cookie: Option<&str>) -> Option<User> {
    let cookie = cookie?;
    match self.get_json::<MeOut>("/api/auth/me", cookie).await {
      Ok(out) => out.user,
      Err(e) => {
        log_degraded("me", &e);
        None
      }
    }
  }

  /// Best attempt per mode identifier; empty for guests.
  #[instrument(level = "debug", skip_all)]
  pub async fn best_records(&self, cookie: Option<&str>) -> HashMap<String, BestRecord> {
    let Some(cookie) = cookie else {
      return HashMap::new();
    };
    match self.get_json::<RecordsOut>("/api/records", cookie).await {
      Ok(out) => out.records,
      Err(e) => {
        log_degraded("best_records", &e);
        HashMap::new()
      }
    }
  }

  #[instrument(level = "debug", skip_all)]
  pub async fn stats(&self, cookie: Option<&str>) -> Option<RecordStats> {
    let cookie = cookie?;
    self.get_json::<RecordStats>("/api/records/stats", cookie).await
      .map_err(|e| log_degraded("stats", &e))
      .ok()
  }

  /// Post a run. Returns the XP the server awarded, or None when nothing was saved
  /// (guest, zero score, API down).
  #[instrument(level = "info", skip(self, cookie, sub), fields(mode = %sub.game_mode, score = sub.score))]
  pub async fn submit(&self, cookie: Option<&str>, sub: &RecordSubmission) -> Option<u32> {
    let cookie = cookie?;
    if sub.score == 0 {
      debug!(target: "records", "Zero score, not submitted");
      return None;
    }
    let sent = async {
      let res = self.client.post(self.url("/api/records")?)
        .header(USER_AGENT, UA)
        .header(CONTENT_TYPE, "application/json")
        .header(COOKIE, cookie)
        .json(sub)
        .send().await?;
      Self::decode::<SaveOut>(res).await
    };
    match sent.await {
      Ok(out) => {
        debug!(target: "records", xp = out.xp_earned, "Record saved");
        Some(out.xp_earned)
      }
      Err(e) => {
        log_degraded("submit", &e);
        None
      }
    }
  }
}

fn log_degraded(call: &'static str, e: &RecordError) {
  match e {
    RecordError::Disabled => debug!(target: "records", call, "Records API disabled"),
    // 401 is the normal answer for an expired session.
    RecordError::Status { status: 401, .. } => debug!(target: "records", call, "Not signed in"),
    _ => warn!(target: "records", call, error = %e, "Records API call failed; continuing as guest"),
  }
}

/// `{ "error": "..." }` bodies carry a readable message.
fn extract_error(body: &str) -> Option<String> {
  let v: Value = serde_json::from_str(body).ok()?;
  v.get("error")?.as_str().map(str::to_string)
}
