//! Loading game configuration (tunables, dataset URLs, records API, catalog extras) from TOML.
//!
//! See `GameConfig` for the expected schema. Every section is optional.

use serde::Deserialize;
use tracing::{error, info};

use crate::catalog::CatalogExtras;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct GameConfig {
  #[serde(default)]
  pub game: Tunables,
  #[serde(default)]
  pub maps: MapUrls,
  #[serde(default)]
  pub records: RecordsConfig,
  #[serde(default)]
  pub sessions: SessionsConfig,
  #[serde(default)]
  pub catalog: CatalogExtras,
}

/// Gameplay constants.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Tunables {
  pub where_rounds: usize,
  pub where_points: u32,
  /// Distance at or below which a click earns full points.
  pub where_full_km: f64,
  /// Distance at or beyond which a click earns nothing.
  pub where_zero_km: f64,
  /// Countries asked in the top-population / top-area maps.
  pub top_n: usize,
  /// Wrong options shown next to the right one in multiple-choice modes.
  pub distractors: usize,
  /// Flags laid out (and asked) in the flag-click grid.
  pub flag_grid: usize,
  /// Delay before flashing reveals settle to their final color.
  pub flash_ms: u64,
  pub walk_preferred: (usize, usize),
  pub walk_fallback: (usize, usize),
  pub walk_preferred_attempts: usize,
  pub walk_fallback_attempts: usize,
}

impl Default for Tunables {
  fn default() -> Self {
    Self {
      where_rounds: 7,
      where_points: 1000,
      where_full_km: 50.0,
      where_zero_km: 6000.0,
      top_n: 15,
      distractors: 5,
      flag_grid: 30,
      flash_ms: 150,
      walk_preferred: (5, 13),
      walk_fallback: (3, 20),
      walk_preferred_attempts: 200,
      walk_fallback_attempts: 100,
    }
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MapUrls {
  pub world: String,
  pub brazil: String,
  pub united_states: String,
  /// Skip downloads and use schematic maps built from catalog centroids.
  pub offline: bool,
  /// Per-dataset download timeout.
  pub timeout_secs: u64,
}

impl Default for MapUrls {
  fn default() -> Self {
    Self {
      world: "https://cdn.jsdelivr.net/npm/world-atlas@2/countries-50m.json".into(),
      brazil: "https://cdn.jsdelivr.net/npm/br-atlas@0.1.0/br-states.json".into(),
      united_states: "https://cdn.jsdelivr.net/npm/us-atlas@3/states-10m.json".into(),
      offline: false,
      timeout_secs: 30,
    }
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RecordsConfig {
  /// Base URL of the auth/records API, e.g. "http://localhost:8080". None disables persistence.
  pub base_url: Option<String>,
  pub timeout_secs: u64,
}

impl Default for RecordsConfig {
  fn default() -> Self {
    Self { base_url: None, timeout_secs: 5 }
  }
}

/// Limits on HTTP-driven sessions. WebSocket connections own their orchestrator and are not counted.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SessionsConfig {
  /// Live sessions allowed at once; creation fails beyond this.
  pub max: usize,
  /// A session untouched for this long is dropped by the sweeper.
  pub idle_ttl_secs: u64,
  pub sweep_every_secs: u64,
}

impl Default for SessionsConfig {
  fn default() -> Self {
    Self { max: 1000, idle_ttl_secs: 1800, sweep_every_secs: 60 }
  }
}

/// Attempt to load `GameConfig` from GAME_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_game_config_from_env() -> Option<GameConfig> {
  let path = std::env::var("GAME_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<GameConfig>(&s) {
      Ok(cfg) => {
        info!(target: "terra_quest", %path, "Loaded game config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "terra_quest", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "terra_quest", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

/// Config file (or defaults) with environment overrides applied.
pub fn resolve_config() -> GameConfig {
  let mut cfg = load_game_config_from_env().unwrap_or_default();
  if let Ok(url) = std::env::var("RECORDS_API_URL") {
    if !url.trim().is_empty() {
      cfg.records.base_url = Some(url.trim().trim_end_matches('/').to_string());
    }
  }
  if matches!(std::env::var("MAPS_OFFLINE").as_deref(), Ok("1") | Ok("true")) {
    cfg.maps.offline = true;
  }
  cfg
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn partial_toml_keeps_defaults() {
    let cfg: GameConfig = toml::from_str(
      r#"
        [game]
        where_rounds = 3

        [records]
        base_url = "http://localhost:8080"

        [sessions]
        max = 5

        [catalog.aliases]
        "Terra Brasilis" = "76"
      "#,
    )
    .unwrap();
    assert_eq!(cfg.game.where_rounds, 3);
    assert_eq!(cfg.game.where_points, 1000);
    assert_eq!(cfg.records.base_url.as_deref(), Some("http://localhost:8080"));
    assert_eq!(cfg.records.timeout_secs, 5);
    assert_eq!((cfg.sessions.max, cfg.sessions.sweep_every_secs), (5, 60));
    assert!(cfg.maps.world.contains("world-atlas"));
    assert_eq!(cfg.catalog.aliases.get("Terra Brasilis").map(String::as_str), Some("76"));
  }

  #[test]
  fn empty_toml_is_default() {
    let cfg: GameConfig = toml::from_str("").unwrap();
    assert_eq!((cfg.game.top_n, cfg.game.flag_grid), (15, 30));
    assert!(cfg.records.base_url.is_none());
    assert_eq!(cfg.maps.timeout_secs, 30);
    assert_eq!((cfg.sessions.max, cfg.sessions.idle_ttl_secs), (1000, 1800));
  }
}
