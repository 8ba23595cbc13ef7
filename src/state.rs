//! Application state: catalog, map templates, records client and live HTTP sessions.
//!
//! This module owns:
//!   - the entity catalog (built-in seeds plus TOML extras)
//!   - one map template per map kind, loading in the background
//!   - the records/auth API client
//!   - HTTP-driven orchestrators keyed by session id (WebSocket connections own theirs)

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::config::{resolve_config, GameConfig};
use crate::domain::MapKind;
use crate::error::GameError;
use crate::geo;
use crate::map::{MapSource, MapView};
use crate::orchestrator::{MapTemplates, Orchestrator};
use crate::records::RecordsClient;

pub type SharedOrchestrator = Arc<Mutex<Orchestrator>>;

/// A live HTTP session and the last time a request reached it.
pub struct SessionEntry {
    pub orch: SharedOrchestrator,
    pub touched: Instant,
}

const MAP_KINDS: [MapKind; 3] = [MapKind::World, MapKind::Brazil, MapKind::UnitedStates];

#[derive(Clone)]
pub struct AppState {
    pub config: GameConfig,
    pub catalog: Arc<Catalog>,
    pub maps: MapTemplates,
    pub records: RecordsClient,
    pub sessions: Arc<RwLock<HashMap<String, SessionEntry>>>,
}

impl AppState {
    /// Build state from env: config file, catalog, records client. Maps start as loading.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        Self::from_config(resolve_config())
    }

    pub fn from_config(config: GameConfig) -> Self {
        let catalog = Arc::new(Catalog::build(&config.catalog));
        info!(
            target: "terra_quest",
            countries = catalog.country_count(),
            languages = catalog.languages().len(),
            landmarks = catalog.landmarks().len(),
            "Catalog built"
        );

        let records = RecordsClient::from_config(&config.records);
        if records.enabled() {
            info!(target: "terra_quest", base_url = ?config.records.base_url, "Records API enabled.");
        } else {
            info!(target: "terra_quest", "Records API disabled (no RECORDS_API_URL). Playing as guest.");
        }

        let maps = MAP_KINDS.into_iter().map(|k| (k, MapView::loading(k))).collect();
        Self {
            config,
            catalog,
            maps: Arc::new(std::sync::RwLock::new(maps)),
            records,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn new_orchestrator(&self) -> Orchestrator {
        Orchestrator::new(
            self.catalog.clone(),
            self.maps.clone(),
            self.config.game.clone(),
            StdRng::from_entropy(),
        )
    }

    pub fn install_map(&self, view: MapView) {
        match self.maps.write() {
            Ok(mut maps) => {
                maps.insert(view.kind, view);
            }
            Err(e) => error!(target: "map", error = %e, "Map templates lock poisoned"),
        }
    }

    /// Fetch every map dataset (or build schematic maps offline) and install the results.
    /// A failed download installs a `Failed` map so modes report it instead of hanging.
    #[instrument(level = "info", skip(self))]
    pub async fn load_maps(&self) {
        let urls = &self.config.maps;
        if urls.offline {
            for kind in MAP_KINDS {
                self.install_map(MapView::schematic(kind, &self.catalog));
            }
            info!(target: "map", "Offline: schematic maps installed");
            return;
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(urls.timeout_secs.max(1)))
            .build()
            .unwrap_or_else(|e| {
                warn!(target: "map", error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });
        for kind in MAP_KINDS {
            let url = match kind {
                MapKind::World => &urls.world,
                MapKind::Brazil => &urls.brazil,
                MapKind::UnitedStates => &urls.united_states,
            };
            let src = MapSource::for_kind(kind);
            let view = match geo::fetch_features(&client, url, src.object, src.fallback_first, src.rule).await {
                Ok(features) => MapView::from_features(kind, features, &self.catalog),
                Err(e) => {
                    error!(target: "map", ?kind, %url, error = %e, "Map dataset failed to load");
                    MapView::failed(kind, e.to_string())
                }
            };
            self.install_map(view);
        }
    }

    /// Register a new session. At the cap, idle sessions are swept first; if none
    /// were idle the request is refused.
    #[instrument(level = "debug", skip(self))]
    pub async fn create_session(&self) -> Result<(String, SharedOrchestrator), GameError> {
        let limits = &self.config.sessions;
        let mut sessions = self.sessions.write().await;
        if sessions.len() >= limits.max {
            let now = Instant::now();
            sweep(&mut sessions, now, self.idle_ttl());
            if sessions.len() >= limits.max {
                warn!(target: "game", max = limits.max, "Session limit reached");
                return Err(GameError::SessionLimit(limits.max));
            }
        }
        let id = Uuid::new_v4().to_string();
        let orch = Arc::new(Mutex::new(self.new_orchestrator()));
        sessions.insert(id.clone(), SessionEntry { orch: orch.clone(), touched: Instant::now() });
        info!(target: "game", %id, live = sessions.len(), "Session created");
        Ok((id, orch))
    }

    /// Look a session up and mark it as used.
    pub async fn session(&self, id: &str) -> Option<SharedOrchestrator> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(id)?;
        entry.touched = Instant::now();
        Some(entry.orch.clone())
    }

    /// Drop a session. Returns the orchestrator so a pending run can still be handed off.
    #[instrument(level = "debug", skip(self))]
    pub async fn remove_session(&self, id: &str) -> Option<SharedOrchestrator> {
        self.sessions.write().await.remove(id).map(|e| e.orch)
    }

    fn idle_ttl(&self) -> Duration {
        Duration::from_secs(self.config.sessions.idle_ttl_secs)
    }

    /// Drop sessions idle longer than the TTL as of `now`. Returns how many went.
    pub async fn sweep_idle(&self, now: Instant) -> usize {
        let mut sessions = self.sessions.write().await;
        sweep(&mut sessions, now, self.idle_ttl())
    }

    /// Periodic idle-session sweep; runs until the runtime shuts down.
    #[instrument(level = "info", skip(self))]
    pub async fn run_session_sweeper(&self) {
        let every = Duration::from_secs(self.config.sessions.sweep_every_secs.max(1));
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            self.sweep_idle(Instant::now()).await;
        }
    }
}

fn sweep(sessions: &mut HashMap<String, SessionEntry>, now: Instant, ttl: Duration) -> usize {
    let before = sessions.len();
    sessions.retain(|_, e| now.saturating_duration_since(e.touched) <= ttl);
    let dropped = before - sessions.len();
    if dropped > 0 {
        info!(target: "game", dropped, live = sessions.len(), "Idle sessions swept");
    }
    dropped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ModeId;

    fn offline() -> AppState {
        let mut cfg = GameConfig::default();
        cfg.maps.offline = true;
        AppState::from_config(cfg)
    }

    #[tokio::test]
    async fn offline_maps_are_ready() {
        let state = offline();
        assert!(!state.maps.read().unwrap()[&MapKind::World].is_ready());
        state.load_maps().await;
        for kind in MAP_KINDS {
            assert!(state.maps.read().unwrap()[&kind].is_ready(), "{kind:?}");
        }
    }

    #[tokio::test]
    async fn unreachable_dataset_installs_a_failed_map() {
        let mut cfg = GameConfig::default();
        cfg.maps.world = "http://127.0.0.1:9/world.json".into();
        cfg.maps.brazil = "http://127.0.0.1:9/br.json".into();
        cfg.maps.united_states = "http://127.0.0.1:9/us.json".into();
        let state = AppState::from_config(cfg);
        state.load_maps().await;
        let maps = state.maps.read().unwrap();
        assert!(matches!(maps[&MapKind::Brazil].status(), crate::map::MapStatus::Failed { .. }));
    }

    #[tokio::test]
    async fn sessions_lifecycle() {
        let state = offline();
        state.load_maps().await;
        let (id, orch) = state.create_session().await.unwrap();
        orch.lock().await.select_mode(ModeId::WorldWhere);
        let again = state.session(&id).await.unwrap();
        assert!(again.lock().await.view().prompt.is_some());
        assert!(state.remove_session(&id).await.is_some());
        assert!(state.session(&id).await.is_none());
        assert!(state.remove_session(&id).await.is_none());
    }

    #[tokio::test]
    async fn sweep_drops_only_idle_sessions() {
        let state = offline();
        let (stale, _) = state.create_session().await.unwrap();
        let (fresh, _) = state.create_session().await.unwrap();
        let ttl = state.idle_ttl();

        assert_eq!(state.sweep_idle(Instant::now()).await, 0);

        // Age one session past the TTL; the other is touched by a lookup.
        let later = Instant::now() + ttl + Duration::from_secs(1);
        state.sessions.write().await.get_mut(&fresh).unwrap().touched = later;
        assert_eq!(state.sweep_idle(later).await, 1);
        assert!(state.session(&stale).await.is_none());
        assert!(state.session(&fresh).await.is_some());
    }

    #[tokio::test]
    async fn cap_refuses_new_sessions_until_one_goes() {
        let mut cfg = GameConfig::default();
        cfg.maps.offline = true;
        cfg.sessions.max = 2;
        let state = AppState::from_config(cfg);
        let (first, _) = state.create_session().await.unwrap();
        state.create_session().await.unwrap();
        assert_eq!(state.create_session().await.unwrap_err(), GameError::SessionLimit(2));

        state.remove_session(&first).await;
        assert!(state.create_session().await.is_ok());
        assert_eq!(state.sessions.read().await.len(), 2);
    }

    #[tokio::test]
    async fn cap_sweeps_idle_sessions_first() {
        let mut cfg = GameConfig::default();
        cfg.maps.offline = true;
        cfg.sessions.max = 1;
        let state = AppState::from_config(cfg);
        let (old, _) = state.create_session().await.unwrap();
        let long_ago = Instant::now().checked_sub(state.idle_ttl() + Duration::from_secs(1));
        // Instant may not reach that far back on a freshly booted host.
        let Some(long_ago) = long_ago else { return };
        state.sessions.write().await.get_mut(&old).unwrap().touched = long_ago;
        let (new, _) = state.create_session().await.unwrap();
        assert!(state.session(&old).await.is_none());
        assert!(state.session(&new).await.is_some());
    }

    #[tokio::test]
    async fn stalled_dataset_times_out() {
        // Accepts connections and never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((sock, _)) = listener.accept().await {
                held.push(sock);
            }
        });

        let mut cfg = GameConfig::default();
        cfg.maps.timeout_secs = 1;
        cfg.maps.world = format!("http://{addr}/world.json");
        cfg.maps.brazil = format!("http://{addr}/br.json");
        cfg.maps.united_states = format!("http://{addr}/us.json");
        let state = AppState::from_config(cfg);
        let done = tokio::time::timeout(Duration::from_secs(20), state.load_maps()).await;
        assert!(done.is_ok(), "map loading hung on a stalled server");
        let maps = state.maps.read().unwrap();
        assert!(matches!(maps[&MapKind::World].status(), crate::map::MapStatus::Failed { .. }));
    }
}
