//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! The same client message schema is accepted on `/ws` and on `POST /api/v1/sessions/:id/commands`.

use serde::{Deserialize, Serialize};

use crate::domain::{Difficulty, ModeId, ModeInfo, Screen};
use crate::map::Tooltip;
use crate::modes::Feedback;
use crate::orchestrator::View;
use crate::records::{BestRecord, User};
use crate::scoring::{Achievement, LevelProgress, Skill};

/// Messages the client can send.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    /// Ask for the current view without changing anything.
    Snapshot,
    Navigate {
        screen: Screen,
    },
    SelectMode {
        mode: ModeId,
    },
    ChooseDifficulty {
        difficulty: Difficulty,
    },
    Guess {
        text: String,
    },
    ClickShape {
        id: String,
    },
    ClickPoint {
        lon: f64,
        lat: f64,
    },
    /// Click in screen pixels; hit-tested server-side against the current viewport.
    ClickScreen {
        x: f64,
        y: f64,
    },
    Pick {
        index: usize,
    },
    Skip,
    GiveUp,
    Inspect {
        id: String,
    },
    Pan {
        dx: f64,
        dy: f64,
    },
    /// Wheel zoom around the screen position (x, y); negative delta zooms in.
    Zoom {
        delta: f64,
        x: f64,
        y: f64,
    },
    Restart,
}

/// Messages the server sends back.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    View {
        view: View,
    },
    Feedback {
        feedback: Feedback,
    },
    Tooltip {
        id: String,
        tooltip: Tooltip,
    },
    MapSettled {
        epoch: u64,
    },
    RecordSaved {
        game_mode: ModeId,
        xp_earned: u32,
    },
    Error {
        message: String,
    },
}

//
// HTTP request/response DTOs
//

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
    pub records: bool,
}

#[derive(Serialize)]
pub struct ModesOut {
    pub modes: Vec<ModeInfo>,
}

#[derive(Serialize)]
pub struct SessionOut {
    pub id: String,
    pub view: View,
}

#[derive(Serialize)]
pub struct CommandOut {
    pub messages: Vec<ServerWsMessage>,
}

#[derive(Debug, Deserialize)]
pub struct XpIn {
    pub game_mode: ModeId,
    pub score: u32,
    pub total: u32,
    #[serde(default)]
    pub time_seconds: u64,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
}

#[derive(Serialize)]
pub struct XpOut {
    pub xp: u32,
}

#[derive(Debug, Deserialize)]
pub struct LevelsQuery {
    pub xp: Option<u64>,
}

#[derive(Serialize)]
pub struct LevelsOut {
    #[serde(flatten)]
    pub progress: LevelProgress,
    pub thresholds: &'static [u64],
}

/// Player profile assembled from the records API; guests get an empty one.
#[derive(Serialize)]
pub struct ProfileOut {
    pub user: Option<User>,
    pub level: LevelProgress,
    pub achievements: Vec<Achievement>,
    pub skills: std::collections::BTreeMap<&'static str, Skill>,
    pub records: std::collections::HashMap<String, BestRecord>,
    pub play_streak: u32,
}
