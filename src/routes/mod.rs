//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws` (one orchestrator per connection)
/// - REST API under `/api/v1/...`, including HTTP-driven sessions
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        .route("/ws", get(ws::ws_upgrade))
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/modes", get(http::http_get_modes))
        .route("/api/v1/sessions", post(http::http_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(http::http_get_session).delete(http::http_delete_session),
        )
        .route("/api/v1/sessions/:id/commands", post(http::http_post_command))
        .route("/api/v1/xp", post(http::http_post_xp))
        .route("/api/v1/levels", get(http::http_get_levels))
        .route("/api/v1/profile", get(http::http_get_profile))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .fallback_service(static_service)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::config::GameConfig;

    async fn app() -> Router {
        let mut cfg = GameConfig::default();
        cfg.maps.offline = true;
        let state = Arc::new(AppState::from_config(cfg));
        state.load_maps().await;
        build_router(state)
    }

    async fn json(res: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_and_modes() {
        let app = app().await;
        let res = app.clone().oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json(res).await["ok"], true);

        let res = app.oneshot(Request::get("/api/v1/modes").body(Body::empty()).unwrap()).await.unwrap();
        let v = json(res).await;
        assert_eq!(v["modes"].as_array().unwrap().len(), 21);
        assert_eq!(v["modes"][0]["id"], "world-type");
    }

    #[tokio::test]
    async fn session_commands_over_http() {
        let app = app().await;
        let res = app.clone().oneshot(Request::post("/api/v1/sessions").body(Body::empty()).unwrap()).await.unwrap();
        let id = json(res).await["id"].as_str().unwrap().to_string();
        let cmd = format!("/api/v1/sessions/{id}/commands");

        let res = app.clone().oneshot(post_json(&cmd, serde_json::json!({ "type": "select_mode", "mode": "world-where" }))).await.unwrap();
        let v = json(res).await;
        assert_eq!(v["messages"][0]["type"], "view");
        assert_eq!(v["messages"][0]["view"]["prompt"]["kind"], "where");

        let res = app.clone().oneshot(post_json(&cmd, serde_json::json!({ "type": "skip" }))).await.unwrap();
        let v = json(res).await;
        assert_eq!(v["messages"][0]["feedback"]["kind"], "skipped");

        let res = app.clone().oneshot(post_json(&cmd, serde_json::json!({ "type": "bogus" }))).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let uri = format!("/api/v1/sessions/{id}");
        let res = app.clone().oneshot(Request::delete(uri.as_str()).body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        let res = app.oneshot(Request::get(uri.as_str()).body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn session_cap_answers_service_unavailable() {
        let mut cfg = GameConfig::default();
        cfg.maps.offline = true;
        cfg.sessions.max = 1;
        let app = build_router(Arc::new(AppState::from_config(cfg)));
        let create = || Request::post("/api/v1/sessions").body(Body::empty()).unwrap();
        let res = app.clone().oneshot(create()).await.unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let res = app.oneshot(create()).await.unwrap();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn xp_levels_and_guest_profile() {
        let app = app().await;
        let body = serde_json::json!({ "game_mode": "world-flags-game", "score": 12, "total": 15, "difficulty": "hard" });
        let res = app.clone().oneshot(post_json("/api/v1/xp", body)).await.unwrap();
        assert_eq!(json(res).await["xp"], 480);

        let res = app.clone().oneshot(Request::get("/api/v1/levels?xp=250").body(Body::empty()).unwrap()).await.unwrap();
        let v = json(res).await;
        assert_eq!(v["level"], 3);
        assert_eq!(v["thresholds"].as_array().unwrap().len(), 50);

        let res = app.oneshot(Request::get("/api/v1/profile").body(Body::empty()).unwrap()).await.unwrap();
        let v = json(res).await;
        assert!(v["user"].is_null());
        assert_eq!(v["level"]["level"], 1);
        assert_eq!(v["achievements"][0]["unlocked"], false);
    }
}
