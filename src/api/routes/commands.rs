use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::state::AppState;
use crate::api::ApiError;

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub player_id: String,
    pub command: String,
}

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub completed: usize,
    pub scanned_at: DateTime<Utc>,
}

/// Run one command line for a player and return the reply text.
pub async fn run_command(
    State(state): State<AppState>,
    Json(req): Json<CommandRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let player_id = req.player_id.trim();
    if player_id.is_empty() {
        return Err(ApiError::BadRequest("player_id must not be empty".into()));
    }

    let content = state.bot.handle(player_id, &req.command).await?;
    Ok(Json(CommandResponse { content }))
}

/// Complete every due upgrade now.
pub async fn run_scan(State(state): State<AppState>) -> Result<Json<ScanResponse>, ApiError> {
    let now = Utc::now();
    let completed = state.bot.scan(now.timestamp()).await?;
    if !completed.is_empty() {
        info!("Manual scan completed {} upgrades", completed.len());
    }

    Ok(Json(ScanResponse {
        completed: completed.len(),
        scanned_at: now,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::util::ServiceExt;

    use crate::api::build_router;
    use crate::api::state::AppState;
    use crate::commands::Bot;
    use crate::notify::MemoryNotifier;
    use crate::reference::ReferenceData;
    use crate::storage::PlayerStore;

    fn make_state(tmp: &TempDir, notifier: Arc<MemoryNotifier>) -> AppState {
        let store = PlayerStore::load(tmp.path().join("players.json")).unwrap();
        AppState::new(Arc::new(Bot::new(store, ReferenceData::default(), notifier)))
    }

    async fn post_json(app: axum::Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_command_returns_reply() {
        let tmp = TempDir::new().unwrap();
        let app = build_router(make_state(&tmp, Arc::new(MemoryNotifier::new())), "*");

        let (status, json) = post_json(
            app,
            "/api/commands",
            r#"{"player_id": "42", "command": "test"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["content"], "I'm alive!");
    }

    #[tokio::test]
    async fn test_command_rejection_is_reply_text() {
        let tmp = TempDir::new().unwrap();
        let app = build_router(make_state(&tmp, Arc::new(MemoryNotifier::new())), "*");

        let (status, json) = post_json(
            app,
            "/api/commands",
            r#"{"player_id": "42", "command": "upgrade_planet planet_name:Nowhere"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["content"], "You don't have a planet named 'Nowhere'.");
    }

    #[tokio::test]
    async fn test_command_mutation_is_persisted() {
        let tmp = TempDir::new().unwrap();
        let app = build_router(make_state(&tmp, Arc::new(MemoryNotifier::new())), "*");

        let (status, _) = post_json(
            app,
            "/api/commands",
            r#"{"player_id": "42", "command": "add_planet planet_name:Dune level:5 ptype:desert tier:1"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let reloaded = PlayerStore::load(tmp.path().join("players.json")).unwrap();
        let record = reloaded.get("42").unwrap();
        assert_eq!(record.find_by_name("dune"), Some(0));
    }

    #[tokio::test]
    async fn test_command_empty_player_is_bad_request() {
        let tmp = TempDir::new().unwrap();
        let app = build_router(make_state(&tmp, Arc::new(MemoryNotifier::new())), "*");

        let (status, json) = post_json(
            app,
            "/api/commands",
            r#"{"player_id": " ", "command": "test"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_command_malformed_body() {
        let tmp = TempDir::new().unwrap();
        let app = build_router(make_state(&tmp, Arc::new(MemoryNotifier::new())), "*");

        let (status, _) = post_json(app, "/api/commands", r#"{"command": "test"}"#).await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn test_scan_completes_due_upgrades() {
        let tmp = TempDir::new().unwrap();
        let notifier = Arc::new(MemoryNotifier::new());
        let state = make_state(&tmp, notifier.clone());

        // Schedule at epoch zero so the deadline is long past.
        state
            .bot
            .handle_at("42", "add_planet planet_name:Dune level:5 ptype:desert tier:1", 0)
            .await
            .unwrap();
        state
            .bot
            .handle_at("42", "upgrade_planet planet_name:Dune duration:1m", 0)
            .await
            .unwrap();

        let (status, json) = post_json(build_router(state.clone(), "*"), "/api/scan", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["completed"], 1);
        assert_eq!(notifier.sent().len(), 1);

        let (_, json) = post_json(build_router(state, "*"), "/api/scan", "").await;
        assert_eq!(json["completed"], 0);
    }
}
