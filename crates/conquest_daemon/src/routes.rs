use crate::state::{now_ms, AppState};
use axum::{
    extract::{Path, State},
    http::{header, Method, StatusCode},
    response::{
        sse::{Event, Sse},
        Json,
    },
    routing::{get, post},
    Router,
};
use conquest_core::{GameId, UserId};
use conquest_store::UserRecord;
use rand::Rng;
use serde::Deserialize;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[cfg(test)]
pub fn make_router(state: AppState) -> Router {
    make_router_with_cors(state, "http://localhost:5173")
}

pub fn make_router_with_cors(state: AppState, cors_origin: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin.parse::<axum::http::HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route(
            "/api/v1/games",
            post(create_game_handler).get(list_games_handler),
        )
        .route("/api/v1/games/:id/meta", get(meta_handler))
        .route("/api/v1/games/:id/snapshot", get(snapshot_handler))
        .route("/api/v1/users/:id", get(user_handler))
        .route("/api/v1/stream", get(stream_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Deserialize)]
pub struct CreateGameRequest {
    pub users: Vec<String>,
}

pub async fn create_game_handler(
    State(app_state): State<AppState>,
    Json(req): Json<CreateGameRequest>,
) -> (StatusCode, Json<serde_json::Value>) {
    let roster: Vec<UserId> = req.users.iter().map(|u| UserId(u.clone())).collect();

    let built = {
        let mut rng = app_state.id_rng.lock();
        let game_id = conquest_world::new_game_id(&mut *rng);
        let seed = rng.gen::<u64>();
        conquest_world::build_initial_state(
            game_id,
            &roster,
            app_state.map_radius,
            seed,
            app_state.ticker.constants(),
            &mut *rng,
        )
    };

    let state = match built {
        Ok(state) => state,
        Err(err) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": err.to_string()})),
            );
        }
    };

    // Mint stat records for first-time users; returning users keep theirs.
    for user in &roster {
        if app_state.store.get_user(user).is_none() {
            app_state
                .store
                .insert_user(UserRecord::new(user.clone(), &user.0));
        }
    }

    let game_id = state.meta.id.clone();
    app_state.store.commit_game(state);
    app_state.ticker.start_game_tick(&game_id, now_ms());
    tracing::info!(game = %game_id, players = roster.len(), "match created");

    (
        StatusCode::OK,
        Json(serde_json::json!({"game_id": game_id.0})),
    )
}

pub async fn list_games_handler(State(app_state): State<AppState>) -> Json<serde_json::Value> {
    let ids: Vec<String> = app_state
        .store
        .game_ids()
        .into_iter()
        .map(|id| id.0)
        .collect();
    Json(serde_json::json!({ "games": ids }))
}

pub async fn meta_handler(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> (StatusCode, Json<serde_json::Value>) {
    let Some(state) = app_state.store.load_game(&GameId(id)) else {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "unknown game"})),
        );
    };
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "id": state.meta.id.0,
            "status": state.meta.status,
            "tick": state.meta.current_tick,
            "seed": state.meta.seed,
            "schema_version": state.meta.schema_version,
            "last_tick_at_ms": state.meta.last_tick_at_ms,
        })),
    )
}

pub async fn snapshot_handler(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let Some(state) = app_state.store.load_game(&GameId(id)) else {
        return (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "application/json")],
            r#"{"error":"unknown game"}"#.to_string(),
        );
    };
    match serde_json::to_string(&state) {
        Ok(json) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            json,
        ),
        Err(err) => {
            tracing::error!("snapshot serialization failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "application/json")],
                r#"{"error":"serialization failed"}"#.to_string(),
            )
        }
    }
}

pub async fn user_handler(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> (StatusCode, Json<serde_json::Value>) {
    match app_state.store.get_user(&UserId(id)) {
        Some(user) => (StatusCode::OK, Json(serde_json::json!(user))),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "unknown user"})),
        ),
    }
}

pub async fn stream_handler(
    State(app_state): State<AppState>,
) -> Sse<impl futures_core::Stream<Item = Result<Event, Infallible>>> {
    let mut rx = app_state.event_tx.subscribe();
    let store = app_state.store.clone();

    let stream = async_stream::stream! {
        loop {
            tokio::select! {
                result = rx.recv() => {
                    match result {
                        Ok(events) if !events.is_empty() => {
                            let data = serde_json::to_string(&events).unwrap_or_default();
                            yield Ok(Event::default().data(data));
                        }
                        Ok(_) => {}
                        Err(broadcast::error::RecvError::Lagged(_)) => {}
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
                _ = tokio::time::sleep(Duration::from_secs(5)) => {
                    let games = store.game_ids().len();
                    let heartbeat = serde_json::json!({"heartbeat": true, "games": games});
                    yield Ok(Event::default().data(heartbeat.to_string()));
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("ping"),
    )
}
