pub mod health;
pub mod party;
pub mod playback;
pub mod players;
pub mod queue;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::Serialize;

use crate::api::middleware::{host_auth_middleware, optional_host_middleware, HostClaims};
use crate::api::AppState;

/// Error body shared by every route
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: &str) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
            details: None,
        }
    }
}

/// Reject a host token minted for a different party
pub(crate) fn ensure_host_of(
    claims: &HostClaims,
    party_id: &str,
) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    if claims.party_id != party_id {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new(
                "Host token does not match this party",
                "NOT_PARTY_HOST",
            )),
        ));
    }
    Ok(())
}

/// Create the main API router
pub fn create_api_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .nest("/party", create_party_router(state.clone()))
        .nest("/queue", create_queue_router(state.clone()))
        .nest("/playback", create_playback_router(state.clone()))
        .route("/players/:partyId", get(players::get_active_participants))
        .route("/health", get(health::health_handler))
        .with_state(state)
}

/// Create party router
fn create_party_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        // Public routes
        .route("/", post(party::create_party))
        .route("/code/:joinCode", get(party::resolve_join_code))
        .route("/:partyId", get(party::get_party_details))
        .route("/:partyId/join", post(party::join_party))
        .route("/:partyId/heartbeat", post(party::heartbeat))
        // Host-only routes
        .route(
            "/:partyId/start",
            post(party::start_party).layer(middleware::from_fn_with_state(
                state.clone(),
                host_auth_middleware,
            )),
        )
        .route(
            "/:partyId/intermission",
            post(party::intermission).layer(middleware::from_fn_with_state(
                state.clone(),
                host_auth_middleware,
            )),
        )
        .route(
            "/:partyId/close",
            post(party::close_party).layer(middleware::from_fn_with_state(
                state.clone(),
                host_auth_middleware,
            )),
        )
        .route(
            "/:partyId/settings/fairness",
            post(party::set_fairness).layer(middleware::from_fn_with_state(
                state.clone(),
                host_auth_middleware,
            )),
        )
        .route(
            "/:partyId/settings/playback",
            post(party::set_playback_disabled).layer(middleware::from_fn_with_state(
                state.clone(),
                host_auth_middleware,
            )),
        )
        .route(
            "/:partyId/settings/manualOrder",
            post(party::set_manual_order).layer(middleware::from_fn_with_state(
                state.clone(),
                host_auth_middleware,
            )),
        )
        .with_state(state)
}

/// Create queue router
fn create_queue_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/:partyId/items", post(queue::add_item))
        // Optional auth: a host token widens removal beyond the singer's own items
        .route(
            "/:partyId/items/:itemId",
            delete(queue::remove_item).layer(middleware::from_fn_with_state(
                state.clone(),
                optional_host_middleware,
            )),
        )
        .route(
            "/:partyId/reorder",
            post(queue::reorder_queue).layer(middleware::from_fn_with_state(
                state.clone(),
                host_auth_middleware,
            )),
        )
        .route(
            "/:partyId/items/:itemId/priority",
            post(queue::toggle_priority).layer(middleware::from_fn_with_state(
                state.clone(),
                host_auth_middleware,
            )),
        )
        .with_state(state)
}

/// Create playback router
fn create_playback_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/:partyId/play",
            post(playback::play).layer(middleware::from_fn_with_state(
                state.clone(),
                host_auth_middleware,
            )),
        )
        .route(
            "/:partyId/pause",
            post(playback::pause).layer(middleware::from_fn_with_state(
                state.clone(),
                host_auth_middleware,
            )),
        )
        // Open to the room: the designated player display auto-advances
        .route("/:partyId/advance", post(playback::advance))
        .with_state(state)
}
