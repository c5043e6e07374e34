use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::HostClaims;
use crate::api::routes::{ensure_host_of, ErrorResponse};
use crate::api::AppState;
use crate::application::queue::{
    AddItem, AddItemError, AddItemInput, RemoveItem, RemoveItemError, RemoveItemInput,
    RemoveRequester, ReorderQueue, ReorderQueueError, ReorderQueueInput, SubmittedSong,
    TogglePriority, TogglePriorityError, TogglePriorityInput,
};
use crate::domain::entities::QueueItem;
use crate::domain::value_objects::QueueSnapshot;
use crate::infrastructure::app_state::{PartyEvent, PartyEventKind};

// ============================================================================
// Request/Response DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    #[serde(rename = "singerName")]
    pub singer_name: String,
    /// Free-text search against the catalog
    pub query: Option<String>,
    /// Already-resolved song reference
    pub song: Option<SubmittedSongDto>,
}

#[derive(Debug, Deserialize)]
pub struct SubmittedSongDto {
    pub title: String,
    #[serde(rename = "coverUrl")]
    pub cover_url: Option<String>,
    /// Compact ISO-8601 duration as handed back by the catalog
    pub duration: Option<String>,
    #[serde(rename = "durationSeconds")]
    pub duration_seconds: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RemoveItemRequest {
    #[serde(rename = "singerName")]
    pub singer_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub order: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct TogglePriorityRequest {
    #[serde(rename = "isPriority")]
    pub is_priority: bool,
}

#[derive(Debug, Serialize)]
pub struct AddItemResponse {
    pub success: bool,
    pub item: QueueItem,
    pub snapshot: QueueSnapshot,
}

#[derive(Debug, Serialize)]
pub struct QueueMutationResponse {
    pub success: bool,
    pub applied: bool,
    pub snapshot: QueueSnapshot,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /api/queue/:partyId/items - Submit a song
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    Path(party_id): Path<String>,
    Json(body): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<AddItemResponse>), (StatusCode, Json<ErrorResponse>)> {
    let _guard = state.party_locks.acquire(&party_id).await;

    let use_case = AddItem::new(
        state.party_repo.clone(),
        state.resolver.clone(),
        state.fallback_bounds,
    );
    let result = use_case
        .execute(AddItemInput {
            party_id: party_id.clone(),
            singer_name: body.singer_name,
            query: body.query,
            song: body.song.map(|s| SubmittedSong {
                title: s.title,
                cover_url: s.cover_url,
                duration_encoded: s.duration,
                duration_seconds: s.duration_seconds,
            }),
        })
        .await
        .map_err(|e| match e {
            AddItemError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(msg, "INVALID_SUBMISSION")),
            ),
            AddItemError::PartyNotFound => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("Party not found", "PARTY_NOT_FOUND")),
            ),
            AddItemError::PartyClosed => (
                StatusCode::CONFLICT,
                Json(ErrorResponse::new("Party is closed", "PARTY_CLOSED")),
            ),
            AddItemError::Repository(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to add song".to_string(),
                    code: "ADD_ITEM_ERROR".to_string(),
                    details: Some(e.to_string()),
                }),
            ),
        })?;

    state.broadcast_event(PartyEvent::new(
        &party_id,
        PartyEventKind::PlaylistUpdated {
            snapshot: result.snapshot.clone(),
        },
    ));

    Ok((
        StatusCode::CREATED,
        Json(AddItemResponse {
            success: true,
            item: result.item,
            snapshot: result.snapshot,
        }),
    ))
}

/// DELETE /api/queue/:partyId/items/:itemId - Withdraw an unplayed song.
/// A host token removes anything; otherwise the body's singerName must own
/// the item.
pub async fn remove_item(
    State(state): State<Arc<AppState>>,
    claims: Option<Extension<HostClaims>>,
    Path((party_id, item_id)): Path<(String, String)>,
    body: Option<Json<RemoveItemRequest>>,
) -> Result<Json<QueueMutationResponse>, (StatusCode, Json<ErrorResponse>)> {
    let requester = match claims {
        Some(Extension(claims)) if claims.party_id == party_id => RemoveRequester::Host,
        _ => {
            let singer = body
                .and_then(|b| b.singer_name.clone())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());
            match singer {
                Some(name) => RemoveRequester::Singer(name),
                None => {
                    return Err((
                        StatusCode::BAD_REQUEST,
                        Json(ErrorResponse::new(
                            "singerName is required without a host token",
                            "MISSING_SINGER_NAME",
                        )),
                    ))
                }
            }
        }
    };

    let _guard = state.party_locks.acquire(&party_id).await;

    let use_case = RemoveItem::new(state.party_repo.clone());
    let result = use_case
        .execute(RemoveItemInput {
            party_id: party_id.clone(),
            item_id,
            requester,
        })
        .await
        .map_err(|e| match e {
            RemoveItemError::PartyNotFound => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("Party not found", "PARTY_NOT_FOUND")),
            ),
            RemoveItemError::ItemNotFound => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("Queue item not found", "ITEM_NOT_FOUND")),
            ),
            RemoveItemError::PartyClosed => (
                StatusCode::CONFLICT,
                Json(ErrorResponse::new("Party is closed", "PARTY_CLOSED")),
            ),
            RemoveItemError::AlreadyPlayed => (
                StatusCode::CONFLICT,
                Json(ErrorResponse::new(
                    "Item has already been played",
                    "ITEM_ALREADY_PLAYED",
                )),
            ),
            RemoveItemError::NotOwner => (
                StatusCode::FORBIDDEN,
                Json(ErrorResponse::new(
                    "Only the submitting singer or the host can remove this item",
                    "NOT_ITEM_OWNER",
                )),
            ),
            RemoveItemError::Repository(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to remove song".to_string(),
                    code: "REMOVE_ITEM_ERROR".to_string(),
                    details: Some(e.to_string()),
                }),
            ),
        })?;

    state.broadcast_event(PartyEvent::new(
        &party_id,
        PartyEventKind::PlaylistUpdated {
            snapshot: result.snapshot.clone(),
        },
    ));

    Ok(Json(QueueMutationResponse {
        success: true,
        applied: true,
        snapshot: result.snapshot,
    }))
}

/// POST /api/queue/:partyId/reorder - Apply a host permutation (manual mode)
pub async fn reorder_queue(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<HostClaims>,
    Path(party_id): Path<String>,
    Json(body): Json<ReorderRequest>,
) -> Result<Json<QueueMutationResponse>, (StatusCode, Json<ErrorResponse>)> {
    ensure_host_of(&claims, &party_id)?;

    let _guard = state.party_locks.acquire(&party_id).await;

    let use_case = ReorderQueue::new(state.party_repo.clone());
    let result = use_case
        .execute(ReorderQueueInput {
            party_id: party_id.clone(),
            order: body.order,
        })
        .await
        .map_err(|e| match e {
            ReorderQueueError::PartyNotFound => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("Party not found", "PARTY_NOT_FOUND")),
            ),
            ReorderQueueError::PartyClosed => (
                StatusCode::CONFLICT,
                Json(ErrorResponse::new("Party is closed", "PARTY_CLOSED")),
            ),
            ReorderQueueError::UnknownItem(id) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(
                    format!("Unknown or played item in order: {}", id),
                    "INVALID_ORDER",
                )),
            ),
            ReorderQueueError::DuplicateItem(id) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(
                    format!("Duplicate item in order: {}", id),
                    "INVALID_ORDER",
                )),
            ),
            ReorderQueueError::Repository(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to reorder queue".to_string(),
                    code: "REORDER_ERROR".to_string(),
                    details: Some(e.to_string()),
                }),
            ),
        })?;

    if result.applied {
        state.broadcast_event(PartyEvent::new(
            &party_id,
            PartyEventKind::PlaylistUpdated {
                snapshot: result.snapshot.clone(),
            },
        ));
    }

    Ok(Json(QueueMutationResponse {
        success: true,
        applied: result.applied,
        snapshot: result.snapshot,
    }))
}

/// POST /api/queue/:partyId/items/:itemId/priority - Jump-queue flag
pub async fn toggle_priority(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<HostClaims>,
    Path((party_id, item_id)): Path<(String, String)>,
    Json(body): Json<TogglePriorityRequest>,
) -> Result<Json<QueueMutationResponse>, (StatusCode, Json<ErrorResponse>)> {
    ensure_host_of(&claims, &party_id)?;

    let _guard = state.party_locks.acquire(&party_id).await;

    let use_case = TogglePriority::new(state.party_repo.clone());
    let result = use_case
        .execute(TogglePriorityInput {
            party_id: party_id.clone(),
            item_id,
            is_priority: body.is_priority,
        })
        .await
        .map_err(|e| match e {
            TogglePriorityError::PartyNotFound => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("Party not found", "PARTY_NOT_FOUND")),
            ),
            TogglePriorityError::ItemNotFound => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("Queue item not found", "ITEM_NOT_FOUND")),
            ),
            TogglePriorityError::PartyClosed => (
                StatusCode::CONFLICT,
                Json(ErrorResponse::new("Party is closed", "PARTY_CLOSED")),
            ),
            TogglePriorityError::AlreadyPlayed => (
                StatusCode::CONFLICT,
                Json(ErrorResponse::new(
                    "Item has already been played",
                    "ITEM_ALREADY_PLAYED",
                )),
            ),
            TogglePriorityError::Repository(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to update priority".to_string(),
                    code: "PRIORITY_ERROR".to_string(),
                    details: Some(e.to_string()),
                }),
            ),
        })?;

    state.broadcast_event(PartyEvent::new(
        &party_id,
        PartyEventKind::PlaylistUpdated {
            snapshot: result.snapshot.clone(),
        },
    ));

    Ok(Json(QueueMutationResponse {
        success: true,
        applied: true,
        snapshot: result.snapshot,
    }))
}
