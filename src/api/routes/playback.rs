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
use crate::application::playback::{
    AdvanceQueue, AdvanceQueueError, AdvanceQueueInput, PausePlayback, PausePlaybackError,
    PausePlaybackInput, StartPlayback, StartPlaybackError, StartPlaybackInput,
};
use crate::domain::entities::QueueItem;
use crate::infrastructure::app_state::{PartyEvent, PartyEventKind};

// ============================================================================
// Request/Response DTOs
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct PlayRequest {
    #[serde(rename = "seekSeconds")]
    pub seek_seconds: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdvanceRequest {
    /// Item the caller is skipping; stale values resolve to a no-op
    #[serde(rename = "itemId")]
    pub item_id: Option<String>,
    /// Emit the advisory skip-timer lock before advancing
    #[serde(rename = "skipTimer")]
    pub skip_timer: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct PlayResponse {
    pub success: bool,
    pub applied: bool,
    #[serde(rename = "startedAt")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<i64>,
    #[serde(rename = "remainingSeconds")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct PauseResponse {
    pub success: bool,
    pub applied: bool,
    #[serde(rename = "remainingSeconds")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AdvanceResponse {
    pub success: bool,
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advanced: Option<QueueItem>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /api/playback/:partyId/play - Start/resume/scrub the countdown
pub async fn play(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<HostClaims>,
    Path(party_id): Path<String>,
    body: Option<Json<PlayRequest>>,
) -> Result<Json<PlayResponse>, (StatusCode, Json<ErrorResponse>)> {
    ensure_host_of(&claims, &party_id)?;

    let seek_seconds = body.and_then(|b| b.seek_seconds);

    let _guard = state.party_locks.acquire(&party_id).await;

    let use_case = StartPlayback::new(state.party_repo.clone());
    let result = use_case
        .execute(StartPlaybackInput {
            party_id: party_id.clone(),
            seek_seconds,
        })
        .await;

    match result {
        Ok(output) => {
            state.broadcast_event(PartyEvent::new(
                &party_id,
                PartyEventKind::PlaybackStarted {
                    started_at: output.started_at,
                    remaining_seconds: output.remaining_seconds,
                },
            ));

            Ok(Json(PlayResponse {
                success: true,
                applied: true,
                started_at: Some(output.started_at),
                remaining_seconds: Some(output.remaining_seconds),
            }))
        }
        // Play against the wrong state is silently ignored: no broadcast
        Err(StartPlaybackError::InvalidTransition(_)) | Err(StartPlaybackError::NothingQueued) => {
            Ok(Json(PlayResponse {
                success: true,
                applied: false,
                started_at: None,
                remaining_seconds: None,
            }))
        }
        Err(StartPlaybackError::PartyNotFound) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Party not found", "PARTY_NOT_FOUND")),
        )),
        Err(StartPlaybackError::Repository(e)) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Failed to start playback".to_string(),
                code: "PLAY_ERROR".to_string(),
                details: Some(e.to_string()),
            }),
        )),
    }
}

/// POST /api/playback/:partyId/pause - Freeze the countdown
pub async fn pause(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<HostClaims>,
    Path(party_id): Path<String>,
) -> Result<Json<PauseResponse>, (StatusCode, Json<ErrorResponse>)> {
    ensure_host_of(&claims, &party_id)?;

    let _guard = state.party_locks.acquire(&party_id).await;

    let use_case = PausePlayback::new(state.party_repo.clone());
    let result = use_case
        .execute(PausePlaybackInput {
            party_id: party_id.clone(),
        })
        .await;

    match result {
        Ok(output) => {
            state.broadcast_event(PartyEvent::new(
                &party_id,
                PartyEventKind::PlaybackPaused {
                    remaining_seconds: output.remaining_seconds,
                },
            ));

            Ok(Json(PauseResponse {
                success: true,
                applied: true,
                remaining_seconds: Some(output.remaining_seconds),
            }))
        }
        Err(PausePlaybackError::InvalidTransition(_)) => Ok(Json(PauseResponse {
            success: true,
            applied: false,
            remaining_seconds: None,
        })),
        Err(PausePlaybackError::PartyNotFound) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Party not found", "PARTY_NOT_FOUND")),
        )),
        Err(PausePlaybackError::Repository(e)) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Failed to pause playback".to_string(),
                code: "PAUSE_ERROR".to_string(),
                details: Some(e.to_string()),
            }),
        )),
    }
}

/// POST /api/playback/:partyId/advance - Mark the current turn complete.
/// Open to the room: the player display invokes this when its local
/// countdown hits zero, and any host can skip manually.
pub async fn advance(
    State(state): State<Arc<AppState>>,
    Path(party_id): Path<String>,
    body: Option<Json<AdvanceRequest>>,
) -> Result<Json<AdvanceResponse>, (StatusCode, Json<ErrorResponse>)> {
    let request = body.map(|b| b.0).unwrap_or_default();

    // Advisory UI lock so every surface can grey out its skip buttons while
    // this advance is in flight
    if request.skip_timer.unwrap_or(false) {
        if let Some(item_id) = &request.item_id {
            state.broadcast_event(PartyEvent::new(
                &party_id,
                PartyEventKind::SkipTimerStarted {
                    item_id: item_id.clone(),
                },
            ));
        }
    }

    let _guard = state.party_locks.acquire(&party_id).await;

    let use_case = AdvanceQueue::new(state.party_repo.clone());
    let result = match use_case
        .execute(AdvanceQueueInput {
            party_id: party_id.clone(),
            expected_item_id: request.item_id,
        })
        .await
    {
        Ok(result) => result,
        // A vanished party is ignored for advance, not an error
        Err(AdvanceQueueError::PartyNotFound) => {
            return Ok(Json(AdvanceResponse {
                success: true,
                applied: false,
                advanced: None,
            }))
        }
        Err(AdvanceQueueError::Repository(e)) => {
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to advance queue".to_string(),
                    code: "ADVANCE_ERROR".to_string(),
                    details: Some(e.to_string()),
                }),
            ))
        }
    };

    if result.applied {
        state.broadcast_event(PartyEvent::new(
            &party_id,
            PartyEventKind::PlaylistUpdated {
                snapshot: result.snapshot,
            },
        ));
    }

    Ok(Json(AdvanceResponse {
        success: true,
        applied: result.applied,
        advanced: result.advanced,
    }))
}
