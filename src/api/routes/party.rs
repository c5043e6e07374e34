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
use crate::application::party::{
    CloseParty, ClosePartyError, ClosePartyInput, CreateParty, CreatePartyError, CreatePartyInput,
    GetPartyDetails, GetPartyDetailsError, GetPartyDetailsInput, Intermission, IntermissionError,
    IntermissionInput, JoinParty, JoinPartyError, JoinPartyInput, SettingChange, StartParty,
    StartPartyError, StartPartyInput, UpdateSettings, UpdateSettingsError, UpdateSettingsInput,
};
use crate::domain::entities::Party;
use crate::domain::value_objects::{PartySettings, QueueSnapshot};
use crate::infrastructure::app_state::{PartyEvent, PartyEventKind};

/// Convert timestamp to ISO 8601 string
fn timestamp_to_rfc3339(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| "1970-01-01T00:00:00Z".to_string())
}

// ============================================================================
// Request/Response DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreatePartyRequest {
    pub name: String,
    #[serde(rename = "hostName")]
    pub host_name: String,
    pub settings: Option<PartySettingsDto>,
}

#[derive(Debug, Deserialize)]
pub struct PartySettingsDto {
    #[serde(rename = "fairnessEnabled")]
    pub fairness_enabled: Option<bool>,
    #[serde(rename = "playbackDisabled")]
    pub playback_disabled: Option<bool>,
    #[serde(rename = "manualOrder")]
    pub manual_order: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct JoinPartyRequest {
    pub name: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HeartbeatRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SetFairnessRequest {
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetPlaybackDisabledRequest {
    pub disabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetManualOrderRequest {
    pub enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct PartyResponse {
    pub id: String,
    pub name: String,
    #[serde(rename = "hostName")]
    pub host_name: String,
    #[serde(rename = "joinCode")]
    pub join_code: String,
    pub status: String,
    pub settings: PartySettings,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl PartyResponse {
    fn from_party(party: &Party) -> Self {
        Self {
            id: party.id.clone(),
            name: party.name.clone(),
            host_name: party.host_name.clone(),
            join_code: party.join_code.clone(),
            status: party.status.as_str().to_string(),
            settings: party.settings.clone(),
            created_at: timestamp_to_rfc3339(party.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatePartyResponse {
    pub success: bool,
    pub party: PartyResponse,
    #[serde(rename = "hostToken")]
    pub host_token: String,
}

#[derive(Debug, Serialize)]
pub struct PartyDetailsResponse {
    pub success: bool,
    pub party: PartyResponse,
    pub snapshot: QueueSnapshot,
}

#[derive(Debug, Serialize)]
pub struct JoinPartyResponse {
    pub success: bool,
    pub party: PartyResponse,
    pub snapshot: QueueSnapshot,
    #[serde(rename = "firstJoin")]
    pub first_join: bool,
}

#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub success: bool,
    pub applied: bool,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /api/party - Create a new party
pub async fn create_party(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreatePartyRequest>,
) -> Result<(StatusCode, Json<CreatePartyResponse>), (StatusCode, Json<ErrorResponse>)> {
    let settings = body
        .settings
        .map(|s| PartySettings {
            fairness_enabled: s.fairness_enabled.unwrap_or(true),
            playback_disabled: s.playback_disabled.unwrap_or(false),
            manual_order: s.manual_order.unwrap_or(false),
        })
        .unwrap_or_default();

    let use_case = CreateParty::new(state.party_repo.clone());
    let result = use_case
        .execute(CreatePartyInput {
            name: body.name,
            host_name: body.host_name,
            settings,
        })
        .await
        .map_err(|e| match e {
            CreatePartyError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(msg, "INVALID_PARTY")),
            ),
            CreatePartyError::Repository(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to create party".to_string(),
                    code: "CREATE_PARTY_ERROR".to_string(),
                    details: Some(e.to_string()),
                }),
            ),
        })?;

    let party = result.party;

    // The creator is the first participant and the party's host
    let now = chrono::Utc::now().timestamp();
    state.presence.join(&party.id, &party.host_name, None, now);
    state.presence.mark_host(&party.id, &party.host_name);

    let host_token = state
        .jwt_service
        .sign(&party.id, &party.host_name)
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to sign host token".to_string(),
                    code: "TOKEN_ERROR".to_string(),
                    details: Some(e.to_string()),
                }),
            )
        })?;

    Ok((
        StatusCode::CREATED,
        Json(CreatePartyResponse {
            success: true,
            party: PartyResponse::from_party(&party),
            host_token,
        }),
    ))
}

/// GET /api/party/code/:joinCode - Resolve a join code to its party
pub async fn resolve_join_code(
    State(state): State<Arc<AppState>>,
    Path(join_code): Path<String>,
) -> Result<Json<PartyDetailsResponse>, (StatusCode, Json<ErrorResponse>)> {
    use crate::domain::repositories::PartyRepository;

    let party = state
        .party_repo
        .find_by_join_code(join_code.trim().to_uppercase().as_str())
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to look up join code".to_string(),
                    code: "JOIN_CODE_ERROR".to_string(),
                    details: Some(e.to_string()),
                }),
            )
        })?
        .ok_or((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Unknown join code", "JOIN_CODE_NOT_FOUND")),
        ))?;

    get_party_details(State(state), Path(party.id)).await
}

/// GET /api/party/:partyId - Get party details and the current snapshot
pub async fn get_party_details(
    State(state): State<Arc<AppState>>,
    Path(party_id): Path<String>,
) -> Result<Json<PartyDetailsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let use_case = GetPartyDetails::new(state.party_repo.clone());
    let result = use_case
        .execute(GetPartyDetailsInput { party_id })
        .await
        .map_err(|e| match e {
            GetPartyDetailsError::PartyNotFound => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("Party not found", "PARTY_NOT_FOUND")),
            ),
            GetPartyDetailsError::Repository(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to get party".to_string(),
                    code: "GET_PARTY_ERROR".to_string(),
                    details: Some(e.to_string()),
                }),
            ),
        })?;

    Ok(Json(PartyDetailsResponse {
        success: true,
        party: PartyResponse::from_party(&result.party),
        snapshot: result.snapshot,
    }))
}

/// POST /api/party/:partyId/join - Join a party as a guest
pub async fn join_party(
    State(state): State<Arc<AppState>>,
    Path(party_id): Path<String>,
    Json(body): Json<JoinPartyRequest>,
) -> Result<Json<JoinPartyResponse>, (StatusCode, Json<ErrorResponse>)> {
    let use_case = JoinParty::new(state.party_repo.clone());
    let result = use_case
        .execute(JoinPartyInput {
            party_id: party_id.clone(),
            name: body.name.clone(),
        })
        .await
        .map_err(|e| match e {
            JoinPartyError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(msg, "INVALID_JOIN")),
            ),
            JoinPartyError::PartyNotFound => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("Party not found", "PARTY_NOT_FOUND")),
            ),
            JoinPartyError::PartyClosed => (
                StatusCode::CONFLICT,
                Json(ErrorResponse::new("Party is closed", "PARTY_CLOSED")),
            ),
            JoinPartyError::Repository(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to join party".to_string(),
                    code: "JOIN_PARTY_ERROR".to_string(),
                    details: Some(e.to_string()),
                }),
            ),
        })?;

    let now = chrono::Utc::now().timestamp();
    let first_join = state
        .presence
        .join(&party_id, body.name.trim(), body.avatar, now);

    let participants = state.presence.active(&party_id, now);
    state.broadcast_event(PartyEvent::new(
        &party_id,
        PartyEventKind::PresenceUpdated { participants },
    ));

    Ok(Json(JoinPartyResponse {
        success: true,
        party: PartyResponse::from_party(&result.party),
        snapshot: result.snapshot,
        first_join,
    }))
}

/// POST /api/party/:partyId/heartbeat - Refresh a participant's last-seen.
/// Fire-and-forget: a heartbeat for a vanished party is inert.
pub async fn heartbeat(
    State(state): State<Arc<AppState>>,
    Path(party_id): Path<String>,
    Json(body): Json<HeartbeatRequest>,
) -> Json<AckResponse> {
    let now = chrono::Utc::now().timestamp();
    state.presence.heartbeat(&party_id, body.name.trim(), now);

    Json(AckResponse {
        success: true,
        applied: true,
    })
}

/// POST /api/party/:partyId/start - Open -> Started
pub async fn start_party(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<HostClaims>,
    Path(party_id): Path<String>,
) -> Result<Json<AckResponse>, (StatusCode, Json<ErrorResponse>)> {
    ensure_host_of(&claims, &party_id)?;

    let _guard = state.party_locks.acquire(&party_id).await;

    let use_case = StartParty::new(state.party_repo.clone());
    let result = use_case
        .execute(StartPartyInput {
            party_id: party_id.clone(),
        })
        .await
        .map_err(|e| match e {
            StartPartyError::PartyNotFound => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("Party not found", "PARTY_NOT_FOUND")),
            ),
            StartPartyError::Repository(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to start party".to_string(),
                    code: "START_PARTY_ERROR".to_string(),
                    details: Some(e.to_string()),
                }),
            ),
        })?;

    if result.applied {
        state.broadcast_event(PartyEvent::new(
            &party_id,
            PartyEventKind::PlaylistUpdated {
                snapshot: result.snapshot,
            },
        ));
    }

    Ok(Json(AckResponse {
        success: true,
        applied: result.applied,
    }))
}

/// POST /api/party/:partyId/intermission - Started -> Open, clock cleared
pub async fn intermission(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<HostClaims>,
    Path(party_id): Path<String>,
) -> Result<Json<AckResponse>, (StatusCode, Json<ErrorResponse>)> {
    ensure_host_of(&claims, &party_id)?;

    let _guard = state.party_locks.acquire(&party_id).await;

    let use_case = Intermission::new(state.party_repo.clone());
    let result = use_case
        .execute(IntermissionInput {
            party_id: party_id.clone(),
        })
        .await
        .map_err(|e| match e {
            IntermissionError::PartyNotFound => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("Party not found", "PARTY_NOT_FOUND")),
            ),
            IntermissionError::Repository(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to pause party".to_string(),
                    code: "INTERMISSION_ERROR".to_string(),
                    details: Some(e.to_string()),
                }),
            ),
        })?;

    if result.applied {
        state.broadcast_event(PartyEvent::new(
            &party_id,
            PartyEventKind::PlaylistUpdated {
                snapshot: result.snapshot,
            },
        ));
    }

    Ok(Json(AckResponse {
        success: true,
        applied: result.applied,
    }))
}

/// POST /api/party/:partyId/close - Terminal transition
pub async fn close_party(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<HostClaims>,
    Path(party_id): Path<String>,
) -> Result<Json<AckResponse>, (StatusCode, Json<ErrorResponse>)> {
    ensure_host_of(&claims, &party_id)?;

    let _guard = state.party_locks.acquire(&party_id).await;

    let use_case = CloseParty::new(state.party_repo.clone());
    let result = use_case
        .execute(ClosePartyInput {
            party_id: party_id.clone(),
        })
        .await
        .map_err(|e| match e {
            ClosePartyError::PartyNotFound => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("Party not found", "PARTY_NOT_FOUND")),
            ),
            ClosePartyError::Repository(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to close party".to_string(),
                    code: "CLOSE_PARTY_ERROR".to_string(),
                    details: Some(e.to_string()),
                }),
            ),
        })?;

    if result.applied {
        state.broadcast_event(PartyEvent::new(&party_id, PartyEventKind::PartyClosed));
        state.presence.remove_party(&party_id);
    }

    drop(_guard);
    if result.applied {
        state.party_locks.remove(&party_id).await;
    }

    Ok(Json(AckResponse {
        success: true,
        applied: result.applied,
    }))
}

/// POST /api/party/:partyId/settings/fairness
pub async fn set_fairness(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<HostClaims>,
    Path(party_id): Path<String>,
    Json(body): Json<SetFairnessRequest>,
) -> Result<Json<AckResponse>, (StatusCode, Json<ErrorResponse>)> {
    apply_setting(&state, &claims, &party_id, SettingChange::Fairness(body.enabled)).await
}

/// POST /api/party/:partyId/settings/playback
pub async fn set_playback_disabled(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<HostClaims>,
    Path(party_id): Path<String>,
    Json(body): Json<SetPlaybackDisabledRequest>,
) -> Result<Json<AckResponse>, (StatusCode, Json<ErrorResponse>)> {
    apply_setting(
        &state,
        &claims,
        &party_id,
        SettingChange::PlaybackDisabled(body.disabled),
    )
    .await
}

/// POST /api/party/:partyId/settings/manualOrder
pub async fn set_manual_order(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<HostClaims>,
    Path(party_id): Path<String>,
    Json(body): Json<SetManualOrderRequest>,
) -> Result<Json<AckResponse>, (StatusCode, Json<ErrorResponse>)> {
    apply_setting(
        &state,
        &claims,
        &party_id,
        SettingChange::ManualOrder(body.enabled),
    )
    .await
}

async fn apply_setting(
    state: &Arc<AppState>,
    claims: &HostClaims,
    party_id: &str,
    change: SettingChange,
) -> Result<Json<AckResponse>, (StatusCode, Json<ErrorResponse>)> {
    ensure_host_of(claims, party_id)?;

    let _guard = state.party_locks.acquire(party_id).await;

    let use_case = UpdateSettings::new(state.party_repo.clone());
    let result = use_case
        .execute(UpdateSettingsInput {
            party_id: party_id.to_string(),
            change,
        })
        .await
        .map_err(|e| match e {
            UpdateSettingsError::PartyNotFound => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("Party not found", "PARTY_NOT_FOUND")),
            ),
            UpdateSettingsError::Repository(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to update settings".to_string(),
                    code: "UPDATE_SETTINGS_ERROR".to_string(),
                    details: Some(e.to_string()),
                }),
            ),
        })?;

    if result.applied {
        state.broadcast_event(PartyEvent::new(
            party_id,
            PartyEventKind::PlaylistUpdated {
                snapshot: result.snapshot,
            },
        ));
    }

    Ok(Json(AckResponse {
        success: true,
        applied: result.applied,
    }))
}
