use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Serialize;

use crate::api::AppState;
use crate::domain::entities::Participant;

#[derive(Debug, Serialize)]
pub struct ActiveParticipantsResponse {
    pub success: bool,
    pub participants: Vec<Participant>,
    pub count: usize,
}

/// GET /api/players/:partyId - Participants seen within the liveness window
pub async fn get_active_participants(
    State(state): State<Arc<AppState>>,
    Path(party_id): Path<String>,
) -> Json<ActiveParticipantsResponse> {
    let now = chrono::Utc::now().timestamp();
    let participants = state.presence.active(&party_id, now);
    let count = participants.len();

    Json(ActiveParticipantsResponse {
        success: true,
        participants,
        count,
    })
}
