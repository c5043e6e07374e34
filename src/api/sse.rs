use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use serde::Deserialize;

use crate::domain::repositories::PartyRepository;
use crate::domain::value_objects::QueueSnapshot;
use crate::infrastructure::app_state::{AppState, PartyEvent, PartyEventKind};

#[derive(Deserialize)]
pub struct SseParams {
    #[serde(rename = "partyId")]
    party_id: String,
    /// Joining as a named participant; anonymous displays omit it
    name: Option<String>,
    avatar: Option<String>,
}

/// GET /subscribe?partyId=... - Subscribe to one party room.
///
/// The first event is the full current snapshot, so a late joiner has seen
/// the state it is about to mutate before any of its intents land. After
/// that the stream forwards this party's events only.
pub async fn sse_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SseParams>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let party_id = params.party_id.clone();

    // A named connect doubles as a presence join
    if let Some(name) = params.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        let now = chrono::Utc::now().timestamp();
        let first_join = state.presence.join(&party_id, name, params.avatar.clone(), now);
        if first_join {
            tracing::debug!("New singer '{}' joined party {}", name, party_id);
        }

        let participants = state.presence.active(&party_id, now);
        state.broadcast_event(PartyEvent::new(
            &party_id,
            PartyEventKind::PresenceUpdated { participants },
        ));
    }

    // Authoritative state for the join acknowledgement
    let initial: Option<PartyEvent> = match state.party_repo.find_by_id(&party_id).await {
        Ok(Some(party)) => match state.party_repo.list_items(&party.id).await {
            Ok(items) => Some(PartyEvent::new(
                &party_id,
                PartyEventKind::PlaylistUpdated {
                    snapshot: QueueSnapshot::build(&party, &items),
                },
            )),
            Err(e) => {
                tracing::warn!("Failed to load queue for SSE snapshot: {}", e);
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            tracing::warn!("Failed to load party for SSE snapshot: {}", e);
            None
        }
    };

    // Subscribe to events - use new_receiver() to get an active receiver
    let mut receiver = state.event_sender.new_receiver();
    let participant = params.name.clone();

    let stream = async_stream::stream! {
        tracing::debug!("SSE stream started for party {}", party_id);

        // Join acknowledgement: snapshot first, events after
        if let Some(event) = initial {
            let json = serde_json::to_string(&event).unwrap_or_default();
            yield Ok(Event::default().event("snapshot").data(json));
        } else {
            yield Ok(Event::default()
                .event("error")
                .data(serde_json::json!({
                    "error": "Party not found",
                    "code": "PARTY_NOT_FOUND"
                }).to_string()));
        }

        let mut heartbeat_interval = tokio::time::interval(Duration::from_secs(20));

        loop {
            tokio::select! {
                _ = heartbeat_interval.tick() => {
                    tracing::trace!("SSE heartbeat");
                    // Send heartbeat comment (not a real event)
                    yield Ok(Event::default().comment("heartbeat"));
                }
                result = receiver.recv() => {
                    match result {
                        Ok(event) => {
                            // Room isolation: only this party's events
                            if event.party_id != party_id {
                                continue;
                            }
                            let closing = matches!(event.kind, PartyEventKind::PartyClosed);
                            tracing::debug!("SSE forwarding '{}' to party {}", event.kind.name(), party_id);
                            let json = serde_json::to_string(&event).unwrap_or_default();
                            yield Ok(Event::default().event("event").data(json));
                            if closing {
                                break;
                            }
                        }
                        Err(e) => {
                            tracing::warn!("SSE receiver error: {:?}, closing stream", e);
                            // Channel closed, client reconciles on reconnect
                            break;
                        }
                    }
                }
            }
        }

        if let Some(name) = participant {
            tracing::debug!("SSE stream for '{}' in party {} ended", name, party_id);
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
