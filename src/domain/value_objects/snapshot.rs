use serde::Serialize;

use crate::domain::entities::{Party, PartyStatus, QueueItem};
use crate::domain::services::playback_clock::{self, ClockState};
use crate::domain::services::scheduler;
use crate::domain::value_objects::PartySettings;

/// Authoritative clock fields as broadcast to clients. While playing the
/// displayed countdown is `max(0, remaining - floor((now - startedAt)/1000))`;
/// while paused it is the static remaining value.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockView {
    pub state: ClockState,
    pub current_item_id: Option<String>,
    pub started_at: Option<i64>,
    pub remaining_seconds: Option<i64>,
}

/// Full queue state for one party. Broadcast wholesale after every mutation:
/// idempotent replacement converges every client, unlike delta patches.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSnapshot {
    pub status: PartyStatus,
    pub settings: PartySettings,
    pub current_item: Option<QueueItem>,
    pub unplayed: Vec<QueueItem>,
    pub played: Vec<QueueItem>,
    pub clock: ClockView,
}

impl QueueSnapshot {
    /// Assemble the snapshot from the party record and its queue items.
    /// Deterministic: the unplayed ordering comes straight from the
    /// scheduler over the same inputs every client could use.
    pub fn build(party: &Party, items: &[QueueItem]) -> Self {
        let last_played = scheduler::last_played_singer(items);
        let unplayed = scheduler::order_unplayed(items, last_played.as_deref(), &party.settings);

        let mut played: Vec<QueueItem> =
            items.iter().filter(|i| i.is_played()).cloned().collect();
        played.sort_by_key(|i| (i.played_at, i.added_seq));

        let current_item = party
            .current_item_id
            .as_deref()
            .and_then(|id| items.iter().find(|i| i.id == id))
            .cloned();

        QueueSnapshot {
            status: party.status,
            settings: party.settings.clone(),
            current_item,
            unplayed,
            played,
            clock: ClockView {
                state: playback_clock::clock_state(party),
                current_item_id: party.current_item_id.clone(),
                started_at: party.current_started_at,
                remaining_seconds: party.current_remaining_seconds,
            },
        }
    }
}
