use std::sync::Arc;

use crate::domain::entities::Party;
use crate::domain::repositories::{PartyRepository, RepositoryError};
use crate::domain::services::{playback_clock, scheduler};
use crate::domain::value_objects::QueueSnapshot;

/// Start playback input
pub struct StartPlaybackInput {
    pub party_id: String,
    /// Scrub: restart the countdown this many seconds into the item
    pub seek_seconds: Option<f64>,
}

/// Start playback output
pub struct StartPlaybackOutput {
    pub party: Party,
    pub snapshot: QueueSnapshot,
    pub started_at: i64,
    pub remaining_seconds: i64,
}

/// Start playback use case: recompute the scheduler head and start (or
/// resume, or scrub) its countdown.
pub struct StartPlayback<P: PartyRepository> {
    party_repo: Arc<P>,
}

impl<P: PartyRepository> StartPlayback<P> {
    pub fn new(party_repo: Arc<P>) -> Self {
        Self { party_repo }
    }

    pub async fn execute(
        &self,
        input: StartPlaybackInput,
    ) -> Result<StartPlaybackOutput, StartPlaybackError> {
        let mut party = self
            .party_repo
            .find_by_id(&input.party_id)
            .await?
            .ok_or(StartPlaybackError::PartyNotFound)?;

        let items = self.party_repo.list_items(&party.id).await?;
        let last_played = scheduler::last_played_singer(&items);
        let head = scheduler::head(&items, last_played.as_deref(), &party.settings)
            .ok_or(StartPlaybackError::NothingQueued)?;

        let now_ms = chrono::Utc::now().timestamp_millis();
        playback_clock::play(&mut party, &head, input.seek_seconds, now_ms)?;
        self.party_repo.save(&party).await?;

        let started_at = party.current_started_at.unwrap_or(now_ms);
        let remaining_seconds = party.current_remaining_seconds.unwrap_or(0);
        let snapshot = QueueSnapshot::build(&party, &items);

        Ok(StartPlaybackOutput {
            party,
            snapshot,
            started_at,
            remaining_seconds,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StartPlaybackError {
    #[error("Party not found")]
    PartyNotFound,
    #[error("No unplayed item is ready")]
    NothingQueued,
    #[error(transparent)]
    InvalidTransition(#[from] playback_clock::ClockError),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
