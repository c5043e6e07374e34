use std::sync::Arc;

use crate::domain::entities::Party;
use crate::domain::repositories::{PartyRepository, RepositoryError};
use crate::domain::services::playback_clock;
use crate::domain::value_objects::QueueSnapshot;

/// Pause playback input
pub struct PausePlaybackInput {
    pub party_id: String,
}

/// Pause playback output
pub struct PausePlaybackOutput {
    pub party: Party,
    pub snapshot: QueueSnapshot,
    pub remaining_seconds: i64,
}

/// Pause playback use case: freeze the countdown at whole-second precision.
pub struct PausePlayback<P: PartyRepository> {
    party_repo: Arc<P>,
}

impl<P: PartyRepository> PausePlayback<P> {
    pub fn new(party_repo: Arc<P>) -> Self {
        Self { party_repo }
    }

    pub async fn execute(
        &self,
        input: PausePlaybackInput,
    ) -> Result<PausePlaybackOutput, PausePlaybackError> {
        let mut party = self
            .party_repo
            .find_by_id(&input.party_id)
            .await?
            .ok_or(PausePlaybackError::PartyNotFound)?;

        let now_ms = chrono::Utc::now().timestamp_millis();
        let remaining_seconds = playback_clock::pause(&mut party, now_ms)?;
        self.party_repo.save(&party).await?;

        let items = self.party_repo.list_items(&party.id).await?;
        let snapshot = QueueSnapshot::build(&party, &items);

        Ok(PausePlaybackOutput {
            party,
            snapshot,
            remaining_seconds,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PausePlaybackError {
    #[error("Party not found")]
    PartyNotFound,
    #[error(transparent)]
    InvalidTransition(#[from] playback_clock::ClockError),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
