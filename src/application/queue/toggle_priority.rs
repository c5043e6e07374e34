use std::sync::Arc;

use crate::application::reconcile_and_snapshot;
use crate::domain::entities::Party;
use crate::domain::repositories::{PartyRepository, RepositoryError};
use crate::domain::value_objects::QueueSnapshot;

/// Toggle priority input
pub struct TogglePriorityInput {
    pub party_id: String,
    pub item_id: String,
    pub is_priority: bool,
}

/// Toggle priority output
pub struct TogglePriorityOutput {
    pub party: Party,
    pub snapshot: QueueSnapshot,
}

/// Toggle priority use case: host-settable jump-queue flag.
pub struct TogglePriority<P: PartyRepository> {
    party_repo: Arc<P>,
}

impl<P: PartyRepository> TogglePriority<P> {
    pub fn new(party_repo: Arc<P>) -> Self {
        Self { party_repo }
    }

    pub async fn execute(
        &self,
        input: TogglePriorityInput,
    ) -> Result<TogglePriorityOutput, TogglePriorityError> {
        let mut party = self
            .party_repo
            .find_by_id(&input.party_id)
            .await?
            .ok_or(TogglePriorityError::PartyNotFound)?;

        if party.is_closed() {
            return Err(TogglePriorityError::PartyClosed);
        }

        let item = self
            .party_repo
            .find_item(&input.party_id, &input.item_id)
            .await?
            .ok_or(TogglePriorityError::ItemNotFound)?;

        if item.is_played() {
            return Err(TogglePriorityError::AlreadyPlayed);
        }

        self.party_repo
            .set_priority(&input.party_id, &input.item_id, input.is_priority)
            .await?;

        let snapshot = reconcile_and_snapshot(self.party_repo.as_ref(), &mut party).await?;

        Ok(TogglePriorityOutput { party, snapshot })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TogglePriorityError {
    #[error("Party not found")]
    PartyNotFound,
    #[error("Party is closed")]
    PartyClosed,
    #[error("Queue item not found")]
    ItemNotFound,
    #[error("Item has already been played")]
    AlreadyPlayed,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
