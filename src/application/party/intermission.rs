use std::sync::Arc;

use crate::domain::entities::{Party, PartyStatus};
use crate::domain::repositories::{PartyRepository, RepositoryError};
use crate::domain::value_objects::QueueSnapshot;

/// Intermission input
pub struct IntermissionInput {
    pub party_id: String,
}

/// Intermission output
pub struct IntermissionOutput {
    pub party: Party,
    pub snapshot: QueueSnapshot,
    pub applied: bool,
}

/// Intermission use case: Started -> Open, clearing the clock. The queue
/// itself is untouched; resuming later recomputes the head from scratch.
pub struct Intermission<P: PartyRepository> {
    party_repo: Arc<P>,
}

impl<P: PartyRepository> Intermission<P> {
    pub fn new(party_repo: Arc<P>) -> Self {
        Self { party_repo }
    }

    pub async fn execute(
        &self,
        input: IntermissionInput,
    ) -> Result<IntermissionOutput, IntermissionError> {
        let mut party = self
            .party_repo
            .find_by_id(&input.party_id)
            .await?
            .ok_or(IntermissionError::PartyNotFound)?;

        let applied = party.status == PartyStatus::Started;
        if applied {
            party.suspend();
            self.party_repo.save(&party).await?;
        }

        let items = self.party_repo.list_items(&party.id).await?;
        let snapshot = QueueSnapshot::build(&party, &items);

        Ok(IntermissionOutput {
            party,
            snapshot,
            applied,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IntermissionError {
    #[error("Party not found")]
    PartyNotFound,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
