use std::sync::Arc;

use crate::domain::entities::Party;
use crate::domain::repositories::{PartyRepository, RepositoryError};
use crate::domain::value_objects::QueueSnapshot;

/// Join party input
pub struct JoinPartyInput {
    pub party_id: String,
    pub name: String,
}

/// Join party output: the full snapshot is the join acknowledgement — a
/// client must have seen it before its own mutations are meaningful.
pub struct JoinPartyOutput {
    pub party: Party,
    pub snapshot: QueueSnapshot,
}

/// Join party use case
pub struct JoinParty<P: PartyRepository> {
    party_repo: Arc<P>,
}

impl<P: PartyRepository> JoinParty<P> {
    pub fn new(party_repo: Arc<P>) -> Self {
        Self { party_repo }
    }

    pub async fn execute(&self, input: JoinPartyInput) -> Result<JoinPartyOutput, JoinPartyError> {
        if input.name.trim().is_empty() {
            return Err(JoinPartyError::Validation("Guest name is required".into()));
        }

        let party = self
            .party_repo
            .find_by_id(&input.party_id)
            .await?
            .ok_or(JoinPartyError::PartyNotFound)?;

        if party.is_closed() {
            return Err(JoinPartyError::PartyClosed);
        }

        let items = self.party_repo.list_items(&party.id).await?;
        let snapshot = QueueSnapshot::build(&party, &items);

        Ok(JoinPartyOutput { party, snapshot })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JoinPartyError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Party not found")]
    PartyNotFound,
    #[error("Party is closed")]
    PartyClosed,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
