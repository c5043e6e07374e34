use std::sync::Arc;

use crate::domain::entities::Party;
use crate::domain::repositories::{PartyRepository, RepositoryError};
use crate::domain::value_objects::QueueSnapshot;

/// Get party details input
pub struct GetPartyDetailsInput {
    pub party_id: String,
}

/// Get party details output
pub struct GetPartyDetailsOutput {
    pub party: Party,
    pub snapshot: QueueSnapshot,
}

/// Get party details use case
pub struct GetPartyDetails<P: PartyRepository> {
    party_repo: Arc<P>,
}

impl<P: PartyRepository> GetPartyDetails<P> {
    pub fn new(party_repo: Arc<P>) -> Self {
        Self { party_repo }
    }

    pub async fn execute(
        &self,
        input: GetPartyDetailsInput,
    ) -> Result<GetPartyDetailsOutput, GetPartyDetailsError> {
        let party = self
            .party_repo
            .find_by_id(&input.party_id)
            .await?
            .ok_or(GetPartyDetailsError::PartyNotFound)?;

        let items = self.party_repo.list_items(&party.id).await?;
        let snapshot = QueueSnapshot::build(&party, &items);

        Ok(GetPartyDetailsOutput { party, snapshot })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GetPartyDetailsError {
    #[error("Party not found")]
    PartyNotFound,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
