use std::sync::Arc;

use crate::domain::entities::Party;
use crate::domain::repositories::{PartyRepository, RepositoryError};

/// Close party input
pub struct ClosePartyInput {
    pub party_id: String,
}

/// Close party output
pub struct ClosePartyOutput {
    pub party: Party,
    pub applied: bool,
}

/// Close party use case: terminal transition, no further mutation accepted.
pub struct CloseParty<P: PartyRepository> {
    party_repo: Arc<P>,
}

impl<P: PartyRepository> CloseParty<P> {
    pub fn new(party_repo: Arc<P>) -> Self {
        Self { party_repo }
    }

    pub async fn execute(&self, input: ClosePartyInput) -> Result<ClosePartyOutput, ClosePartyError> {
        let mut party = self
            .party_repo
            .find_by_id(&input.party_id)
            .await?
            .ok_or(ClosePartyError::PartyNotFound)?;

        let applied = !party.is_closed();
        if applied {
            party.close();
            self.party_repo.save(&party).await?;
        }

        Ok(ClosePartyOutput { party, applied })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClosePartyError {
    #[error("Party not found")]
    PartyNotFound,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
