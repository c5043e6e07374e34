use std::sync::Arc;

use crate::domain::entities::{generate_join_code, Party};
use crate::domain::repositories::{PartyRepository, RepositoryError};
use crate::domain::value_objects::PartySettings;

/// Create party input
pub struct CreatePartyInput {
    pub name: String,
    pub host_name: String,
    pub settings: PartySettings,
}

/// Create party output
pub struct CreatePartyOutput {
    pub party: Party,
}

/// Create party use case
pub struct CreateParty<P: PartyRepository> {
    party_repo: Arc<P>,
}

impl<P: PartyRepository> CreateParty<P> {
    pub fn new(party_repo: Arc<P>) -> Self {
        Self { party_repo }
    }

    pub async fn execute(
        &self,
        input: CreatePartyInput,
    ) -> Result<CreatePartyOutput, CreatePartyError> {
        if input.name.trim().is_empty() {
            return Err(CreatePartyError::Validation("Party name is required".into()));
        }
        if input.host_name.trim().is_empty() {
            return Err(CreatePartyError::Validation("Host name is required".into()));
        }

        let party = Party::new(
            uuid::Uuid::new_v4().to_string(),
            input.name.trim().to_string(),
            input.host_name.trim().to_string(),
            generate_join_code(),
            input.settings,
        );

        self.party_repo.save(&party).await?;

        Ok(CreatePartyOutput { party })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CreatePartyError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
