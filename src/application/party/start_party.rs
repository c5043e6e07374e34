use std::sync::Arc;

use crate::application::reconcile_and_snapshot;
use crate::domain::entities::{Party, PartyStatus};
use crate::domain::repositories::{PartyRepository, RepositoryError};
use crate::domain::value_objects::QueueSnapshot;

/// Start party input
pub struct StartPartyInput {
    pub party_id: String,
}

/// Start party output
pub struct StartPartyOutput {
    pub party: Party,
    pub snapshot: QueueSnapshot,
    /// False when the transition was invalid and nothing changed
    pub applied: bool,
}

/// Start party use case: Open -> Started, loading the scheduler head into
/// the clock so displays immediately show what is up next.
pub struct StartParty<P: PartyRepository> {
    party_repo: Arc<P>,
}

impl<P: PartyRepository> StartParty<P> {
    pub fn new(party_repo: Arc<P>) -> Self {
        Self { party_repo }
    }

    pub async fn execute(
        &self,
        input: StartPartyInput,
    ) -> Result<StartPartyOutput, StartPartyError> {
        let mut party = self
            .party_repo
            .find_by_id(&input.party_id)
            .await?
            .ok_or(StartPartyError::PartyNotFound)?;

        if party.status != PartyStatus::Open {
            let items = self.party_repo.list_items(&party.id).await?;
            let snapshot = QueueSnapshot::build(&party, &items);
            return Ok(StartPartyOutput {
                party,
                snapshot,
                applied: false,
            });
        }

        party.start();
        self.party_repo.save(&party).await?;

        let snapshot = reconcile_and_snapshot(self.party_repo.as_ref(), &mut party).await?;

        Ok(StartPartyOutput {
            party,
            snapshot,
            applied: true,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StartPartyError {
    #[error("Party not found")]
    PartyNotFound,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
