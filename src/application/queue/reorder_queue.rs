use std::collections::HashSet;
use std::sync::Arc;

use crate::application::reconcile_and_snapshot;
use crate::domain::entities::Party;
use crate::domain::repositories::{PartyRepository, RepositoryError};
use crate::domain::value_objects::QueueSnapshot;

/// Reorder queue input: the host's explicit permutation of unplayed items
pub struct ReorderQueueInput {
    pub party_id: String,
    pub order: Vec<String>,
}

/// Reorder queue output
pub struct ReorderQueueOutput {
    pub party: Party,
    pub snapshot: QueueSnapshot,
    /// False when manual ordering is not active (scheduler owns the order)
    pub applied: bool,
}

/// Reorder queue use case, manual-order mode only.
pub struct ReorderQueue<P: PartyRepository> {
    party_repo: Arc<P>,
}

impl<P: PartyRepository> ReorderQueue<P> {
    pub fn new(party_repo: Arc<P>) -> Self {
        Self { party_repo }
    }

    pub async fn execute(
        &self,
        input: ReorderQueueInput,
    ) -> Result<ReorderQueueOutput, ReorderQueueError> {
        let mut party = self
            .party_repo
            .find_by_id(&input.party_id)
            .await?
            .ok_or(ReorderQueueError::PartyNotFound)?;

        if party.is_closed() {
            return Err(ReorderQueueError::PartyClosed);
        }

        if !party.settings.manual_order {
            let items = self.party_repo.list_items(&party.id).await?;
            let snapshot = QueueSnapshot::build(&party, &items);
            return Ok(ReorderQueueOutput {
                party,
                snapshot,
                applied: false,
            });
        }

        // Every id must name an unplayed item of this party
        let items = self.party_repo.list_items(&party.id).await?;
        let unplayed: HashSet<&str> = items
            .iter()
            .filter(|i| !i.is_played())
            .map(|i| i.id.as_str())
            .collect();
        let mut seen = HashSet::new();
        for id in &input.order {
            if !unplayed.contains(id.as_str()) {
                return Err(ReorderQueueError::UnknownItem(id.clone()));
            }
            if !seen.insert(id.as_str()) {
                return Err(ReorderQueueError::DuplicateItem(id.clone()));
            }
        }

        self.party_repo.set_positions(&party.id, &input.order).await?;
        party.touch();
        self.party_repo.save(&party).await?;

        let snapshot = reconcile_and_snapshot(self.party_repo.as_ref(), &mut party).await?;

        Ok(ReorderQueueOutput {
            party,
            snapshot,
            applied: true,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReorderQueueError {
    #[error("Party not found")]
    PartyNotFound,
    #[error("Party is closed")]
    PartyClosed,
    #[error("Unknown or played item in order: {0}")]
    UnknownItem(String),
    #[error("Duplicate item in order: {0}")]
    DuplicateItem(String),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
