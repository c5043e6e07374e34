use std::sync::Arc;

use crate::application::reconcile_and_snapshot;
use crate::domain::entities::Party;
use crate::domain::repositories::{PartyRepository, RepositoryError};
use crate::domain::value_objects::QueueSnapshot;

/// Who is asking for the removal
pub enum RemoveRequester {
    Host,
    Singer(String),
}

/// Remove item input
pub struct RemoveItemInput {
    pub party_id: String,
    pub item_id: String,
    pub requester: RemoveRequester,
}

/// Remove item output
pub struct RemoveItemOutput {
    pub party: Party,
    pub snapshot: QueueSnapshot,
}

/// Remove item use case. Singer-scoped: guests may delete only their own
/// unplayed items; the host may delete any unplayed item.
pub struct RemoveItem<P: PartyRepository> {
    party_repo: Arc<P>,
}

impl<P: PartyRepository> RemoveItem<P> {
    pub fn new(party_repo: Arc<P>) -> Self {
        Self { party_repo }
    }

    pub async fn execute(&self, input: RemoveItemInput) -> Result<RemoveItemOutput, RemoveItemError> {
        let mut party = self
            .party_repo
            .find_by_id(&input.party_id)
            .await?
            .ok_or(RemoveItemError::PartyNotFound)?;

        if party.is_closed() {
            return Err(RemoveItemError::PartyClosed);
        }

        let item = self
            .party_repo
            .find_item(&input.party_id, &input.item_id)
            .await?
            .ok_or(RemoveItemError::ItemNotFound)?;

        if item.is_played() {
            return Err(RemoveItemError::AlreadyPlayed);
        }

        if let RemoveRequester::Singer(name) = &input.requester {
            if !item.singer_name.eq_ignore_ascii_case(name.trim()) {
                return Err(RemoveItemError::NotOwner);
            }
        }

        self.party_repo.delete_item(&input.party_id, &input.item_id).await?;

        let snapshot = reconcile_and_snapshot(self.party_repo.as_ref(), &mut party).await?;

        Ok(RemoveItemOutput { party, snapshot })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RemoveItemError {
    #[error("Party not found")]
    PartyNotFound,
    #[error("Party is closed")]
    PartyClosed,
    #[error("Queue item not found")]
    ItemNotFound,
    #[error("Item has already been played")]
    AlreadyPlayed,
    #[error("Only the submitting singer or the host can remove this item")]
    NotOwner,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
