use std::sync::Arc;

use crate::application::reconcile_and_snapshot;
use crate::domain::entities::{Party, QueueItem};
use crate::domain::repositories::{PartyRepository, RepositoryError};
use crate::domain::services::{playback_clock, scheduler};
use crate::domain::value_objects::QueueSnapshot;

/// Advance queue input
pub struct AdvanceQueueInput {
    pub party_id: String,
    /// Item the caller believes it is skipping; a mismatch resolves the
    /// request as a concurrent-advance race instead of consuming the next
    /// item in line
    pub expected_item_id: Option<String>,
}

/// Advance queue output
pub struct AdvanceQueueOutput {
    pub party: Party,
    pub snapshot: QueueSnapshot,
    /// The item whose turn just completed, None on a no-op race
    pub advanced: Option<QueueItem>,
    pub applied: bool,
}

/// Advance queue use case: the single place `played_at` is written.
///
/// Callers must hold the party lock; within it the target resolution plus
/// the guarded `mark_played` write make a racing duplicate a no-op rather
/// than a second head consumed.
pub struct AdvanceQueue<P: PartyRepository> {
    party_repo: Arc<P>,
}

impl<P: PartyRepository> AdvanceQueue<P> {
    pub fn new(party_repo: Arc<P>) -> Self {
        Self { party_repo }
    }

    pub async fn execute(
        &self,
        input: AdvanceQueueInput,
    ) -> Result<AdvanceQueueOutput, AdvanceQueueError> {
        let mut party = self
            .party_repo
            .find_by_id(&input.party_id)
            .await?
            .ok_or(AdvanceQueueError::PartyNotFound)?;

        let items = self.party_repo.list_items(&party.id).await?;
        let last_played = scheduler::last_played_singer(&items);
        let head = scheduler::head(&items, last_played.as_deref(), &party.settings);

        let target = match playback_clock::advance_target(
            &party,
            &items,
            head.as_ref(),
            input.expected_item_id.as_deref(),
        ) {
            Ok(target) => target.clone(),
            Err(_) => {
                // Invalid transition or a racing call got here first:
                // state unchanged, hand back the current truth
                let snapshot = QueueSnapshot::build(&party, &items);
                return Ok(AdvanceQueueOutput {
                    party,
                    snapshot,
                    advanced: None,
                    applied: false,
                });
            }
        };

        let played_at = chrono::Utc::now().timestamp();
        match self
            .party_repo
            .mark_played(&party.id, &target.id, played_at)
            .await
        {
            Ok(()) => {}
            Err(RepositoryError::NotFound(_)) => {
                let snapshot = QueueSnapshot::build(&party, &items);
                return Ok(AdvanceQueueOutput {
                    party,
                    snapshot,
                    advanced: None,
                    applied: false,
                });
            }
            Err(e) => return Err(e.into()),
        }

        party.clear_clock();
        party.touch();
        self.party_repo.save(&party).await?;

        // The next head loads paused so every display shows what is up next
        let snapshot = reconcile_and_snapshot(self.party_repo.as_ref(), &mut party).await?;

        let mut advanced = target;
        advanced.played_at = Some(played_at);

        Ok(AdvanceQueueOutput {
            party,
            snapshot,
            advanced: Some(advanced),
            applied: true,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AdvanceQueueError {
    #[error("Party not found")]
    PartyNotFound,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
