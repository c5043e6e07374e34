use std::sync::Arc;

use crate::application::reconcile_and_snapshot;
use crate::domain::entities::Party;
use crate::domain::repositories::{PartyRepository, RepositoryError};
use crate::domain::services::scheduler;
use crate::domain::value_objects::QueueSnapshot;

/// One settings toggle per intent
#[derive(Debug, Clone, Copy)]
pub enum SettingChange {
    Fairness(bool),
    PlaybackDisabled(bool),
    ManualOrder(bool),
}

/// Update settings input
pub struct UpdateSettingsInput {
    pub party_id: String,
    pub change: SettingChange,
}

/// Update settings output
pub struct UpdateSettingsOutput {
    pub party: Party,
    pub snapshot: QueueSnapshot,
    pub applied: bool,
}

/// Update settings use case. Fairness and manual-order changes can move the
/// scheduler head, so both end with a clock reconciliation.
pub struct UpdateSettings<P: PartyRepository> {
    party_repo: Arc<P>,
}

impl<P: PartyRepository> UpdateSettings<P> {
    pub fn new(party_repo: Arc<P>) -> Self {
        Self { party_repo }
    }

    pub async fn execute(
        &self,
        input: UpdateSettingsInput,
    ) -> Result<UpdateSettingsOutput, UpdateSettingsError> {
        let mut party = self
            .party_repo
            .find_by_id(&input.party_id)
            .await?
            .ok_or(UpdateSettingsError::PartyNotFound)?;

        if party.is_closed() {
            let items = self.party_repo.list_items(&party.id).await?;
            let snapshot = QueueSnapshot::build(&party, &items);
            return Ok(UpdateSettingsOutput {
                party,
                snapshot,
                applied: false,
            });
        }

        match input.change {
            SettingChange::Fairness(enabled) => {
                party.settings.fairness_enabled = enabled;
            }
            SettingChange::PlaybackDisabled(disabled) => {
                party.settings.playback_disabled = disabled;
            }
            SettingChange::ManualOrder(enabled) => {
                if enabled && !party.settings.manual_order {
                    // Freeze the current automatic ordering as the starting
                    // permutation, so enabling the toggle is not a reshuffle
                    let items = self.party_repo.list_items(&party.id).await?;
                    let last_played = scheduler::last_played_singer(&items);
                    let ordered = scheduler::order_unplayed(
                        &items,
                        last_played.as_deref(),
                        &party.settings,
                    );
                    let ids: Vec<String> = ordered.into_iter().map(|i| i.id).collect();
                    self.party_repo.set_positions(&party.id, &ids).await?;
                } else if !enabled && party.settings.manual_order {
                    // Automatic mode recomputes from scratch
                    self.party_repo.clear_positions(&party.id).await?;
                }
                party.settings.manual_order = enabled;
            }
        }

        party.touch();
        self.party_repo.save(&party).await?;

        let snapshot = reconcile_and_snapshot(self.party_repo.as_ref(), &mut party).await?;

        Ok(UpdateSettingsOutput {
            party,
            snapshot,
            applied: true,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateSettingsError {
    #[error("Party not found")]
    PartyNotFound,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
