pub mod party;
pub mod playback;
pub mod queue;

use crate::domain::entities::Party;
use crate::domain::repositories::{PartyRepository, RepositoryError};
use crate::domain::services::{playback_clock, scheduler};
use crate::domain::value_objects::QueueSnapshot;

/// Reconcile the clock with the current scheduler head and build the
/// snapshot every mutation broadcasts. Saves the party only when the head
/// change actually touched the clock fields.
pub(crate) async fn reconcile_and_snapshot<P: PartyRepository>(
    repo: &P,
    party: &mut Party,
) -> Result<QueueSnapshot, RepositoryError> {
    let items = repo.list_items(&party.id).await?;
    let last_played = scheduler::last_played_singer(&items);
    let head = scheduler::head(&items, last_played.as_deref(), &party.settings);

    if playback_clock::reset_for_new_head(party, head.as_ref()) {
        repo.save(party).await?;
    }

    Ok(QueueSnapshot::build(party, &items))
}
