//! Queue fairness scheduler.
//!
//! Pure ordering over a party's queue items: given everything submitted so
//! far (played and unplayed) and the party settings, produce the ordered
//! unplayed list. The head of the result is the only legitimate "current
//! item" candidate. Deterministic for identical inputs, so clients may
//! recompute partial orderings optimistically and agree with the server.

use std::collections::VecDeque;

use crate::domain::entities::QueueItem;
use crate::domain::value_objects::PartySettings;

/// Order the unplayed items of a party.
///
/// Modes:
/// - manual order: the host permutation (`position`) is absolute;
/// - FIFO (`fairness_enabled == false`): submission order, priority first;
/// - fairness: priority jump-queue, then one round-robin turn per singer.
pub fn order_unplayed(
    items: &[QueueItem],
    last_played_singer: Option<&str>,
    settings: &PartySettings,
) -> Vec<QueueItem> {
    let mut unplayed: Vec<&QueueItem> = items.iter().filter(|i| !i.is_played()).collect();

    if settings.manual_order {
        unplayed.sort_by_key(|i| (i.position.unwrap_or(i64::MAX), i.added_seq, i.tiebreak_key));
        return unplayed.into_iter().cloned().collect();
    }

    let (mut priority, mut normal): (Vec<&QueueItem>, Vec<&QueueItem>) =
        unplayed.drain(..).partition(|i| i.is_priority);

    // Priority is a simple jump-queue in both modes
    priority.sort_by_key(|i| (i.added_seq, i.tiebreak_key));

    if !settings.fairness_enabled {
        normal.sort_by_key(|i| (i.added_seq, i.tiebreak_key));
        return priority.into_iter().chain(normal).cloned().collect();
    }

    normal.sort_by_key(|i| (i.added_seq, i.tiebreak_key));

    // Group by singer, each group keeping the singer's own submission order
    let mut groups: Vec<(String, VecDeque<&QueueItem>)> = Vec::new();
    for item in normal {
        match groups.iter_mut().find(|(name, _)| *name == item.singer_name) {
            Some((_, queue)) => queue.push_back(item),
            None => {
                let mut queue = VecDeque::new();
                queue.push_back(item);
                groups.push((item.singer_name.clone(), queue));
            }
        }
    }

    let mut ordered: Vec<QueueItem> = priority.into_iter().cloned().collect();

    // One round per pass: each singer's first unemitted item, singers ordered
    // by their earliest remaining submission; the singer who just played goes
    // to the back of the round whenever anyone else has a candidate.
    while !groups.is_empty() {
        groups.sort_by_key(|(_, queue)| {
            queue
                .front()
                .map(|front| (front.added_seq, front.tiebreak_key))
                .unwrap_or((i64::MAX, u32::MAX))
        });

        if groups.len() > 1 {
            if let Some(last) = last_played_singer {
                if let Some(pos) = groups.iter().position(|(name, _)| name == last) {
                    let group = groups.remove(pos);
                    groups.push(group);
                }
            }
        }

        for (_, queue) in groups.iter_mut() {
            if let Some(item) = queue.pop_front() {
                ordered.push(item.clone());
            }
        }

        groups.retain(|(_, queue)| !queue.is_empty());
    }

    ordered
}

/// First element of the current ordering, if any.
pub fn head(
    items: &[QueueItem],
    last_played_singer: Option<&str>,
    settings: &PartySettings,
) -> Option<QueueItem> {
    order_unplayed(items, last_played_singer, settings)
        .into_iter()
        .next()
}

/// Singer of the most recently played item.
pub fn last_played_singer(items: &[QueueItem]) -> Option<String> {
    items
        .iter()
        .filter(|i| i.is_played())
        .max_by_key(|i| (i.played_at, i.added_seq))
        .map(|i| i.singer_name.clone())
}
