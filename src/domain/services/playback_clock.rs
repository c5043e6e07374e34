//! Playback clock state machine.
//!
//! The clock owns exactly three fields on the party: `current_item_id`,
//! `current_started_at` (millis, None while paused) and
//! `current_remaining_seconds`. Every connected client reconstructs its
//! countdown from the broadcast `(started_at, remaining_seconds)` pair plus
//! its own wall clock, so transitions here only ever deal in those fields.

use serde::Serialize;

use crate::domain::entities::{Party, PartyStatus, QueueItem};

/// Derived clock state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockState {
    Idle,
    Paused,
    Playing,
}

pub fn clock_state(party: &Party) -> ClockState {
    if party.current_started_at.is_some() {
        ClockState::Playing
    } else if party.current_item_id.is_some() {
        ClockState::Paused
    } else {
        ClockState::Idle
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    #[error("party is closed")]
    Closed,
    #[error("party has not been started")]
    NotStarted,
    #[error("playback is disabled for this party")]
    PlaybackDisabled,
    #[error("nothing is playing")]
    NotPlaying,
    #[error("no unplayed item is ready")]
    NothingQueued,
}

/// Start (or resume, or scrub) playback of the scheduler head.
///
/// With a seek the remaining time is recomputed from the item's full
/// duration; without one, a reloaded head resets to full duration while the
/// already-loaded item resumes from where pause left it.
pub fn play(
    party: &mut Party,
    head: &QueueItem,
    seek_seconds: Option<f64>,
    now_ms: i64,
) -> Result<(), ClockError> {
    match party.status {
        PartyStatus::Closed => return Err(ClockError::Closed),
        PartyStatus::Open => return Err(ClockError::NotStarted),
        PartyStatus::Started => {}
    }
    if party.settings.playback_disabled {
        return Err(ClockError::PlaybackDisabled);
    }

    let remaining = match seek_seconds {
        Some(seek) => (party_duration(head) - seek.max(0.0).floor() as i64).max(0),
        None => {
            if party.current_item_id.as_deref() == Some(head.id.as_str()) {
                party
                    .current_remaining_seconds
                    .unwrap_or_else(|| party_duration(head))
            } else {
                party_duration(head)
            }
        }
    };

    party.current_item_id = Some(head.id.clone());
    party.current_remaining_seconds = Some(remaining);
    party.current_started_at = Some(now_ms);
    party.touch();
    Ok(())
}

/// Freeze the countdown. Returns the remaining seconds after subtracting
/// the elapsed playing time, floored to whole seconds.
pub fn pause(party: &mut Party, now_ms: i64) -> Result<i64, ClockError> {
    let started_at = party.current_started_at.ok_or(ClockError::NotPlaying)?;
    let elapsed = ((now_ms - started_at) / 1000).max(0);
    let remaining = (party.current_remaining_seconds.unwrap_or(0) - elapsed).max(0);
    party.current_remaining_seconds = Some(remaining);
    party.current_started_at = None;
    party.touch();
    Ok(remaining)
}

/// Resolve which item an advance request consumes: the loaded item when one
/// is set (and still unplayed), otherwise the scheduler head. `expected`
/// lets racing duplicates detect that the state they targeted is gone.
pub fn advance_target<'a>(
    party: &Party,
    items: &'a [QueueItem],
    head: Option<&'a QueueItem>,
    expected: Option<&str>,
) -> Result<&'a QueueItem, ClockError> {
    match party.status {
        PartyStatus::Closed => return Err(ClockError::Closed),
        PartyStatus::Open => return Err(ClockError::NotStarted),
        PartyStatus::Started => {}
    }

    let target = match party.current_item_id.as_deref() {
        Some(current) => items.iter().find(|i| i.id == current && !i.is_played()),
        None => None,
    }
    .or(head)
    .ok_or(ClockError::NothingQueued)?;

    if let Some(expected_id) = expected {
        if expected_id != target.id {
            return Err(ClockError::NothingQueued);
        }
    }

    Ok(target)
}

/// Reload the clock when the head changes identity while not playing.
/// A live countdown is never interrupted by queue churn; reconciliation
/// happens on the next pause/advance instead. Returns whether the party
/// record changed.
pub fn reset_for_new_head(party: &mut Party, head: Option<&QueueItem>) -> bool {
    if party.status != PartyStatus::Started || party.is_playing() {
        return false;
    }

    match head {
        Some(item) => {
            if party.current_item_id.as_deref() == Some(item.id.as_str()) {
                return false;
            }
            party.current_item_id = Some(item.id.clone());
            party.current_remaining_seconds = Some(item.duration_seconds);
            party.current_started_at = None;
            party.touch();
            true
        }
        None => {
            if party.current_item_id.is_none() {
                return false;
            }
            party.clear_clock();
            party.touch();
            true
        }
    }
}

fn party_duration(item: &QueueItem) -> i64 {
    item.duration_seconds.max(0)
}
