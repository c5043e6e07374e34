use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::entities::{Participant, ParticipantRole};

/// Presence tracker: who is in which party, and who is still live.
///
/// Records are upserted on join and refreshed on heartbeat; they are never
/// hard-deleted while the party exists, only aged out of the active view by
/// the liveness window.
pub struct PresenceTracker {
    parties: RwLock<HashMap<String, HashMap<String, Participant>>>,
    window_secs: i64,
}

impl PresenceTracker {
    pub fn new(window_secs: i64) -> Self {
        Self {
            parties: RwLock::new(HashMap::new()),
            window_secs: window_secs.max(1),
        }
    }

    /// Upsert a participant. Returns true on a first-ever join for this
    /// party (drives the "new singer" notification, nothing else).
    pub fn join(&self, party_id: &str, name: &str, avatar: Option<String>, now: i64) -> bool {
        let mut parties = self.parties.write().unwrap();
        let members = parties.entry(party_id.to_string()).or_default();

        match members.get_mut(name) {
            Some(existing) => {
                existing.last_seen_at = now;
                if avatar.is_some() {
                    existing.avatar = avatar;
                }
                false
            }
            None => {
                members.insert(
                    name.to_string(),
                    Participant::new(name.to_string(), avatar, now),
                );
                true
            }
        }
    }

    /// The creating flow marks its host; everyone else stays a guest.
    pub fn mark_host(&self, party_id: &str, name: &str) {
        let mut parties = self.parties.write().unwrap();
        if let Some(member) = parties
            .get_mut(party_id)
            .and_then(|members| members.get_mut(name))
        {
            member.role = ParticipantRole::Host;
        }
    }

    /// Refresh last-seen only. Unknown party or name is inert.
    pub fn heartbeat(&self, party_id: &str, name: &str, now: i64) {
        let mut parties = self.parties.write().unwrap();
        if let Some(member) = parties
            .get_mut(party_id)
            .and_then(|members| members.get_mut(name))
        {
            member.last_seen_at = now;
        }
    }

    /// Participants seen within the liveness window, stable join order.
    pub fn active(&self, party_id: &str, now: i64) -> Vec<Participant> {
        let parties = self.parties.read().unwrap();
        let mut members: Vec<Participant> = parties
            .get(party_id)
            .map(|members| {
                members
                    .values()
                    .filter(|p| p.is_active(now, self.window_secs))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        members.sort_by(|a, b| (a.joined_at, &a.name).cmp(&(b.joined_at, &b.name)));
        members
    }

    /// Teardown when a party closes.
    pub fn remove_party(&self, party_id: &str) {
        let mut parties = self.parties.write().unwrap();
        parties.remove(party_id);
    }
}
