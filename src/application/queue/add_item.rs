use std::sync::Arc;

use crate::application::reconcile_and_snapshot;
use crate::domain::entities::{Party, QueueItem};
use crate::domain::repositories::{PartyRepository, RepositoryError};
use crate::domain::value_objects::{
    fallback_duration_seconds, parse_iso8601_duration, QueueSnapshot,
};
use crate::infrastructure::services::SongResolver;

/// Song reference as submitted by a client that already resolved it
pub struct SubmittedSong {
    pub title: String,
    pub cover_url: Option<String>,
    pub duration_encoded: Option<String>,
    pub duration_seconds: Option<i64>,
}

/// Add item input: either a free-text query for the resolver, or an
/// already-resolved song reference.
pub struct AddItemInput {
    pub party_id: String,
    pub singer_name: String,
    pub query: Option<String>,
    pub song: Option<SubmittedSong>,
}

/// Add item output
pub struct AddItemOutput {
    pub party: Party,
    pub item: QueueItem,
    pub snapshot: QueueSnapshot,
}

/// Add item use case. Metadata resolution is best-effort: a failed lookup
/// or an unparsable duration falls back to a bounded random duration so the
/// submission always lands and the advance timers still terminate.
pub struct AddItem<P: PartyRepository> {
    party_repo: Arc<P>,
    resolver: Option<Arc<dyn SongResolver>>,
    fallback_bounds: (i64, i64),
}

impl<P: PartyRepository> AddItem<P> {
    pub fn new(
        party_repo: Arc<P>,
        resolver: Option<Arc<dyn SongResolver>>,
        fallback_bounds: (i64, i64),
    ) -> Self {
        Self {
            party_repo,
            resolver,
            fallback_bounds,
        }
    }

    pub async fn execute(&self, input: AddItemInput) -> Result<AddItemOutput, AddItemError> {
        if input.singer_name.trim().is_empty() {
            return Err(AddItemError::Validation("Singer name is required".into()));
        }

        let mut party = self
            .party_repo
            .find_by_id(&input.party_id)
            .await?
            .ok_or(AddItemError::PartyNotFound)?;

        if party.is_closed() {
            return Err(AddItemError::PartyClosed);
        }

        let (title, cover_url, duration_seconds) = self.resolve_metadata(&input).await?;

        let added_seq = self.party_repo.next_added_seq(&party.id).await?;
        let item = QueueItem::new(
            party.id.clone(),
            input.singer_name.trim().to_string(),
            title,
            cover_url,
            duration_seconds,
            added_seq,
        );
        self.party_repo.insert_item(&item).await?;

        let snapshot = reconcile_and_snapshot(self.party_repo.as_ref(), &mut party).await?;

        Ok(AddItemOutput {
            party,
            item,
            snapshot,
        })
    }

    async fn resolve_metadata(
        &self,
        input: &AddItemInput,
    ) -> Result<(String, Option<String>, i64), AddItemError> {
        let (min, max) = self.fallback_bounds;

        if let Some(song) = &input.song {
            if song.title.trim().is_empty() {
                return Err(AddItemError::Validation("Song title is required".into()));
            }
            let duration = song
                .duration_seconds
                .filter(|d| *d > 0)
                .or_else(|| {
                    song.duration_encoded
                        .as_deref()
                        .and_then(parse_iso8601_duration)
                        .map(|d| d as i64)
                        .filter(|d| *d > 0)
                })
                .unwrap_or_else(|| fallback_duration_seconds(min, max));
            return Ok((song.title.trim().to_string(), song.cover_url.clone(), duration));
        }

        let query = input
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| AddItemError::Validation("A song query or song is required".into()))?;

        if let Some(resolver) = &self.resolver {
            match resolver.resolve(query).await {
                Ok(resolved) => {
                    let duration = resolved
                        .duration_encoded
                        .as_deref()
                        .and_then(parse_iso8601_duration)
                        .map(|d| d as i64)
                        .filter(|d| *d > 0)
                        .unwrap_or_else(|| fallback_duration_seconds(min, max));
                    return Ok((resolved.title, resolved.cover_url, duration));
                }
                Err(e) => {
                    tracing::warn!("Song resolution failed for '{}': {}", query, e);
                }
            }
        }

        // No resolver or lookup failed: the raw query becomes the title
        Ok((
            query.to_string(),
            None,
            fallback_duration_seconds(min, max),
        ))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AddItemError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Party not found")]
    PartyNotFound,
    #[error("Party is closed")]
    PartyClosed,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
