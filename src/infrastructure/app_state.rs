use std::sync::Arc;

use async_broadcast::{broadcast, Receiver, Sender};
use serde::Serialize;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::domain::entities::Participant;
use crate::domain::value_objects::QueueSnapshot;
use crate::infrastructure::auth::JwtService;
use crate::infrastructure::database;
use crate::infrastructure::database::repositories::SqlitePartyRepository;
use crate::infrastructure::services::{
    CatalogConfig, CatalogService, PartyLocks, PresenceTracker, SongResolver,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,

    /// JWT service for host tokens
    pub jwt_service: Arc<JwtService>,

    /// Presence tracker for connected participants
    pub presence: Arc<PresenceTracker>,

    /// Per-party serialization boundary for mutating operations
    pub party_locks: Arc<PartyLocks>,

    /// Party + queue repository
    pub party_repo: Arc<SqlitePartyRepository>,

    /// Event broadcaster for SSE
    pub event_sender: Sender<PartyEvent>,
    pub event_receiver: Receiver<PartyEvent>,

    /// Song catalog resolver (optional)
    pub resolver: Option<Arc<dyn SongResolver>>,

    /// Fallback duration bounds (seconds) for unresolvable songs
    pub fallback_bounds: (i64, i64),
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        // Get database path from environment
        let db_path = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("DB_PATH"))
            .unwrap_or_else(|_| "sqlite:./data/micdrop.db".to_string());

        // Ensure path has sqlite: prefix
        let db_url = if db_path.starts_with("sqlite:") {
            db_path
        } else {
            format!("sqlite:{}", db_path)
        };

        tracing::info!("Connecting to database: {}", db_url);

        // An in-memory database must stay on a single connection or every
        // pooled connection sees its own empty schema
        let db = if db_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .connect(&db_url)
                .await?
        } else {
            SqlitePool::connect(&db_url).await?
        };

        database::init_schema(&db).await?;

        // Create JWT service for host tokens
        let jwt_secret = std::env::var("JWT_SECRET")
            .unwrap_or_else(|_| "micdrop-secret-key-change-in-production".to_string());
        let jwt_service = Arc::new(JwtService::new(jwt_secret));

        // Presence liveness window
        let window_secs: i64 = std::env::var("PRESENCE_WINDOW_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(300);
        let presence = Arc::new(PresenceTracker::new(window_secs));

        let party_locks = Arc::new(PartyLocks::new());
        let party_repo = Arc::new(SqlitePartyRepository::new(db.clone()));

        // Create event broadcaster (capacity of 1000 events)
        let (event_sender, event_receiver) = broadcast(1000);

        // Initialize catalog resolver if configured
        let resolver: Option<Arc<dyn SongResolver>> = if std::env::var("CATALOG_BASE_URL").is_ok() {
            let service = CatalogService::new(CatalogConfig::default());
            if service.health_check().await {
                tracing::info!("Catalog resolver initialized and available");
                Some(Arc::new(service))
            } else {
                tracing::warn!("Catalog configured but not available - submissions use fallback metadata");
                None
            }
        } else {
            tracing::info!("Catalog not configured - submissions use fallback metadata");
            None
        };

        let fallback_min: i64 = std::env::var("FALLBACK_DURATION_MIN_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(180);
        let fallback_max: i64 = std::env::var("FALLBACK_DURATION_MAX_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(240);

        Ok(Self {
            db,
            jwt_service,
            presence,
            party_locks,
            party_repo,
            event_sender,
            event_receiver,
            resolver,
            fallback_bounds: (fallback_min, fallback_max),
        })
    }

    /// Broadcast an event to all connected SSE clients
    pub fn broadcast_event(&self, event: PartyEvent) {
        let receiver_count = self.event_sender.receiver_count();
        tracing::debug!(
            "Broadcasting '{}' for party {} to {} receivers",
            event.kind.name(),
            event.party_id,
            receiver_count
        );
        match self.event_sender.try_broadcast(event) {
            Ok(None) => {
                tracing::debug!("Event broadcast but no active receivers");
            }
            Ok(Some(_)) => {
                tracing::debug!("Event broadcast successfully with overflow");
            }
            Err(e) => {
                tracing::warn!("Failed to broadcast event: {:?}", e);
            }
        }
    }
}

/// Event envelope for SSE broadcasting: one room (party) per event
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyEvent {
    pub party_id: String,
    #[serde(flatten)]
    pub kind: PartyEventKind,
    pub timestamp: i64,
}

/// Closed set of outbound events. Queue-shaped mutations all collapse into
/// one full `PlaylistUpdated` snapshot; only the two pure clock transitions
/// get lightweight events of their own.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PartyEventKind {
    PlaylistUpdated {
        snapshot: QueueSnapshot,
    },
    PlaybackStarted {
        started_at: i64,
        remaining_seconds: i64,
    },
    PlaybackPaused {
        remaining_seconds: i64,
    },
    PresenceUpdated {
        participants: Vec<Participant>,
    },
    /// Advisory UI lock while an auto-advance is in flight; never a
    /// correctness mechanism
    SkipTimerStarted {
        item_id: String,
    },
    PartyClosed,
}

impl PartyEventKind {
    pub fn name(&self) -> &'static str {
        match self {
            PartyEventKind::PlaylistUpdated { .. } => "playlistUpdated",
            PartyEventKind::PlaybackStarted { .. } => "playbackStarted",
            PartyEventKind::PlaybackPaused { .. } => "playbackPaused",
            PartyEventKind::PresenceUpdated { .. } => "presenceUpdated",
            PartyEventKind::SkipTimerStarted { .. } => "skipTimerStarted",
            PartyEventKind::PartyClosed => "partyClosed",
        }
    }
}

impl PartyEvent {
    pub fn new(party_id: &str, kind: PartyEventKind) -> Self {
        Self {
            party_id: party_id.to_string(),
            kind,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}
