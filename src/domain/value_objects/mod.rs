pub mod duration;
mod party_settings;
mod snapshot;

pub use duration::{fallback_duration_seconds, parse_iso8601_duration};
pub use party_settings::PartySettings;
pub use snapshot::{ClockView, QueueSnapshot};
