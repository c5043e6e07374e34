mod advance_queue;
mod pause_playback;
mod start_playback;

pub use advance_queue::*;
pub use pause_playback::*;
pub use start_playback::*;
