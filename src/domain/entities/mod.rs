mod participant;
mod party;
mod queue_item;

pub use participant::*;
pub use party::*;
pub use queue_item::*;
