mod add_item;
mod remove_item;
mod reorder_queue;
mod toggle_priority;

pub use add_item::*;
pub use remove_item::*;
pub use reorder_queue::*;
pub use toggle_priority::*;
