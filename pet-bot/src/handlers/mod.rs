//! Handlers of the pet bot's chain: greeting on member joins, then the AI planner turn.

mod ai;
mod members_added;

pub use ai::{AiHandler, ERROR_REPLY};
pub use members_added::{MembersAddedHandler, GREETING};
