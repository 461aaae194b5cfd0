//! Domain Value Objects
//!
//! Immutable objects that represent concepts in the domain
//! with no conceptual identity, only defined by their attributes.

mod id;
mod item_id;
mod score;

pub use id::SessionId;
pub use item_id::ItemId;
pub use score::Score;
