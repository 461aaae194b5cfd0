//! Domain entities

pub mod ranked_item;

pub use ranked_item::RankedItem;
