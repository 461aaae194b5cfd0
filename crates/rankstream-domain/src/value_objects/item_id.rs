//! Result identity value object

use crate::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

/// Identity of one ranked result.
///
/// Backends identify results by whatever key their records carry (a database
/// id, a registration number...). The aggregate only needs equality, so the
/// value is kept as an opaque, cheaply clonable string.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(Arc<str>);

impl ItemId {
    /// Create a new identity.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidItemId`] for empty or whitespace-only input.
    pub fn new(value: impl AsRef<str>) -> DomainResult<Self> {
        let value = value.as_ref();
        if value.trim().is_empty() {
            return Err(DomainError::InvalidItemId(
                "identity must not be empty".to_string(),
            ));
        }
        Ok(Self(Arc::from(value)))
    }

    /// Borrow the identity as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({:?})", &*self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ItemId {
    type Error = DomainError;

    fn try_from(value: String) -> DomainResult<Self> {
        Self::new(value)
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.0.to_string()
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
