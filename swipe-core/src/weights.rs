//! Weight tables mapping attribute matches to points.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One `(category, name, points)` row.
///
/// `name` is matched as a case-insensitive substring of the attribute value
/// stored under `category`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightEntry {
    /// Attribute category, e.g. `interest`.
    pub category: String,
    /// Text looked for inside the attribute value.
    pub name: String,
    /// Points added when the entry matches; may be negative.
    pub points: i64,
}

impl WeightEntry {
    /// Convenience constructor.
    pub fn new(category: impl Into<String>, name: impl Into<String>, points: i64) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
            points,
        }
    }
}

/// Errors returned by [`WeightTable::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeightTableError {
    /// An entry had an empty or whitespace-only category.
    #[error("weight entry {index} has a blank category")]
    BlankCategory {
        /// Position of the entry in the input.
        index: usize,
    },
    /// An entry had an empty or whitespace-only name.
    #[error("weight entry {index} has a blank name")]
    BlankName {
        /// Position of the entry in the input.
        index: usize,
    },
}

/// Ordered, immutable list of weight entries.
///
/// # Examples
///
/// ```
/// use swipe_core::{WeightEntry, WeightTable};
///
/// let table = WeightTable::new(vec![WeightEntry::new("age", "25", 5)])?;
/// assert_eq!(table.len(), 1);
/// # Ok::<(), swipe_core::WeightTableError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeightTable {
    entries: Vec<WeightEntry>,
}

impl WeightTable {
    /// Validate and wrap `entries`, preserving their order.
    pub fn new(entries: Vec<WeightEntry>) -> Result<Self, WeightTableError> {
        for (index, entry) in entries.iter().enumerate() {
            if entry.category.trim().is_empty() {
                return Err(WeightTableError::BlankCategory { index });
            }
            if entry.name.trim().is_empty() {
                return Err(WeightTableError::BlankName { index });
            }
        }
        Ok(Self { entries })
    }

    /// Entries in load order.
    #[must_use]
    pub fn entries(&self) -> &[WeightEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
