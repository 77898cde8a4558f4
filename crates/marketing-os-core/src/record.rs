use std::cmp::Ordering;

use time::OffsetDateTime;

use crate::error::ValidationError;

/// Collection-scoped identifier, assigned as `max(existing) + 1`.
pub type RecordId = u64;

/// Borrowed view of one record field, typed for comparison and matching.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Flag(bool),
    Number(f64),
    Timestamp(OffsetDateTime),
    Text(&'a str),
}

impl FieldValue<'_> {
    fn kind_rank(&self) -> u8 {
        match self {
            Self::Flag(_) => 0,
            Self::Number(_) => 1,
            Self::Timestamp(_) => 2,
            Self::Text(_) => 3,
        }
    }

    /// Numeric projection used by range criteria. Timestamps project to Unix seconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Timestamp(value) => Some(value.unix_timestamp() as f64),
            Self::Flag(_) | Self::Text(_) => None,
        }
    }

    /// Text projection used by substring criteria. Non-text fields never match a search term.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Total order across all field kinds.
    ///
    /// Text compares case-folded first, then by raw value, which keeps "alpha"
    /// and "Alpha" adjacent the way a locale collator would.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Flag(lhs), Self::Flag(rhs)) => lhs.cmp(rhs),
            (Self::Number(lhs), Self::Number(rhs)) => lhs.total_cmp(rhs),
            (Self::Timestamp(lhs), Self::Timestamp(rhs)) => lhs.cmp(rhs),
            (Self::Text(lhs), Self::Text(rhs)) => collate(lhs, rhs),
            (lhs, rhs) => lhs.kind_rank().cmp(&rhs.kind_rank()),
        }
    }
}

fn collate(lhs: &str, rhs: &str) -> Ordering {
    let folded_lhs = lhs.chars().flat_map(char::to_lowercase);
    let folded_rhs = rhs.chars().flat_map(char::to_lowercase);
    folded_lhs.cmp(folded_rhs).then_with(|| lhs.cmp(rhs))
}

/// A row in one of the console's in-memory collections.
///
/// Implementors expose their fields by name so criteria, sorting and
/// validation can be configured declaratively per view.
pub trait Record: Clone {
    fn id(&self) -> RecordId;

    fn set_id(&mut self, id: RecordId);

    /// Look up one field by its identifier. Unknown names return `None`.
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;

    /// Fields that must be non-empty after trimming, as `(field, value)` pairs.
    fn required_fields(&self) -> Vec<(&'static str, &str)> {
        Vec::new()
    }

    /// Name compared case-insensitively by collections that reject duplicates.
    fn unique_name(&self) -> Option<&str> {
        None
    }

    /// Record-specific checks beyond required fields (URL format, score bounds).
    ///
    /// # Errors
    /// Returns the first [`ValidationError`] the record violates.
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}
