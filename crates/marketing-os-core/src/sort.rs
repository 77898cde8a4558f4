use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::record::Record;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Hash)]
pub struct SortSpec {
    pub key: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    #[must_use]
    pub fn ascending(key: impl Into<String>) -> Self {
        Self { key: key.into(), direction: SortDirection::Ascending }
    }

    #[must_use]
    pub fn descending(key: impl Into<String>) -> Self {
        Self { key: key.into(), direction: SortDirection::Descending }
    }
}

/// Column-header sort control shared by every list view.
///
/// Selecting the active key again flips the direction; selecting a new key
/// resets to ascending.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct SortState {
    spec: Option<SortSpec>,
}

impl SortState {
    #[must_use]
    pub fn new(initial: Option<SortSpec>) -> Self {
        Self { spec: initial }
    }

    pub fn select(&mut self, key: &str) -> &SortSpec {
        let next = match self.spec.take() {
            Some(current) if current.key == key => {
                SortSpec { key: current.key, direction: current.direction.toggled() }
            }
            _ => SortSpec::ascending(key),
        };
        self.spec.insert(next)
    }

    pub fn clear(&mut self) {
        self.spec = None;
    }

    #[must_use]
    pub fn spec(&self) -> Option<&SortSpec> {
        self.spec.as_ref()
    }
}

/// Compare two records on `key` in ascending order. Absent values go last.
#[must_use]
pub fn compare_by_key<R: Record>(lhs: &R, rhs: &R, key: &str) -> Ordering {
    match (lhs.field(key), rhs.field(key)) {
        (Some(lhs), Some(rhs)) => lhs.compare(&rhs),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare_directed<R: Record>(lhs: &R, rhs: &R, spec: &SortSpec) -> Ordering {
    let present = (lhs.field(&spec.key).is_some(), rhs.field(&spec.key).is_some());
    match (present, spec.direction) {
        ((true, true), SortDirection::Descending) => compare_by_key(rhs, lhs, &spec.key),
        _ => compare_by_key(lhs, rhs, &spec.key),
    }
}

/// Stable in-place sort. Records with equal keys keep their prior relative order
/// in both directions.
pub fn sort_records<R: Record>(records: &mut [R], spec: &SortSpec) {
    records.sort_by(|lhs, rhs| compare_directed(lhs, rhs, spec));
}

/// Stable sort over borrowed records, used by derived views.
pub fn sort_refs<R: Record>(records: &mut [&R], spec: &SortSpec) {
    records.sort_by(|lhs, rhs| compare_directed(*lhs, *rhs, spec));
}
