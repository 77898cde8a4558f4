use serde::{Deserialize, Serialize};

use crate::record::{FieldValue, Record};

/// Exact-match value that disables the filter.
pub const ALL: &str = "All";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    Substring,
    Exact,
    Range,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FieldFilter {
    Substring { field: String, value: String },
    Exact { field: String, value: String },
    Range { field: String, min: f64, max: f64 },
}

impl FieldFilter {
    #[must_use]
    pub fn substring(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Substring { field: field.into(), value: value.into() }
    }

    #[must_use]
    pub fn exact(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Exact { field: field.into(), value: value.into() }
    }

    #[must_use]
    pub fn range(field: impl Into<String>, min: f64, max: f64) -> Self {
        Self::Range { field: field.into(), min, max }
    }

    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::Substring { field, .. } | Self::Exact { field, .. } | Self::Range { field, .. } => {
                field
            }
        }
    }

    #[must_use]
    pub fn mode(&self) -> MatchMode {
        match self {
            Self::Substring { .. } => MatchMode::Substring,
            Self::Exact { .. } => MatchMode::Exact,
            Self::Range { .. } => MatchMode::Range,
        }
    }

    fn accepts<R: Record>(&self, record: &R) -> bool {
        match self {
            Self::Substring { field, value } => {
                let haystack = record.field(field);
                contains_folded(haystack.as_ref().and_then(FieldValue::as_text).unwrap_or(""), value)
            }
            Self::Exact { field, value } => {
                if is_all(value) {
                    return true;
                }
                record.field(field).is_some_and(|actual| exact_equals(&actual, value))
            }
            Self::Range { field, min, max } => record
                .field(field)
                .and_then(|actual| actual.as_number())
                .is_some_and(|actual| *min <= actual && actual <= *max),
        }
    }
}

/// Active search term plus field-level filters for one list view.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Criteria {
    #[serde(default)]
    pub search_term: String,
    #[serde(default)]
    pub search_fields: Vec<String>,
    #[serde(default)]
    pub filters: Vec<FieldFilter>,
}

impl Criteria {
    #[must_use]
    pub fn search<I, S>(term: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            search_term: term.into(),
            search_fields: fields.into_iter().map(Into::into).collect(),
            filters: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: FieldFilter) -> Self {
        self.set_filter(filter);
        self
    }

    /// Install `filter`, replacing any filter already active on the same field.
    pub fn set_filter(&mut self, filter: FieldFilter) {
        let field = filter.field().to_string();
        self.clear_filter(&field);
        self.filters.push(filter);
    }

    pub fn clear_filter(&mut self, field: &str) {
        self.filters.retain(|existing| existing.field() != field);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.search_term.trim().is_empty() && self.filters.is_empty()
    }
}

/// Decide whether `record` passes every active criterion.
///
/// The search term passes when any search field contains it (case-insensitive);
/// all field filters must pass as well.
#[must_use]
pub fn matches<R: Record>(record: &R, criteria: &Criteria) -> bool {
    passes_search(record, criteria) && criteria.filters.iter().all(|filter| filter.accepts(record))
}

fn passes_search<R: Record>(record: &R, criteria: &Criteria) -> bool {
    let term = criteria.search_term.trim();
    if term.is_empty() {
        return true;
    }

    criteria.search_fields.iter().any(|field| {
        let value = record.field(field);
        contains_folded(value.as_ref().and_then(FieldValue::as_text).unwrap_or(""), term)
    })
}

fn is_all(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case(ALL)
}

/// Case-insensitive containment; surrounding whitespace in `needle` is ignored.
fn contains_folded(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    if needle.is_empty() {
        return true;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn exact_equals(actual: &FieldValue<'_>, expected: &str) -> bool {
    match actual {
        FieldValue::Text(text) => *text == expected,
        FieldValue::Number(number) => {
            expected.trim().parse::<f64>().is_ok_and(|parsed| parsed.total_cmp(number).is_eq())
        }
        FieldValue::Flag(flag) => expected.trim().parse::<bool>().is_ok_and(|parsed| parsed == *flag),
        FieldValue::Timestamp(instant) => {
            time::OffsetDateTime::parse(expected.trim(), &time::format_description::well_known::Rfc3339)
                .is_ok_and(|parsed| parsed == *instant)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordId;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: RecordId,
        name: String,
        status: String,
        score: f64,
        active: bool,
    }

    impl Record for Row {
        fn id(&self) -> RecordId {
            self.id
        }

        fn set_id(&mut self, id: RecordId) {
            self.id = id;
        }

        fn field(&self, name: &str) -> Option<FieldValue<'_>> {
            match name {
                "name" => Some(FieldValue::Text(&self.name)),
                "status" => Some(FieldValue::Text(&self.status)),
                "score" => Some(FieldValue::Number(self.score)),
                "active" => Some(FieldValue::Flag(self.active)),
                _ => None,
            }
        }
    }

    fn row(id: RecordId, name: &str, status: &str, score: f64) -> Row {
        Row { id, name: name.to_string(), status: status.to_string(), score, active: true }
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let rows = [row(1, "Alpha", "Active", 10.0), row(2, "Beta", "Active", 20.0)];
        let criteria = Criteria::search("al", ["name"]);

        let hits = rows.iter().filter(|r| matches(*r, &criteria)).map(|r| r.id).collect::<Vec<_>>();
        assert_eq!(hits, vec![1]);
    }

    #[test]
    fn empty_search_term_always_passes() {
        let criteria = Criteria::search("   ", ["name"]);
        assert!(matches(&row(1, "", "Active", 0.0), &criteria));
    }

    #[test]
    fn search_passes_when_any_field_matches() {
        let criteria = Criteria::search("paus", ["name", "status"]);
        assert!(matches(&row(1, "Alpha", "Paused", 0.0), &criteria));
        assert!(!matches(&row(2, "Alpha", "Active", 0.0), &criteria));
    }

    #[test]
    fn absent_search_field_is_treated_as_empty_string() {
        let criteria = Criteria::search("x", ["missing"]);
        assert!(!matches(&row(1, "x", "x", 0.0), &criteria));

        let blank = Criteria::search("", ["missing"]);
        assert!(matches(&row(1, "x", "x", 0.0), &blank));
    }

    #[test]
    fn substring_filter_trims_like_search() {
        let record = row(1, "Email", "Active", 0.0);
        let search = Criteria::search("Email ", ["name"]);
        let filter = Criteria::default().with_filter(FieldFilter::substring("name", " Email "));
        assert!(matches(&record, &search));
        assert!(matches(&record, &filter));

        let blank = Criteria::default().with_filter(FieldFilter::substring("name", "   "));
        assert!(matches(&row(2, "", "Active", 0.0), &blank));
    }

    #[test]
    fn exact_filter_honors_all_sentinel() {
        let record = row(1, "Alpha", "Active", 0.0);
        assert!(matches(&record, &Criteria::default().with_filter(FieldFilter::exact("status", "All"))));
        assert!(matches(&record, &Criteria::default().with_filter(FieldFilter::exact("status", "all"))));
        assert!(matches(&record, &Criteria::default().with_filter(FieldFilter::exact("status", "Active"))));
        assert!(!matches(&record, &Criteria::default().with_filter(FieldFilter::exact("status", "Paused"))));
    }

    #[test]
    fn exact_filter_on_absent_field_does_not_match() {
        let criteria = Criteria::default().with_filter(FieldFilter::exact("owner", "me"));
        assert!(!matches(&row(1, "Alpha", "Active", 0.0), &criteria));
    }

    #[test]
    fn exact_filter_compares_numbers_and_flags_by_value() {
        let record = row(1, "Alpha", "Active", 42.0);
        assert!(matches(&record, &Criteria::default().with_filter(FieldFilter::exact("score", "42"))));
        assert!(matches(&record, &Criteria::default().with_filter(FieldFilter::exact("active", "true"))));
        assert!(!matches(&record, &Criteria::default().with_filter(FieldFilter::exact("active", "false"))));
    }

    #[test]
    fn range_filter_is_inclusive() {
        let criteria = Criteria::default().with_filter(FieldFilter::range("score", 40.0, 60.0));
        assert!(matches(&row(1, "a", "s", 40.0), &criteria));
        assert!(matches(&row(2, "a", "s", 60.0), &criteria));
        assert!(!matches(&row(3, "a", "s", 60.5), &criteria));
        assert!(!matches(&row(4, "a", "s", 39.9), &criteria));
    }

    #[test]
    fn range_filter_on_text_field_does_not_match() {
        let criteria = Criteria::default().with_filter(FieldFilter::range("name", 0.0, 100.0));
        assert!(!matches(&row(1, "50", "s", 50.0), &criteria));
    }

    #[test]
    fn criteria_combine_with_and() {
        let criteria = Criteria::search("a", ["name"])
            .with_filter(FieldFilter::exact("status", "Active"))
            .with_filter(FieldFilter::range("score", 0.0, 50.0));

        assert!(matches(&row(1, "Alpha", "Active", 10.0), &criteria));
        assert!(!matches(&row(2, "Alpha", "Paused", 10.0), &criteria));
        assert!(!matches(&row(3, "Alpha", "Active", 90.0), &criteria));
        assert!(!matches(&row(4, "Zed", "Active", 10.0), &criteria));
    }

    #[test]
    fn set_filter_replaces_filter_on_same_field() {
        let mut criteria = Criteria::default();
        criteria.set_filter(FieldFilter::exact("status", "Active"));
        criteria.set_filter(FieldFilter::exact("status", "Paused"));
        assert_eq!(criteria.filters, vec![FieldFilter::exact("status", "Paused")]);

        criteria.clear_filter("status");
        assert!(criteria.is_empty());
    }

    #[test]
    fn criteria_serialize_with_tagged_filters() {
        let criteria = Criteria::default().with_filter(FieldFilter::range("score", 1.0, 2.0));
        let json = serde_json::to_value(&criteria)
            .unwrap_or_else(|err| panic!("criteria should serialize: {err}"));
        assert_eq!(json["filters"][0]["mode"], "range");
        assert_eq!(json["filters"][0]["field"], "score");
    }
}
