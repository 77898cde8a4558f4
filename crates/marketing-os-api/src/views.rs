//! Declarative configuration of the list views.
//!
//! Every list view is one [`TableController`] built from a [`ViewSpec`]; the
//! [`TableView`] trait erases the record type so callers can drive any view
//! by [`ViewId`].

use marketing_os_core::{
    Collection, CoreError, Criteria, FieldFilter, Record, RecordId, SortDirection, SortSpec,
    TableController, ValidationError,
};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::router::ViewId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewSpec {
    pub id: ViewId,
    pub search_fields: &'static [&'static str],
    pub filter_fields: &'static [&'static str],
    pub default_sort: Option<(&'static str, SortDirection)>,
    pub unique_names: bool,
}

impl ViewSpec {
    #[must_use]
    pub fn initial_sort(&self) -> Option<SortSpec> {
        self.default_sort.map(|(key, direction)| SortSpec { key: key.to_string(), direction })
    }

    /// # Errors
    /// Returns [`CoreError::DuplicateId`] for bad fixtures or
    /// [`CoreError::InvalidPage`] for a zero page size.
    pub fn build<R: Record>(&self, fixtures: Vec<R>, page_size: usize) -> Result<TableController<R>, CoreError> {
        let mut collection = Collection::from_fixtures(fixtures)?;
        if self.unique_names {
            collection = collection.with_unique_names();
        }
        TableController::new(collection, self.search_fields, self.initial_sort(), page_size)
    }

    /// # Errors
    /// Returns [`ValidationError::Invalid`] when `filter` targets a field this
    /// view does not offer as a filter.
    pub fn check_filter(&self, filter: &FieldFilter) -> Result<(), ValidationError> {
        if self.filter_fields.iter().any(|field| *field == filter.field()) {
            return Ok(());
        }
        Err(ValidationError::Invalid(format!(
            "{} cannot be filtered by `{}`; filterable fields: {}",
            self.id,
            filter.field(),
            self.filter_fields.join(", ")
        )))
    }
}

const fn spec(
    id: ViewId,
    search_fields: &'static [&'static str],
    filter_fields: &'static [&'static str],
    default_sort: Option<(&'static str, SortDirection)>,
    unique_names: bool,
) -> ViewSpec {
    ViewSpec { id, search_fields, filter_fields, default_sort, unique_names }
}

/// Layout of each list view; `None` for tool views without a table.
#[must_use]
pub fn view_spec(view: ViewId) -> Option<ViewSpec> {
    use SortDirection::{Ascending, Descending};

    let layout = match view {
        ViewId::Users => spec(view, &["name", "email"], &["role", "status"], Some(("name", Ascending)), false),
        ViewId::Triggers => spec(view, &["name", "event"], &["channel", "enabled"], Some(("name", Ascending)), true),
        ViewId::Journeys => spec(view, &["name"], &["status", "audience_size", "conversion_rate"], Some(("updated_at", Descending)), false),
        ViewId::Snippets => spec(view, &["title", "body"], &["category", "usage_count"], Some(("title", Ascending)), false),
        ViewId::MemoryObjects => spec(view, &["title"], &["type", "trust_score"], Some(("created_at", Descending)), false),
        ViewId::DriftScanner => {
            spec(view, &["signal", "segment"], &["status", "drift_score"], Some(("drift_score", Descending)), false)
        }
        ViewId::Webhooks => spec(view, &["name", "url", "event"], &["active"], None, false),
        ViewId::AuditLog => spec(view, &["actor", "target"], &["action"], Some(("at", Descending)), false),
        ViewId::Permissions | ViewId::Atomizer | ViewId::Upload => return None,
    };
    Some(layout)
}

/// Fire-and-forget text sink used by copy actions.
pub trait Clipboard {
    fn write_text(&mut self, text: &str);
}

/// Clipboard that keeps the last copied text in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryClipboard {
    pub contents: Option<String>,
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) {
        self.contents = Some(text.to_string());
    }
}

/// Hash of the visible id sequence; equal fingerprints mean equal views.
#[must_use]
pub fn view_fingerprint<I>(ids: I) -> String
where
    I: IntoIterator<Item = RecordId>,
{
    let mut hasher = Sha256::new();
    for id in ids {
        hasher.update(id.to_le_bytes());
    }
    let digest = hasher.finalize();
    let digest_hex = format!("{digest:x}");
    format!("view_{}", &digest_hex[..16])
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PageSnapshot {
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub sort: Option<SortSpec>,
    pub criteria: Criteria,
    pub fingerprint: String,
    pub items: Vec<serde_json::Value>,
}

/// Type-erased controls of one list view.
pub trait TableView {
    fn set_search(&mut self, term: &str);
    fn set_filter(&mut self, filter: FieldFilter);
    fn clear_filter(&mut self, field: &str);
    fn select_sort(&mut self, key: &str) -> SortSpec;
    fn set_sort(&mut self, spec: Option<SortSpec>);
    fn go_to_page(&mut self, page: usize);
    fn visible_ids(&self) -> Vec<RecordId>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn fingerprint(&self) -> String {
        view_fingerprint(self.visible_ids())
    }

    /// # Errors
    /// Returns [`CoreError`] when the page cannot be sliced or a row cannot be rendered.
    fn snapshot(&self) -> Result<PageSnapshot, CoreError>;
}

impl<R> TableView for TableController<R>
where
    R: Record + Serialize,
{
    fn set_search(&mut self, term: &str) {
        TableController::set_search(self, term);
    }

    fn set_filter(&mut self, filter: FieldFilter) {
        TableController::set_filter(self, filter);
    }

    fn clear_filter(&mut self, field: &str) {
        TableController::clear_filter(self, field);
    }

    fn select_sort(&mut self, key: &str) -> SortSpec {
        TableController::select_sort(self, key).clone()
    }

    fn set_sort(&mut self, spec: Option<SortSpec>) {
        TableController::set_sort(self, spec);
    }

    fn go_to_page(&mut self, page: usize) {
        TableController::go_to_page(self, page);
    }

    fn visible_ids(&self) -> Vec<RecordId> {
        self.visible().into_iter().map(Record::id).collect()
    }

    fn len(&self) -> usize {
        self.collection().len()
    }

    fn snapshot(&self) -> Result<PageSnapshot, CoreError> {
        let page = self.page()?;
        let items = page
            .items
            .iter()
            .map(|record| {
                serde_json::to_value(record).map_err(|err| {
                    CoreError::Validation(ValidationError::Invalid(format!(
                        "record {} could not be rendered: {err}",
                        record.id()
                    )))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PageSnapshot {
            page: page.page,
            page_size: page.page_size,
            total_pages: page.total_pages,
            total_items: page.total_items,
            sort: self.sort_spec().cloned(),
            criteria: self.criteria().clone(),
            fingerprint: TableView::fingerprint(self),
            items,
        })
    }
}
