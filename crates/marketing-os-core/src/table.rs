use crate::collection::{Collection, Confirm};
use crate::criteria::{Criteria, FieldFilter};
use crate::error::CoreError;
use crate::record::{Record, RecordId};
use crate::sort::{SortSpec, SortState};
use crate::view::{derive_view, paginate, Page};

/// Filter + sort + CRUD + paging for one list view.
///
/// Holds only the source collection and the active controls; the visible rows
/// are recomputed on every read so they can never drift from the source.
#[derive(Debug, Clone)]
pub struct TableController<R> {
    collection: Collection<R>,
    criteria: Criteria,
    sort: SortState,
    page: usize,
    page_size: usize,
}

impl<R: Record> TableController<R> {
    /// # Errors
    /// Returns [`CoreError::InvalidPage`] when `page_size` is zero.
    pub fn new(
        collection: Collection<R>,
        search_fields: &[&str],
        default_sort: Option<SortSpec>,
        page_size: usize,
    ) -> Result<Self, CoreError> {
        if page_size == 0 {
            return Err(CoreError::InvalidPage);
        }
        Ok(Self {
            collection,
            criteria: Criteria::search("", search_fields.iter().copied()),
            sort: SortState::new(default_sort),
            page: 1,
            page_size,
        })
    }

    #[must_use]
    pub fn collection(&self) -> &Collection<R> {
        &self.collection
    }

    #[must_use]
    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    #[must_use]
    pub fn sort_spec(&self) -> Option<&SortSpec> {
        self.sort.spec()
    }

    #[must_use]
    pub fn current_page(&self) -> usize {
        self.page
    }

    /// Changing the search term returns the view to its first page.
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.criteria.search_term = term.into();
        self.page = 1;
    }

    pub fn set_filter(&mut self, filter: FieldFilter) {
        self.criteria.set_filter(filter);
        self.page = 1;
    }

    pub fn clear_filter(&mut self, field: &str) {
        self.criteria.clear_filter(field);
        self.page = 1;
    }

    /// Column-header click: same key flips direction, new key sorts ascending.
    pub fn select_sort(&mut self, key: &str) -> &SortSpec {
        self.sort.select(key)
    }

    pub fn set_sort(&mut self, spec: Option<SortSpec>) {
        self.sort = SortState::new(spec);
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    #[must_use]
    pub fn visible(&self) -> Vec<&R> {
        derive_view(self.collection.records(), &self.criteria, self.sort.spec())
    }

    /// Current page of the visible rows.
    ///
    /// # Errors
    /// Propagates [`paginate`] errors; unreachable with a validated page size.
    pub fn page(&self) -> Result<Page<&R>, CoreError> {
        paginate(&self.visible(), self.page, self.page_size)
    }

    /// # Errors
    /// See [`Collection::add`].
    pub fn add(&mut self, draft: R) -> Result<RecordId, CoreError> {
        self.collection.add(draft)
    }

    /// # Errors
    /// See [`Collection::update`].
    pub fn update<F>(&mut self, id: RecordId, patch: F) -> Result<&R, CoreError>
    where
        F: FnOnce(&mut R),
    {
        self.collection.update(id, patch)
    }

    /// # Errors
    /// See [`Collection::remove`].
    pub fn remove(&mut self, id: RecordId) -> Result<R, CoreError> {
        self.collection.remove(id)
    }

    /// # Errors
    /// See [`Collection::remove_confirmed`].
    pub fn remove_confirmed<C>(&mut self, id: RecordId, confirm: &mut C) -> Result<Option<R>, CoreError>
    where
        C: Confirm + ?Sized,
    {
        self.collection.remove_confirmed(id, confirm)
    }
}
