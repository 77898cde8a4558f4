//! Table engine behind the Marketing OS list views.
//!
//! Everything here is synchronous and pure over in-memory collections:
//! criteria matching, stable sorting, derived-view recomputation, paging,
//! collection CRUD with `max(id) + 1` assignment, and the cascading
//! role/module permission matrix.

pub mod collection;
pub mod criteria;
pub mod error;
pub mod permissions;
pub mod record;
pub mod sort;
pub mod table;
pub mod validation;
pub mod view;

pub use collection::{Collection, Confirm};
pub use criteria::{matches, Criteria, FieldFilter, MatchMode, ALL};
pub use error::{CoreError, ValidationError};
pub use permissions::{PermissionMatrix, PermissionSet, PermissionType};
pub use record::{FieldValue, Record, RecordId};
pub use sort::{compare_by_key, sort_records, sort_refs, SortDirection, SortSpec, SortState};
pub use table::TableController;
pub use view::{derive_view, paginate, Page};
