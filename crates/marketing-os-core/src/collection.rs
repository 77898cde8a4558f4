use std::collections::BTreeSet;

use crate::error::{CoreError, ValidationError};
use crate::record::{Record, RecordId};

/// Synchronous yes/no gate for destructive actions.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// In-memory collection owned by a single view.
///
/// Ids are assigned as `max(existing, 0) + 1`; records keep insertion order.
#[derive(Debug, Clone)]
pub struct Collection<R> {
    records: Vec<R>,
    unique_names: bool,
}

impl<R> Default for Collection<R> {
    fn default() -> Self {
        Self { records: Vec::new(), unique_names: false }
    }
}

impl<R: Record> Collection<R> {
    /// Build a collection from mount-time fixtures.
    ///
    /// # Errors
    /// Returns [`CoreError::DuplicateId`] when two fixtures share an id, or
    /// [`CoreError::Validation`] when a fixture fails the same checks as `add`.
    pub fn from_fixtures(records: Vec<R>) -> Result<Self, CoreError> {
        let mut seen = BTreeSet::new();
        for record in &records {
            if !seen.insert(record.id()) {
                return Err(CoreError::DuplicateId(record.id()));
            }
        }
        let collection = Self { records, unique_names: false };
        for record in &collection.records {
            collection.check(record, Some(record.id()))?;
        }
        Ok(collection)
    }

    /// Reject adds and updates whose name collides (case-insensitive) with another record.
    #[must_use]
    pub fn with_unique_names(mut self) -> Self {
        self.unique_names = true;
        self
    }

    #[must_use]
    pub fn records(&self) -> &[R] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: RecordId) -> Option<&R> {
        self.records.iter().find(|record| record.id() == id)
    }

    #[must_use]
    pub fn next_id(&self) -> RecordId {
        self.records.iter().map(Record::id).max().unwrap_or(0) + 1
    }

    /// Validate `draft`, assign it the next id, and append it.
    ///
    /// # Errors
    /// Returns [`CoreError::Validation`] for blank required fields, a failing
    /// record check, or a duplicate name; the collection is left unchanged.
    pub fn add(&mut self, mut draft: R) -> Result<RecordId, CoreError> {
        self.check(&draft, None)?;
        let id = self.next_id();
        draft.set_id(id);
        self.records.push(draft);
        Ok(id)
    }

    /// Apply `patch` to the record with `id`, re-validating the result.
    ///
    /// The id survives the patch even if the closure overwrites it.
    ///
    /// # Errors
    /// Returns [`CoreError::NotFound`] when no record has `id`, or
    /// [`CoreError::Validation`] when the patched record is invalid. Either way
    /// the stored record is unchanged.
    pub fn update<F>(&mut self, id: RecordId, patch: F) -> Result<&R, CoreError>
    where
        F: FnOnce(&mut R),
    {
        let index = self.position(id)?;
        let mut candidate = self.records[index].clone();
        patch(&mut candidate);
        candidate.set_id(id);
        self.check(&candidate, Some(id))?;
        self.records[index] = candidate;
        Ok(&self.records[index])
    }

    /// # Errors
    /// Returns [`CoreError::NotFound`] when no record has `id`.
    pub fn remove(&mut self, id: RecordId) -> Result<R, CoreError> {
        let index = self.position(id)?;
        Ok(self.records.remove(index))
    }

    /// Remove after an interactive confirmation. Declining returns `Ok(None)`.
    ///
    /// # Errors
    /// Returns [`CoreError::NotFound`] when no record has `id`; the prompt is not shown.
    pub fn remove_confirmed<C>(&mut self, id: RecordId, confirm: &mut C) -> Result<Option<R>, CoreError>
    where
        C: Confirm + ?Sized,
    {
        self.position(id)?;
        if !confirm.confirm(&format!("Delete record {id}?")) {
            return Ok(None);
        }
        self.remove(id).map(Some)
    }

    fn position(&self, id: RecordId) -> Result<usize, CoreError> {
        self.records.iter().position(|record| record.id() == id).ok_or(CoreError::NotFound(id))
    }

    fn check(&self, record: &R, exclude: Option<RecordId>) -> Result<(), CoreError> {
        for (field, value) in record.required_fields() {
            if value.trim().is_empty() {
                return Err(ValidationError::Required { field }.into());
            }
        }

        record.validate()?;

        if self.unique_names {
            if let Some(name) = record.unique_name() {
                let wanted = name.trim().to_lowercase();
                let clash = self.records.iter().any(|existing| {
                    Some(existing.id()) != exclude
                        && existing
                            .unique_name()
                            .is_some_and(|other| other.trim().to_lowercase() == wanted)
                });
                if clash {
                    return Err(ValidationError::DuplicateName { name: name.trim().to_string() }.into());
                }
            }
        }

        Ok(())
    }
}
