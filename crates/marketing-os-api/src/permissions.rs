//! Shared permission store and the per-role editing surface.

use std::sync::Arc;

use marketing_os_core::{CoreError, PermissionMatrix, PermissionSet, PermissionType};
use parking_lot::RwLock;
use tracing::{debug, warn};

/// Single source of truth for role permissions; clones share the same matrix.
#[derive(Debug, Clone, Default)]
pub struct PermissionStore {
    inner: Arc<RwLock<PermissionMatrix>>,
}

impl PermissionStore {
    #[must_use]
    pub fn new(matrix: PermissionMatrix) -> Self {
        Self { inner: Arc::new(RwLock::new(matrix)) }
    }

    #[must_use]
    pub fn snapshot(&self) -> PermissionMatrix {
        self.inner.read().clone()
    }

    /// # Errors
    /// Returns [`CoreError::UnknownRole`] or [`CoreError::UnknownModule`].
    pub fn set(
        &self,
        role: &str,
        module: &str,
        permission: PermissionType,
        granted: bool,
    ) -> Result<PermissionSet, CoreError> {
        let result = self.inner.write().set(role, module, permission, granted);
        log_edit(role, module, permission, &result);
        result
    }

    /// # Errors
    /// Same as [`PermissionStore::set`].
    pub fn toggle(
        &self,
        role: &str,
        module: &str,
        permission: PermissionType,
    ) -> Result<PermissionSet, CoreError> {
        let result = self.inner.write().toggle(role, module, permission);
        log_edit(role, module, permission, &result);
        result
    }

    /// # Errors
    /// Returns [`CoreError::UnknownRole`] or [`CoreError::UnknownModule`].
    pub fn row(&self, role: &str, module: &str) -> Result<PermissionSet, CoreError> {
        self.inner.read().row(role, module)
    }

    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.inner.read().roles().any(|known| known == role)
    }

    #[must_use]
    pub fn roles(&self) -> Vec<String> {
        self.inner.read().roles().map(str::to_string).collect()
    }
}

fn log_edit(role: &str, module: &str, permission: PermissionType, result: &Result<PermissionSet, CoreError>) {
    match result {
        Ok(row) => debug!(role, module, permission = permission.as_str(), ?row, "permission cascade applied"),
        Err(err) => warn!(role, module, permission = permission.as_str(), %err, "permission edit rejected"),
    }
}

/// Editing surface for one role; edits apply to the store immediately.
#[derive(Debug)]
pub struct PermissionEditor {
    store: PermissionStore,
    role: String,
}

impl PermissionEditor {
    /// # Errors
    /// Returns [`CoreError::UnknownRole`] when the store has no such role.
    pub fn open(store: &PermissionStore, role: &str) -> Result<Self, CoreError> {
        if !store.has_role(role) {
            return Err(CoreError::UnknownRole(role.to_string()));
        }
        debug!(role, "permission editor opened");
        Ok(Self { store: store.clone(), role: role.to_string() })
    }

    #[must_use]
    pub fn role(&self) -> &str {
        &self.role
    }

    /// # Errors
    /// Returns [`CoreError::UnknownModule`] for modules the role has no row for.
    pub fn set(
        &mut self,
        module: &str,
        permission: PermissionType,
        granted: bool,
    ) -> Result<PermissionSet, CoreError> {
        self.store.set(&self.role, module, permission, granted)
    }

    /// # Errors
    /// Same as [`PermissionEditor::set`].
    pub fn toggle(&mut self, module: &str, permission: PermissionType) -> Result<PermissionSet, CoreError> {
        self.store.toggle(&self.role, module, permission)
    }

    #[must_use]
    pub fn rows(&self) -> Vec<(String, PermissionSet)> {
        self.store
            .inner
            .read()
            .modules(&self.role)
            .map(|(module, row)| (module.to_string(), row))
            .collect()
    }

    /// Close the surface; edits were already applied, nothing else is persisted.
    pub fn save(self) -> Vec<(String, PermissionSet)> {
        let rows = self.rows();
        debug!(role = %self.role, modules = rows.len(), "permission editor closed");
        rows
    }
}
