//! Role × module × permission matrix with cascading implication rules.
//!
//! Every reachable state satisfies `Admin ⇒ Edit ⇒ View`: granting a level
//! grants every level below it, and revoking a level revokes every level above.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, ValidationError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum PermissionType {
    View,
    Edit,
    Admin,
}

impl PermissionType {
    pub const ALL: [Self; 3] = [Self::View, Self::Edit, Self::Admin];

    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Self::View => 1,
            Self::Edit => 2,
            Self::Admin => 3,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::View => "View",
            Self::Edit => "Edit",
            Self::Admin => "Admin",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "view" => Some(Self::View),
            "edit" => Some(Self::Edit),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// One `(role, module)` row of the matrix.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct PermissionSet {
    pub view: bool,
    pub edit: bool,
    pub admin: bool,
}

impl PermissionSet {
    pub const NONE: Self = Self { view: false, edit: false, admin: false };
    pub const VIEW_ONLY: Self = Self { view: true, edit: false, admin: false };
    pub const EDITOR: Self = Self { view: true, edit: true, admin: false };
    pub const FULL: Self = Self { view: true, edit: true, admin: true };

    #[must_use]
    pub fn get(&self, permission: PermissionType) -> bool {
        match permission {
            PermissionType::View => self.view,
            PermissionType::Edit => self.edit,
            PermissionType::Admin => self.admin,
        }
    }

    fn put(&mut self, permission: PermissionType, granted: bool) {
        match permission {
            PermissionType::View => self.view = granted,
            PermissionType::Edit => self.edit = granted,
            PermissionType::Admin => self.admin = granted,
        }
    }

    /// Apply one cell edit and cascade it to the sibling cells.
    pub fn set(&mut self, permission: PermissionType, granted: bool) {
        for level in PermissionType::ALL {
            let cascades = if granted {
                level.rank() <= permission.rank()
            } else {
                level.rank() >= permission.rank()
            };
            if cascades {
                self.put(level, granted);
            }
        }
    }

    #[must_use]
    pub fn with(mut self, permission: PermissionType, granted: bool) -> Self {
        self.set(permission, granted);
        self
    }

    #[must_use]
    pub fn is_consistent(&self) -> bool {
        (!self.admin || self.edit) && (!self.edit || self.view)
    }

    /// Highest granted level, if any.
    #[must_use]
    pub fn level(&self) -> Option<PermissionType> {
        PermissionType::ALL.into_iter().rev().find(|permission| self.get(*permission))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Default)]
pub struct PermissionMatrix {
    roles: BTreeMap<String, BTreeMap<String, PermissionSet>>,
}

impl PermissionMatrix {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace one `(role, module)` row.
    ///
    /// # Errors
    /// Returns [`ValidationError::Invalid`] when the row breaks `Admin ⇒ Edit ⇒ View`,
    /// or [`ValidationError::Required`] when the role or module name is blank.
    pub fn insert(
        &mut self,
        role: &str,
        module: &str,
        permissions: PermissionSet,
    ) -> Result<(), CoreError> {
        if role.trim().is_empty() {
            return Err(ValidationError::Required { field: "role" }.into());
        }
        if module.trim().is_empty() {
            return Err(ValidationError::Required { field: "module" }.into());
        }
        if !permissions.is_consistent() {
            return Err(ValidationError::Invalid(format!(
                "permissions for {role}/{module} violate Admin => Edit => View"
            ))
            .into());
        }

        self.roles.entry(role.to_string()).or_default().insert(module.to_string(), permissions);
        Ok(())
    }

    /// Set one cell and return the row after cascading.
    ///
    /// # Errors
    /// Returns [`CoreError::UnknownRole`] or [`CoreError::UnknownModule`] when the
    /// target row does not exist.
    pub fn set(
        &mut self,
        role: &str,
        module: &str,
        permission: PermissionType,
        granted: bool,
    ) -> Result<PermissionSet, CoreError> {
        let modules =
            self.roles.get_mut(role).ok_or_else(|| CoreError::UnknownRole(role.to_string()))?;
        let row = modules.get_mut(module).ok_or_else(|| CoreError::UnknownModule {
            role: role.to_string(),
            module: module.to_string(),
        })?;
        row.set(permission, granted);
        Ok(*row)
    }

    /// Flip one cell, cascading as [`PermissionMatrix::set`] does.
    ///
    /// # Errors
    /// Same as [`PermissionMatrix::set`].
    pub fn toggle(
        &mut self,
        role: &str,
        module: &str,
        permission: PermissionType,
    ) -> Result<PermissionSet, CoreError> {
        let current = self.row(role, module)?.get(permission);
        self.set(role, module, permission, !current)
    }

    /// # Errors
    /// Returns [`CoreError::UnknownRole`] or [`CoreError::UnknownModule`].
    pub fn row(&self, role: &str, module: &str) -> Result<PermissionSet, CoreError> {
        let modules = self.roles.get(role).ok_or_else(|| CoreError::UnknownRole(role.to_string()))?;
        modules.get(module).copied().ok_or_else(|| CoreError::UnknownModule {
            role: role.to_string(),
            module: module.to_string(),
        })
    }

    #[must_use]
    pub fn get(&self, role: &str, module: &str, permission: PermissionType) -> Option<bool> {
        self.roles.get(role)?.get(module).map(|row| row.get(permission))
    }

    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.roles.keys().map(String::as_str)
    }

    pub fn modules(&self, role: &str) -> impl Iterator<Item = (&str, PermissionSet)> {
        self.roles
            .get(role)
            .into_iter()
            .flat_map(|modules| modules.iter().map(|(module, row)| (module.as_str(), *row)))
    }

    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.roles.values().flat_map(BTreeMap::values).all(PermissionSet::is_consistent)
    }
}
