//! Client-side path table for the console views.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ViewId {
    Users,
    Permissions,
    AuditLog,
    Triggers,
    Journeys,
    Snippets,
    Atomizer,
    MemoryObjects,
    Upload,
    DriftScanner,
    Webhooks,
}

impl ViewId {
    pub const ALL: [Self; 11] = [
        Self::Users,
        Self::Permissions,
        Self::AuditLog,
        Self::Triggers,
        Self::Journeys,
        Self::Snippets,
        Self::Atomizer,
        Self::MemoryObjects,
        Self::Upload,
        Self::DriftScanner,
        Self::Webhooks,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Permissions => "permissions",
            Self::AuditLog => "audit-log",
            Self::Triggers => "triggers",
            Self::Journeys => "journeys",
            Self::Snippets => "snippets",
            Self::Atomizer => "atomizer",
            Self::MemoryObjects => "memory-objects",
            Self::Upload => "upload",
            Self::DriftScanner => "drift-scanner",
            Self::Webhooks => "webhooks",
        }
    }

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Users => "/admin/users",
            Self::Permissions => "/admin/permissions",
            Self::AuditLog => "/admin/audit-log",
            Self::Triggers => "/signal-flow/triggers",
            Self::Journeys => "/signal-flow/journeys",
            Self::Snippets => "/signal-studio/snippets",
            Self::Atomizer => "/signal-studio/atomizer",
            Self::MemoryObjects => "/memory-loom/objects",
            Self::Upload => "/memory-loom/upload",
            Self::DriftScanner => "/signalscope/drift",
            Self::Webhooks => "/developer/webhooks",
        }
    }

    /// List views are backed by a table controller; the rest are tools.
    #[must_use]
    pub fn is_table(self) -> bool {
        !matches!(self, Self::Permissions | Self::Atomizer | Self::Upload)
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouterError {
    #[error("no view is mounted at `{0}`")]
    UnknownPath(String),
    #[error("unknown view `{0}`")]
    UnknownView(String),
}

impl FromStr for ViewId {
    type Err = RouterError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|view| view.name() == wanted)
            .ok_or_else(|| RouterError::UnknownView(value.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct Router {
    routes: BTreeMap<String, ViewId>,
    current: ViewId,
}

impl Default for Router {
    fn default() -> Self {
        let mut routes =
            ViewId::ALL.into_iter().map(|view| (view.path().to_string(), view)).collect::<BTreeMap<_, _>>();
        routes.insert("/".to_string(), ViewId::Users);
        Self { routes, current: ViewId::Users }
    }
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current(&self) -> ViewId {
        self.current
    }

    pub fn routes(&self) -> impl Iterator<Item = (&str, ViewId)> {
        self.routes.iter().map(|(path, view)| (path.as_str(), *view))
    }

    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<ViewId> {
        self.routes.get(&normalize(path)).copied()
    }

    /// Switch to the view mounted at `path`.
    ///
    /// # Errors
    /// Returns [`RouterError::UnknownPath`]; the current view is unchanged.
    pub fn navigate(&mut self, path: &str) -> Result<ViewId, RouterError> {
        let Some(view) = self.resolve(path) else {
            warn!(path, current = %self.current, "navigation to unknown path");
            return Err(RouterError::UnknownPath(path.to_string()));
        };
        debug!(path, from = %self.current, to = %view, "navigated");
        self.current = view;
        Ok(view)
    }
}

fn normalize(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
