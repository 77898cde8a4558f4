//! Console facade over the Marketing OS table engine.
//!
//! Mounts every list view from a [`MockDataProvider`], shares one
//! [`PermissionStore`] across the session, and models remote calls with
//! [`SimulatedLoader`].

pub mod atomizer;
pub mod config;
pub mod console;
pub mod fixtures;
pub mod loader;
pub mod permissions;
pub mod records;
pub mod router;
pub mod views;

pub use atomizer::{atomize, recombine, recombine_selected, Atom};
pub use config::{ConfigError, ConsoleConfig, CONFIG_PATH_ENV};
pub use console::{Console, UploadReceipt, WebhookTestReport};
pub use fixtures::{MockDataProvider, StaticFixtures, MODULES};
pub use loader::{LoadError, LoadState, SimulatedLoader};
pub use permissions::{PermissionEditor, PermissionStore};
pub use router::{Router, RouterError, ViewId};
pub use views::{view_fingerprint, view_spec, Clipboard, MemoryClipboard, PageSnapshot, TableView, ViewSpec};
