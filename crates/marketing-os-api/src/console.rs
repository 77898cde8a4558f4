use anyhow::{anyhow, bail, Context, Result};
use marketing_os_core::{Confirm, CoreError, FieldFilter, RecordId, TableController, ValidationError};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ConsoleConfig;
use crate::fixtures::{MockDataProvider, StaticFixtures};
use crate::loader::{LoadState, SimulatedLoader};
use crate::permissions::{PermissionEditor, PermissionStore};
use crate::records::{
    AuditEntry, DeliveryStatus, DriftItem, Journey, MemoryObject, Snippet, Trigger, User, Webhook,
};
use crate::router::{Router, ViewId};
use crate::views::{view_spec, Clipboard, PageSnapshot, TableView};

const DELIVERY_OK: &str = "Delivered: 200 OK";
const DELIVERY_FAILED: &str = "Delivery failed: 500 Internal Server Error";
const UPLOAD_FAILED: &str = "Upload failed";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WebhookTestReport {
    pub webhook_id: RecordId,
    pub status: DeliveryStatus,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UploadReceipt {
    pub file_name: String,
    pub size_bytes: u64,
}

/// One console session: every view's state, mounted from a data provider.
#[derive(Debug)]
pub struct Console {
    config: ConsoleConfig,
    router: Router,
    permissions: PermissionStore,
    users: TableController<User>,
    triggers: TableController<Trigger>,
    journeys: TableController<Journey>,
    snippets: TableController<Snippet>,
    memory_objects: TableController<MemoryObject>,
    drift_items: TableController<DriftItem>,
    webhooks: TableController<Webhook>,
    audit_log: TableController<AuditEntry>,
    webhook_tests: SimulatedLoader<String>,
    webhook_test_target: Option<RecordId>,
    uploads: SimulatedLoader<UploadReceipt>,
}

fn mount<R>(view: ViewId, fixtures: Vec<R>, page_size: usize) -> Result<TableController<R>>
where
    R: marketing_os_core::Record,
{
    let spec = view_spec(view).ok_or_else(|| anyhow!("view {view} has no table layout"))?;
    spec.build(fixtures, page_size).with_context(|| format!("failed to mount {view} view"))
}

fn logged<T>(view: ViewId, action: &'static str, id: Option<RecordId>, result: Result<T, CoreError>) -> Result<T> {
    match &result {
        Ok(_) => debug!(view = %view, action, ?id, "mutation applied"),
        Err(CoreError::NotFound(missing)) => {
            warn!(view = %view, action, id = missing, "mutation target not found");
        }
        Err(err) if err.is_validation() => info!(view = %view, action, %err, "mutation rejected"),
        Err(err) => warn!(view = %view, action, %err, "mutation failed"),
    }
    result.map_err(anyhow::Error::from)
}

impl Console {
    /// Mount every view from `data`.
    ///
    /// # Errors
    /// Fails when `config` is invalid or a fixture set is malformed.
    pub fn new(config: ConsoleConfig, data: &dyn MockDataProvider) -> Result<Self> {
        config.validate()?;
        let page_size = config.page_size;
        let console = Self {
            router: Router::new(),
            permissions: PermissionStore::new(data.permissions().context("failed to mount permissions")?),
            users: mount(ViewId::Users, data.users(), page_size)?,
            triggers: mount(ViewId::Triggers, data.triggers(), page_size)?,
            journeys: mount(ViewId::Journeys, data.journeys(), page_size)?,
            snippets: mount(ViewId::Snippets, data.snippets(), page_size)?,
            memory_objects: mount(ViewId::MemoryObjects, data.memory_objects(), page_size)?,
            drift_items: mount(ViewId::DriftScanner, data.drift_items(), page_size)?,
            webhooks: mount(ViewId::Webhooks, data.webhooks(), page_size)?,
            audit_log: mount(ViewId::AuditLog, data.audit_log(), page_size)?,
            webhook_tests: SimulatedLoader::from_config(&config),
            webhook_test_target: None,
            uploads: SimulatedLoader::new(config.load_delay(), 1.0, config.rng_seed),
            config,
        };
        debug!(page_size, "console mounted");
        Ok(console)
    }

    /// # Errors
    /// See [`Console::new`].
    pub fn with_fixtures(config: ConsoleConfig) -> Result<Self> {
        Self::new(config, &StaticFixtures)
    }

    #[must_use]
    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// # Errors
    /// Returns the router error for unknown paths; the current view is unchanged.
    pub fn navigate(&mut self, path: &str) -> Result<ViewId> {
        Ok(self.router.navigate(path)?)
    }

    /// # Errors
    /// Fails for tool views that have no table.
    pub fn table(&self, view: ViewId) -> Result<&dyn TableView> {
        let table: &dyn TableView = match view {
            ViewId::Users => &self.users,
            ViewId::Triggers => &self.triggers,
            ViewId::Journeys => &self.journeys,
            ViewId::Snippets => &self.snippets,
            ViewId::MemoryObjects => &self.memory_objects,
            ViewId::DriftScanner => &self.drift_items,
            ViewId::Webhooks => &self.webhooks,
            ViewId::AuditLog => &self.audit_log,
            ViewId::Permissions | ViewId::Atomizer | ViewId::Upload => bail!("view {view} is not a table"),
        };
        Ok(table)
    }

    /// # Errors
    /// Fails for tool views that have no table.
    pub fn table_mut(&mut self, view: ViewId) -> Result<&mut dyn TableView> {
        let table: &mut dyn TableView = match view {
            ViewId::Users => &mut self.users,
            ViewId::Triggers => &mut self.triggers,
            ViewId::Journeys => &mut self.journeys,
            ViewId::Snippets => &mut self.snippets,
            ViewId::MemoryObjects => &mut self.memory_objects,
            ViewId::DriftScanner => &mut self.drift_items,
            ViewId::Webhooks => &mut self.webhooks,
            ViewId::AuditLog => &mut self.audit_log,
            ViewId::Permissions | ViewId::Atomizer | ViewId::Upload => bail!("view {view} is not a table"),
        };
        Ok(table)
    }

    /// Install `filter` on a list view after checking the view offers that field.
    ///
    /// # Errors
    /// Returns a validation error for undeclared filter fields, or fails for tool views.
    pub fn apply_filter(&mut self, view: ViewId, filter: FieldFilter) -> Result<()> {
        let layout = view_spec(view).ok_or_else(|| anyhow!("view {view} has no table layout"))?;
        let checked = layout.check_filter(&filter).map_err(CoreError::from);
        logged(view, "filter", None, checked)?;
        self.table_mut(view)?.set_filter(filter);
        Ok(())
    }

    /// # Errors
    /// Fails for tool views or when the page cannot be rendered.
    pub fn snapshot(&self, view: ViewId) -> Result<PageSnapshot> {
        Ok(self.table(view)?.snapshot()?)
    }

    #[must_use]
    pub fn users(&self) -> &TableController<User> {
        &self.users
    }

    #[must_use]
    pub fn triggers(&self) -> &TableController<Trigger> {
        &self.triggers
    }

    #[must_use]
    pub fn journeys(&self) -> &TableController<Journey> {
        &self.journeys
    }

    #[must_use]
    pub fn snippets(&self) -> &TableController<Snippet> {
        &self.snippets
    }

    #[must_use]
    pub fn webhooks(&self) -> &TableController<Webhook> {
        &self.webhooks
    }

    /// # Errors
    /// Returns [`CoreError::Validation`] for blank fields or an existing name.
    pub fn add_trigger(&mut self, draft: Trigger) -> Result<RecordId> {
        logged(ViewId::Triggers, "add", None, self.triggers.add(draft))
    }

    /// # Errors
    /// Returns [`CoreError::NotFound`] or a validation error; the trigger is unchanged on error.
    pub fn update_trigger<F>(&mut self, id: RecordId, patch: F) -> Result<Trigger>
    where
        F: FnOnce(&mut Trigger),
    {
        let result = self.triggers.update(id, patch).cloned();
        logged(ViewId::Triggers, "update", Some(id), result)
    }

    /// # Errors
    /// Returns [`CoreError::NotFound`].
    pub fn remove_trigger(&mut self, id: RecordId) -> Result<Trigger> {
        logged(ViewId::Triggers, "remove", Some(id), self.triggers.remove(id))
    }

    /// # Errors
    /// Returns [`CoreError::Validation`] for blank fields or a malformed email.
    pub fn add_user(&mut self, draft: User) -> Result<RecordId> {
        logged(ViewId::Users, "add", None, self.users.add(draft))
    }

    /// Delete after confirmation; `Ok(None)` when declined.
    ///
    /// # Errors
    /// Returns [`CoreError::NotFound`] without prompting.
    pub fn delete_user(&mut self, id: RecordId, confirm: &mut dyn Confirm) -> Result<Option<User>> {
        logged(ViewId::Users, "delete", Some(id), self.users.remove_confirmed(id, confirm))
    }

    /// Delete after confirmation; `Ok(None)` when declined.
    ///
    /// # Errors
    /// Returns [`CoreError::NotFound`] without prompting.
    pub fn delete_journey(&mut self, id: RecordId, confirm: &mut dyn Confirm) -> Result<Option<Journey>> {
        logged(ViewId::Journeys, "delete", Some(id), self.journeys.remove_confirmed(id, confirm))
    }

    /// Copy a snippet body and bump its usage count; returns the new count.
    ///
    /// # Errors
    /// Returns [`CoreError::NotFound`]; nothing is copied.
    pub fn copy_snippet(&mut self, id: RecordId, clipboard: &mut dyn Clipboard) -> Result<u32> {
        let body = self.snippets.collection().get(id).map(|snippet| snippet.body.clone());
        let body = logged(ViewId::Snippets, "copy", Some(id), body.ok_or(CoreError::NotFound(id)))?;
        clipboard.write_text(&body);
        let count = self
            .snippets
            .update(id, |snippet| snippet.usage_count = snippet.usage_count.saturating_add(1))
            .map(|snippet| snippet.usage_count);
        logged(ViewId::Snippets, "count usage", Some(id), count)
    }

    /// # Errors
    /// Returns [`CoreError::Validation`] when the URL is not `http(s)`.
    pub fn add_webhook(&mut self, draft: Webhook) -> Result<RecordId> {
        logged(ViewId::Webhooks, "add", None, self.webhooks.add(draft))
    }

    #[must_use]
    pub fn webhook_test_pending(&self) -> bool {
        self.webhook_tests.is_pending()
    }

    /// Webhook whose test delivery is pending or awaiting [`Console::finish_webhook_test`].
    #[must_use]
    pub fn webhook_test_target(&self) -> Option<RecordId> {
        self.webhook_test_target
    }

    /// Start a simulated test delivery for one webhook.
    ///
    /// # Errors
    /// Returns [`CoreError::NotFound`] for unknown ids, or a
    /// [`crate::loader::LoadError`] while another test is pending.
    pub fn begin_webhook_test(&mut self, id: RecordId) -> Result<u64> {
        let exists = self.webhooks.collection().get(id).map(|_| ()).ok_or(CoreError::NotFound(id));
        logged(ViewId::Webhooks, "test", Some(id), exists)?;
        let generation = self.webhook_tests.begin(DELIVERY_OK.to_string(), DELIVERY_FAILED)?;
        self.webhook_test_target = Some(id);
        Ok(generation)
    }

    /// Wait for the test started by [`Console::begin_webhook_test`] and record
    /// its outcome on that webhook.
    ///
    /// # Errors
    /// Fails when no test was started, when it was cancelled, or when the
    /// webhook was removed while the test was pending.
    pub async fn finish_webhook_test(&mut self) -> Result<WebhookTestReport> {
        let id = self.webhook_test_target.ok_or_else(|| anyhow!("no webhook test was started"))?;
        let outcome = self.webhook_tests.settled().await;
        self.webhook_test_target = None;
        let (status, message) = match outcome {
            LoadState::Ready(message) => (DeliveryStatus::Delivered, message),
            LoadState::Failed(message) => (DeliveryStatus::Failed, message),
            LoadState::Idle | LoadState::Loading => bail!("webhook test for {id} was cancelled"),
        };
        let recorded = self.webhooks.update(id, |webhook| webhook.last_delivery = Some(status)).map(|_| ());
        logged(ViewId::Webhooks, "record delivery", Some(id), recorded)?;
        Ok(WebhookTestReport { webhook_id: id, status, message })
    }

    /// Run a simulated test delivery and record the outcome on the webhook.
    ///
    /// # Errors
    /// See [`Console::begin_webhook_test`] and [`Console::finish_webhook_test`].
    pub async fn test_webhook(&mut self, id: RecordId) -> Result<WebhookTestReport> {
        self.begin_webhook_test(id)?;
        self.finish_webhook_test().await
    }

    /// Validate an upload and start its simulated transfer.
    ///
    /// # Errors
    /// Returns a validation error for blank names or files above
    /// `max_upload_bytes`, or a [`crate::loader::LoadError`].
    pub fn begin_upload(&mut self, file_name: &str, size_bytes: u64) -> Result<u64> {
        let checked: Result<(), CoreError> = if file_name.trim().is_empty() {
            Err(ValidationError::Required { field: "file_name" }.into())
        } else if size_bytes > self.config.max_upload_bytes {
            Err(ValidationError::Invalid(format!(
                "{file_name} is {size_bytes} bytes; uploads are limited to {} bytes",
                self.config.max_upload_bytes
            ))
            .into())
        } else {
            Ok(())
        };
        logged(ViewId::Upload, "upload", None, checked)?;
        let receipt = UploadReceipt { file_name: file_name.trim().to_string(), size_bytes };
        Ok(self.uploads.begin(receipt, UPLOAD_FAILED)?)
    }

    /// # Errors
    /// See [`Console::begin_upload`].
    pub async fn upload(&mut self, file_name: &str, size_bytes: u64) -> Result<LoadState<UploadReceipt>> {
        self.begin_upload(file_name, size_bytes)?;
        Ok(self.uploads.settled().await)
    }

    #[must_use]
    pub fn upload_state(&self) -> LoadState<UploadReceipt> {
        self.uploads.state()
    }

    /// Abort every pending simulated load.
    pub fn cancel_pending(&mut self) {
        self.webhook_tests.cancel();
        self.webhook_test_target = None;
        self.uploads.cancel();
    }

    #[must_use]
    pub fn permissions(&self) -> &PermissionStore {
        &self.permissions
    }

    /// # Errors
    /// Returns [`CoreError::UnknownRole`].
    pub fn open_permission_editor(&self, role: &str) -> Result<PermissionEditor> {
        Ok(PermissionEditor::open(&self.permissions, role)?)
    }
}
