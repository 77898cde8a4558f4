//! Concrete records backing the console's list views.

use marketing_os_core::validation::{validate_http_url, validate_range};
use marketing_os_core::{FieldValue, Record, RecordId, ValidationError};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash)]
pub enum UserRole {
    Admin,
    Editor,
    Analyst,
    Viewer,
}

impl UserRole {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Editor => "Editor",
            Self::Analyst => "Analyst",
            Self::Viewer => "Viewer",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash)]
pub enum UserStatus {
    Active,
    Invited,
    Suspended,
}

impl UserStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Invited => "Invited",
            Self::Suspended => "Suspended",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub status: UserStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub last_active: OffsetDateTime,
}

impl Record for User {
    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "name" => Some(FieldValue::Text(&self.name)),
            "email" => Some(FieldValue::Text(&self.email)),
            "role" => Some(FieldValue::Text(self.role.as_str())),
            "status" => Some(FieldValue::Text(self.status.as_str())),
            "last_active" => Some(FieldValue::Timestamp(self.last_active)),
            _ => None,
        }
    }

    fn required_fields(&self) -> Vec<(&'static str, &str)> {
        vec![("name", &self.name), ("email", &self.email)]
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let email = self.email.trim();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
            _ => Err(ValidationError::Invalid(format!("email `{email}` is not a valid address"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash)]
pub enum Channel {
    Email,
    #[serde(rename = "SMS")]
    Sms,
    Push,
    Webhook,
}

impl Channel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "Email",
            Self::Sms => "SMS",
            Self::Push => "Push",
            Self::Webhook => "Webhook",
        }
    }
}

/// Event trigger; names are unique per collection (case-insensitive).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trigger {
    pub id: RecordId,
    pub name: String,
    pub event: String,
    pub channel: Channel,
    pub enabled: bool,
}

impl Record for Trigger {
    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "name" => Some(FieldValue::Text(&self.name)),
            "event" => Some(FieldValue::Text(&self.event)),
            "channel" => Some(FieldValue::Text(self.channel.as_str())),
            "enabled" => Some(FieldValue::Flag(self.enabled)),
            _ => None,
        }
    }

    fn required_fields(&self) -> Vec<(&'static str, &str)> {
        vec![("name", &self.name), ("event", &self.event)]
    }

    fn unique_name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash)]
pub enum JourneyStatus {
    Active,
    Paused,
    Draft,
    Completed,
}

impl JourneyStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Paused => "Paused",
            Self::Draft => "Draft",
            Self::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Journey {
    pub id: RecordId,
    pub name: String,
    pub status: JourneyStatus,
    pub audience_size: u32,
    /// Percentage, 0–100.
    pub conversion_rate: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Record for Journey {
    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "name" => Some(FieldValue::Text(&self.name)),
            "status" => Some(FieldValue::Text(self.status.as_str())),
            "audience_size" => Some(FieldValue::Number(f64::from(self.audience_size))),
            "conversion_rate" => Some(FieldValue::Number(self.conversion_rate)),
            "updated_at" => Some(FieldValue::Timestamp(self.updated_at)),
            _ => None,
        }
    }

    fn required_fields(&self) -> Vec<(&'static str, &str)> {
        vec![("name", &self.name)]
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_range("conversion_rate", self.conversion_rate, 0.0, 100.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snippet {
    pub id: RecordId,
    pub title: String,
    pub category: String,
    pub body: String,
    pub usage_count: u32,
}

impl Record for Snippet {
    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "title" => Some(FieldValue::Text(&self.title)),
            "category" => Some(FieldValue::Text(&self.category)),
            "body" => Some(FieldValue::Text(&self.body)),
            "usage_count" => Some(FieldValue::Number(f64::from(self.usage_count))),
            _ => None,
        }
    }

    fn required_fields(&self) -> Vec<(&'static str, &str)> {
        vec![("title", &self.title), ("body", &self.body)]
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash)]
pub enum MemoryObjectType {
    Persona,
    Insight,
    Campaign,
    Asset,
}

impl MemoryObjectType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Persona => "Persona",
            Self::Insight => "Insight",
            Self::Campaign => "Campaign",
            Self::Asset => "Asset",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryObject {
    pub id: RecordId,
    pub title: String,
    #[serde(rename = "type")]
    pub object_type: MemoryObjectType,
    pub trust_score: u8,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Record for MemoryObject {
    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "title" => Some(FieldValue::Text(&self.title)),
            "type" => Some(FieldValue::Text(self.object_type.as_str())),
            "trust_score" => Some(FieldValue::Number(f64::from(self.trust_score))),
            "created_at" => Some(FieldValue::Timestamp(self.created_at)),
            _ => None,
        }
    }

    fn required_fields(&self) -> Vec<(&'static str, &str)> {
        vec![("title", &self.title)]
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_range("trust_score", f64::from(self.trust_score), 0.0, 100.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash)]
pub enum DriftStatus {
    Stable,
    Watch,
    Drifting,
}

impl DriftStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stable => "Stable",
            Self::Watch => "Watch",
            Self::Drifting => "Drifting",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DriftItem {
    pub id: RecordId,
    pub signal: String,
    pub segment: String,
    pub drift_score: u8,
    pub status: DriftStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub detected_at: OffsetDateTime,
}

impl Record for DriftItem {
    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "signal" => Some(FieldValue::Text(&self.signal)),
            "segment" => Some(FieldValue::Text(&self.segment)),
            "drift_score" => Some(FieldValue::Number(f64::from(self.drift_score))),
            "status" => Some(FieldValue::Text(self.status.as_str())),
            "detected_at" => Some(FieldValue::Timestamp(self.detected_at)),
            _ => None,
        }
    }

    fn required_fields(&self) -> Vec<(&'static str, &str)> {
        vec![("signal", &self.signal)]
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_range("drift_score", f64::from(self.drift_score), 0.0, 100.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Delivered,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Webhook {
    pub id: RecordId,
    pub name: String,
    pub url: String,
    pub event: String,
    pub active: bool,
    pub last_delivery: Option<DeliveryStatus>,
}

impl Record for Webhook {
    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "name" => Some(FieldValue::Text(&self.name)),
            "url" => Some(FieldValue::Text(&self.url)),
            "event" => Some(FieldValue::Text(&self.event)),
            "active" => Some(FieldValue::Flag(self.active)),
            "last_delivery" => self.last_delivery.map(|status| {
                FieldValue::Text(match status {
                    DeliveryStatus::Delivered => "delivered",
                    DeliveryStatus::Failed => "failed",
                })
            }),
            _ => None,
        }
    }

    fn required_fields(&self) -> Vec<(&'static str, &str)> {
        vec![("name", &self.name), ("url", &self.url)]
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_http_url("url", &self.url)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash)]
pub enum AuditAction {
    Created,
    Updated,
    Published,
    Restored,
    Deleted,
}

impl AuditAction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::Updated => "Updated",
            Self::Published => "Published",
            Self::Restored => "Restored",
            Self::Deleted => "Deleted",
        }
    }
}

/// One row of the version history / audit log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditEntry {
    pub id: RecordId,
    pub actor: String,
    pub action: AuditAction,
    pub target: String,
    pub version: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
}

impl Record for AuditEntry {
    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "actor" => Some(FieldValue::Text(&self.actor)),
            "action" => Some(FieldValue::Text(self.action.as_str())),
            "target" => Some(FieldValue::Text(&self.target)),
            "version" => Some(FieldValue::Number(f64::from(self.version))),
            "at" => Some(FieldValue::Timestamp(self.at)),
            _ => None,
        }
    }

    fn required_fields(&self) -> Vec<(&'static str, &str)> {
        vec![("actor", &self.actor), ("target", &self.target)]
    }
}
