//! Mount-time mock data.
//!
//! The console has no backend; every view starts from a `MockDataProvider`.
//! Scores such as drift, trust and conversion are fixed numbers here, not the
//! output of any model.

use anyhow::Result;
use marketing_os_core::{PermissionMatrix, PermissionSet};
use time::macros::datetime;

use crate::records::{
    AuditAction, AuditEntry, Channel, DriftItem, DriftStatus, Journey, JourneyStatus,
    MemoryObject, MemoryObjectType, Snippet, Trigger, User, UserRole, UserStatus, Webhook,
};

pub const MODULES: [&str; 7] = [
    "Signal Studio",
    "Memory Loom",
    "Signal Flow",
    "SignalCore",
    "SignalScope",
    "Admin Tools",
    "Developer SDK",
];

pub trait MockDataProvider {
    fn users(&self) -> Vec<User>;
    fn triggers(&self) -> Vec<Trigger>;
    fn journeys(&self) -> Vec<Journey>;
    fn snippets(&self) -> Vec<Snippet>;
    fn memory_objects(&self) -> Vec<MemoryObject>;
    fn drift_items(&self) -> Vec<DriftItem>;
    fn webhooks(&self) -> Vec<Webhook>;
    fn audit_log(&self) -> Vec<AuditEntry>;

    /// # Errors
    /// Returns an error when a fixture row breaks the permission cascade.
    fn permissions(&self) -> Result<PermissionMatrix>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StaticFixtures;

fn user(id: u64, name: &str, email: &str, role: UserRole, status: UserStatus) -> User {
    User {
        id,
        name: name.to_string(),
        email: email.to_string(),
        role,
        status,
        last_active: datetime!(2024-05-01 09:00 UTC) + time::Duration::hours(i64::try_from(id * 13).unwrap_or(0)),
    }
}

impl MockDataProvider for StaticFixtures {
    fn users(&self) -> Vec<User> {
        vec![
            user(1, "Dana Whitfield", "dana@signal.example", UserRole::Admin, UserStatus::Active),
            user(2, "Marcus Lee", "marcus@signal.example", UserRole::Editor, UserStatus::Active),
            user(3, "Priya Natarajan", "priya@signal.example", UserRole::Analyst, UserStatus::Active),
            user(4, "Tomás Ortega", "tomas@signal.example", UserRole::Viewer, UserStatus::Invited),
            user(5, "Alex Kim", "alex@signal.example", UserRole::Editor, UserStatus::Suspended),
            user(6, "Jordan Blake", "jordan@signal.example", UserRole::Viewer, UserStatus::Active),
        ]
    }

    fn triggers(&self) -> Vec<Trigger> {
        [
            (1, "Email Opened", "email.opened", Channel::Email, true),
            (2, "Link Clicked", "email.link_clicked", Channel::Email, true),
            (3, "Cart Abandoned", "commerce.cart_abandoned", Channel::Push, true),
            (4, "SMS Reply", "sms.replied", Channel::Sms, false),
            (5, "Form Submitted", "forms.submitted", Channel::Webhook, true),
        ]
        .into_iter()
        .map(|(id, name, event, channel, enabled)| Trigger {
            id,
            name: name.to_string(),
            event: event.to_string(),
            channel,
            enabled,
        })
        .collect()
    }

    fn journeys(&self) -> Vec<Journey> {
        vec![
            Journey {
                id: 1,
                name: "Welcome Series".to_string(),
                status: JourneyStatus::Active,
                audience_size: 12_480,
                conversion_rate: 18.4,
                updated_at: datetime!(2024-05-10 14:30 UTC),
            },
            Journey {
                id: 2,
                name: "Cart Recovery".to_string(),
                status: JourneyStatus::Active,
                audience_size: 3_205,
                conversion_rate: 9.7,
                updated_at: datetime!(2024-05-12 08:15 UTC),
            },
            Journey {
                id: 3,
                name: "Win-back Q2".to_string(),
                status: JourneyStatus::Paused,
                audience_size: 8_960,
                conversion_rate: 4.1,
                updated_at: datetime!(2024-04-28 17:45 UTC),
            },
            Journey {
                id: 4,
                name: "Product Launch Teaser".to_string(),
                status: JourneyStatus::Draft,
                audience_size: 0,
                conversion_rate: 0.0,
                updated_at: datetime!(2024-05-14 11:00 UTC),
            },
            Journey {
                id: 5,
                name: "Loyalty Anniversary".to_string(),
                status: JourneyStatus::Completed,
                audience_size: 1_530,
                conversion_rate: 22.9,
                updated_at: datetime!(2024-03-30 10:20 UTC),
            },
        ]
    }

    fn snippets(&self) -> Vec<Snippet> {
        [
            (1, "Friendly greeting", "Openers", "Hi {{first_name}}, hope your week is going well!", 42),
            (2, "Discount reminder", "Promotions", "Your 15% code expires in 48 hours.", 17),
            (3, "Unsubscribe footer", "Compliance", "You can unsubscribe at any time.", 96),
            (4, "Cart nudge", "Promotions", "Still thinking it over? Your cart is waiting.", 23),
        ]
        .into_iter()
        .map(|(id, title, category, body, usage_count)| Snippet {
            id,
            title: title.to_string(),
            category: category.to_string(),
            body: body.to_string(),
            usage_count,
        })
        .collect()
    }

    fn memory_objects(&self) -> Vec<MemoryObject> {
        [
            (1, "Budget-conscious parents", MemoryObjectType::Persona, 82, datetime!(2024-02-02 09:00 UTC)),
            (2, "Tuesday sends outperform", MemoryObjectType::Insight, 67, datetime!(2024-03-11 16:40 UTC)),
            (3, "Spring Refresh 2024", MemoryObjectType::Campaign, 91, datetime!(2024-03-20 12:00 UTC)),
            (4, "Hero banner v3", MemoryObjectType::Asset, 45, datetime!(2024-04-05 08:30 UTC)),
            (5, "Lapsed premium buyers", MemoryObjectType::Persona, 58, datetime!(2024-04-18 13:10 UTC)),
        ]
        .into_iter()
        .map(|(id, title, object_type, trust_score, created_at)| MemoryObject {
            id,
            title: title.to_string(),
            object_type,
            trust_score,
            created_at,
        })
        .collect()
    }

    fn drift_items(&self) -> Vec<DriftItem> {
        [
            (1, "Open rate", "New subscribers", 12, DriftStatus::Stable, datetime!(2024-05-01 06:00 UTC)),
            (2, "Click-through", "Returning buyers", 47, DriftStatus::Watch, datetime!(2024-05-03 06:00 UTC)),
            (3, "Brand tone", "Gen Z", 78, DriftStatus::Drifting, datetime!(2024-05-04 06:00 UTC)),
            (4, "Unsubscribe rate", "All contacts", 33, DriftStatus::Watch, datetime!(2024-05-06 06:00 UTC)),
            (5, "Offer affinity", "VIP", 91, DriftStatus::Drifting, datetime!(2024-05-07 06:00 UTC)),
            (6, "Send-time fit", "EMEA", 47, DriftStatus::Watch, datetime!(2024-05-08 06:00 UTC)),
        ]
        .into_iter()
        .map(|(id, signal, segment, drift_score, status, detected_at)| DriftItem {
            id,
            signal: signal.to_string(),
            segment: segment.to_string(),
            drift_score,
            status,
            detected_at,
        })
        .collect()
    }

    fn webhooks(&self) -> Vec<Webhook> {
        [
            (1, "CRM contact sync", "https://crm.example.com/hooks/contacts", "contact.created", true),
            (2, "Slack alerts", "https://hooks.slack.example/services/T000/B000", "journey.failed", true),
            (3, "Data warehouse", "https://ingest.warehouse.example/v1/events", "event.tracked", false),
        ]
        .into_iter()
        .map(|(id, name, url, event, active)| Webhook {
            id,
            name: name.to_string(),
            url: url.to_string(),
            event: event.to_string(),
            active,
            last_delivery: None,
        })
        .collect()
    }

    fn audit_log(&self) -> Vec<AuditEntry> {
        [
            (1, "Dana Whitfield", AuditAction::Created, "Welcome Series", 1, datetime!(2024-04-01 09:00 UTC)),
            (2, "Marcus Lee", AuditAction::Updated, "Welcome Series", 2, datetime!(2024-04-03 10:30 UTC)),
            (3, "Marcus Lee", AuditAction::Published, "Welcome Series", 3, datetime!(2024-04-03 11:00 UTC)),
            (4, "Priya Natarajan", AuditAction::Updated, "Cart Recovery", 4, datetime!(2024-04-20 15:45 UTC)),
            (5, "Dana Whitfield", AuditAction::Restored, "Cart Recovery", 3, datetime!(2024-04-21 08:05 UTC)),
            (6, "Alex Kim", AuditAction::Deleted, "Holiday Blast", 7, datetime!(2024-05-02 17:20 UTC)),
        ]
        .into_iter()
        .map(|(id, actor, action, target, version, at)| AuditEntry {
            id,
            actor: actor.to_string(),
            action,
            target: target.to_string(),
            version,
            at,
        })
        .collect()
    }

    fn permissions(&self) -> Result<PermissionMatrix> {
        let mut matrix = PermissionMatrix::new();
        for module in MODULES {
            let restricted = matches!(module, "Admin Tools" | "Developer SDK");
            matrix.insert("Admin", module, PermissionSet::FULL)?;
            matrix.insert(
                "Editor",
                module,
                if restricted { PermissionSet::VIEW_ONLY } else { PermissionSet::EDITOR },
            )?;
            matrix.insert(
                "Analyst",
                module,
                if module == "SignalScope" { PermissionSet::EDITOR } else { PermissionSet::VIEW_ONLY },
            )?;
            matrix.insert(
                "Viewer",
                module,
                if restricted { PermissionSet::NONE } else { PermissionSet::VIEW_ONLY },
            )?;
        }
        Ok(matrix)
    }
}
