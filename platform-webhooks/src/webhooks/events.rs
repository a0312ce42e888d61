//! Webhook event types and payload builders.
//!
//! Defines the event types and the standard payload envelope for platform webhook deliveries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! webhook_events {
    ($($variant:ident => $name:tt, $description:literal;)*) => {
        /// Webhook event types emitted by the platform.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum WebhookEventType {
            $(
                #[serde(rename = $name)]
                $variant,
            )*
        }

        impl WebhookEventType {
            /// Every event type, in declaration order.
            pub const ALL: &'static [WebhookEventType] = &[$(Self::$variant,)*];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)*
                }
            }

            /// Human-readable summary shown when listing subscribable events.
            pub fn description(&self) -> &'static str {
                match self {
                    $(Self::$variant => $description,)*
                }
            }
        }

        impl std::str::FromStr for WebhookEventType {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(Self::$variant),)*
                    _ => Err(format!("Unknown event type: {}", s)),
                }
            }
        }
    };
}

webhook_events! {
    UserCreated => "user.created", "A user account was created";
    UserUpdated => "user.updated", "A user's profile or attributes changed";
    UserDeleted => "user.deleted", "A user account was deleted";
    UserActivated => "user.activated", "A user account was activated";
    UserDeactivated => "user.deactivated", "A user account was deactivated";
    TeamCreated => "team.created", "A team was created";
    TeamUpdated => "team.updated", "A team's details changed";
    TeamDeleted => "team.deleted", "A team was deleted";
    TeamMemberAdded => "team.member_added", "A user joined a team";
    TeamMemberRemoved => "team.member_removed", "A user was removed from a team";
    TeamMemberRoleChanged => "team.member_role_changed", "A team member's role changed";
    InvitationCreated => "invitation.created", "An invitation was created";
    InvitationSent => "invitation.sent", "An invitation email was sent";
    InvitationAccepted => "invitation.accepted", "An invitation was accepted";
    InvitationExpired => "invitation.expired", "An invitation expired before it was accepted";
    InvitationRevoked => "invitation.revoked", "An invitation was revoked";
    RoleCreated => "role.created", "A custom role was created";
    RoleUpdated => "role.updated", "A role's permissions changed";
    RoleDeleted => "role.deleted", "A custom role was deleted";
    RoleAssigned => "role.assigned", "A role was assigned to a user";
    RoleRemoved => "role.removed", "A role was removed from a user";
    SessionCreated => "session.created", "A user signed in";
    SessionExpired => "session.expired", "A user session expired";
    SettingsUpdated => "settings.updated", "Tenant settings changed";
}

impl WebhookEventType {
    /// Resource family of the event, e.g. `team` for `team.member_added`.
    pub fn category(&self) -> &'static str {
        let name = self.as_str();
        name.split_once('.').map_or(name, |(category, _)| category)
    }
}

/// Listing entry for a subscribable event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventInfo {
    pub name: WebhookEventType,
    pub description: &'static str,
    pub category: &'static str,
}

impl From<WebhookEventType> for EventInfo {
    fn from(event: WebhookEventType) -> Self {
        Self {
            name: event,
            description: event.description(),
            category: event.category(),
        }
    }
}

/// Catalogue of every event a webhook can subscribe to.
pub fn list_events() -> Vec<EventInfo> {
    WebhookEventType::ALL.iter().copied().map(EventInfo::from).collect()
}

impl std::fmt::Display for WebhookEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery state as reported by the platform for a webhook attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Pending,
    Success,
    Failed,
    Retrying,
}

/// Standard webhook payload envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    /// Unique event id (e.g., "evt_...")
    pub id: String,
    /// Event type (e.g., "user.created")
    pub event: WebhookEventType,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// Tenant the event belongs to
    pub tenant_id: String,
    /// Event-specific data
    pub data: serde_json::Value,
}

impl WebhookPayload {
    /// Create a payload for an event that just happened.
    pub fn new(event: WebhookEventType, tenant_id: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            id: format!("evt_{}", uuid::Uuid::new_v4()),
            event,
            timestamp: Utc::now(),
            tenant_id: tenant_id.into(),
            data,
        }
    }

    /// Serialize to the exact JSON string that is signed and sent.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
