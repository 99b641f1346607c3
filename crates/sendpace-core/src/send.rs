//! Send requests and committed schedule records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One request to send one message to one recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendRequest {
    pub recipient: String,
    pub subject: String,
    pub body_text: String,
    /// Display name shown next to the assigned mailbox address. Has no
    /// effect on slot allocation.
    #[serde(default)]
    pub sender_name: String,
}

/// A reserved slot about to be committed to the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewScheduledSend {
    pub mailbox: String,
    pub recipient: String,
    pub subject: String,
    pub body_text: String,
    pub sender_name: String,
    pub scheduled_at: DateTime<Utc>,
}

impl NewScheduledSend {
    /// Attach the store-assigned id once the commit succeeds.
    pub fn with_id(self, id: i64) -> ScheduledSend {
        ScheduledSend {
            id,
            mailbox: self.mailbox,
            recipient: self.recipient,
            subject: self.subject,
            body_text: self.body_text,
            sender_name: self.sender_name,
            scheduled_at: self.scheduled_at,
        }
    }
}

/// A committed slot reservation.
///
/// Never mutated once stored; the day it belongs to is derived from
/// `scheduled_at`'s UTC calendar date. Dispatch at the scheduled
/// instant is a delivery worker's job, not this library's.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledSend {
    pub id: i64,
    pub mailbox: String,
    pub recipient: String,
    pub subject: String,
    pub body_text: String,
    pub sender_name: String,
    pub scheduled_at: DateTime<Utc>,
}
