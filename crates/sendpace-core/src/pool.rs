//! Mailbox pool configuration: ordered sending identities and caps.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::pacing::GapRange;

/// A sending identity with its own daily quota.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mailbox {
    pub address: String,
    #[serde(default = "default_daily_cap")]
    pub daily_cap: u32,
}

fn default_daily_cap() -> u32 {
    10
}

/// Ordered mailbox pool with per-mailbox and global daily caps.
///
/// Position in the pool defines first-fit priority: the allocator
/// fills the first mailbox to its cap before touching the next. The
/// pool is static configuration; it never changes within a scheduling
/// day.
#[derive(Debug, Clone)]
pub struct MailboxPool {
    mailboxes: Vec<Mailbox>,
    global_daily_cap: u32,
    gap_range: GapRange,
}

impl MailboxPool {
    /// Build a validated pool.
    ///
    /// # Errors
    /// Fails on an empty pool, a blank or duplicate address, or a
    /// non-positive cap. A single-mailbox pool is valid.
    pub fn new(
        mailboxes: Vec<Mailbox>,
        global_daily_cap: u32,
        gap_range: GapRange,
    ) -> Result<Self, ValidationError> {
        if mailboxes.is_empty() {
            return Err(ValidationError::EmptyCollection(
                "mailbox pool".to_string(),
            ));
        }
        if global_daily_cap < 1 {
            return Err(ValidationError::InvalidValue {
                field: "global_daily_cap".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        for (index, mailbox) in mailboxes.iter().enumerate() {
            if mailbox.address.trim().is_empty() {
                return Err(ValidationError::InvalidValue {
                    field: format!("mailboxes[{index}].address"),
                    message: "must not be empty".to_string(),
                });
            }
            if mailbox.daily_cap < 1 {
                return Err(ValidationError::InvalidValue {
                    field: format!("mailboxes[{index}].daily_cap"),
                    message: "must be greater than 0".to_string(),
                });
            }
            let duplicate = mailboxes[..index]
                .iter()
                .any(|earlier| earlier.address == mailbox.address);
            if duplicate {
                return Err(ValidationError::InvalidValue {
                    field: format!("mailboxes[{index}].address"),
                    message: format!("duplicate address '{}'", mailbox.address),
                });
            }
        }
        Ok(Self {
            mailboxes,
            global_daily_cap,
            gap_range,
        })
    }

    /// Mailboxes in first-fit priority order.
    pub fn mailboxes(&self) -> &[Mailbox] {
        &self.mailboxes
    }

    /// Daily cap for `address`, or `None` if it is not in the pool.
    pub fn daily_cap_for(&self, address: &str) -> Option<u32> {
        self.mailboxes
            .iter()
            .find(|m| m.address == address)
            .map(|m| m.daily_cap)
    }

    /// Total sends admitted per day across all mailboxes.
    pub fn global_daily_cap(&self) -> u32 {
        self.global_daily_cap
    }

    /// Gap range applied between consecutive sends from one mailbox.
    pub fn gap_range(&self) -> GapRange {
        self.gap_range
    }
}
