//! Slot allocation: pick the next mailbox and send instant for a request.
//!
//! The allocator is a pure decision over explicit inputs:
//! - Checks the global daily cap before any per-mailbox reasoning
//! - Selects a mailbox first-fit in pool order
//! - Spaces the candidate from that mailbox's own last send (or from
//!   `now` for its first send of the day) by a sampled gap
//! - Never places a send past end-of-day
//!
//! The sampled gap is the only randomness; with a fixed gap policy the
//! decision is fully deterministic.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::day_bounds;
use crate::pacing::GapPolicy;
use crate::pool::MailboxPool;
use crate::send::ScheduledSend;

/// Why a structurally valid request was turned down.
///
/// A rejection is a correct decision, not a fault; the caller sees it
/// verbatim and must not retry with the same inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    /// The day's global quota is fully booked.
    DailyLimitReached,
    /// Every mailbox in the pool is at its own daily cap.
    AllMailboxesExhausted,
    /// The selected mailbox's next slot would fall past end-of-day.
    NoCapacityToday,
}

/// Allocation decision for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AllocationOutcome {
    Accepted {
        mailbox: String,
        scheduled_at: DateTime<Utc>,
    },
    Rejected {
        reason: RejectReason,
    },
}

impl AllocationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, AllocationOutcome::Accepted { .. })
    }
}

/// First-fit slot allocator over a fixed mailbox pool.
///
/// First-fit is deliberate: a low-index mailbox absorbs traffic until
/// its cap is hit before the next one is touched. Do not rebalance
/// this into round-robin.
pub struct SlotAllocator {
    pool: MailboxPool,
}

impl SlotAllocator {
    pub fn new(pool: MailboxPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MailboxPool {
        &self.pool
    }

    /// Decide the next (mailbox, instant) for one send.
    ///
    /// `day_schedule` must hold the committed sends of `now`'s UTC day,
    /// ordered ascending by instant.
    pub fn allocate(
        &self,
        now: DateTime<Utc>,
        day_schedule: &[ScheduledSend],
        gap_policy: &dyn GapPolicy,
    ) -> AllocationOutcome {
        let (_, end_of_day) = day_bounds(now);

        // 1. Global admission check. Reaching the cap exactly already
        //    blocks the next send.
        if day_schedule.len() >= self.pool.global_daily_cap() as usize {
            return AllocationOutcome::Rejected {
                reason: RejectReason::DailyLimitReached,
            };
        }

        // 2. Per-mailbox counts and latest instants. The input is
        //    ascending, so the last instant seen per mailbox is its max.
        let mut counts: HashMap<&str, u32> = HashMap::new();
        let mut last_sent_at: HashMap<&str, DateTime<Utc>> = HashMap::new();
        for send in day_schedule {
            *counts.entry(send.mailbox.as_str()).or_insert(0) += 1;
            last_sent_at.insert(send.mailbox.as_str(), send.scheduled_at);
        }

        // 3. First-fit scan in pool order.
        let mut selected = None;
        for mailbox in self.pool.mailboxes() {
            let used = counts.get(mailbox.address.as_str()).copied().unwrap_or(0);
            if used < mailbox.daily_cap {
                selected = Some(mailbox);
                break;
            }
        }
        let mailbox = match selected {
            Some(mailbox) => mailbox,
            None => {
                return AllocationOutcome::Rejected {
                    reason: RejectReason::AllMailboxesExhausted,
                }
            }
        };

        // 4. Gap sampling.
        let gap = Duration::minutes(gap_policy.next_gap(self.pool.gap_range()));

        // 5. Candidate instant, anchored on this mailbox's own last
        //    send. Its first send of the day anchors on `now`.
        let anchor = last_sent_at
            .get(mailbox.address.as_str())
            .copied()
            .unwrap_or(now);
        let candidate = anchor + gap;

        // 6. Day-boundary check. The bound is inclusive; no rollover
        //    into tomorrow.
        if candidate > end_of_day {
            return AllocationOutcome::Rejected {
                reason: RejectReason::NoCapacityToday,
            };
        }

        // 7. Reserve.
        AllocationOutcome::Accepted {
            mailbox: mailbox.address.clone(),
            scheduled_at: candidate,
        }
    }
}
