//! Admission service: one read-decide-write cycle per send request.
//!
//! This module ties the pieces together for a single admission:
//! - Validates the request before touching the store
//! - Reads the day's committed schedule once per attempt
//! - Lets the allocator decide on that snapshot
//! - Commits accepted slots conditionally; a rejection persists nothing
//!
//! The conditional commit carries the day count the decision was based
//! on. If another admission landed in between, the store refuses the
//! insert and the whole cycle re-runs on a fresh snapshot, up to
//! [`MAX_COMMIT_ATTEMPTS`] times.

use std::sync::Arc;

use crate::allocator::{AllocationOutcome, SlotAllocator};
use crate::clock::{day_bounds, Clock, SystemClock};
use crate::error::{Result, ScheduleError, StoreError, ValidationError};
use crate::pacing::{GapPolicy, UniformGapPolicy};
use crate::pool::MailboxPool;
use crate::send::{NewScheduledSend, SendRequest};
use crate::storage::ScheduleStore;

/// Commit attempts before an admission gives up as contended.
const MAX_COMMIT_ATTEMPTS: u32 = 3;

/// Slot admission over a shared schedule store.
///
/// One instance serves concurrent callers; correctness under races
/// comes from the store's conditional insert, not from locking here.
pub struct SchedulingService {
    store: Arc<dyn ScheduleStore>,
    allocator: SlotAllocator,
    clock: Box<dyn Clock>,
    gap_policy: Box<dyn GapPolicy>,
}

impl SchedulingService {
    /// Service with the system clock and uniform gap sampling.
    pub fn new(store: Arc<dyn ScheduleStore>, pool: MailboxPool) -> Self {
        Self {
            store,
            allocator: SlotAllocator::new(pool),
            clock: Box::new(SystemClock),
            gap_policy: Box::new(UniformGapPolicy),
        }
    }

    /// Replace the clock. Tests pin the day with a fixed instant.
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the gap sampler.
    pub fn with_gap_policy(mut self, gap_policy: Box<dyn GapPolicy>) -> Self {
        self.gap_policy = gap_policy;
        self
    }

    pub fn pool(&self) -> &MailboxPool {
        self.allocator.pool()
    }

    /// Admit one send request.
    ///
    /// Returns the allocator's decision. `Rejected` outcomes are
    /// terminal for today's inputs and leave the store untouched.
    ///
    /// # Errors
    ///
    /// Fails on an invalid request, an unavailable store, or when
    /// [`MAX_COMMIT_ATTEMPTS`] consecutive commits lost against
    /// concurrent admissions.
    pub fn schedule(&self, request: &SendRequest) -> Result<AllocationOutcome> {
        validate_request(request)?;

        // One clock reading per admission. Conflict retries re-read the
        // schedule but keep the same day window and anchor.
        let now = self.clock.now_utc();
        let (day_start, day_end) = day_bounds(now);

        let mut attempts = 0;
        loop {
            attempts += 1;
            let day_schedule = self.store.query_day(day_start, day_end)?;
            let outcome = self
                .allocator
                .allocate(now, &day_schedule, self.gap_policy.as_ref());

            let (mailbox, scheduled_at) = match &outcome {
                AllocationOutcome::Accepted {
                    mailbox,
                    scheduled_at,
                } => (mailbox.clone(), *scheduled_at),
                AllocationOutcome::Rejected { reason } => {
                    tracing::debug!(
                        "send to {} rejected: {:?}",
                        request.recipient,
                        reason
                    );
                    return Ok(outcome);
                }
            };

            let new_send = NewScheduledSend {
                mailbox,
                recipient: request.recipient.clone(),
                subject: request.subject.clone(),
                body_text: request.body_text.clone(),
                sender_name: request.sender_name.clone(),
                scheduled_at,
            };

            match self.store.insert(&new_send, day_schedule.len()) {
                Ok(id) => {
                    tracing::info!(
                        "scheduled send {} via {} at {}",
                        id,
                        new_send.mailbox,
                        new_send.scheduled_at.to_rfc3339()
                    );
                    return Ok(outcome);
                }
                Err(StoreError::Conflict) if attempts < MAX_COMMIT_ATTEMPTS => {
                    tracing::debug!(
                        "commit attempt {} lost to a concurrent admission, re-reading",
                        attempts
                    );
                }
                Err(StoreError::Conflict) => {
                    tracing::warn!(
                        "giving up after {} contended commit attempts",
                        attempts
                    );
                    return Err(ScheduleError::Contention { attempts });
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

fn validate_request(request: &SendRequest) -> Result<(), ValidationError> {
    if request.recipient.trim().is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "recipient".to_string(),
            message: "must not be empty".to_string(),
        });
    }
    Ok(())
}
