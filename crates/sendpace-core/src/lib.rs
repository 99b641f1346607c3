//! # Sendpace Core Library
//!
//! This library provides the core admission logic for paced email
//! sending. Each send request is assigned a mailbox and a future send
//! instant, or turned down, under per-mailbox and global daily quotas.
//! Actual delivery is out of scope; a separate worker reads committed
//! slots and sends when they fall due.
//!
//! ## Architecture
//!
//! - **Allocator**: A pure first-fit decision over a day's committed
//!   schedule; all inputs are explicit, nothing is read or written
//! - **Service**: The read-decide-write cycle around the allocator,
//!   with a conditional commit that re-runs on concurrent admissions
//! - **Storage**: SQLite-backed schedule store and TOML-based pool
//!   configuration, plus an in-memory store for tests and embedding
//! - **Pacing**: Gap sampling policies that space sends per mailbox
//!
//! ## Key Components
//!
//! - [`SchedulingService`]: Admission entry point
//! - [`SlotAllocator`]: First-fit slot decision
//! - [`SqliteStore`]: Committed-schedule persistence
//! - [`PoolConfig`]: Mailbox pool and pacing configuration

pub mod allocator;
pub mod clock;
pub mod error;
pub mod pacing;
pub mod pool;
pub mod send;
pub mod service;
pub mod storage;

pub use allocator::{AllocationOutcome, RejectReason, SlotAllocator};
pub use clock::{day_bounds, Clock, FixedClock, SystemClock};
pub use error::{ConfigError, ScheduleError, StoreError, ValidationError};
pub use pacing::{FixedGapPolicy, GapPolicy, GapRange, SequenceGapPolicy, UniformGapPolicy};
pub use pool::{Mailbox, MailboxPool};
pub use send::{NewScheduledSend, ScheduledSend, SendRequest};
pub use service::SchedulingService;
pub use storage::{MemoryStore, PacingConfig, PoolConfig, ScheduleStore, SqliteStore};
