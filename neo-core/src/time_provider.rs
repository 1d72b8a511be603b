// Copyright (C) 2015-2025 The Neo Project.
//
// time_provider.rs file belongs to the neo project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Time source abstraction for testable time-based operations.
//!
//! Components that stamp or compare wall-clock times (pool items,
//! re-verification budgets, rebroadcast cut-offs) hold an
//! `Arc<dyn TimeSource>` handed to them at construction, so tests can drive
//! time deterministically without touching any process-wide state.
//!
//! ```rust
//! use neo_core::time_provider::{ManualTimeSource, TimeSource};
//!
//! let clock = ManualTimeSource::new(1_600_000_000_000);
//! clock.advance_millis(250);
//! assert_eq!(clock.utc_now().timestamp_millis(), 1_600_000_000_250);
//! ```

use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Trait implemented by concrete time sources.
pub trait TimeSource: Send + Sync {
    /// Returns the current UTC time.
    fn utc_now(&self) -> DateTime<Utc>;

    /// Returns the current UTC time as milliseconds since Unix epoch.
    fn utc_now_timestamp_millis(&self) -> i64 {
        self.utc_now().timestamp_millis()
    }
}

/// Default system-backed time source.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn utc_now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Time source that only moves when told to.
#[derive(Debug)]
pub struct ManualTimeSource(AtomicI64);

impl ManualTimeSource {
    pub fn new(timestamp_millis: i64) -> Self {
        Self(AtomicI64::new(timestamp_millis))
    }

    pub fn set_millis(&self, timestamp_millis: i64) {
        self.0.store(timestamp_millis, Ordering::SeqCst);
    }

    pub fn advance_millis(&self, delta: i64) {
        self.0.fetch_add(delta, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn utc_now(&self) -> DateTime<Utc> {
        let millis = self.0.load(Ordering::SeqCst);
        Utc.timestamp_millis_opt(millis)
            .single()
            .unwrap_or_default()
    }
}

/// Returns the system clock as a shareable time source.
pub fn system_time() -> Arc<dyn TimeSource> {
    Arc::new(SystemTimeSource)
}
