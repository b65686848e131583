//! src/telemetry/snapshot.rs
//!
//! Immutable per-call report built from counters and timers.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::telemetry::counters::{CallPath, TelemetryCounters};
use crate::telemetry::timers::{StageTimes, TelemetryTimer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallReport {
    pub path: Option<CallPath>,
    pub frames: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub attempts: u32,
    pub allocation_failures: u32,
    pub chunk_size_kb: Option<u32>,
    /// `bytes_out / bytes_in`, 0 for empty input.
    pub ratio: f64,
    pub elapsed: Duration,
    pub stage_times: StageTimes,
}

impl CallReport {
    pub fn from(counters: &TelemetryCounters, timer: &TelemetryTimer) -> Self {
        let ratio = if counters.bytes_in > 0 {
            counters.bytes_out as f64 / counters.bytes_in as f64
        } else {
            0.0
        };

        Self {
            path: counters.path,
            frames: counters.frames,
            bytes_in: counters.bytes_in,
            bytes_out: counters.bytes_out,
            attempts: counters.attempts,
            allocation_failures: counters.allocation_failures,
            chunk_size_kb: counters.chunk_size_kb,
            ratio,
            elapsed: timer.elapsed(),
            stage_times: timer.stage_times.clone(),
        }
    }

    pub fn retried(&self) -> bool {
        self.attempts > 1
    }

    /// Stage times can never add up to more than the whole call.
    pub fn sanity_check(&self) -> bool {
        self.stage_times.total() <= self.elapsed
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
