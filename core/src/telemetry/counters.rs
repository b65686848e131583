//! telemetry/counters.rs
//! Mutable counters collected during one compress/decompress call.
//!
//! Summary: frame and byte counts plus back-off bookkeeping.
//! Converted into an immutable `CallReport` when the call ends.
use serde::{Deserialize, Serialize};

/// Which route the call took in the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallPath {
    /// Single whole-buffer codec call.
    Fast,
    /// Compression through size-bounded chunks.
    Chunked,
    /// Decompression frame by frame.
    Split,
}

#[derive(Default, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TelemetryCounters {
    pub path: Option<CallPath>,
    /// Frames written (compress) or decoded (decompress) by the successful attempt.
    pub frames: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
    /// Codec passes over the input, fast path included.
    pub attempts: u32,
    pub allocation_failures: u32,
    /// Chunk size of the last chunked attempt.
    pub chunk_size_kb: Option<u32>,
}

impl TelemetryCounters {
    pub fn new(bytes_in: usize) -> Self {
        Self { bytes_in: bytes_in as u64, ..Self::default() }
    }

    /// Start a new pass. Output from an abandoned pass is forgotten.
    pub fn begin_attempt(&mut self, path: CallPath, chunk_size_kb: Option<u32>) {
        self.attempts += 1;
        self.path = Some(path);
        self.chunk_size_kb = chunk_size_kb;
        self.frames = 0;
        self.bytes_out = 0;
    }

    pub fn add_frame(&mut self, out_len: usize) {
        self.frames += 1;
        self.bytes_out += out_len as u64;
    }

    pub fn add_allocation_failure(&mut self) {
        self.allocation_failures += 1;
    }
}
