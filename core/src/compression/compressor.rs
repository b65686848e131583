//! compression/compressor.rs
//! Adaptive chunked compression.
//!
//! Design notes:
//! - Inputs up to `compress_limit_kb` get one whole-buffer attempt first.
//! - The chunked path compresses each slice into its own frame and concatenates them.
//! - An allocation failure anywhere in a pass throws the pass away, halves the chunk
//!   size and starts over; once at the floor it becomes `ResourceExhausted`.
//! - Any other codec error is returned as is, without retrying.
use tracing::{debug, warn};

use crate::compression::classify::is_allocation_error;
use crate::compression::handle::CodecHandle;
use crate::compression::types::{CodecError, CompressionError};
use crate::config::EngineConfig;
use crate::telemetry::{CallPath, Stage, TelemetryCounters, TelemetryTimer};
use crate::utils::{chunks_of, halve_chunk_kb, kb_to_bytes};

pub struct AdaptiveCompressor<'a> {
    codec: &'a CodecHandle,
    config: &'a EngineConfig,
}

impl<'a> AdaptiveCompressor<'a> {
    pub fn new(codec: &'a CodecHandle, config: &'a EngineConfig) -> Self {
        Self { codec, config }
    }

    /// Compress `input` into one or more concatenated frames.
    ///
    /// `chunk_size_kb` is the starting chunk size for the chunked path.
    pub async fn compress(
        &self,
        input: &[u8],
        chunk_size_kb: u32,
        counters: &mut TelemetryCounters,
        timer: &mut TelemetryTimer,
    ) -> Result<Vec<u8>, CompressionError> {
        let limit = kb_to_bytes(self.config.compress_limit_kb);
        if input.len() <= limit {
            counters.begin_attempt(CallPath::Fast, None);
            let result = {
                let _t = timer.stage(Stage::Compress);
                self.codec.compress(input).await
            };
            match result {
                Ok(frame) => {
                    counters.add_frame(frame.len());
                    debug!(len = input.len(), out = frame.len(), "compressed in one frame");
                    return Ok(frame);
                }
                Err(e) if is_allocation_error(&e) => {
                    counters.add_allocation_failure();
                    warn!(len = input.len(), error = %e, "whole-buffer compression ran out of memory, chunking");
                }
                Err(e) => return Err(e.into()),
            }
        } else {
            debug!(len = input.len(), limit, "input above compress limit, chunking");
        }

        self.compress_chunked(input, chunk_size_kb, counters, timer).await
    }

    async fn compress_chunked(
        &self,
        input: &[u8],
        start_kb: u32,
        counters: &mut TelemetryCounters,
        timer: &mut TelemetryTimer,
    ) -> Result<Vec<u8>, CompressionError> {
        let floor_kb = self.config.min_chunk_size_kb;
        let mut chunk_kb = start_kb;

        loop {
            counters.begin_attempt(CallPath::Chunked, Some(chunk_kb));
            match self.compress_pass(input, chunk_kb, counters, timer).await {
                Ok(out) => {
                    debug!(
                        len = input.len(),
                        out = out.len(),
                        chunk_kb,
                        frames = counters.frames,
                        "compressed in chunks"
                    );
                    return Ok(out);
                }
                Err(e) if is_allocation_error(&e) => {
                    counters.add_allocation_failure();
                    match halve_chunk_kb(chunk_kb, floor_kb) {
                        Some(next) => {
                            warn!(from_kb = chunk_kb, to_kb = next, error = %e, "allocation failure, retrying with smaller chunks");
                            chunk_kb = next;
                        }
                        None => {
                            warn!(chunk_kb, floor_kb, error = %e, "allocation failure at chunk floor, giving up");
                            return Err(CompressionError::ResourceExhausted {
                                input_len: input.len(),
                                floor_kb,
                                last: e,
                            });
                        }
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// One full pass at a fixed chunk size. Nothing leaks out on failure.
    async fn compress_pass(
        &self,
        input: &[u8],
        chunk_kb: u32,
        counters: &mut TelemetryCounters,
        timer: &mut TelemetryTimer,
    ) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::new();
        for chunk in chunks_of(input, kb_to_bytes(chunk_kb)) {
            let frame = {
                let _t = timer.stage(Stage::Compress);
                self.codec.compress(chunk).await?
            };
            counters.add_frame(frame.len());
            out.extend_from_slice(&frame);
        }
        Ok(out)
    }
}
