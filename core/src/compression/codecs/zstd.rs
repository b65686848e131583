//! src/compression/codecs/zstd.rs
//!
//! Single-shot zstd codec.
//!
//! Design notes:
//! - One `compress` call produces exactly one zstd frame (bulk API, no streaming state).
//! - The output buffer is sized with `try_reserve_exact`, so a refused allocation comes
//!   back as `CodecError::Allocation` instead of aborting the process.
//! - `decompress` accepts concatenated frames, which is what the whole-buffer fast path needs.
//!   When the frame headers declare the content size, the output is reserved up front with
//!   the same fallible reservation; only size-less input is decoded through the stream API.
//! - `frame_len` reports exact frame sizes, so markers inside frame data never split a frame.
//! - zstd's own errors keep their message text (e.g. "Allocation error : not enough memory")
//!   so the textual classifier can still see them.
use async_trait::async_trait;

use crate::compression::types::{Codec, CodecError};
use crate::constants::DEFAULT_LEVEL_ZSTD;

const CODEC: &str = "zstd";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZstdCodec {
    level: i32,
}

impl ZstdCodec {
    /// Create a zstd codec at the given level.
    ///
    /// # Errors
    /// - `CodecError::InitFailed` if the level is outside zstd's supported range.
    pub fn new(level: i32) -> Result<Self, CodecError> {
        let range = zstd::compression_level_range();
        if !range.contains(&level) {
            return Err(CodecError::InitFailed {
                codec: CODEC,
                msg: format!(
                    "level {} outside {}..={}",
                    level,
                    range.start(),
                    range.end()
                ),
            });
        }
        Ok(Self { level })
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    fn compress_frame(&self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
        let bound = zstd_safe::compress_bound(input.len());
        let mut out: Vec<u8> = Vec::new();
        out.try_reserve_exact(bound)
            .map_err(|e| CodecError::allocation(CODEC, format!("{} bytes: {}", bound, e)))?;

        let mut ctx = zstd::bulk::Compressor::new(self.level)
            .map_err(|e| CodecError::InitFailed { codec: CODEC, msg: e.to_string() })?;
        ctx.compress_to_buffer(input, &mut out)
            .map_err(|e| CodecError::process(CODEC, e.to_string()))?;
        Ok(out)
    }

    fn decompress_frames(&self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
        let declared = match zstd_safe::find_decompressed_size(input) {
            Ok(Some(n)) if n > 0 => n,
            _ => {
                return zstd::stream::decode_all(input)
                    .map_err(|e| CodecError::process(CODEC, e.to_string()));
            }
        };

        let mut out = reserve_output(declared)?;
        let mut ctx = zstd::bulk::Decompressor::new()
            .map_err(|e| CodecError::InitFailed { codec: CODEC, msg: e.to_string() })?;
        ctx.decompress_to_buffer(input, &mut out)
            .map_err(|e| CodecError::process(CODEC, e.to_string()))?;
        Ok(out)
    }
}

/// Empty buffer with room for `len` bytes, or `CodecError::Allocation` if the
/// allocator refuses.
fn reserve_output(len: u64) -> Result<Vec<u8>, CodecError> {
    let len = usize::try_from(len)
        .map_err(|_| CodecError::allocation(CODEC, format!("{} bytes exceed the address space", len)))?;
    let mut out: Vec<u8> = Vec::new();
    out.try_reserve_exact(len)
        .map_err(|e| CodecError::allocation(CODEC, format!("{} bytes: {}", len, e)))?;
    Ok(out)
}

impl Default for ZstdCodec {
    fn default() -> Self {
        Self { level: DEFAULT_LEVEL_ZSTD }
    }
}

#[async_trait]
impl Codec for ZstdCodec {
    fn name(&self) -> &'static str {
        CODEC
    }

    // Every call builds its own context, nothing is shared between calls.
    fn is_reentrant(&self) -> bool {
        true
    }

    fn frame_len(&self, input: &[u8]) -> Option<usize> {
        zstd_safe::find_frame_compressed_size(input).ok()
    }

    async fn compress(&self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
        self.compress_frame(input)
    }

    async fn decompress(&self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
        self.decompress_frames(input)
    }
}
