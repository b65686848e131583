//! zframe-core
//!
//! Adaptive chunked zstd compression for memory-constrained hosts.
//!
//! Large payloads are compressed as a run of independent frames; allocation
//! failures shrink the chunk size and retry, and decompression falls back to
//! frame-by-frame decoding when a single pass would not fit.

#![forbid(unsafe_code)]

// Shared and top level
pub mod config;
pub mod constants;
pub mod types;
pub mod utils;

pub mod compression;
pub mod telemetry;

pub mod engine;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::compression::{
        find_frame_offsets, is_allocation_error, Codec, CodecError, CodecHandle, CompressionError,
    };
    pub use crate::compression::codecs::ZstdCodec;
    pub use crate::config::{CompressOptions, DecompressOptions, EngineConfig};
    pub use crate::engine::Engine;
    pub use crate::telemetry::{CallPath, CallReport};
    pub use crate::types::EngineError;
}
