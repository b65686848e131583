//! compression/mod.rs
//! Adaptive chunked compression over a single-shot codec.
//!
//! - `scanner` finds frame boundaries in a multi-frame archive.
//! - `compressor` / `decompressor` implement the fast path and the chunked/split fallbacks.
//! - `handle` owns the codec and its one-time initialisation.
//! - `classify` decides what counts as running out of memory.

pub mod classify;
pub mod codecs;
pub mod compressor;
pub mod decompressor;
pub mod handle;
pub mod scanner;
pub mod types;

pub use classify::is_allocation_error;
pub use compressor::AdaptiveCompressor;
pub use decompressor::AdaptiveDecompressor;
pub use handle::CodecHandle;
pub use scanner::{count_frames, find_frame_offsets, frame_ranges, plan_frames, FramePlan};
pub use types::*;
