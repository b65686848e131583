//! compression/types.rs
//! Codec seam and the errors that cross it.
use async_trait::async_trait;
use thiserror::Error;

/// Failure reported by a single codec invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The codec knows it ran out of memory (structured signal).
    #[error("codec {codec} allocation failed: {msg}")]
    Allocation { codec: &'static str, msg: String },

    /// Codec runtime could not be brought up.
    #[error("codec {codec} init failed: {msg}")]
    InitFailed { codec: &'static str, msg: String },

    /// Any other compress/decompress failure. The message is kept verbatim,
    /// allocation classification may still fall back to inspecting it.
    #[error("codec {codec} process failed: {msg}")]
    ProcessFailed { codec: &'static str, msg: String },
}

impl CodecError {
    pub fn process(codec: &'static str, msg: impl Into<String>) -> Self {
        CodecError::ProcessFailed { codec, msg: msg.into() }
    }

    pub fn allocation(codec: &'static str, msg: impl Into<String>) -> Self {
        CodecError::Allocation { codec, msg: msg.into() }
    }

    /// Raw message without the codec prefix.
    pub fn message(&self) -> &str {
        match self {
            CodecError::Allocation { msg, .. }
            | CodecError::InitFailed { msg, .. }
            | CodecError::ProcessFailed { msg, .. } => msg,
        }
    }
}

/// Errors surfaced by the adaptive compressor and decompressor.
#[derive(Debug, Error)]
pub enum CompressionError {
    /// Non-allocation codec failure, propagated unchanged.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Chunk size already at the floor and the codec still ran out of memory.
    #[error(
        "resource exhausted: {input_len} bytes could not be compressed even with {floor_kb} KB chunks \
         (last error: {last}); reduce input size or use a server-side path"
    )]
    ResourceExhausted {
        input_len: usize,
        floor_kb: u32,
        last: CodecError,
    },
}

impl CompressionError {
    pub fn is_resource_exhausted(&self) -> bool {
        matches!(self, CompressionError::ResourceExhausted { .. })
    }
}

/// Single-shot byte codec.
///
/// One `compress` call must produce exactly one self-contained frame, and
/// `decompress` must accept one frame (or a concatenation of frames when the
/// underlying format allows it).
// Require Send + Sync so a handle can be shared across tasks.
#[async_trait]
pub trait Codec: Send + Sync {
    /// Short name used in errors and logs.
    fn name(&self) -> &'static str;

    /// Whether concurrent calls on one instance are safe. Defaults to no, which
    /// makes the handle serialise calls.
    fn is_reentrant(&self) -> bool {
        false
    }

    /// Exact length of the complete frame at the start of `input`, when the
    /// format can tell. `None` leaves frame splitting to the marker scan.
    fn frame_len(&self, _input: &[u8]) -> Option<usize> {
        None
    }

    async fn compress(&self, input: &[u8]) -> Result<Vec<u8>, CodecError>;

    async fn decompress(&self, input: &[u8]) -> Result<Vec<u8>, CodecError>;
}
