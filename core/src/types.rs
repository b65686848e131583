use thiserror::Error;

use crate::{
    compression::{CodecError, CompressionError},
    config::ConfigError,
};

/// Unified engine error.
/// - `From<T>` impls let `?` work across config and compression layers.
/// - Codec errors keep their original message.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Bad engine config or per-call option.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Compression/decompression error.
    #[error(transparent)]
    Compression(#[from] CompressionError),
}

impl From<CodecError> for EngineError {
    fn from(e: CodecError) -> Self {
        EngineError::Compression(CompressionError::Codec(e))
    }
}

impl EngineError {
    pub fn is_resource_exhausted(&self) -> bool {
        matches!(self, EngineError::Compression(e) if e.is_resource_exhausted())
    }

    /// The raw codec error, if that is what stopped the call.
    pub fn codec_error(&self) -> Option<&CodecError> {
        match self {
            EngineError::Compression(CompressionError::Codec(e)) => Some(e),
            _ => None,
        }
    }
}
