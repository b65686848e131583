//! engine.rs
//! Public entry points.
//!
//! An `Engine` pairs an externally owned `CodecHandle` with an `EngineConfig`.
//! Calls are independent: nothing but the handle's initialised codec outlives a call.
use std::sync::Arc;

use crate::compression::{AdaptiveCompressor, AdaptiveDecompressor, Codec, CodecHandle};
use crate::compression::codecs::ZstdCodec;
use crate::config::{CompressOptions, DecompressOptions, EngineConfig};
use crate::telemetry::{CallReport, TelemetryCounters, TelemetryTimer};
use crate::types::EngineError;

#[derive(Debug, Clone)]
pub struct Engine {
    codec: Arc<CodecHandle>,
    config: EngineConfig,
}

impl Engine {
    /// # Errors
    /// - `EngineError::Config` if `config` does not validate.
    pub fn new(codec: Arc<CodecHandle>, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { codec, config })
    }

    /// Engine over a lazily initialised zstd codec at `config.level`.
    pub fn with_zstd(config: EngineConfig) -> Result<Self, EngineError> {
        let level = config.level;
        let handle = CodecHandle::lazy(move || async move {
            ZstdCodec::new(level).map(|c| Arc::new(c) as Arc<dyn Codec>)
        });
        Self::new(Arc::new(handle), config)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn codec_handle(&self) -> &Arc<CodecHandle> {
        &self.codec
    }

    pub async fn compress(&self, input: &[u8], opts: CompressOptions) -> Result<Vec<u8>, EngineError> {
        self.compress_with_report(input, opts).await.map(|(out, _)| out)
    }

    pub async fn decompress(&self, input: &[u8], opts: DecompressOptions) -> Result<Vec<u8>, EngineError> {
        self.decompress_with_report(input, opts).await.map(|(out, _)| out)
    }

    /// Like `compress`, also returning what the call did.
    pub async fn compress_with_report(
        &self,
        input: &[u8],
        opts: CompressOptions,
    ) -> Result<(Vec<u8>, CallReport), EngineError> {
        let chunk_kb = opts.resolve(&self.config)?;
        let mut counters = TelemetryCounters::new(input.len());
        let mut timer = TelemetryTimer::new();

        let out = AdaptiveCompressor::new(&self.codec, &self.config)
            .compress(input, chunk_kb, &mut counters, &mut timer)
            .await?;

        timer.finish();
        Ok((out, CallReport::from(&counters, &timer)))
    }

    pub async fn decompress_with_report(
        &self,
        input: &[u8],
        opts: DecompressOptions,
    ) -> Result<(Vec<u8>, CallReport), EngineError> {
        let threshold_kb = opts.resolve(&self.config)?;
        let mut counters = TelemetryCounters::new(input.len());
        let mut timer = TelemetryTimer::new();

        let out = AdaptiveDecompressor::new(&self.codec)
            .decompress(input, threshold_kb, &mut counters, &mut timer)
            .await?;

        timer.finish();
        Ok((out, CallReport::from(&counters, &timer)))
    }

    /// Blocking wrapper for hosts without an executor.
    pub fn compress_blocking(&self, input: &[u8], opts: CompressOptions) -> Result<Vec<u8>, EngineError> {
        pollster::block_on(self.compress(input, opts))
    }

    pub fn decompress_blocking(&self, input: &[u8], opts: DecompressOptions) -> Result<Vec<u8>, EngineError> {
        pollster::block_on(self.decompress(input, opts))
    }
}
