//! config.rs
//! Engine-wide defaults and per-call overrides.
//!
//! Defaults are built once (code, JSON, or environment) and handed to the engine.
//! Environment values are plain base-10 integers; nothing is evaluated.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    env_vars, DEFAULT_CHUNK_SIZE_KB, DEFAULT_COMPRESS_LIMIT_KB, DEFAULT_LEVEL_ZSTD,
    DEFAULT_THRESHOLD_KB, MIN_CHUNK_SIZE_KB,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{key}: cannot parse {value:?} as an integer")]
    Parse { key: &'static str, value: String },

    #[error("{key} must be greater than zero")]
    Zero { key: &'static str },

    #[error("invalid config json: {0}")]
    Json(String),
}

/// Process-wide engine defaults. All sizes in KB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Starting chunk size for the chunked compression path.
    pub chunk_size_kb: u32,
    /// Decompression fast path applies at or below this size.
    pub threshold_kb: u32,
    /// Compression fast path applies at or below this size.
    pub compress_limit_kb: u32,
    /// Back-off floor.
    pub min_chunk_size_kb: u32,
    /// Codec level, only meaningful for codecs built from this config.
    pub level: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_size_kb: DEFAULT_CHUNK_SIZE_KB,
            threshold_kb: DEFAULT_THRESHOLD_KB,
            compress_limit_kb: DEFAULT_COMPRESS_LIMIT_KB,
            min_chunk_size_kb: MIN_CHUNK_SIZE_KB,
            level: DEFAULT_LEVEL_ZSTD,
        }
    }
}

impl EngineConfig {
    /// Read overrides from the process environment. Unset variables keep their default.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, with the variable source injected.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(v) = parse_var(&lookup, env_vars::CHUNK_SIZE_KB)? {
            cfg.chunk_size_kb = v;
        }
        if let Some(v) = parse_var(&lookup, env_vars::THRESHOLD_KB)? {
            cfg.threshold_kb = v;
        }
        if let Some(v) = parse_var(&lookup, env_vars::COMPRESS_LIMIT_KB)? {
            cfg.compress_limit_kb = v;
        }
        if let Some(v) = parse_var(&lookup, env_vars::MIN_CHUNK_SIZE_KB)? {
            cfg.min_chunk_size_kb = v;
        }
        if let Some(v) = parse_var(&lookup, env_vars::LEVEL)? {
            cfg.level = v;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse from JSON; missing fields take their default.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        nonzero(env_vars::CHUNK_SIZE_KB, self.chunk_size_kb)?;
        nonzero(env_vars::THRESHOLD_KB, self.threshold_kb)?;
        nonzero(env_vars::COMPRESS_LIMIT_KB, self.compress_limit_kb)?;
        nonzero(env_vars::MIN_CHUNK_SIZE_KB, self.min_chunk_size_kb)?;
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::Parse { key, value: raw }),
    }
}

fn nonzero(key: &'static str, v: u32) -> Result<(), ConfigError> {
    if v == 0 {
        return Err(ConfigError::Zero { key });
    }
    Ok(())
}

/// Per-call compression override.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressOptions {
    pub chunk_size_kb: Option<u32>,
}

impl CompressOptions {
    pub fn chunk_size_kb(kb: u32) -> Self {
        Self { chunk_size_kb: Some(kb) }
    }

    /// Effective starting chunk size; the per-call value wins.
    pub fn resolve(&self, cfg: &EngineConfig) -> Result<u32, ConfigError> {
        let kb = self.chunk_size_kb.unwrap_or(cfg.chunk_size_kb);
        nonzero("chunk_size_kb", kb)?;
        Ok(kb)
    }
}

/// Per-call decompression override.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecompressOptions {
    pub threshold_kb: Option<u32>,
}

impl DecompressOptions {
    pub fn threshold_kb(kb: u32) -> Self {
        Self { threshold_kb: Some(kb) }
    }

    pub fn resolve(&self, cfg: &EngineConfig) -> Result<u32, ConfigError> {
        let kb = self.threshold_kb.unwrap_or(cfg.threshold_kb);
        nonzero("threshold_kb", kb)?;
        Ok(kb)
    }
}
