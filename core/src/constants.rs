//! constants.rs
//! Frame magic, size units and engine defaults.

/// zstd frame magic number as it appears on the wire (0xFD2FB528, little-endian).
// Protocol magic field, so `[u8; 4]` lets the type enforce "exactly 4 bytes".
pub const FRAME_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// One kilobyte, the unit every size knob is expressed in.
pub const KB: usize = 1024;

/// Defaults when the per-call option is None
pub const DEFAULT_CHUNK_SIZE_KB: u32 = 1024; // 1 MiB
pub const DEFAULT_THRESHOLD_KB: u32 = 10 * 1024; // 10 MiB
/// Inputs above this size skip the whole-buffer compression attempt.
pub const DEFAULT_COMPRESS_LIMIT_KB: u32 = 10 * 1024; // 10 MiB
/// Back-off never halves the chunk size below this floor.
pub const MIN_CHUNK_SIZE_KB: u32 = 64;

/// zstd's own default level.
pub const DEFAULT_LEVEL_ZSTD: i32 = 3;

/// Environment variables read by `EngineConfig::from_env`.
pub mod env_vars {
    pub const CHUNK_SIZE_KB: &str = "ZFRAME_CHUNK_SIZE_KB";
    pub const THRESHOLD_KB: &str = "ZFRAME_DECOMPRESS_THRESHOLD_KB";
    pub const COMPRESS_LIMIT_KB: &str = "ZFRAME_COMPRESS_LIMIT_KB";
    pub const MIN_CHUNK_SIZE_KB: &str = "ZFRAME_MIN_CHUNK_SIZE_KB";
    pub const LEVEL: &str = "ZFRAME_LEVEL";
}
