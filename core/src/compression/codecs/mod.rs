//! compression/codecs/mod.rs
//! Concrete single-shot codecs.

pub mod zstd;

pub use self::zstd::*;
