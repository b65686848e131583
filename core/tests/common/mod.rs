#![allow(dead_code)]

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use async_trait::async_trait;
use zframe_core::constants::FRAME_MAGIC;
use zframe_core::prelude::*;

/// How a scripted codec misbehaves.
#[derive(Clone, Copy, Debug)]
pub enum Fault {
    None,
    /// Text-only allocation failure (no structured variant), like a trapped runtime.
    OomAbove(usize),
    /// Structured allocation failure.
    AllocAbove(usize),
    /// Non-allocation failure on every call.
    Corrupt,
}

impl Fault {
    fn check(self, len: usize) -> Result<(), CodecError> {
        match self {
            Fault::None => Ok(()),
            Fault::OomAbove(max) if len > max => {
                Err(CodecError::process("mock", "RangeError: Cannot enlarge memory arrays"))
            }
            Fault::AllocAbove(max) if len > max => Err(CodecError::allocation("mock", "arena full")),
            Fault::Corrupt => Err(CodecError::process("mock", "invalid frame header")),
            _ => Ok(()),
        }
    }
}

/// Real zstd underneath, with scripted faults and a log of every input length.
pub struct ScriptedCodec {
    inner: ZstdCodec,
    pub compress_fault: Fault,
    pub decompress_fault: Fault,
    pub compress_calls: Mutex<Vec<usize>>,
    pub decompress_calls: Mutex<Vec<usize>>,
}

impl ScriptedCodec {
    pub fn new(compress_fault: Fault, decompress_fault: Fault) -> Self {
        Self {
            inner: ZstdCodec::default(),
            compress_fault,
            decompress_fault,
            compress_calls: Mutex::new(Vec::new()),
            decompress_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn compress_lens(&self) -> Vec<usize> {
        self.compress_calls.lock().unwrap().clone()
    }

    pub fn decompress_lens(&self) -> Vec<usize> {
        self.decompress_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Codec for ScriptedCodec {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn compress(&self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
        self.compress_calls.lock().unwrap().push(input.len());
        self.compress_fault.check(input.len())?;
        self.inner.compress(input).await
    }

    async fn decompress(&self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
        self.decompress_calls.lock().unwrap().push(input.len());
        self.decompress_fault.check(input.len())?;
        self.inner.decompress(input).await
    }
}

/// Transparent framing with exact sizes: magic, u32 LE length, payload.
/// Lets tests build archives of a precise byte length.
pub struct StoredCodec;

pub const STORED_OVERHEAD: usize = 8;

#[async_trait]
impl Codec for StoredCodec {
    fn name(&self) -> &'static str {
        "stored"
    }

    async fn compress(&self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::with_capacity(input.len() + STORED_OVERHEAD);
        out.extend_from_slice(&FRAME_MAGIC);
        out.extend_from_slice(&(input.len() as u32).to_le_bytes());
        out.extend_from_slice(input);
        Ok(out)
    }

    async fn decompress(&self, mut input: &[u8]) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::new();
        while !input.is_empty() {
            if input.len() < STORED_OVERHEAD || input[..4] != FRAME_MAGIC {
                return Err(CodecError::process("stored", "bad frame"));
            }
            let len = u32::from_le_bytes([input[4], input[5], input[6], input[7]]) as usize;
            let end = STORED_OVERHEAD + len;
            if input.len() < end {
                return Err(CodecError::process("stored", "truncated frame"));
            }
            out.extend_from_slice(&input[STORED_OVERHEAD..end]);
            input = &input[end..];
        }
        Ok(out)
    }
}

/// Yields once so concurrent futures get a chance to interleave.
pub struct YieldOnce(bool);

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            return Poll::Ready(());
        }
        self.0 = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

pub fn yield_once() -> YieldOnce {
    YieldOnce(false)
}

/// Non-reentrant codec that records the highest number of overlapping calls.
#[derive(Default)]
pub struct OverlapTracker {
    active: AtomicUsize,
    pub max_active: AtomicUsize,
}

#[async_trait]
impl Codec for OverlapTracker {
    fn name(&self) -> &'static str {
        "overlap"
    }

    async fn compress(&self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        yield_once().await;
        self.active.fetch_sub(1, Ordering::SeqCst);
        StoredCodec.compress(input).await
    }

    async fn decompress(&self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
        StoredCodec.decompress(input).await
    }
}

pub fn engine_with<C: Codec + 'static>(codec: Arc<C>, config: EngineConfig) -> Engine {
    let handle = CodecHandle::from_arc(codec);
    Engine::new(Arc::new(handle), config).unwrap()
}

/// Deterministic, moderately compressible bytes.
pub fn sample(len: usize) -> Vec<u8> {
    let mut x: u32 = 0x1234_5678;
    (0..len)
        .map(|i| {
            x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            if i % 7 == 0 { (x >> 24) as u8 } else { (i % 13) as u8 }
        })
        .collect()
}

/// Incompressible bytes (xorshift), so zstd stores them verbatim.
pub fn noise(len: usize, seed: u32) -> Vec<u8> {
    let mut x = seed | 1;
    (0..len)
        .map(|_| {
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            (x >> 8) as u8
        })
        .collect()
}
