//! compression/handle.rs
//! Externally owned codec handle.
//!
//! Summary: initialises the codec at most once (single-flight, async lock) and
//! serialises calls into codecs that are not reentrant. Engines borrow the handle;
//! nothing here is global, so every test can build its own.
use std::fmt;
use std::future::Future;
use std::sync::{Arc, OnceLock};

use futures::future::BoxFuture;
use futures::lock::Mutex;
use futures::FutureExt;

use crate::compression::types::{Codec, CodecError};

type Init = Box<dyn Fn() -> BoxFuture<'static, Result<Arc<dyn Codec>, CodecError>> + Send + Sync>;

pub struct CodecHandle {
    ready: OnceLock<Arc<dyn Codec>>,
    init: Option<Init>,
    init_lock: Mutex<()>,
    call_lock: Mutex<()>,
}

impl CodecHandle {
    /// Wrap an already constructed codec.
    pub fn new<C: Codec + 'static>(codec: C) -> Self {
        Self::from_arc(Arc::new(codec))
    }

    pub fn from_arc(codec: Arc<dyn Codec>) -> Self {
        let ready = OnceLock::new();
        let _ = ready.set(codec);
        Self {
            ready,
            init: None,
            init_lock: Mutex::new(()),
            call_lock: Mutex::new(()),
        }
    }

    /// Defer codec construction to the first call.
    ///
    /// Concurrent first calls run `init` once; the others wait for it. A failed
    /// init is not memoised, the next call tries again.
    pub fn lazy<F, Fut>(init: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Arc<dyn Codec>, CodecError>> + Send + 'static,
    {
        Self {
            ready: OnceLock::new(),
            init: Some(Box::new(move || init().boxed())),
            init_lock: Mutex::new(()),
            call_lock: Mutex::new(()),
        }
    }

    pub fn is_initialised(&self) -> bool {
        self.ready.get().is_some()
    }

    /// Resolve the codec, running the initialiser if this is the first use.
    pub async fn codec(&self) -> Result<Arc<dyn Codec>, CodecError> {
        if let Some(codec) = self.ready.get() {
            return Ok(codec.clone());
        }

        let _guard = self.init_lock.lock().await;
        // Another caller may have finished while we waited.
        if let Some(codec) = self.ready.get() {
            return Ok(codec.clone());
        }

        let init = self.init.as_ref().ok_or_else(|| CodecError::InitFailed {
            codec: "unknown",
            msg: "handle has neither a codec nor an initialiser".into(),
        })?;
        let codec = init().await?;
        tracing::debug!(codec = codec.name(), "codec initialised");
        Ok(self.ready.get_or_init(|| codec).clone())
    }

    pub async fn compress(&self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
        let codec = self.codec().await?;
        if codec.is_reentrant() {
            return codec.compress(input).await;
        }
        let _serial = self.call_lock.lock().await;
        codec.compress(input).await
    }

    pub async fn decompress(&self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
        let codec = self.codec().await?;
        if codec.is_reentrant() {
            return codec.decompress(input).await;
        }
        let _serial = self.call_lock.lock().await;
        codec.decompress(input).await
    }
}

impl fmt::Debug for CodecHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecHandle")
            .field("codec", &self.ready.get().map(|c| c.name()))
            .field("lazy", &self.init.is_some())
            .finish()
    }
}
