//! Latest-request-wins developing for interactive hosts.
//!
//! A host that re-develops on every filter tap can have several requests
//! in flight. Each request takes a token up front; when it completes, its
//! result is only handed back if no newer request was started meanwhile.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, warn};

use crate::buffer::PixelBuffer;
use crate::error::PipelineResult;
use crate::options::ProcessingOptions;
use crate::pipeline::FilmPipeline;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn generation(self) -> u64 {
        self.0
    }
}

#[derive(Debug, PartialEq)]
pub enum Developed<T> {
    Fresh(T),
    /// A newer request superseded this one.
    Stale,
}

impl<T> Developed<T> {
    pub fn fresh(self) -> Option<T> {
        match self {
            Developed::Fresh(v) => Some(v),
            Developed::Stale => None,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Developed::Stale)
    }
}

struct Inner {
    pipeline: FilmPipeline,
    generation: AtomicU64,
}

/// Shares one pipeline (and its grain cache) across requests.
#[derive(Clone)]
pub struct DevelopSession {
    inner: Arc<Inner>,
}

impl DevelopSession {
    pub fn new(pipeline: FilmPipeline) -> Self {
        Self {
            inner: Arc::new(Inner {
                pipeline,
                generation: AtomicU64::new(0),
            }),
        }
    }

    pub fn pipeline(&self) -> &FilmPipeline {
        &self.inner.pipeline
    }

    /// Start a request; every earlier token becomes stale.
    pub fn begin(&self) -> RequestToken {
        RequestToken(self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.inner.generation.load(Ordering::Acquire) == token.0
    }

    pub fn accept<T>(&self, token: RequestToken, value: T) -> Developed<T> {
        if self.is_current(token) {
            Developed::Fresh(value)
        } else {
            debug!(token = token.0, "dropping stale result");
            Developed::Stale
        }
    }

    /// Decode and develop on the blocking pool.
    ///
    /// The token is taken when this is called, not when the future is
    /// first polled, so call order decides which request is newest.
    pub fn develop(
        &self,
        bytes: Vec<u8>,
        filter_id: String,
        options: ProcessingOptions,
        seed: u64,
    ) -> impl Future<Output = PipelineResult<Developed<PixelBuffer>>> + Send + use<> {
        let token = self.begin();
        let session = self.clone();
        async move {
            let worker = session.clone();
            let joined = tokio::task::spawn_blocking(move || {
                let mut rng = StdRng::seed_from_u64(seed);
                worker
                    .inner
                    .pipeline
                    .process(&bytes, &filter_id, &options, &mut rng)
            })
            .await;

            let result = match joined {
                Ok(result) => result,
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(e) => {
                    warn!(error = %e, "develop task cancelled");
                    return Ok(Developed::Stale);
                }
            };
            let buf = result?;
            Ok(session.accept(token, buf))
        }
    }
}

impl Default for DevelopSession {
    fn default() -> Self {
        Self::new(FilmPipeline::new())
    }
}
