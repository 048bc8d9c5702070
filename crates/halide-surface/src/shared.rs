use std::sync::Arc;

use halide_core::PixelBuffer;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::annotation::AnnotationSnapshot;
use crate::error::SurfaceResult;
use crate::export::ExportFormat;
use crate::surface::CompositingSurface;

/// A surface shared between an input task and render/export requests.
///
/// Annotation changes go through the write lock, one writer at a time;
/// flattening and export only need the read lock.
#[derive(Clone)]
pub struct SharedSurface {
    inner: Arc<RwLock<CompositingSurface>>,
}

impl SharedSurface {
    pub fn new(surface: CompositingSurface) -> Self {
        Self {
            inner: Arc::new(RwLock::new(surface)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, CompositingSurface> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, CompositingSurface> {
        self.inner.write()
    }

    /// Runs `f` with exclusive access.
    pub fn update<T>(&self, f: impl FnOnce(&mut CompositingSurface) -> T) -> T {
        f(&mut self.inner.write())
    }

    pub fn snapshot(&self) -> AnnotationSnapshot {
        self.inner.read().snapshot()
    }

    pub fn flatten(&self) -> SurfaceResult<PixelBuffer> {
        self.inner.read().flatten()
    }

    pub fn export(&self, format: ExportFormat) -> SurfaceResult<Vec<u8>> {
        self.inner.read().export(format)
    }
}
