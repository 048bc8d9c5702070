use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::debug;

use crate::buffer::PixelBuffer;

pub const DEFAULT_GRAIN_CACHE_CAPACITY: usize = 8;

/// Intensity bucketed to whole percent.
pub fn intensity_bucket(intensity: f32) -> u32 {
    // The epsilon keeps values like 0.35 (stored as 0.3499999) in their bucket.
    ((intensity.clamp(0.0, 1.0) as f64) * 100.0 + 1e-4).floor() as u32
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GrainKey {
    pub width: u32,
    pub height: u32,
    pub bucket: u32,
}

impl GrainKey {
    pub fn new(width: u32, height: u32, intensity: f32) -> Self {
        Self {
            width,
            height,
            bucket: intensity_bucket(intensity),
        }
    }

    /// Noise seed for this key. Fields depend on nothing else, so a cache
    /// hit and a miss hand back the same samples.
    pub fn seed(&self) -> u64 {
        const SALT: u64 = 0x6772_6169_6e5f_6669;
        ((self.width as u64) << 40 ^ (self.height as u64) << 16 ^ self.bucket as u64) ^ SALT
    }
}

/// Monochrome signed noise, one sample per pixel. Read-only once built.
#[derive(Debug, PartialEq, Eq)]
pub struct GrainField {
    pub width: u32,
    pub height: u32,
    pub samples: Vec<i16>,
}

impl GrainField {
    /// Samples are `round((u - 0.5) * bucket / 100 * 255)` for uniform `u` in 0..1,
    /// drawn from a generator seeded by the key.
    pub fn generate(key: GrainKey) -> Self {
        let mut rng = StdRng::seed_from_u64(key.seed());
        let amplitude = key.bucket as f32 / 100.0 * 255.0;
        let len = key.width as usize * key.height as usize;
        let samples = (0..len)
            .map(|_| ((rng.random::<f32>() - 0.5) * amplitude).round() as i16)
            .collect();
        Self {
            width: key.width,
            height: key.height,
            samples,
        }
    }
}

/// Adds the field to RGB, clamping. Alpha is untouched.
pub fn apply_grain(mut buf: PixelBuffer, field: &GrainField) -> PixelBuffer {
    if field.width != buf.width || field.height != buf.height {
        debug!(
            buffer = ?(buf.width, buf.height),
            field = ?(field.width, field.height),
            "grain field size mismatch, skipping"
        );
        return buf;
    }
    let w = buf.width as usize;
    buf.par_rows_mut()
        .zip(field.samples.par_chunks(w))
        .for_each(|((_, row), noise)| {
            for (px, &n) in row.chunks_exact_mut(4).zip(noise) {
                for c in &mut px[..3] {
                    *c = (*c as i16 + n).clamp(0, 255) as u8;
                }
            }
        });
    buf
}

/// Bounded LRU of grain fields keyed by size and intensity bucket.
pub struct GrainCache {
    inner: Mutex<GrainLru>,
}

struct GrainLru {
    fields: HashMap<GrainKey, Arc<GrainField>>,
    lru: VecDeque<GrainKey>,
    capacity: usize,
}

impl GrainLru {
    fn touch(&mut self, key: GrainKey) {
        if let Some(pos) = self.lru.iter().position(|k| *k == key) {
            self.lru.remove(pos);
        }
        self.lru.push_back(key);
    }

    fn insert(&mut self, key: GrainKey, field: Arc<GrainField>) {
        self.fields.insert(key, field);
        self.touch(key);
        while self.lru.len() > self.capacity {
            if let Some(old) = self.lru.pop_front() {
                self.fields.remove(&old);
                debug!(?old, "evicted grain field");
            }
        }
    }
}

impl GrainCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(GrainLru {
                fields: HashMap::new(),
                lru: VecDeque::new(),
                capacity: capacity.max(1),
            }),
        }
    }

    /// Returns the cached field for the key, generating it on a miss.
    pub fn get_or_generate(&self, width: u32, height: u32, intensity: f32) -> Arc<GrainField> {
        let key = GrainKey::new(width, height, intensity);
        let mut inner = self.inner.lock();
        if let Some(field) = inner.fields.get(&key).cloned() {
            inner.touch(key);
            return field;
        }
        let t0 = std::time::Instant::now();
        let field = Arc::new(GrainField::generate(key));
        debug!(
            ?key,
            elapsed_ms = t0.elapsed().as_millis(),
            "generated grain field"
        );
        inner.insert(key, Arc::clone(&field));
        field
    }

    pub fn len(&self) -> usize {
        self.inner.lock().fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &GrainKey) -> bool {
        self.inner.lock().fields.contains_key(key)
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.fields.clear();
        inner.lru.clear();
    }
}

impl Default for GrainCache {
    fn default() -> Self {
        Self::new(DEFAULT_GRAIN_CACHE_CAPACITY)
    }
}
