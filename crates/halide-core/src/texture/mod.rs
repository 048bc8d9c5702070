//! Procedural film textures: grain, light leaks, dust and scratches.
//!
//! Every function takes the buffer by value and returns it. Randomness
//! comes only from the caller's RNG.

pub mod dust;
pub mod grain;
pub mod leak;

pub use dust::scatter_dust;
pub use grain::{GrainCache, GrainField, GrainKey, apply_grain};
pub use leak::{Side, corner_leak, side_leak};
