//! Perceptual hash algorithm implementations.

mod perceptual;

pub use perceptual::{PerceptualHasher, DEFAULT_HASH_SIZE};
