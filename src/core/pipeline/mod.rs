//! # Pipeline Module
//!
//! Orchestrates a hashing run and the exports that follow it.
//!
//! ## Pipeline Stages
//! 1. **Scan** - Expand the selection into candidate files
//! 2. **Hash** - SHA-256 for every file, pHash for raster images
//! 3. **Report** - Build the Markdown report, save or copy it
//! 4. **Package** - Bundle files and report into a sealed ZIP
//!
//! ## Parallelism
//! Uses rayon for parallel hashing across multiple CPU cores. Output order
//! is the enumeration order regardless of which worker finishes first.

mod executor;
mod session;

pub use executor::{
    Batch, CancellationToken, Pipeline, PipelineBuilder, PipelineConfig, SkippedFile,
};
pub use session::Session;
