//! # Origistamp Hash
//!
//! Fingerprints documents and images so their integrity can be checked
//! later.
//!
//! ## What it does
//! - **Hash** - SHA-256 for every selected file, pHash for raster images
//! - **Compare** - two files byte for byte, or two images perceptually
//! - **Report** - one Markdown report, optionally rendered to PDF
//! - **Archive** - files plus report in a ZIP sealed by a `.sha256` sidecar
//!
//! ## Architecture
//! - `core` - The hashing, comparison and export engine
//! - `events` - Event-driven progress reporting
//! - `config` - Persisted preferences
//! - `error` - Error types with paths and reasons

pub mod config;
pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use config::Config;
pub use error::{OrigistampError, Result};

/// Initialize tracing for the library
///
/// Logs go to stderr so stdout stays clean for report and JSON output.
/// The level defaults to `warn` and `RUST_LOG` overrides it. Calling this
/// twice is harmless.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
