//! # origistamp CLI
//!
//! Command-line interface for Origistamp Hash.
//!
//! ## Usage
//! ```bash
//! origistamp hash ~/Documents --report out/ --format both
//! origistamp verify out/DocHash_20240101_120000.zip
//! ```

mod cli;

use origistamp::Result;

fn main() -> Result<()> {
    origistamp::init_tracing();
    cli::run()
}
