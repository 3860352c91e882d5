//! Tessera compiler core pipeline.
//!
//! Turns a term assembled by a builder (HOAS binders, arbitrary sharing)
//! into canonical closed IR:
//!
//! ```text
//! resolve_bindings → closed check → cse
//!   → fixed point [beta-simplify, const-fold, cse]
//!   → type-check → domain-inference → validate
//! ```
//!
//! Each stage is fatal on error; nothing is partially returned.

mod options;
mod pipeline;

use std::sync::Once;

pub use options::PipelineOptions;
pub use pipeline::{compile, compile_batch, Compiled};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Does nothing unless `RUST_LOG` is set,
/// e.g. `RUST_LOG=tess_canon=debug` or `RUST_LOG=tessc=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
