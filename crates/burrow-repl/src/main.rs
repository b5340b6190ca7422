//! burrow REPL entry point.
//!
//! Launch the interactive shell against an environment file:
//! ```bash
//! cargo run -p burrow-repl -- environment.json
//! ```

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "environment.json".to_string());
    burrow_repl::run(&path)
}
