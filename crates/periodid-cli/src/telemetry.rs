//! Log output of the binary.
//!
//! Events go to stderr so that stdout carries nothing but the JSON lines the
//! commands print. The filter is read from `RUST_LOG` and defaults to
//! `info`; the library's own events (clock rotations, stalls, shutdown) show
//! up at `debug` and `trace`.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339()),
        )
        .try_init()?;
    Ok(())
}
