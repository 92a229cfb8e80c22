//! Logs a line per second into a rotation-aware file.
//!
//! ```text
//! cargo run --example rotate --features tracing-subscriber -- /tmp/rotate.log /tmp/rotate.pid
//! mv /tmp/rotate.log /tmp/rotate.1.log && kill -HUP $(cat /tmp/rotate.pid)
//! kill -INT $(cat /tmp/rotate.pid)
//! ```

use std::sync::Arc;
use std::time::Duration;

use hupwriter::{HupWriter, ReopenFailurePolicy, TerminatePolicy};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| "rotate.log".into());
    let marker = args.next().unwrap_or_else(|| "rotate.pid".into());

    let writer = Arc::new(
        HupWriter::builder(&path)
            .marker(&marker)
            .os_signals()
            .reopen_failure(ReopenFailurePolicy::Report)
            .terminate(TerminatePolicy::Return)
            .open()?,
    );

    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(Arc::clone(&writer))
        .init();

    let mut tick = tokio::time::interval(Duration::from_secs(1));
    let mut n = 0u64;
    while !writer.is_closed() {
        tick.tick().await;
        n += 1;
        tracing::info!(n, "tick");
    }

    writer.shutdown().await?;
    eprintln!("closed after {n} ticks");
    Ok(())
}
