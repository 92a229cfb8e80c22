//! Drives a writer from code and mirrors its events through `LogWriter`.
//!
//! ```text
//! RUST_LOG=hupwriter=debug cargo run --example observe --features logging
//! ```

use std::io::Write;
use std::sync::Arc;

use hupwriter::{EventKind, HupWriter, LogWriter, Subscribe, TerminatePolicy, signals};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("observe.log");

    let (notifier, source) = signals::channel();
    let writer = HupWriter::builder(&path)
        .marker(dir.path().join("observe.pid"))
        .signals(source)
        .terminate(TerminatePolicy::Return)
        .subscribers(vec![Arc::new(LogWriter) as Arc<dyn Subscribe>])
        .open()?;
    let mut events = writer.subscribe();

    for round in 1..=3 {
        writeln!(&writer, "round {round}")?;
        std::fs::rename(&path, dir.path().join(format!("observe.{round}.log")))?;
        notifier.rotate();
        while events.recv().await?.kind != EventKind::Reopened {}
    }

    notifier.terminate();
    while events.recv().await?.kind != EventKind::Closed {}
    writer.shutdown().await?;

    for round in 1..=3 {
        let body = std::fs::read_to_string(dir.path().join(format!("observe.{round}.log")))?;
        print!("observe.{round}.log: {body}");
    }
    Ok(())
}
