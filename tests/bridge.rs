use std::fs;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use hupwriter::{
    Event, EventKind, HupWriter, ReopenFailurePolicy, Subscribe, TerminatePolicy, WriterError,
    signals,
};
use tokio::sync::broadcast;

const WAIT: Duration = Duration::from_secs(5);

/// Waits until an event of `kind` arrives, skipping others.
async fn wait_for(rx: &mut broadcast::Receiver<Event>, kind: EventKind) -> Event {
    tokio::time::timeout(WAIT, async {
        loop {
            match rx.recv().await {
                Ok(ev) if ev.kind == kind => return ev,
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => panic!("bus closed before {kind:?}"),
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {kind:?}"))
}

#[derive(Default)]
struct Recorder {
    seen: Mutex<Vec<EventKind>>,
}

#[async_trait]
impl Subscribe for Recorder {
    async fn on_event(&self, ev: &Event) {
        self.seen.lock().unwrap().push(ev.kind);
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}

#[tokio::test]
async fn rotate_notification_reopens_path() {
    let dir = tempfile::tempdir().unwrap();
    let name = dir.path().join("app.log");
    let (notifier, source) = signals::channel();
    let w = HupWriter::builder(&name)
        .signals(source)
        .reopen_failure(ReopenFailurePolicy::Report)
        .terminate(TerminatePolicy::Return)
        .open()
        .unwrap();
    let mut rx = w.subscribe();

    writeln!(&w, "first").unwrap();
    fs::rename(&name, dir.path().join("app.1.log")).unwrap();
    assert!(notifier.rotate());
    wait_for(&mut rx, EventKind::RotateRequested).await;
    let ev = wait_for(&mut rx, EventKind::Reopened).await;
    assert_eq!(ev.path.as_deref(), Some(name.as_path()));

    writeln!(&w, "second").unwrap();
    w.shutdown().await.unwrap();

    assert_eq!(fs::read_to_string(dir.path().join("app.1.log")).unwrap(), "first\n");
    assert_eq!(fs::read_to_string(&name).unwrap(), "second\n");
    assert!(notifier.is_closed(), "source must be released after shutdown");
}

#[tokio::test]
async fn terminate_notification_closes_and_removes_marker() {
    let dir = tempfile::tempdir().unwrap();
    let pid = dir.path().join("app.pid");
    let (notifier, source) = signals::channel();
    let w = HupWriter::builder(dir.path().join("app.log"))
        .marker(&pid)
        .signals(source)
        .terminate(TerminatePolicy::Return)
        .open()
        .unwrap();
    let mut rx = w.subscribe();

    assert!(notifier.terminate());
    wait_for(&mut rx, EventKind::TerminateRequested).await;
    wait_for(&mut rx, EventKind::MarkerRemoved).await;

    assert!(w.is_closed());
    assert!(!pid.exists());
    assert!(matches!(w.write(b"late\n"), Err(WriterError::Closed)));

    // Already closed by the bridge; shutdown only joins the tasks.
    w.shutdown().await.unwrap();
    assert!(notifier.is_closed());
    assert!(!notifier.rotate());
}

#[tokio::test]
async fn reported_reopen_failure_closes_writer() {
    let dir = tempfile::tempdir().unwrap();
    let logs = dir.path().join("logs");
    fs::create_dir(&logs).unwrap();
    let pid = dir.path().join("app.pid");
    let (notifier, source) = signals::channel();
    let w = HupWriter::builder(logs.join("app.log"))
        .marker(&pid)
        .signals(source)
        .reopen_failure(ReopenFailurePolicy::Report)
        .terminate(TerminatePolicy::Return)
        .open()
        .unwrap();
    let mut rx = w.subscribe();

    fs::remove_dir_all(&logs).unwrap();
    assert!(notifier.rotate());

    let ev = wait_for(&mut rx, EventKind::ReopenFailed).await;
    assert!(ev.reason.is_some());
    wait_for(&mut rx, EventKind::MarkerRemoved).await;

    assert!(w.is_closed());
    assert!(!pid.exists());
    assert!(matches!(w.write(b"x"), Err(WriterError::Closed)));
    w.shutdown().await.unwrap();
}

#[tokio::test]
async fn subscribers_see_the_whole_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let name = dir.path().join("app.log");
    let recorder = Arc::new(Recorder::default());
    let (notifier, source) = signals::channel();
    let w = HupWriter::builder(&name)
        .marker(dir.path().join("app.pid"))
        .signals(source)
        .terminate(TerminatePolicy::Return)
        .subscribers(vec![recorder.clone() as Arc<dyn Subscribe>])
        .open()
        .unwrap();
    let mut rx = w.subscribe();

    fs::rename(&name, dir.path().join("app.1.log")).unwrap();
    notifier.rotate();
    wait_for(&mut rx, EventKind::Reopened).await;
    w.shutdown().await.unwrap();

    let seen = recorder.seen.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![
            EventKind::Opened,
            EventKind::MarkerWritten,
            EventKind::RotateRequested,
            EventKind::Reopened,
            EventKind::Closed,
            EventKind::MarkerRemoved,
        ]
    );
}

#[tokio::test]
async fn explicit_close_stops_bridge() {
    let dir = tempfile::tempdir().unwrap();
    let (notifier, source) = signals::channel();
    let w = HupWriter::builder(dir.path().join("app.log"))
        .signals(source)
        .open()
        .unwrap();

    w.close().unwrap();
    w.shutdown().await.unwrap();
    assert!(notifier.is_closed());
}

#[test]
fn signal_source_needs_a_runtime() {
    let dir = tempfile::tempdir().unwrap();
    let pid = dir.path().join("app.pid");
    let (_notifier, source) = signals::channel();

    let err = HupWriter::builder(dir.path().join("app.log"))
        .marker(&pid)
        .signals(source)
        .open()
        .unwrap_err();
    assert!(matches!(err, WriterError::Runtime));
    assert!(!pid.exists());
    assert!(!dir.path().join("app.log").exists());
}
