use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::core::bridge;
use crate::core::handle::FileHandle;
use crate::core::marker::PendingMarker;
use crate::core::writer::{HupWriter, Inner, Tasks};
use crate::error::WriterError;
use crate::events::{Bus, Event, EventKind};
use crate::policies::{ReopenFailurePolicy, TerminatePolicy};
use crate::signals::NotificationSource;
use crate::subscribers::{Subscribe, SubscriberSet};

enum Source {
    None,
    #[cfg(any(unix, windows))]
    Os,
    Custom(Box<dyn NotificationSource>),
}

/// Builder for a [`HupWriter`] with optional signal bridge and subscribers.
///
/// ```rust
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use hupwriter::{HupWriter, ReopenFailurePolicy, TerminatePolicy};
///
/// let dir = std::env::temp_dir().join(format!("hupwriter-builder-doc-{}", std::process::id()));
/// std::fs::create_dir_all(&dir)?;
///
/// let writer = HupWriter::builder(dir.join("app.log"))
///     .marker(dir.join("app.pid"))
///     .os_signals()
///     .reopen_failure(ReopenFailurePolicy::Report)
///     .terminate(TerminatePolicy::Return)
///     .open()?;
///
/// writer.shutdown().await?;
/// # std::fs::remove_dir_all(&dir)?;
/// # Ok(())
/// # }
/// ```
pub struct HupWriterBuilder {
    cfg: Config,
    source: Source,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl HupWriterBuilder {
    /// Creates a builder for `path` with default configuration.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::from_config(Config::new(path))
    }

    /// Creates a builder from a complete configuration.
    pub fn from_config(cfg: Config) -> Self {
        Self {
            cfg,
            source: Source::None,
            subscribers: Vec::new(),
        }
    }

    /// Writes the process id to `path` at open and removes it at close.
    ///
    /// An empty path disables the marker.
    pub fn marker(mut self, path: impl Into<PathBuf>) -> Self {
        self.cfg.marker = path.into();
        self
    }

    /// Permission bits for a newly created output file (unix only).
    pub fn mode(mut self, mode: u32) -> Self {
        self.cfg.mode = mode;
        self
    }

    /// Sets the escalation for a signal-driven reopen failure.
    pub fn reopen_failure(mut self, policy: ReopenFailurePolicy) -> Self {
        self.cfg.reopen_failure = policy;
        self
    }

    /// Sets the action taken after closing on a terminate-request.
    pub fn terminate(mut self, policy: TerminatePolicy) -> Self {
        self.cfg.terminate = policy;
        self
    }

    /// Sets the event bus capacity.
    pub fn bus_capacity(mut self, capacity: usize) -> Self {
        self.cfg.bus_capacity = capacity;
        self
    }

    /// Drives the writer from a custom notification source.
    ///
    /// Opening then requires a tokio runtime.
    pub fn signals(mut self, source: impl NotificationSource) -> Self {
        self.source = Source::Custom(Box::new(source));
        self
    }

    /// Drives the writer from process signals (see [`OsSignals`](crate::signals::OsSignals)).
    ///
    /// Listeners are registered by [`open`](Self::open), which then requires
    /// a tokio runtime. After close the terminate signal gets its default
    /// action back.
    #[cfg(any(unix, windows))]
    pub fn os_signals(mut self) -> Self {
        self.source = Source::Os;
        self
    }

    /// Sets event subscribers. Opening with subscribers requires a tokio runtime.
    pub fn subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Opens the writer.
    ///
    /// Order of side effects:
    /// 1. register signal listeners (if any)
    /// 2. write the marker (if configured)
    /// 3. open the output file; on failure the marker is removed again
    /// 4. spawn the subscriber listener and the signal bridge
    ///
    /// Nothing is left behind when an error is returned.
    pub fn open(self) -> Result<HupWriter, WriterError> {
        let needs_runtime = !matches!(self.source, Source::None) || !self.subscribers.is_empty();
        let runtime = if needs_runtime {
            Some(tokio::runtime::Handle::try_current().map_err(|_| WriterError::Runtime)?)
        } else {
            None
        };

        let source: Option<Box<dyn NotificationSource>> = match self.source {
            Source::None => None,
            #[cfg(any(unix, windows))]
            Source::Os => Some(Box::new(crate::signals::OsSignals::new()?)),
            Source::Custom(source) => Some(source),
        };

        let cfg = self.cfg;
        let pending = cfg.marker_path().map(PendingMarker::write).transpose()?;

        let bus = Bus::new(cfg.bus_capacity_clamped());
        let handle = FileHandle::open(cfg.path.clone(), cfg.mode, bus.clone())?;
        if let Some(pending) = pending {
            pending.commit();
        }

        let token = CancellationToken::new();
        let inner = Arc::new(Inner::new(handle, &cfg, bus.clone(), token.clone()));
        let mut tasks = Tasks::default();

        if let Some(runtime) = &runtime {
            if !self.subscribers.is_empty() {
                let set = SubscriberSet::new(self.subscribers, bus.clone());
                tasks.listener = Some(listen(runtime, &bus, set, token.clone()));
            }
        }

        bus.publish(Event::new(EventKind::Opened).with_path(&cfg.path));
        if let Some(marker) = cfg.marker_path() {
            bus.publish(Event::new(EventKind::MarkerWritten).with_path(marker));
        }

        if let (Some(runtime), Some(source)) = (&runtime, source) {
            tasks.bridge = Some(bridge::spawn(runtime, Arc::clone(&inner), source, token));
        }

        tracing::debug!(
            path = %cfg.path.display(),
            marker = ?cfg.marker_path(),
            bridge = tasks.bridge.is_some(),
            "writer opened"
        );
        Ok(HupWriter::from_parts(inner, tasks))
    }
}

/// Forwards bus events to `set` until the writer closes, then drains what was
/// published up to the close and shuts the set down.
fn listen(
    runtime: &tokio::runtime::Handle,
    bus: &Bus,
    set: SubscriberSet,
    token: CancellationToken,
) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    runtime.spawn(async move {
        loop {
            tokio::select! {
                biased;
                got = rx.recv() => match got {
                    Ok(ev) => set.emit(ev),
                    Err(RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "subscriber listener lagged");
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = token.cancelled() => {
                    loop {
                        match rx.try_recv() {
                            Ok(ev) => set.emit(ev),
                            Err(TryRecvError::Lagged(_)) => continue,
                            Err(_) => break,
                        }
                    }
                    break;
                }
            }
        }
        set.shutdown().await;
    })
}
