//! Transient user-facing error banner with auto-dismiss.
//!
//! # Design
//! `ErrorNotifier` is a clonable handle over shared state, so the
//! orchestrator can write while a renderer reads. Readers get an
//! `ErrorBanner` copy; nothing outside this module mutates the banner.
//!
//! Each `show` schedules an auto-hide on the current tokio runtime and
//! invalidates the previous one, so the banner stays up for the full delay
//! after the latest `show`. A `hide` cancels the pending auto-hide as well.
//! The generation counter covers the window where an aborted task has
//! already woken and is waiting on the lock.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::AbortHandle;

/// How long a banner stays visible after `show`.
pub const AUTO_HIDE_DELAY: Duration = Duration::from_secs(5);

/// Read-only view of the banner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorBanner {
    pub message: String,
    pub visible: bool,
}

#[derive(Debug, Default)]
struct Inner {
    banner: ErrorBanner,
    generation: u64,
    pending: Option<AbortHandle>,
}

impl Inner {
    fn cancel_pending(&mut self) {
        self.generation += 1;
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

#[derive(Debug, Clone)]
pub struct ErrorNotifier {
    inner: Arc<Mutex<Inner>>,
    delay: Duration,
}

impl Default for ErrorNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorNotifier {
    pub fn new() -> Self {
        Self::with_delay(AUTO_HIDE_DELAY)
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            delay,
        }
    }

    /// Display `message` and schedule it to hide after the configured delay.
    ///
    /// Outside a tokio runtime the banner stays visible until `hide`.
    pub fn show(&self, message: impl Into<String>) {
        let mut inner = self.inner.lock();
        inner.cancel_pending();
        inner.banner = ErrorBanner {
            message: message.into(),
            visible: true,
        };

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("no async runtime, error banner will not auto-hide");
            return;
        };
        let generation = inner.generation;
        let shared = Arc::clone(&self.inner);
        let delay = self.delay;
        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let mut inner = shared.lock();
            if inner.generation == generation {
                inner.banner.visible = false;
                inner.pending = None;
            }
        });
        inner.pending = Some(task.abort_handle());
    }

    /// Clear the message and hide the banner immediately.
    pub fn hide(&self) {
        let mut inner = self.inner.lock();
        inner.cancel_pending();
        inner.banner = ErrorBanner::default();
    }

    pub fn banner(&self) -> ErrorBanner {
        self.inner.lock().banner.clone()
    }

    pub fn message(&self) -> String {
        self.inner.lock().banner.message.clone()
    }

    pub fn is_visible(&self) -> bool {
        self.inner.lock().banner.visible
    }
}
