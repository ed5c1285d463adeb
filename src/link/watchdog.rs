//! Link liveness hooks.
//!
//! The receiver reports every ':' it sees to a [`LinkMonitor`]. The monitor
//! restarts the injected [`WatchdogTimer`] (when the application asked to be
//! told about silence) and then runs the application's "data received"
//! callback. The timer itself lives outside the codec: [`TokioWatchdog`] is
//! the hosted implementation, [`NoopWatchdog`] stands in when none is given.

use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Default silence interval before the not-received callback fires
pub const DEFAULT_NOT_RECEIVED_INTERVAL: Duration = Duration::from_millis(1000);

/// Application callback type
pub type LinkCallback = Box<dyn FnMut() + Send + 'static>;

/// A periodic timer that fires unless restarted
pub trait WatchdogTimer: Send {
    /// Start firing `callback` every `interval` without a restart
    /// Re-arming replaces any previous callback.
    fn arm(&mut self, interval: Duration, callback: LinkCallback);

    /// Push the next expiry a full interval into the future
    fn restart(&mut self);

    /// Stop the timer
    fn disarm(&mut self);
}

/// Timer used when the application supplies none
#[derive(Debug, Default)]
pub struct NoopWatchdog;

impl WatchdogTimer for NoopWatchdog {
    fn arm(&mut self, interval: Duration, _callback: LinkCallback) {
        tracing::warn!(
            "No watchdog timer installed; silence callback ({:?}) will never fire",
            interval
        );
    }

    fn restart(&mut self) {}

    fn disarm(&mut self) {}
}

/// Watchdog timer backed by a tokio task
pub struct TokioWatchdog {
    handle: Handle,
    restart: Arc<Notify>,
    task: Option<JoinHandle<()>>,
}

impl TokioWatchdog {
    /// Create a timer that spawns onto `handle`
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            restart: Arc::new(Notify::new()),
            task: None,
        }
    }

    /// Create a timer on the runtime the caller is running in, if any
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }

    pub fn is_armed(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl WatchdogTimer for TokioWatchdog {
    fn arm(&mut self, interval: Duration, mut callback: LinkCallback) {
        self.disarm();

        let restart = self.restart.clone();
        self.task = Some(self.handle.spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {
                        tracing::debug!("No frame for {:?}", interval);
                        callback();
                    }
                    _ = restart.notified() => {}
                }
            }
        }));
    }

    fn restart(&mut self) {
        if self.task.is_some() {
            self.restart.notify_one();
        }
    }

    fn disarm(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for TokioWatchdog {
    fn drop(&mut self) {
        self.disarm();
    }
}

/// Connects colon detection to the watchdog timer and application callbacks
pub struct LinkMonitor {
    timer: Box<dyn WatchdogTimer>,
    armed: bool,
    on_received: Option<LinkCallback>,
}

impl LinkMonitor {
    pub fn new(timer: Box<dyn WatchdogTimer>) -> Self {
        Self {
            timer,
            armed: false,
            on_received: None,
        }
    }

    /// Register a callback run every time a frame start is seen
    pub fn on_data_received(&mut self, callback: LinkCallback) {
        self.on_received = Some(callback);
    }

    /// Register a callback run when `interval` passes with no frame start
    pub fn on_data_not_received(&mut self, callback: LinkCallback, interval: Duration) {
        self.timer.arm(interval, callback);
        self.armed = true;
    }

    /// Stop watching for silence
    pub fn clear_data_not_received(&mut self) {
        self.timer.disarm();
        self.armed = false;
    }

    /// Record that a frame start (':') was observed
    pub fn frame_started(&mut self) {
        if self.armed {
            self.timer.restart();
        }
        if let Some(callback) = self.on_received.as_mut() {
            callback();
        }
    }
}

impl Default for LinkMonitor {
    fn default() -> Self {
        Self::new(Box::new(NoopWatchdog))
    }
}
