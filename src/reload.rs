//! Reload notification
//!
//! [`ReloadSignal`] is a single-slot mailbox between whoever detects changes
//! and the events endpoint that tells browsers to reload. [`Debouncer`]
//! collapses a burst of file events into one notification once activity has
//! been quiet for a whole window.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Server-sent event written to a waiting client when a reload is due
pub const RELOAD_EVENT: &str = "data: null\n\n";

/// Default quiet period before a burst of changes triggers a reload
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Single-slot reload notification.
///
/// At most one notification is pending at a time; notifying while one is
/// pending is a no-op.
#[derive(Debug, Default)]
pub struct ReloadSignal {
    pending: Mutex<bool>,
    condvar: Condvar,
}

impl ReloadSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a reload as pending. Never blocks.
    ///
    /// Returns false if a notification was already pending.
    pub fn notify(&self) -> bool {
        let mut pending = self.lock();
        if *pending {
            return false;
        }
        *pending = true;
        drop(pending);
        self.condvar.notify_one();
        true
    }

    /// Whether a notification is waiting to be consumed
    pub fn is_pending(&self) -> bool {
        *self.lock()
    }

    /// Block until a notification is pending, then consume it
    pub fn wait(&self) {
        let mut pending = self.lock();
        while !*pending {
            pending = self
                .condvar
                .wait(pending)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *pending = false;
    }

    /// Like [`ReloadSignal::wait`], giving up after `timeout`.
    ///
    /// Returns true if a notification was consumed.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut pending = self.lock();

        while !*pending {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            pending = self
                .condvar
                .wait_timeout(pending, remaining)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }

        *pending = false;
        true
    }

    fn lock(&self) -> MutexGuard<'_, bool> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Restart-on-activity timer feeding a [`ReloadSignal`].
///
/// Every [`Debouncer::touch`] restarts the quiet window. When the window
/// elapses with no further touch, the signal is notified once. Dropping the
/// debouncer stops its thread without notifying.
pub struct Debouncer {
    touches: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(window: Duration, signal: Arc<ReloadSignal>) -> Self {
        let (tx, rx) = mpsc::channel::<()>();

        let worker = thread::spawn(move || {
            // Idle until the first touch of a burst
            while rx.recv().is_ok() {
                loop {
                    match rx.recv_timeout(window) {
                        Ok(()) => tracing::trace!("Debounce window restarted"),
                        Err(RecvTimeoutError::Timeout) => {
                            let fresh = signal.notify();
                            tracing::trace!("Debounce window elapsed (notified: {})", fresh);
                            break;
                        }
                        Err(RecvTimeoutError::Disconnected) => return,
                    }
                }
            }
        });

        Debouncer {
            touches: Some(tx),
            worker: Some(worker),
        }
    }

    /// Record activity, restarting the quiet window
    pub fn touch(&self) {
        if let Some(tx) = &self.touches {
            // Send only fails once the worker is gone
            let _ = tx.send(());
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.touches.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl std::fmt::Debug for Debouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("running", &self.worker.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_slot() {
        let signal = ReloadSignal::new();
        assert!(signal.notify());
        assert!(!signal.notify());
        assert!(signal.is_pending());
        signal.wait();
        assert!(!signal.is_pending());
        assert!(signal.notify());
    }

    #[test]
    fn test_reload_event_is_one_sse_message() {
        assert!(RELOAD_EVENT.starts_with("data: "));
        assert!(RELOAD_EVENT.ends_with("\n\n"));
    }

    #[test]
    fn test_wait_timeout_without_notification() {
        let signal = ReloadSignal::new();
        assert!(!signal.wait_timeout(Duration::from_millis(20)));
    }

    #[test]
    fn test_wait_wakes_on_notify() {
        let signal = Arc::new(ReloadSignal::new());
        let waiter = {
            let signal = Arc::clone(&signal);
            thread::spawn(move || signal.wait_timeout(Duration::from_secs(5)))
        };
        thread::sleep(Duration::from_millis(20));
        signal.notify();
        assert!(waiter.join().unwrap());
        assert!(!signal.is_pending());
    }

    #[test]
    fn test_burst_notifies_once() {
        let signal = Arc::new(ReloadSignal::new());
        let debouncer = Debouncer::new(Duration::from_millis(100), Arc::clone(&signal));

        for _ in 0..5 {
            debouncer.touch();
            thread::sleep(Duration::from_millis(10));
        }
        assert!(!signal.is_pending());

        assert!(signal.wait_timeout(Duration::from_secs(5)));
        assert!(!signal.wait_timeout(Duration::from_millis(250)));
    }

    #[test]
    fn test_no_touch_no_notification() {
        let signal = Arc::new(ReloadSignal::new());
        let _debouncer = Debouncer::new(Duration::from_millis(10), Arc::clone(&signal));
        assert!(!signal.wait_timeout(Duration::from_millis(60)));
    }

    #[test]
    fn test_drop_stops_worker_without_notifying() {
        let signal = Arc::new(ReloadSignal::new());
        let debouncer = Debouncer::new(Duration::from_secs(10), Arc::clone(&signal));
        debouncer.touch();
        drop(debouncer);
        assert!(!signal.is_pending());
    }
}
