//! Periodic session sweep.
//!
//! A background thread owned by the router's lifecycle: started when the
//! host begins serving, stopped (and joined) on shutdown or drop. The
//! sweep interval wait is a condvar timeout, so `stop` interrupts it
//! immediately instead of waiting out the interval.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::session::SessionStore;

#[derive(Default)]
struct SweeperSignal {
    stopped: Mutex<bool>,
    wake: Condvar,
}

/// Handle to the background sweep thread.
pub struct SessionSweeper {
    signal: Arc<SweeperSignal>,
    handle: Option<JoinHandle<()>>,
}

impl SessionSweeper {
    /// Start sweeping `store` every `interval`.
    #[must_use]
    pub fn start(store: Arc<SessionStore>, interval: Duration) -> Self {
        let signal = Arc::new(SweeperSignal::default());
        let thread_signal = Arc::clone(&signal);

        let handle = std::thread::Builder::new()
            .name("wayroute-session-sweeper".to_owned())
            .spawn(move || {
                let mut stopped = thread_signal.stopped.lock();
                loop {
                    if *stopped {
                        break;
                    }
                    let timed_out = thread_signal
                        .wake
                        .wait_for(&mut stopped, interval)
                        .timed_out();
                    if *stopped {
                        break;
                    }
                    if timed_out {
                        let removed = store.sweep_expired();
                        if removed > 0 {
                            tracing::debug!(removed, "swept expired sessions");
                        }
                    }
                }
            })
            .expect("spawn session sweeper thread");

        Self {
            signal,
            handle: Some(handle),
        }
    }

    /// Stop the sweeper and wait for the thread to exit. Idempotent.
    pub fn stop(&mut self) {
        *self.signal.stopped.lock() = true;
        self.signal.wake.notify_all();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SessionSweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for SessionSweeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSweeper")
            .field("running", &self.handle.is_some())
            .finish()
    }
}
