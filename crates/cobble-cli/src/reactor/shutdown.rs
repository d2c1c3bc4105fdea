//! Process-wide shutdown trigger.
//!
//! The coordinator is shared by the event loop, every workflow handler and
//! the attach input thread. Requesting shutdown is idempotent and may happen
//! from any thread, including before the loop starts running.

use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;

#[derive(Debug)]
struct ShutdownState {
    requested: watch::Sender<bool>,
    failed: AtomicBool,
}

/// Cloneable handle onto the shutdown flag and the sticky failure bit.
#[derive(Debug, Clone)]
pub(crate) struct ShutdownCoordinator {
    state: Arc<ShutdownState>,
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownCoordinator {
    pub(crate) fn new() -> Self {
        let (requested, _) = watch::channel(false);
        Self {
            state: Arc::new(ShutdownState {
                requested,
                failed: AtomicBool::new(false),
            }),
        }
    }

    /// Asks the event loop to stop.
    ///
    /// Returns `true` only for the call that flipped the flag.
    pub(crate) fn request_shutdown(&self) -> bool {
        let flipped = self.state.requested.send_if_modified(|requested| {
            if *requested {
                false
            } else {
                *requested = true;
                true
            }
        });
        if flipped {
            tracing::debug!("shutdown requested");
        }
        flipped
    }

    pub(crate) fn is_requested(&self) -> bool {
        *self.state.requested.borrow()
    }

    /// Records a failure without stopping the loop.
    pub(crate) fn mark_failed(&self) {
        self.state.failed.store(true, Ordering::SeqCst);
    }

    /// Records a failure and stops the loop.
    pub(crate) fn fail(&self) {
        self.mark_failed();
        self.request_shutdown();
    }

    pub(crate) fn has_failed(&self) -> bool {
        self.state.failed.load(Ordering::SeqCst)
    }

    /// Resolves once shutdown has been requested.
    pub(crate) async fn requested(&self) {
        let mut receiver = self.state.requested.subscribe();
        // The sender lives as long as `self`, so the wait cannot fail.
        let _ = receiver.wait_for(|requested| *requested).await;
    }

    /// Process exit status reflecting the sticky failure bit.
    pub(crate) fn exit_code(&self) -> ExitCode {
        if self.has_failed() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }
}
