//! Single-threaded event loop driving every workflow.
//!
//! All socket I/O and continuation scheduling happens on one current-thread
//! `tokio` runtime. [`EventLoop::run`] blocks until the shared
//! [`ShutdownCoordinator`] is triggered; a workflow finishing without
//! requesting shutdown leaves event handlers running until something does.

mod shutdown;

use std::future::{self, Future};
use std::io;
use std::process::ExitCode;

use tokio::runtime::{Builder, Runtime};

use crate::context::AppContext;
use crate::errors::AppError;

pub(crate) use shutdown::ShutdownCoordinator;

/// Owns the runtime for the lifetime of one invocation.
pub(crate) struct EventLoop {
    runtime: Runtime,
}

impl EventLoop {
    pub(crate) fn new() -> io::Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self { runtime })
    }

    /// Drives `workflow` and its handlers until shutdown is requested.
    ///
    /// An error reaching the top of the workflow is printed to stderr, marks
    /// the exit status as failed and requests shutdown.
    pub(crate) fn run<F>(self, context: &AppContext, workflow: F) -> ExitCode
    where
        F: Future<Output = Result<(), AppError>>,
    {
        let shutdown = context.shutdown().clone();
        self.runtime.block_on(async {
            let driven = async {
                if let Err(error) = workflow.await {
                    context.report_failure(&error);
                }
                future::pending::<()>().await;
            };
            tokio::select! {
                biased;
                () = shutdown.requested() => {}
                () = driven => {}
            }
        });
        shutdown.exit_code()
    }
}
