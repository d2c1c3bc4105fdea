//! Application context shared by every workflow of one invocation.

use std::fmt;
use std::sync::Arc;

use cobble_config::InstallLayout;

use crate::console::{Console, Stream};
use crate::errors::AppError;
use crate::reactor::ShutdownCoordinator;
use crate::rpc::{ConnectionRegistry, ConnectorFactory, RpcClient};
use crate::service::ServiceName;

/// Console, shutdown trigger and proxies, cheap to clone into handlers.
#[derive(Clone)]
pub(crate) struct AppContext {
    console: Console,
    shutdown: ShutdownCoordinator,
    registry: Arc<ConnectionRegistry>,
    layout: InstallLayout,
}

impl AppContext {
    pub(crate) fn new(
        console: Console,
        layout: InstallLayout,
        connectors: Arc<dyn ConnectorFactory>,
    ) -> Self {
        Self {
            console,
            shutdown: ShutdownCoordinator::new(),
            registry: Arc::new(ConnectionRegistry::new(connectors)),
            layout,
        }
    }

    pub(crate) fn console(&self) -> &Console {
        &self.console
    }

    pub(crate) fn shutdown(&self) -> &ShutdownCoordinator {
        &self.shutdown
    }

    pub(crate) fn layout(&self) -> &InstallLayout {
        &self.layout
    }

    pub(crate) fn daemon(&self) -> RpcClient {
        self.registry.daemon()
    }

    pub(crate) fn service(&self, service: &ServiceName) -> RpcClient {
        self.registry.service(service)
    }

    /// Prints one line to stdout.
    pub(crate) fn say(&self, args: fmt::Arguments<'_>) -> Result<(), AppError> {
        self.console
            .line(Stream::Stdout, args)
            .map_err(AppError::Console)
    }

    /// Top-level error sink: prints `error`, fails the run and stops the loop.
    pub(crate) fn report_failure(&self, error: &AppError) {
        tracing::debug!(?error, "workflow failed");
        if let Err(write_error) = self.console.line(Stream::Stderr, format_args!("{error}")) {
            tracing::error!(%write_error, %error, "failed to report error");
        }
        self.shutdown.fail();
    }

    /// Prints a line from an event handler, logging write failures.
    pub(crate) fn emit(&self, stream: Stream, args: fmt::Arguments<'_>) {
        if let Err(error) = self.console.line(stream, args) {
            tracing::warn!(%error, "failed to write event output");
        }
    }

    /// Copies instance output to stdout verbatim.
    pub(crate) fn stream(&self, chunk: &str) {
        if let Err(error) = self.console.chunk(Stream::Stdout, chunk) {
            tracing::warn!(%error, "failed to write service output");
        }
    }
}
