//! Error types and diagnostics helpers for the CLI runtime.

use std::io;
use std::sync::Arc;

use thiserror::Error;

use crate::lifecycle::LifecycleError;
use crate::rpc::RpcError;
use crate::service::ValidationError;
use crate::telemetry::TelemetryError;
use crate::workflows::MissingComponent;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Installation(#[from] MissingComponent),
    #[error("daemon lifecycle command failed: {0}")]
    Lifecycle(#[from] LifecycleError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("failed to start the event loop: {0}")]
    Runtime(#[source] io::Error),
    #[error("failed to start the input reader: {0}")]
    InputThread(#[source] io::Error),
    #[error("failed to write output: {0}")]
    Console(#[source] io::Error),
    #[error("failed to resolve path {path}: {source}")]
    ResolvePath {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Rpc(#[from] RpcError),
    #[error("{failed} of {total} requests failed: {first}")]
    Settled {
        failed: usize,
        total: usize,
        #[source]
        first: RpcError,
    },
}
