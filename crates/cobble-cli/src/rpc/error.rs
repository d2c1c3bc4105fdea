//! Error types surfaced by RPC proxies.

use std::io;
use std::sync::Arc;

use thiserror::Error;

use super::frame::RemoteFault;

/// Failures observed by a proxy call.
///
/// Errors are cloneable because one connection failure is delivered to every
/// pending call and to every call issued afterwards.
#[derive(Debug, Clone, Error)]
pub(crate) enum RpcError {
    #[error("failed to connect to {peer}: {source}")]
    Connect {
        peer: String,
        #[source]
        source: Arc<io::Error>,
    },
    #[error("connection to {peer} closed")]
    Disconnected { peer: String },
    #[error("connection to {peer} failed: {source}")]
    Transport {
        peer: String,
        #[source]
        source: Arc<io::Error>,
    },
    #[error("{method} failed: {fault}")]
    Remote { method: String, fault: RemoteFault },
    #[error("malformed message from {peer}: {detail}")]
    Protocol { peer: String, detail: String },
    #[error("unexpected {method} response: {detail}")]
    UnexpectedResponse { method: String, detail: String },
    #[error("failed to encode {method} request: {detail}")]
    Encode { method: String, detail: String },
}
