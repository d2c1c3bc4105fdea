//! JSON-RPC 2.0 frames carried one per line.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

const JSONRPC_VERSION: &str = "2.0";

/// Notification announcing interest in an event name.
pub(crate) const SUBSCRIBE_METHOD: &str = "rpc.on";

#[derive(Serialize)]
struct OutboundFrame<'a, P> {
    jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<u64>,
    method: &'a str,
    params: &'a P,
}

/// Error object reported by the peer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub(crate) struct RemoteFault {
    #[serde(default)]
    pub(crate) code: i64,
    pub(crate) message: String,
}

impl fmt::Display for RemoteFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Deserialize)]
struct RawFrame {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    params: Value,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<RemoteFault>,
}

/// Frames the client acts upon.
#[derive(Debug, PartialEq)]
pub(crate) enum InboundFrame {
    Response {
        id: u64,
        outcome: Result<Value, RemoteFault>,
    },
    Event {
        name: String,
        params: Value,
    },
}

/// Reasons an inbound line is rejected.
#[derive(Debug, Error)]
pub(crate) enum FrameError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("frame is neither a response nor an event")]
    Unrecognised,
}

pub(crate) fn encode_request<P>(id: u64, method: &str, params: &P) -> serde_json::Result<String>
where
    P: Serialize,
{
    serde_json::to_string(&OutboundFrame {
        jsonrpc: JSONRPC_VERSION,
        id: Some(id),
        method,
        params,
    })
}

pub(crate) fn encode_subscription(event: &str) -> serde_json::Result<String> {
    serde_json::to_string(&OutboundFrame {
        jsonrpc: JSONRPC_VERSION,
        id: None,
        method: SUBSCRIBE_METHOD,
        params: &[event],
    })
}

pub(crate) fn decode(line: &str) -> Result<InboundFrame, FrameError> {
    let raw: RawFrame = serde_json::from_str(line)?;
    match (raw.id, raw.method) {
        (Some(id), _) => Ok(InboundFrame::Response {
            id,
            outcome: raw.error.map_or(Ok(raw.result), Err),
        }),
        (None, Some(name)) => Ok(InboundFrame::Event {
            name,
            params: raw.params,
        }),
        (None, None) => Err(FrameError::Unrecognised),
    }
}
