//! RPC client proxies.
//!
//! One [`RpcClient`] exists per logical peer. It connects lazily on first
//! use, correlates responses to their calls by request id, and fans events
//! out to standing subscriptions in registration order. A connection failure
//! rejects every pending call and every call made afterwards.

mod connector;
mod error;
mod frame;
mod link;
mod registry;
mod subscription;

use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::OnceCell;

pub(crate) use connector::Connector;
#[cfg(test)]
pub(crate) use connector::Connection;
pub(crate) use error::RpcError;
#[cfg(test)]
pub(crate) use frame::RemoteFault;
#[cfg(test)]
pub(crate) use registry::Peer;
pub(crate) use registry::{ConnectionRegistry, ConnectorFactory, UnixSocketFactory};
pub(crate) use subscription::SubscriptionHandle;

use link::Link;
use subscription::{EventHandler, SharedSubscriptions, SubscriptionTable};

struct ClientState {
    peer: String,
    connector: Arc<dyn Connector>,
    link: OnceCell<Result<Link, RpcError>>,
    subscriptions: SharedSubscriptions,
}

/// Proxy for one peer; clones share the connection and subscriptions.
#[derive(Clone)]
pub(crate) struct RpcClient {
    state: Arc<ClientState>,
}

impl RpcClient {
    pub(crate) fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            state: Arc::new(ClientState {
                peer: connector.describe(),
                connector,
                link: OnceCell::new(),
                subscriptions: Arc::new(Mutex::new(SubscriptionTable::default())),
            }),
        }
    }

    pub(crate) fn peer(&self) -> &str {
        &self.state.peer
    }

    #[cfg(test)]
    pub(crate) fn shares_connection(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    /// Connects to the peer.
    ///
    /// Repeated and concurrent calls observe the outcome of the first
    /// attempt.
    pub(crate) async fn start(&self) -> Result<(), RpcError> {
        self.link().await.map(|_| ())
    }

    async fn link(&self) -> Result<&Link, RpcError> {
        let outcome = self
            .state
            .link
            .get_or_init(|| async {
                let peer = self.state.peer.clone();
                match self.state.connector.connect().await {
                    Ok(connection) => {
                        tracing::debug!(%peer, "connected");
                        Ok(Link::establish(
                            peer,
                            connection,
                            Arc::clone(&self.state.subscriptions),
                        ))
                    }
                    Err(source) => Err(RpcError::Connect {
                        peer,
                        source: Arc::new(source),
                    }),
                }
            })
            .await;
        outcome.as_ref().map_err(Clone::clone)
    }

    /// Issues `method` and resolves with the peer's result.
    pub(crate) async fn call<P>(&self, method: &str, params: P) -> Result<Value, RpcError>
    where
        P: Serialize,
    {
        self.link().await?.call(method, &params).await
    }

    /// Issues `method` and decodes the result into `T`.
    pub(crate) async fn call_as<T, P>(&self, method: &str, params: P) -> Result<T, RpcError>
    where
        T: DeserializeOwned,
        P: Serialize,
    {
        let value = self.call(method, params).await?;
        serde_json::from_value(value).map_err(|error| RpcError::UnexpectedResponse {
            method: method.to_owned(),
            detail: error.to_string(),
        })
    }

    /// Registers `handler` for every `event` the peer emits.
    ///
    /// Returns at once; the peer is told about the subscription before any
    /// later call is sent.
    pub(crate) fn subscribe<F>(&self, event: &str, handler: F) -> SubscriptionHandle
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let handler: EventHandler = Arc::new(handler);
        let id = subscription::lock(&self.state.subscriptions).insert(event, handler);
        SubscriptionHandle::new(id, &self.state.subscriptions)
    }

    /// Like [`RpcClient::subscribe`] with the payload decoded into `T`.
    ///
    /// Payloads that fail to decode are logged and skipped.
    pub(crate) fn subscribe_as<T, F>(&self, event: &str, handler: F) -> SubscriptionHandle
    where
        T: DeserializeOwned,
        F: Fn(T) + Send + Sync + 'static,
    {
        let name = event.to_owned();
        self.subscribe(event, move |params| {
            match serde_json::from_value::<T>(params.clone()) {
                Ok(payload) => handler(payload),
                Err(error) => tracing::warn!(event = %name, %error, "skipping malformed event"),
            }
        })
    }
}
