//! Hands out one proxy per peer for the lifetime of an invocation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use cobble_config::InstallLayout;

use super::RpcClient;
use super::connector::{Connector, UnixConnector};
use crate::service::ServiceName;

/// Peers the CLI talks to.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Peer<'a> {
    Daemon,
    Service(&'a ServiceName),
}

/// Chooses how a peer is reached.
pub(crate) trait ConnectorFactory: Send + Sync {
    fn connector(&self, peer: Peer<'_>) -> Arc<dyn Connector>;
}

/// Reaches the daemon through its installation socket and services through
/// `<service>/api.socket`.
#[derive(Debug, Clone)]
pub(crate) struct UnixSocketFactory {
    layout: InstallLayout,
}

impl UnixSocketFactory {
    pub(crate) fn new(layout: InstallLayout) -> Self {
        Self { layout }
    }
}

impl ConnectorFactory for UnixSocketFactory {
    fn connector(&self, peer: Peer<'_>) -> Arc<dyn Connector> {
        match peer {
            Peer::Daemon => Arc::new(UnixConnector::new("daemon", self.layout.daemon_socket())),
            Peer::Service(service) => Arc::new(UnixConnector::new(
                format!("service {service}"),
                service.socket_path(),
            )),
        }
    }
}

/// Lazily created proxies keyed by peer.
pub(crate) struct ConnectionRegistry {
    factory: Arc<dyn ConnectorFactory>,
    daemon: OnceLock<RpcClient>,
    services: Mutex<HashMap<ServiceName, RpcClient>>,
}

impl ConnectionRegistry {
    pub(crate) fn new(factory: Arc<dyn ConnectorFactory>) -> Self {
        Self {
            factory,
            daemon: OnceLock::new(),
            services: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn daemon(&self) -> RpcClient {
        self.daemon
            .get_or_init(|| RpcClient::new(self.factory.connector(Peer::Daemon)))
            .clone()
    }

    pub(crate) fn service(&self, service: &ServiceName) -> RpcClient {
        let mut services = self.services.lock().unwrap_or_else(PoisonError::into_inner);
        services
            .entry(service.clone())
            .or_insert_with(|| RpcClient::new(self.factory.connector(Peer::Service(service))))
            .clone()
    }
}
