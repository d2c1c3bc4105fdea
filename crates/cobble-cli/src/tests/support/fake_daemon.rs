//! In-memory stand-in for the process manager and service instances.
//!
//! Each connection is a `tokio` duplex pipe served by a task on the event
//! loop's runtime. Responses are scripted per peer and method; requests and
//! subscription announcements are recorded for assertions.

use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, WriteHalf};

use crate::rpc::{Connection, Connector, ConnectorFactory, Peer};

/// Peer identity as seen by the fake.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum FakePeer {
    Daemon,
    Service(String),
}

impl FakePeer {
    pub(crate) fn service(name: &str) -> Self {
        Self::Service(name.to_owned())
    }
}

impl From<Peer<'_>> for FakePeer {
    fn from(peer: Peer<'_>) -> Self {
        match peer {
            Peer::Daemon => Self::Daemon,
            Peer::Service(service) => Self::Service(service.as_str().to_owned()),
        }
    }
}

/// One action taken in answer to a request.
#[derive(Debug, Clone)]
pub(crate) enum PeerAction {
    Reply(Value),
    Fail(String),
    Emit { event: String, params: Value },
    Pause(Duration),
}

impl PeerAction {
    pub(crate) fn emit(event: &str, params: Value) -> Self {
        Self::Emit {
            event: event.to_owned(),
            params,
        }
    }
}

type Responder = Arc<dyn Fn(&Value) -> Vec<PeerAction> + Send + Sync>;

/// Request received by a fake peer.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedCall {
    pub(crate) method: String,
    pub(crate) params: Value,
}

#[derive(Default)]
struct FakeState {
    responders: HashMap<(FakePeer, String), Responder>,
    refused: HashSet<FakePeer>,
    calls: HashMap<FakePeer, Vec<RecordedCall>>,
    subscriptions: HashMap<FakePeer, Vec<String>>,
    connections: HashMap<FakePeer, usize>,
}

/// Scriptable daemon and service instances; cheap to clone.
#[derive(Clone, Default)]
pub(crate) struct FakeDaemon {
    state: Arc<Mutex<FakeState>>,
}

impl FakeDaemon {
    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Answers `method` on `peer` with whatever `responder` returns.
    pub(crate) fn respond<F>(&self, peer: FakePeer, method: &str, responder: F)
    where
        F: Fn(&Value) -> Vec<PeerAction> + Send + Sync + 'static,
    {
        self.lock()
            .responders
            .insert((peer, method.to_owned()), Arc::new(responder));
    }

    pub(crate) fn reply(&self, peer: FakePeer, method: &str, result: Value) {
        self.respond(peer, method, move |_| vec![PeerAction::Reply(result.clone())]);
    }

    pub(crate) fn fail(&self, peer: FakePeer, method: &str, message: &str) {
        let message = message.to_owned();
        self.respond(peer, method, move |_| vec![PeerAction::Fail(message.clone())]);
    }

    /// Makes connection attempts to `peer` fail.
    pub(crate) fn refuse(&self, peer: FakePeer) {
        self.lock().refused.insert(peer);
    }

    pub(crate) fn calls(&self, peer: &FakePeer) -> Vec<RecordedCall> {
        self.lock().calls.get(peer).cloned().unwrap_or_default()
    }

    pub(crate) fn methods(&self, peer: &FakePeer) -> Vec<String> {
        self.calls(peer)
            .into_iter()
            .map(|call| call.method)
            .collect()
    }

    pub(crate) fn subscriptions(&self, peer: &FakePeer) -> Vec<String> {
        self.lock()
            .subscriptions
            .get(peer)
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn connections(&self, peer: &FakePeer) -> usize {
        self.lock().connections.get(peer).copied().unwrap_or(0)
    }

    fn actions_for(&self, peer: &FakePeer, method: &str, params: &Value) -> Vec<PeerAction> {
        let responder = {
            let mut state = self.lock();
            state
                .calls
                .entry(peer.clone())
                .or_default()
                .push(RecordedCall {
                    method: method.to_owned(),
                    params: params.clone(),
                });
            state
                .responders
                .get(&(peer.clone(), method.to_owned()))
                .cloned()
        };
        match responder {
            Some(responder) => responder(params),
            None => vec![PeerAction::Reply(Value::Null)],
        }
    }

    async fn serve(self, peer: FakePeer, stream: DuplexStream) {
        let (reader, mut writer) = tokio::io::split(stream);
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let Ok(frame) = serde_json::from_str::<Value>(&line) else {
                break;
            };
            let method = frame["method"].as_str().unwrap_or_default().to_owned();
            let params = frame.get("params").cloned().unwrap_or(Value::Null);
            let Some(id) = frame.get("id").cloned() else {
                if method == "rpc.on" {
                    let events = params.as_array().cloned().unwrap_or_default();
                    let mut state = self.lock();
                    let recorded = state.subscriptions.entry(peer.clone()).or_default();
                    recorded.extend(events.iter().filter_map(Value::as_str).map(str::to_owned));
                }
                continue;
            };
            for action in self.actions_for(&peer, &method, &params) {
                let frame = match action {
                    PeerAction::Reply(result) => json!({"jsonrpc": "2.0", "id": id, "result": result}),
                    PeerAction::Fail(message) => json!({
                        "jsonrpc": "2.0",
                        "id": id,
                        "error": {"code": -32000, "message": message},
                    }),
                    PeerAction::Emit { event, params } => {
                        json!({"jsonrpc": "2.0", "method": event, "params": params})
                    }
                    PeerAction::Pause(duration) => {
                        tokio::time::sleep(duration).await;
                        continue;
                    }
                };
                if write_frame(&mut writer, &frame).await.is_err() {
                    return;
                }
            }
        }
    }
}

async fn write_frame(writer: &mut WriteHalf<DuplexStream>, frame: &Value) -> io::Result<()> {
    writer.write_all(frame.to_string().as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}

struct FakeConnector {
    daemon: FakeDaemon,
    peer: FakePeer,
}

#[async_trait]
impl Connector for FakeConnector {
    fn describe(&self) -> String {
        match &self.peer {
            FakePeer::Daemon => String::from("fake daemon"),
            FakePeer::Service(name) => format!("fake service {name}"),
        }
    }

    async fn connect(&self) -> io::Result<Connection> {
        {
            let mut state = self.daemon.lock();
            if state.refused.contains(&self.peer) {
                return Err(io::Error::from(io::ErrorKind::ConnectionRefused));
            }
            *state.connections.entry(self.peer.clone()).or_default() += 1;
        }
        let (client, server) = tokio::io::duplex(64 * 1024);
        tokio::spawn(self.daemon.clone().serve(self.peer.clone(), server));
        let (reader, writer) = tokio::io::split(client);
        Ok(Connection::new(reader, writer))
    }
}

impl ConnectorFactory for FakeDaemon {
    fn connector(&self, peer: Peer<'_>) -> Arc<dyn Connector> {
        Arc::new(FakeConnector {
            daemon: self.clone(),
            peer: FakePeer::from(peer),
        })
    }
}
