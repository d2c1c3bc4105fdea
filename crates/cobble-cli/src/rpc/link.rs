//! A live connection: request correlation plus the reader and writer tasks.

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;

use super::connector::Connection;
use super::error::RpcError;
use super::frame::{self, InboundFrame, RemoteFault};
use super::subscription::{self, SharedSubscriptions};

type Reply = oneshot::Sender<Result<Value, RpcError>>;

struct Waiter {
    method: String,
    reply: Reply,
}

/// Calls awaiting their response, keyed by request id.
#[derive(Default)]
struct PendingTable {
    next_id: u64,
    waiting: HashMap<u64, Waiter>,
    closed: Option<RpcError>,
}

impl PendingTable {
    fn register(
        &mut self,
        method: &str,
    ) -> Result<(u64, oneshot::Receiver<Result<Value, RpcError>>), RpcError> {
        if let Some(error) = self.closed.as_ref() {
            return Err(error.clone());
        }
        let id = self.next_id;
        self.next_id += 1;
        let (reply, receiver) = oneshot::channel();
        self.waiting.insert(
            id,
            Waiter {
                method: method.to_owned(),
                reply,
            },
        );
        Ok((id, receiver))
    }

    fn forget(&mut self, id: u64) {
        self.waiting.remove(&id);
    }

    fn resolve(&mut self, id: u64, outcome: Result<Value, RemoteFault>) -> bool {
        let Some(waiter) = self.waiting.remove(&id) else {
            return false;
        };
        let Waiter { method, reply } = waiter;
        // The caller may have gone away; nothing else awaits this reply.
        let _ = reply.send(outcome.map_err(|fault| RpcError::Remote { method, fault }));
        true
    }

    fn close(&mut self, error: &RpcError) {
        if self.closed.is_none() {
            self.closed = Some(error.clone());
        }
        for (_, waiter) in self.waiting.drain() {
            let _ = waiter.reply.send(Err(error.clone()));
        }
    }
}

type SharedPending = Arc<Mutex<PendingTable>>;

fn lock(pending: &Mutex<PendingTable>) -> MutexGuard<'_, PendingTable> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Established connection to one peer.
pub(crate) struct Link {
    peer: String,
    outbound: UnboundedSender<String>,
    pending: SharedPending,
}

impl Link {
    /// Spawns the reader and writer tasks; must run inside the event loop.
    pub(crate) fn establish(
        peer: String,
        connection: Connection,
        subscriptions: SharedSubscriptions,
    ) -> Self {
        let (outbound, queue) = mpsc::unbounded_channel();
        let pending = SharedPending::default();
        subscription::lock(&subscriptions).attach(outbound.clone());
        let Connection { reader, writer } = connection;
        tokio::spawn(write_frames(
            peer.clone(),
            writer,
            queue,
            Arc::clone(&pending),
        ));
        tokio::spawn(read_frames(
            peer.clone(),
            reader,
            Arc::clone(&pending),
            subscriptions,
        ));
        Self {
            peer,
            outbound,
            pending,
        }
    }

    pub(crate) async fn call<P>(&self, method: &str, params: &P) -> Result<Value, RpcError>
    where
        P: Serialize,
    {
        let (id, receiver) = lock(&self.pending).register(method)?;
        let request = match frame::encode_request(id, method, params) {
            Ok(request) => request,
            Err(error) => {
                lock(&self.pending).forget(id);
                return Err(RpcError::Encode {
                    method: method.to_owned(),
                    detail: error.to_string(),
                });
            }
        };
        tracing::trace!(peer = %self.peer, id, method, "sending request");
        if self.outbound.send(request).is_err() {
            lock(&self.pending).forget(id);
            return Err(self.disconnected());
        }
        receiver.await.unwrap_or_else(|_| Err(self.disconnected()))
    }

    fn disconnected(&self) -> RpcError {
        RpcError::Disconnected {
            peer: self.peer.clone(),
        }
    }
}

async fn write_frames(
    peer: String,
    mut writer: Box<dyn AsyncWrite + Send + Unpin>,
    mut queue: UnboundedReceiver<String>,
    pending: SharedPending,
) {
    while let Some(frame) = queue.recv().await {
        if let Err(source) = send_frame(&mut writer, &frame).await {
            tracing::warn!(%peer, %source, "failed to write frame");
            lock(&pending).close(&RpcError::Transport {
                peer,
                source: Arc::new(source),
            });
            return;
        }
    }
}

async fn send_frame(
    writer: &mut Box<dyn AsyncWrite + Send + Unpin>,
    frame: &str,
) -> io::Result<()> {
    writer.write_all(frame.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}

async fn read_frames(
    peer: String,
    reader: Box<dyn AsyncBufRead + Send + Unpin>,
    pending: SharedPending,
    subscriptions: SharedSubscriptions,
) {
    let mut lines = reader.lines();
    let error = loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => {}
            Ok(Some(line)) => match frame::decode(&line) {
                Ok(InboundFrame::Response { id, outcome }) => {
                    if !lock(&pending).resolve(id, outcome) {
                        tracing::warn!(%peer, id, "dropping response for unknown request");
                    }
                }
                Ok(InboundFrame::Event { name, params }) => {
                    dispatch(&subscriptions, &name, &params);
                }
                Err(detail) => {
                    break RpcError::Protocol {
                        peer,
                        detail: detail.to_string(),
                    };
                }
            },
            Ok(None) => break RpcError::Disconnected { peer },
            Err(source) => {
                break RpcError::Transport {
                    peer,
                    source: Arc::new(source),
                };
            }
        }
    };
    tracing::debug!(%error, "connection closed");
    lock(&pending).close(&error);
    subscription::lock(&subscriptions).detach();
}

fn dispatch(subscriptions: &SharedSubscriptions, name: &str, params: &Value) {
    let handlers = subscription::lock(subscriptions).handlers_for(name);
    if handlers.is_empty() {
        tracing::debug!(event = name, "no handler for event");
    }
    for handler in handlers {
        handler(params);
    }
}
