//! Command workflows.
//!
//! Each workflow connects the proxies it needs, issues its correlated calls
//! and subscriptions, prints its terminal line and decides whether to request
//! shutdown. Failures propagate to the event loop's error sink.
//!
//! Event handlers never request shutdown themselves. A handler waiting for a
//! terminal event raises a [`Milestone`] and the workflow requests shutdown
//! once its own calls have settled.

mod check;
mod daemon;
mod dump;
mod launch;
mod ps;
mod start;
mod stop;

use std::future::Future;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::errors::AppError;
use crate::rpc::RpcError;
use crate::service::ServiceName;

pub(crate) use check::{MissingComponent, check};
pub(crate) use daemon::{kill_daemon, ping_daemon};
pub(crate) use dump::dump;
pub(crate) use ps::ps;
pub(crate) use start::start;
pub(crate) use stop::stop;

/// Parameters for methods that take none; encoded as `{}`.
#[derive(Debug, Serialize)]
pub(crate) struct NoParams {}

/// Parameters of the daemon's `kill` method.
#[derive(Debug, Serialize)]
pub(crate) struct KillParams<'a> {
    pub(crate) service: &'a ServiceName,
    pub(crate) signal: i32,
    pub(crate) restart: i32,
}

/// Daemon event naming a service, such as `started` or `stopped`.
#[derive(Debug, Deserialize)]
pub(crate) struct ServiceEvent {
    pub(crate) service: String,
}

/// Daemon `output` event carrying a chunk of instance output.
#[derive(Debug, Deserialize)]
pub(crate) struct OutputEvent {
    pub(crate) service: String,
    pub(crate) data: String,
}

/// Flag raised from an event handler and awaited by the owning workflow.
#[derive(Debug)]
pub(crate) struct Milestone {
    reached: watch::Sender<bool>,
}

impl Milestone {
    pub(crate) fn new() -> Self {
        let (reached, _) = watch::channel(false);
        Self { reached }
    }

    pub(crate) fn reach(&self) {
        self.reached.send_replace(true);
    }

    /// Resolves once [`Milestone::reach`] has been called, including before
    /// this future was created.
    pub(crate) async fn reached(&self) {
        let mut receiver = self.reached.subscribe();
        if receiver.wait_for(|reached| *reached).await.is_err() {
            tracing::debug!("milestone channel closed");
        }
    }
}

/// Waits for every call to settle, then fails if any member failed.
pub(crate) async fn settle_all<I, F, T>(calls: I) -> Result<Vec<T>, AppError>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, RpcError>>,
{
    settled(join_all(calls).await)
}

fn settled<T>(outcomes: Vec<Result<T, RpcError>>) -> Result<Vec<T>, AppError> {
    let total = outcomes.len();
    let mut values = Vec::with_capacity(total);
    let mut failed = 0;
    let mut first = None;
    for outcome in outcomes {
        match outcome {
            Ok(value) => values.push(value),
            Err(error) => {
                failed += 1;
                first.get_or_insert(error);
            }
        }
    }
    match first {
        None => Ok(values),
        Some(first) => Err(AppError::Settled {
            failed,
            total,
            first,
        }),
    }
}
