//! `stop`: signal a set of services, optionally waiting for them to exit.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

use super::{KillParams, Milestone, ServiceEvent, settle_all};
use crate::command::StopRequest;
use crate::console::Stream;
use crate::context::AppContext;
use crate::errors::AppError;
use crate::service::ServiceName;

#[derive(Debug, Serialize)]
struct StatusParams<'a> {
    service: &'a ServiceName,
}

/// Counts `stopped` events for the requested services of one invocation.
#[derive(Debug)]
struct StopTracker {
    targets: Vec<ServiceName>,
    stopped: AtomicUsize,
}

impl StopTracker {
    fn new(targets: Vec<ServiceName>) -> Self {
        Self {
            targets,
            stopped: AtomicUsize::new(0),
        }
    }

    /// Records a `stopped` event.
    ///
    /// Returns `None` for services outside the set, otherwise whether every
    /// target has now been seen.
    fn record(&self, service: &str) -> Option<bool> {
        if !self.targets.iter().any(|target| target.matches(service)) {
            return None;
        }
        let seen = self.stopped.fetch_add(1, Ordering::SeqCst) + 1;
        Some(seen >= self.targets.len())
    }
}

pub(crate) async fn stop(context: &AppContext, request: StopRequest) -> Result<(), AppError> {
    let StopRequest {
        services,
        signal,
        restart,
        wait,
    } = request;
    let daemon = context.daemon();
    daemon.start().await?;

    let statuses = services
        .iter()
        .map(|service| daemon.call("status", StatusParams { service }));
    let status_outcome = settle_all(statuses).await;

    let stopped = wait.then(|| watch_stops(context, &services));

    let kills = services.iter().map(|service| {
        daemon.call(
            "kill",
            KillParams {
                service,
                signal: signal.number(),
                restart: restart.wire_value(),
            },
        )
    });
    let kill_outcome = settle_all(kills).await;
    status_outcome?;
    kill_outcome?;

    context.say(format_args!(
        "sent {} signal to {} service(s)",
        signal.name(),
        services.len()
    ))?;
    if let Some(stopped) = stopped {
        stopped.reached().await;
    }
    context.shutdown().request_shutdown();
    Ok(())
}

/// Prints each requested service's `stopped` event and raises the returned
/// milestone once every one of them has been seen.
fn watch_stops(context: &AppContext, services: &[ServiceName]) -> Arc<Milestone> {
    let milestone = Arc::new(Milestone::new());
    let all_stopped = Arc::clone(&milestone);
    let tracker = StopTracker::new(services.to_vec());
    let handler_context = context.clone();
    context
        .daemon()
        .subscribe_as("stopped", move |event: ServiceEvent| {
            match tracker.record(&event.service) {
                Some(complete) => {
                    handler_context.emit(Stream::Stdout, format_args!("{} stopped", event.service));
                    if complete {
                        all_stopped.reach();
                    }
                }
                None => tracing::debug!(service = %event.service, "ignoring unrelated stop"),
            }
        });
    milestone
}
