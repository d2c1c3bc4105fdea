//! `start`: launch one service instance through the daemon.

use std::sync::Arc;

use serde::Serialize;

use super::launch::LaunchOptions;
use super::{Milestone, OutputEvent, ServiceEvent};
use crate::command::StartRequest;
use crate::console::Stream;
use crate::context::AppContext;
use crate::errors::AppError;
use crate::service::ServiceName;

#[derive(Debug, Serialize)]
struct StartParams<'a> {
    service: &'a ServiceName,
    options: LaunchOptions,
}

pub(crate) async fn start(context: &AppContext, request: StartRequest) -> Result<(), AppError> {
    let StartRequest { service, wait } = request;
    let daemon = context.daemon();
    daemon.start().await?;
    let options = LaunchOptions::for_service(context.layout(), &service)?;

    let started = wait.then(|| watch_startup(context, &service));

    daemon
        .call(
            "start",
            StartParams {
                service: &service,
                options,
            },
        )
        .await?;
    context.say(format_args!("{service} launched"))?;
    if let Some(started) = started {
        started.reached().await;
    }
    context.shutdown().request_shutdown();
    Ok(())
}

/// Streams the instance's output and raises the returned milestone once the
/// daemon reports it started.
fn watch_startup(context: &AppContext, service: &ServiceName) -> Arc<Milestone> {
    let daemon = context.daemon();

    let output = context.clone();
    let target = service.clone();
    daemon.subscribe_as("output", move |event: OutputEvent| {
        if target.matches(&event.service) {
            output.stream(&event.data);
        }
    });

    let milestone = Arc::new(Milestone::new());
    let started = Arc::clone(&milestone);
    let handler_context = context.clone();
    let target = service.clone();
    daemon.subscribe_as("started", move |event: ServiceEvent| {
        if target.matches(&event.service) {
            handler_context.emit(Stream::Stdout, format_args!("{target} started"));
            started.reach();
        }
    });
    milestone
}
