//! `dump`: ask an instance for a stack dump and stream its output.

use super::{KillParams, OutputEvent};
use crate::command::DumpRequest;
use crate::context::AppContext;
use crate::errors::AppError;

/// Restart value telling the daemon to leave the instance running.
const KEEP_RUNNING: i32 = 0;

/// Never requests shutdown itself; output streams until interrupted.
pub(crate) async fn dump(context: &AppContext, request: DumpRequest) -> Result<(), AppError> {
    let DumpRequest { service } = request;
    let daemon = context.daemon();
    daemon.start().await?;

    let output = context.clone();
    let target = service.clone();
    daemon.subscribe_as("output", move |event: OutputEvent| {
        if target.matches(&event.service) {
            output.stream(&event.data);
        }
    });

    daemon
        .call(
            "kill",
            KillParams {
                service: &service,
                signal: libc::SIGUSR1,
                restart: KEEP_RUNNING,
            },
        )
        .await?;
    Ok(())
}
