//! `ping-daemon` and `kill-daemon`.

use super::NoParams;
use crate::context::AppContext;
use crate::errors::AppError;

pub(crate) async fn ping_daemon(context: &AppContext) -> Result<(), AppError> {
    let daemon = context.daemon();
    daemon.start().await?;
    daemon.call("ping", NoParams {}).await?;
    context.say(format_args!("daemon is running"))?;
    context.shutdown().request_shutdown();
    Ok(())
}

/// Asks the daemon to stop every service and exit.
pub(crate) async fn kill_daemon(context: &AppContext) -> Result<(), AppError> {
    let daemon = context.daemon();
    daemon.start().await?;
    daemon.call("shutdown", NoParams {}).await?;
    context.say(format_args!("daemon is shut down"))?;
    context.shutdown().request_shutdown();
    Ok(())
}
