//! CLI argument definitions for the cobblestone manager.

use clap::{Args, Parser, Subcommand};

use crate::service::ServiceName;

/// Command-line interface for the cobblestone manager.
#[derive(Parser, Debug)]
#[command(
    name = "cobble",
    about = "cobblestone manager",
    version,
    disable_help_subcommand = true
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CliCommand {
    /// Checks that every installation component is present.
    Check,
    /// Starts a service instance.
    Start(StartArgs),
    /// Lists service instances and their status.
    Ps,
    /// Asks a service instance to dump its stack.
    Dump(DumpArgs),
    /// Stops one or more service instances.
    Stop(StopArgs),
    /// Checks whether the daemon answers.
    PingDaemon,
    /// Shuts the daemon down.
    KillDaemon,
    /// Attaches an interactive console to a service instance.
    Attach(AttachArgs),
}

#[derive(Args, Debug, Clone)]
pub(crate) struct StartArgs {
    /// Service instance to start.
    #[arg(value_name = "SERVICE")]
    pub(crate) service: ServiceName,
    /// Waits until the instance reports it has started.
    #[arg(long)]
    pub(crate) wait: bool,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct DumpArgs {
    /// Service instance to dump.
    #[arg(value_name = "SERVICE")]
    pub(crate) service: ServiceName,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct StopArgs {
    /// Service instances to stop.
    #[arg(value_name = "SERVICE", required = true, num_args = 1..)]
    pub(crate) services: Vec<ServiceName>,
    /// Restarts the instances after they stop.
    #[arg(long, overrides_with = "no_restart")]
    pub(crate) restart: bool,
    /// Keeps the instances stopped (default).
    #[arg(long = "no-restart", overrides_with = "restart")]
    pub(crate) no_restart: bool,
    /// Sends SIGKILL instead of SIGTERM.
    #[arg(long)]
    pub(crate) force: bool,
    /// Waits until every instance reports it has stopped.
    #[arg(long)]
    pub(crate) wait: bool,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct AttachArgs {
    /// Service instance to attach to.
    #[arg(value_name = "SERVICE")]
    pub(crate) service: ServiceName,
    /// Deprecated; accepted and ignored.
    #[arg(long)]
    pub(crate) wait: bool,
    /// Name used for chat messages and commands.
    #[arg(long, value_name = "NAME")]
    pub(crate) sender: Option<String>,
}
