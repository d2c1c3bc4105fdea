//! Validated per-subcommand requests.
//!
//! Parsing produces one [`Invocation`] carrying exactly the values its
//! workflow needs. Checks that touch the filesystem run here, before any
//! proxy exists.

use crate::cli::{AttachArgs, CliCommand, DumpArgs, StartArgs, StopArgs};
use crate::service::{ServiceName, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Invocation {
    Check,
    Start(StartRequest),
    Ps,
    Dump(DumpRequest),
    Stop(StopRequest),
    PingDaemon,
    KillDaemon,
    Attach(AttachRequest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StartRequest {
    pub(crate) service: ServiceName,
    pub(crate) wait: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DumpRequest {
    pub(crate) service: ServiceName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StopRequest {
    pub(crate) services: Vec<ServiceName>,
    pub(crate) signal: StopSignal,
    pub(crate) restart: RestartMode,
    pub(crate) wait: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AttachRequest {
    pub(crate) service: ServiceName,
    pub(crate) sender: Option<String>,
    pub(crate) wait: bool,
}

/// Signal sent to stop an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StopSignal {
    Terminate,
    Kill,
}

impl StopSignal {
    pub(crate) const fn number(self) -> i32 {
        match self {
            Self::Terminate => libc::SIGTERM,
            Self::Kill => libc::SIGKILL,
        }
    }

    pub(crate) const fn name(self) -> &'static str {
        match self {
            Self::Terminate => "SIGTERM",
            Self::Kill => "SIGKILL",
        }
    }
}

/// What the daemon does once a stopped instance exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RestartMode {
    Restart,
    Stay,
}

impl RestartMode {
    /// Wire encoding understood by the daemon's `kill` method.
    pub(crate) const fn wire_value(self) -> i32 {
        match self {
            Self::Restart => 1,
            Self::Stay => -1,
        }
    }
}

impl TryFrom<CliCommand> for Invocation {
    type Error = ValidationError;

    fn try_from(command: CliCommand) -> Result<Self, Self::Error> {
        Ok(match command {
            CliCommand::Check => Self::Check,
            CliCommand::Start(StartArgs { service, wait }) => {
                service.ensure_directory()?;
                Self::Start(StartRequest { service, wait })
            }
            CliCommand::Ps => Self::Ps,
            CliCommand::Dump(DumpArgs { service }) => {
                service.ensure_directory()?;
                Self::Dump(DumpRequest { service })
            }
            CliCommand::Stop(args) => Self::Stop(StopRequest::try_from(args)?),
            CliCommand::PingDaemon => Self::PingDaemon,
            CliCommand::KillDaemon => Self::KillDaemon,
            CliCommand::Attach(AttachArgs {
                service,
                wait,
                sender,
            }) => {
                service.ensure_directory()?;
                Self::Attach(AttachRequest {
                    service,
                    sender,
                    wait,
                })
            }
        })
    }
}

impl TryFrom<StopArgs> for StopRequest {
    type Error = ValidationError;

    fn try_from(args: StopArgs) -> Result<Self, Self::Error> {
        for service in &args.services {
            service.ensure_directory()?;
        }
        Ok(Self {
            services: args.services,
            signal: if args.force {
                StopSignal::Kill
            } else {
                StopSignal::Terminate
            },
            restart: if args.restart {
                RestartMode::Restart
            } else {
                RestartMode::Stay
            },
            wait: args.wait,
        })
    }
}
