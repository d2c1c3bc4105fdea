//! Command-line runtime for the cobblestone manager.
//!
//! The module owns argument parsing, configuration bootstrapping, daemon
//! auto-start and the single-threaded event loop that drives every
//! subcommand's RPC workflow. The runtime can be exercised from the binary
//! entrypoint and from tests, where configuration loading, daemon launching,
//! peer connections and the process streams are substituted.

use std::ffi::OsString;
use std::io::{self, BufRead, BufReader};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use clap::error::ErrorKind;
use cobble_config::{Config, InstallLayout};
use futures::FutureExt;
use futures::future::LocalBoxFuture;

mod cli;
mod command;
mod config;
mod console;
mod context;
mod errors;
mod lifecycle;
mod reactor;
mod rpc;
mod service;
mod session;
mod telemetry;
mod workflows;

use cli::Cli;
use command::Invocation;
use config::{ConfigLoader, OrthoConfigLoader, split_config_arguments};
use console::Stream;
use context::AppContext;
use errors::AppError;
use lifecycle::{DaemonLauncher, SystemLauncher};
use reactor::EventLoop;
use rpc::{ConnectorFactory, UnixSocketFactory};

pub use console::Console;

/// Process streams handed to the runtime.
///
/// The console carries stdout and stderr; `input` feeds interactive sessions.
pub struct Io {
    console: Console,
    input: Box<dyn BufRead + Send>,
}

impl Io {
    /// Bundles explicit streams.
    pub fn new(console: Console, input: Box<dyn BufRead + Send>) -> Self {
        Self { console, input }
    }

    /// Binds the process's standard streams.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(Console::stdio(), Box::new(BufReader::new(io::stdin())))
    }
}

enum Outcome {
    Exit(ExitCode),
    Ready {
        invocation: Invocation,
        config: Config,
    },
}

struct CliRunner<'a, L: ConfigLoader, D: DaemonLauncher> {
    loader: &'a L,
    launcher: &'a D,
    connectors: Option<Arc<dyn ConnectorFactory>>,
}

impl<'a, L, D> CliRunner<'a, L, D>
where
    L: ConfigLoader,
    D: DaemonLauncher,
{
    fn new(loader: &'a L, launcher: &'a D) -> Self {
        Self {
            loader,
            launcher,
            connectors: None,
        }
    }

    #[cfg(test)]
    fn with_connectors(mut self, connectors: Arc<dyn ConnectorFactory>) -> Self {
        self.connectors = Some(connectors);
        self
    }

    fn run<I>(&self, args: I, io: Io) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
    {
        let Io { console, input } = io;
        let args: Vec<OsString> = args.into_iter().collect();
        let result = self.prepare(&args, &console).and_then(|outcome| match outcome {
            Outcome::Exit(exit_code) => Ok(exit_code),
            Outcome::Ready { invocation, config } => {
                self.execute(invocation, &config, console.clone(), input)
            }
        });
        match result {
            Ok(exit_code) => exit_code,
            Err(error) => {
                report(&console, &error);
                ExitCode::FAILURE
            }
        }
    }

    fn prepare(&self, args: &[OsString], console: &Console) -> Result<Outcome, AppError> {
        let split = split_config_arguments(args);
        let cli = match Cli::try_parse_from(&split.command_arguments) {
            Ok(cli) => cli,
            Err(error)
                if matches!(
                    error.kind(),
                    ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
                ) =>
            {
                console
                    .chunk(Stream::Stdout, &error.render().to_string())
                    .map_err(AppError::Console)?;
                return Ok(Outcome::Exit(ExitCode::SUCCESS));
            }
            Err(error) => return Err(AppError::CliUsage(error)),
        };
        let config = self.loader.load(&split.config_arguments)?;
        telemetry::initialise(&config)?;
        let invocation = Invocation::try_from(cli.command)?;
        tracing::debug!(?invocation, install_dir = %config.install_dir(), "parsed invocation");
        Ok(Outcome::Ready { invocation, config })
    }

    fn execute(
        &self,
        invocation: Invocation,
        config: &Config,
        console: Console,
        input: Box<dyn BufRead + Send>,
    ) -> Result<ExitCode, AppError> {
        let layout = InstallLayout::from_config(config);
        let connectors = self
            .connectors
            .clone()
            .unwrap_or_else(|| Arc::new(UnixSocketFactory::new(layout.clone())));
        let context = AppContext::new(console, layout, connectors);

        let workflow: LocalBoxFuture<'_, Result<(), AppError>> = match invocation {
            Invocation::Check => {
                workflows::check(context.layout(), context.console())?;
                return Ok(ExitCode::SUCCESS);
            }
            Invocation::Start(request) => {
                self.launcher
                    .ensure_running(context.layout(), context.console())?;
                workflows::start(&context, request).boxed_local()
            }
            Invocation::Ps => workflows::ps(&context).boxed_local(),
            Invocation::Dump(request) => workflows::dump(&context, request).boxed_local(),
            Invocation::Stop(request) => workflows::stop(&context, request).boxed_local(),
            Invocation::PingDaemon => workflows::ping_daemon(&context).boxed_local(),
            Invocation::KillDaemon => workflows::kill_daemon(&context).boxed_local(),
            Invocation::Attach(request) => session::attach(&context, request, input).boxed_local(),
        };

        let event_loop = EventLoop::new().map_err(AppError::Runtime)?;
        Ok(event_loop.run(&context, workflow))
    }
}

fn report(console: &Console, error: &AppError) {
    let written = match error {
        AppError::CliUsage(usage) => console.chunk(Stream::Stderr, &usage.render().to_string()),
        other => console.line(Stream::Stderr, format_args!("{other}")),
    };
    if let Err(write_error) = written {
        tracing::error!(%write_error, %error, "failed to report error");
    }
}

/// Runs the CLI with the given arguments and process streams.
///
/// Returns the process exit status: success unless validation, the
/// installation check, daemon start-up or a workflow failed.
#[must_use]
pub fn run<I>(args: I, io: Io) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
{
    CliRunner::new(&OrthoConfigLoader, &SystemLauncher).run(args, io)
}

#[cfg(test)]
pub(crate) fn run_with<I, L, D>(
    args: I,
    io: Io,
    loader: &L,
    launcher: &D,
    connectors: Arc<dyn ConnectorFactory>,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    L: ConfigLoader,
    D: DaemonLauncher,
{
    CliRunner::new(loader, launcher)
        .with_connectors(connectors)
        .run(args, io)
}

#[cfg(test)]
mod tests;
