//! Test support for the cobble CLI.
//!
//! Supplies captured output buffers, a context harness for driving single
//! workflows, and the behavioural test world that runs the whole CLI against
//! the in-memory [`FakeDaemon`].

mod fake_daemon;

use std::cell::{Cell, RefCell};
use std::ffi::OsString;
use std::io::{self, Cursor, Write};
use std::process::ExitCode;
use std::sync::{Arc, Mutex, PoisonError};

use camino::Utf8PathBuf;
use cobble_config::{Config, InstallLayout};
use rstest::fixture;
use tempfile::TempDir;

use crate::config::ConfigLoader;
use crate::console::Console;
use crate::context::AppContext;
use crate::errors::AppError;
use crate::lifecycle::{DaemonLauncher, LifecycleError};
use crate::{Io, run_with};

pub(crate) use fake_daemon::{FakeDaemon, FakePeer, PeerAction, RecordedCall};

/// Cloneable in-memory writer.
#[derive(Clone, Default)]
pub(crate) struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub(crate) fn contents(&self) -> String {
        let bytes = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Context wired to captured output and a fake daemon.
pub(crate) struct Harness {
    stdout: SharedBuffer,
    stderr: SharedBuffer,
    daemon: FakeDaemon,
    context: AppContext,
}

impl Harness {
    pub(crate) fn new() -> Self {
        let stdout = SharedBuffer::default();
        let stderr = SharedBuffer::default();
        let daemon = FakeDaemon::default();
        let console = Console::new(stdout.clone(), stderr.clone(), false);
        let context = AppContext::new(
            console,
            InstallLayout::new("/srv/cobble"),
            Arc::new(daemon.clone()),
        );
        Self {
            stdout,
            stderr,
            daemon,
            context,
        }
    }

    pub(crate) fn context(&self) -> AppContext {
        self.context.clone()
    }

    pub(crate) fn daemon(&self) -> &FakeDaemon {
        &self.daemon
    }

    pub(crate) fn stdout(&self) -> String {
        self.stdout.contents()
    }

    pub(crate) fn stderr(&self) -> String {
        self.stderr.contents()
    }
}

pub(crate) struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    pub(crate) fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        Ok(self.config.clone())
    }
}

/// Launcher that records calls instead of spawning processes.
#[derive(Default)]
pub(crate) struct StubLauncher {
    calls: Cell<usize>,
    failure: RefCell<Option<LifecycleError>>,
}

impl StubLauncher {
    pub(crate) fn fail_with(&self, error: LifecycleError) {
        *self.failure.borrow_mut() = Some(error);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl DaemonLauncher for StubLauncher {
    fn ensure_running(&self, _layout: &InstallLayout, _console: &Console) -> Result<(), LifecycleError> {
        self.calls.set(self.calls.get() + 1);
        self.failure.borrow_mut().take().map_or(Ok(()), Err)
    }
}

/// State shared by the behavioural steps.
pub(crate) struct TestWorld {
    pub(crate) install_root: TempDir,
    pub(crate) daemon: FakeDaemon,
    pub(crate) launcher: StubLauncher,
    pub(crate) input: String,
    pub(crate) interactive: bool,
    pub(crate) stdout: SharedBuffer,
    pub(crate) stderr: SharedBuffer,
    pub(crate) exit_code: Option<ExitCode>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self {
            install_root: tempfile::tempdir().expect("temp dir"),
            daemon: FakeDaemon::default(),
            launcher: StubLauncher::default(),
            input: String::new(),
            interactive: false,
            stdout: SharedBuffer::default(),
            stderr: SharedBuffer::default(),
            exit_code: None,
        }
    }
}

impl TestWorld {
    pub(crate) fn install_dir(&self) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(self.install_root.path().join(".cobblestone"))
            .expect("utf-8 temp dir")
    }

    pub(crate) fn layout(&self) -> InstallLayout {
        InstallLayout::new(self.install_dir())
    }

    fn config(&self) -> Config {
        Config {
            install_dir: self.install_dir(),
            ..Config::default()
        }
    }

    pub(crate) fn run(&mut self, command: &str) {
        self.stdout = SharedBuffer::default();
        self.stderr = SharedBuffer::default();
        let console = Console::new(self.stdout.clone(), self.stderr.clone(), self.interactive);
        let input = Cursor::new(self.input.clone().into_bytes());
        let io = Io::new(console, Box::new(input));
        let loader = StaticConfigLoader::new(self.config());
        let exit = run_with(
            build_args(command),
            io,
            &loader,
            &self.launcher,
            Arc::new(self.daemon.clone()),
        );
        self.exit_code = Some(exit);
    }

    pub(crate) fn stdout_text(&self) -> String {
        self.stdout.contents()
    }

    pub(crate) fn stderr_text(&self) -> String {
        self.stderr.contents()
    }

    pub(crate) fn exit_code(&self) -> ExitCode {
        self.exit_code.expect("exit code recorded")
    }
}

pub(crate) fn build_args(command: &str) -> Vec<OsString> {
    let mut args = vec![OsString::from("cobble")];
    args.extend(
        command
            .split_whitespace()
            .map(|token| OsString::from(token.trim_matches('"'))),
    );
    args
}

#[fixture]
pub(crate) fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::default())
}
