//! Daemon process spawning.

use std::process::{Child, Command, Stdio};

use camino::Utf8Path;

use super::error::LifecycleError;

/// Spawns the process manager detached from the CLI's standard streams.
pub(super) fn spawn_daemon(binary: &Utf8Path) -> Result<Child, LifecycleError> {
    Command::new(binary.as_std_path())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| LifecycleError::LaunchDaemon {
            binary: binary.to_string(),
            source,
        })
}
