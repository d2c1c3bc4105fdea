//! Derives the installation paths shared by every subcommand.
//!
//! The manager installation keeps the process manager binary, its control
//! socket and the two runtime trees (`core/` and `game/`) beneath a single
//! root directory. All paths are derived here so the installation check, the
//! daemon launcher and the RPC connectors agree on the layout.

use camino::{Utf8Path, Utf8PathBuf};

use crate::Config;

const DAEMON_BINARY: &str = "nsgod";
const DAEMON_SOCKET: &str = "nsgod.socket";
const CORE_DIR: &str = "core";
const CORE_RUNTIME: &str = "run/stone";
const GAME_DIR: &str = "game";
const GAME_BINARY: &str = "bedrock_server";

/// Canonical paths for the components of a manager installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    root: Utf8PathBuf,
}

impl InstallLayout {
    /// Builds a layout rooted at `root`.
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Derives the layout from the shared configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.install_dir())
    }

    /// Installation root directory.
    pub fn root(&self) -> &Utf8Path {
        self.root.as_path()
    }

    /// Path to the process manager executable.
    pub fn daemon_binary(&self) -> Utf8PathBuf {
        self.root.join(DAEMON_BINARY)
    }

    /// Path to the process manager's control socket.
    pub fn daemon_socket(&self) -> Utf8PathBuf {
        self.root.join(DAEMON_SOCKET)
    }

    /// Directory holding the server core, used as the service root filesystem.
    pub fn core_dir(&self) -> Utf8PathBuf {
        self.root.join(CORE_DIR)
    }

    /// Runtime executable inside the server core.
    pub fn core_runtime(&self) -> Utf8PathBuf {
        self.core_dir().join(CORE_RUNTIME)
    }

    /// Directory holding the game distribution.
    pub fn game_dir(&self) -> Utf8PathBuf {
        self.root.join(GAME_DIR)
    }

    /// Game server executable.
    pub fn game_binary(&self) -> Utf8PathBuf {
        self.game_dir().join(GAME_BINARY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::daemon_binary(InstallLayout::daemon_binary as fn(&InstallLayout) -> Utf8PathBuf, "/srv/cobble/nsgod")]
    #[case::daemon_socket(InstallLayout::daemon_socket as fn(&InstallLayout) -> Utf8PathBuf, "/srv/cobble/nsgod.socket")]
    #[case::core_runtime(InstallLayout::core_runtime as fn(&InstallLayout) -> Utf8PathBuf, "/srv/cobble/core/run/stone")]
    #[case::game_binary(InstallLayout::game_binary as fn(&InstallLayout) -> Utf8PathBuf, "/srv/cobble/game/bedrock_server")]
    fn derives_component_paths(
        #[case] derive: fn(&InstallLayout) -> Utf8PathBuf,
        #[case] expected: &str,
    ) {
        let layout = InstallLayout::new("/srv/cobble");
        assert_eq!(derive(&layout), Utf8PathBuf::from(expected));
    }

    #[test]
    fn default_layout_is_relative_to_working_directory() {
        let layout = InstallLayout::from_config(&Config::default());
        assert_eq!(layout.daemon_socket(), Utf8PathBuf::from(".cobblestone/nsgod.socket"));
    }
}
