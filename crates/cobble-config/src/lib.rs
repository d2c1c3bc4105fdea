//! Shared configuration for the cobblestone manager.
//!
//! Values are layered by `ortho_config`: built-in defaults, then a
//! configuration file, then `COBBLE_*` environment variables, then the
//! configuration flags given ahead of the subcommand.

mod defaults;
mod layout;
mod logging;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_INSTALL_DIR, DEFAULT_LOG_FILTER, default_install_dir, default_log_filter,
    default_log_filter_string, default_log_format,
};
pub use layout::InstallLayout;
pub use logging::{LogFormat, LogFormatParseError};

/// Runtime configuration for the `cobble` binary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "COBBLE")]
pub struct Config {
    /// Root of the manager installation.
    #[ortho_config(default = default_install_dir())]
    #[serde(default = "default_install_dir")]
    pub install_dir: Utf8PathBuf,
    /// `tracing` filter expression applied to diagnostics.
    #[ortho_config(default = default_log_filter_string())]
    #[serde(default = "default_log_filter_string")]
    pub log_filter: String,
    /// Output format for diagnostics.
    #[ortho_config(default = default_log_format())]
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            install_dir: default_install_dir(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Root of the manager installation.
    pub fn install_dir(&self) -> &Utf8Path {
        self.install_dir.as_path()
    }

    /// Filter expression applied to diagnostics.
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Output format for diagnostics.
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Installation layout derived from [`Config::install_dir`].
    pub fn layout(&self) -> InstallLayout {
        InstallLayout::from_config(self)
    }
}
