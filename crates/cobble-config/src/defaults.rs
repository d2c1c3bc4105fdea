use camino::Utf8PathBuf;

use crate::logging::LogFormat;

/// Installation directory used when nothing else is configured.
///
/// The path is relative so the manager operates on the installation found in
/// the current working directory.
pub const DEFAULT_INSTALL_DIR: &str = ".cobblestone";

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Default installation directory.
pub fn default_install_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_INSTALL_DIR)
}

/// Default log filter expression used by the binary.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binary.
pub fn default_log_format() -> LogFormat {
    LogFormat::Compact
}
