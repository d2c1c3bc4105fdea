//! Validated service identifiers.
//!
//! A service name doubles as the key into the daemon's instance table and as
//! the directory holding that instance's data and control socket, so it is
//! checked once at the CLI boundary before any RPC traffic.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use camino::Utf8PathBuf;
use serde::Serialize;
use thiserror::Error;

const SERVICE_SOCKET: &str = "api.socket";

/// Errors raised while validating command arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum ValidationError {
    #[error("service name must not be empty")]
    EmptyServiceName,
    #[error("service name '{name}' must not contain '.'")]
    DottedServiceName { name: String },
    #[error("service directory '{name}' does not exist")]
    MissingServiceDirectory { name: String },
}

/// Name of a managed service instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub(crate) struct ServiceName(String);

impl ServiceName {
    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }

    /// Directory holding the instance's data, relative to the working
    /// directory.
    pub(crate) fn directory(&self) -> &Path {
        Path::new(&self.0)
    }

    /// Control socket exposed by the running instance.
    pub(crate) fn socket_path(&self) -> Utf8PathBuf {
        Utf8PathBuf::from(&self.0).join(SERVICE_SOCKET)
    }

    /// Confirms the instance directory exists.
    pub(crate) fn ensure_directory(&self) -> Result<(), ValidationError> {
        if self.directory().is_dir() {
            Ok(())
        } else {
            Err(ValidationError::MissingServiceDirectory {
                name: self.0.clone(),
            })
        }
    }

    /// Returns true when an event payload names this service.
    pub(crate) fn matches(&self, candidate: &str) -> bool {
        self.0 == candidate
    }
}

impl FromStr for ServiceName {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.is_empty() {
            return Err(ValidationError::EmptyServiceName);
        }
        if value.contains('.') {
            return Err(ValidationError::DottedServiceName {
                name: value.to_owned(),
            });
        }
        Ok(Self(value.to_owned()))
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
