//! Launch options sent with the daemon's `start` method.

use std::path::{self, Path, PathBuf};
use std::time::Duration;

use cobble_config::InstallLayout;
use serde::{Serialize, Serializer};

use crate::errors::AppError;
use crate::service::ServiceName;

const WORKING_DIRECTORY: &str = "/run";
const LOG_FILE: &str = "stone.log";
const COMMAND_LINE: &[&str] = &["./game/bedrock_server"];
const ENVIRONMENT: &[&str] = &[
    "UPSTART_JOB=cobblestone",
    "LD_PRELOAD=/run/loader.so",
    "HOME=/run/data",
];
const SYSTEM_MOUNTS: &[(&str, &str)] = &[
    ("dev", "/dev"),
    ("sys", "/sys"),
    ("proc", "/proc"),
    ("tmp", "/tmp"),
];
const RESTART_ATTEMPTS: u32 = 5;
const RESTART_WINDOW: Duration = Duration::from_secs(60);

/// Bind mount of `source` at `target` inside the instance root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct Mount(PathBuf, PathBuf);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct RestartPolicy {
    enabled: bool,
    #[serde(rename = "max")]
    max_attempts: u32,
    #[serde(rename = "reset_timer", serialize_with = "as_millis")]
    reset_window: Duration,
}

fn as_millis<S: Serializer>(window: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u128(window.as_millis())
}

/// How the daemon should run one service instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct LaunchOptions {
    #[serde(rename = "waitstop")]
    wait_until_running: bool,
    #[serde(rename = "pty")]
    allocate_pty: bool,
    #[serde(rename = "root")]
    root_directory: PathBuf,
    #[serde(rename = "cwd")]
    working_directory: PathBuf,
    #[serde(rename = "log")]
    log_file: PathBuf,
    #[serde(rename = "cmdline")]
    command_line: Vec<String>,
    #[serde(rename = "env")]
    environment: Vec<String>,
    mounts: Vec<Mount>,
    #[serde(rename = "restart")]
    restart_policy: RestartPolicy,
}

impl LaunchOptions {
    /// Options for running the game server of `service` from `layout`.
    pub(crate) fn for_service(
        layout: &InstallLayout,
        service: &ServiceName,
    ) -> Result<Self, AppError> {
        let data_directory = absolute(service.directory())?;
        let mut mounts = vec![
            Mount(
                PathBuf::from("run/game"),
                absolute(layout.game_dir().as_std_path())?,
            ),
            Mount(PathBuf::from("run/data"), data_directory.clone()),
        ];
        mounts.extend(
            SYSTEM_MOUNTS
                .iter()
                .map(|(target, source)| Mount(PathBuf::from(target), PathBuf::from(source))),
        );
        Ok(Self {
            wait_until_running: true,
            allocate_pty: true,
            root_directory: absolute(layout.core_dir().as_std_path())?,
            working_directory: PathBuf::from(WORKING_DIRECTORY),
            log_file: data_directory.join(LOG_FILE),
            command_line: COMMAND_LINE.iter().map(|part| (*part).to_owned()).collect(),
            environment: ENVIRONMENT.iter().map(|entry| (*entry).to_owned()).collect(),
            mounts,
            restart_policy: RestartPolicy {
                enabled: true,
                max_attempts: RESTART_ATTEMPTS,
                reset_window: RESTART_WINDOW,
            },
        })
    }
}

fn absolute(relative: &Path) -> Result<PathBuf, AppError> {
    path::absolute(relative).map_err(|source| AppError::ResolvePath {
        path: relative.display().to_string(),
        source,
    })
}
