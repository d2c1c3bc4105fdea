//! Local installation check.

use cobble_config::InstallLayout;
use thiserror::Error;

use crate::console::{Console, Stream};
use crate::errors::AppError;

/// First missing installation component, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub(crate) enum MissingComponent {
    #[error("Not installed at all")]
    Installation,
    #[error("nsgod (process manager) is not installed")]
    ProcessManager,
    #[error("StoneServer core is not installed")]
    Core,
    #[error("Minecraft (bedrock edition) is not installed")]
    Game,
}

pub(crate) fn verify_installation(layout: &InstallLayout) -> Result<(), MissingComponent> {
    if !layout.root().is_dir() {
        return Err(MissingComponent::Installation);
    }
    if !layout.daemon_binary().is_file() {
        return Err(MissingComponent::ProcessManager);
    }
    if !layout.core_dir().is_dir() || !layout.core_runtime().is_file() {
        return Err(MissingComponent::Core);
    }
    if !layout.game_dir().is_dir() || !layout.game_binary().is_file() {
        return Err(MissingComponent::Game);
    }
    Ok(())
}

/// Runs without the event loop; only the filesystem is consulted.
pub(crate) fn check(layout: &InstallLayout, console: &Console) -> Result<(), AppError> {
    verify_installation(layout)?;
    console
        .line(Stream::Stdout, format_args!("all components are installed"))
        .map_err(AppError::Console)
}
