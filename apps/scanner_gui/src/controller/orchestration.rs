//! Command orchestration helpers from UI actions to backend command queue.

use std::time::Instant;

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::card::{BannerKind, BannerState};

/// Queue a command for the backend worker. Queue-pressure failures are
/// surfaced on the banner instead of blocking the surface thread.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    banner: &mut Option<BannerState>,
    now: Instant,
) -> bool {
    let cmd_name = cmd.name();
    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            true
        }
        Err(TrySendError::Full(_)) => {
            *banner = Some(BannerState::new(
                BannerKind::Error,
                "Command queue is full; please retry",
                now,
            ));
            false
        }
        Err(TrySendError::Disconnected(_)) => {
            *banner = Some(BannerState::new(
                BannerKind::Error,
                "Backend worker disconnected (possible startup failure); restart the app",
                now,
            ));
            false
        }
    }
}
