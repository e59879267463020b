//! Routes trusted peer actions to backend commands.
//!
//! Commands are fire-and-forget: the outcome is never reported back to the
//! protocol, the next poll simply observes whatever the player did.

use std::sync::Arc;

use playerlink_core::{Command, Inbound};

use crate::backend::Backend;

/// Backend command for an action message, if it is one.
pub fn command_for(message: &Inbound) -> Option<Command> {
    match message {
        Inbound::PlayPause => Some(Command::PlayPause),
        Inbound::Stop => Some(Command::Stop),
        Inbound::ListPrev => Some(Command::Prev),
        Inbound::ListNext => Some(Command::Next),
        Inbound::AudioMute => Some(Command::Mute),
        Inbound::Fullscreen => Some(Command::Fullscreen),
        Inbound::PlaylistPlay { index } => Some(Command::Item(*index)),
        Inbound::Seek { position } => Some(Command::Seek(*position)),
        Inbound::SetVolume { volume } => Some(Command::volume(*volume)),
        Inbound::Hello { .. } | Inbound::Accept { .. } | Inbound::Reject { .. } => None,
    }
}

/// Whether an action changes polled state enough to warrant an early poll.
pub fn triggers_update(message: &Inbound) -> bool {
    matches!(
        message,
        Inbound::PlayPause
            | Inbound::Stop
            | Inbound::ListPrev
            | Inbound::ListNext
            | Inbound::AudioMute
            | Inbound::PlaylistPlay { .. }
            | Inbound::SetVolume { .. }
    )
}

/// Invoke a command in the background.
pub fn invoke<B: Backend>(backend: Arc<B>, command: Command) {
    tokio::spawn(async move {
        let path = command.path();
        if let Err(e) = backend.fetch(&path).await {
            tracing::debug!(error = %e, path = %path, "backend command failed");
        }
    });
}
