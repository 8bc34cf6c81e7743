//! SceneGPT Viewer: a Bevy window that mirrors the editor scene.
//!
//! Architecture: chat session (tokio) ─SceneEvent→ Bevy App (main thread)
//!
//! The session owns the scene. The viewer only ever sees snapshots, so a
//! closed window never affects editing and a slow frame never blocks a
//! request.

pub mod plugin;
pub mod registry;

use tokio::sync::mpsc;

use crate::scene::SceneEvent;

/// Channel end held by the Bevy side (inserted as a Resource).
pub struct ViewerChannels {
    pub events: mpsc::UnboundedReceiver<SceneEvent>,
}

/// Create a matched pair of (sender for the session, ViewerChannels for Bevy).
///
/// Dropping the sender closes the window.
pub fn create_viewer_channels() -> (mpsc::UnboundedSender<SceneEvent>, ViewerChannels) {
    let (tx, events) = mpsc::unbounded_channel();
    (tx, ViewerChannels { events })
}
