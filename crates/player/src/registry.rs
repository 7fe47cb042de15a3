// Player registry keyed by texture id
// Owned by the host plugin; there is no process-wide instance.

use crate::config::SessionConfig;
use crate::session::{PlayerSession, SessionResources};
use parking_lot::Mutex;
use podium_video_core::{PlayerError, Result};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
pub struct PlayerRegistry {
    players: Mutex<HashMap<i64, Arc<PlayerSession>>>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session and register it under its texture id
    pub fn create(&self, config: SessionConfig, resources: SessionResources) -> Result<i64> {
        crate::init_logging();
        let session = PlayerSession::new(config, resources)?;
        let id = session.texture_id();

        let previous = self.players.lock().insert(id, Arc::new(session));
        if let Some(previous) = previous {
            log::warn!("Texture id {} reused, disposing previous player", id);
            if let Err(e) = previous.dispose() {
                log::error!("Failed to dispose replaced player {}: {}", id, e);
            }
        }
        Ok(id)
    }

    pub fn get(&self, id: i64) -> Result<Arc<PlayerSession>> {
        self.players
            .lock()
            .get(&id)
            .cloned()
            .ok_or_else(|| PlayerError::InvalidState("Invalid player ID".into()))
    }

    /// Run `f` against a registered player. The registry lock is released
    /// before `f` runs so event listeners may call back into the registry.
    pub fn with_player<R>(&self, id: i64, f: impl FnOnce(&PlayerSession) -> Result<R>) -> Result<R> {
        let player = self.get(id)?;
        f(&player)
    }

    /// Dispose and unregister one player
    pub fn dispose(&self, id: i64) -> Result<()> {
        let player = self
            .players
            .lock()
            .remove(&id)
            .ok_or_else(|| PlayerError::InvalidState("Invalid player ID".into()))?;
        player.dispose()
    }

    /// Dispose every player, e.g. when the host engine detaches.
    /// Failures are logged; every player is still removed.
    pub fn dispose_all(&self) {
        let players: Vec<_> = self.players.lock().drain().collect();
        for (id, player) in players {
            if let Err(e) = player.dispose() {
                log::error!("Failed to dispose player {}: {}", id, e);
            }
        }
    }

    pub fn on_picture_in_picture_mode_changed(&self, id: i64, in_pip: bool) -> Result<()> {
        self.with_player(id, |player| player.on_picture_in_picture_mode_changed(in_pip))
    }

    pub fn len(&self) -> usize {
        self.players.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.lock().is_empty()
    }
}
