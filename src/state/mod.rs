mod catalogue;
pub mod export;
mod game;
mod lock_in;
mod player;
pub mod score;

pub use catalogue::{SongCatalogue, SongRef};
pub use game::{ClaimOutcome, JoinOutcome, LockInOutcome, Songfest};
pub use lock_in::LockInTracker;
pub use player::PlayerRegistry;
pub use score::ScoringPolicy;

use crate::protocol::ServerMessage;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The one session this process hosts. Handlers hold the write lock for
    /// the whole event so events are applied one at a time.
    pub songfest: Arc<RwLock<Songfest>>,
    /// Broadcast channel for messages every connected client receives
    pub broadcast: broadcast::Sender<ServerMessage>,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_policy(ScoringPolicy::default())
    }

    pub fn with_policy(policy: ScoringPolicy) -> Self {
        let (tx, _rx) = broadcast::channel(100);
        Self {
            songfest: Arc::new(RwLock::new(Songfest::new(policy))),
            broadcast: tx,
        }
    }

    /// Send a message to every connected client
    pub fn broadcast_to_all(&self, msg: ServerMessage) {
        // No receivers connected is fine
        let _ = self.broadcast.send(msg);
    }

    /// Broadcast a fresh snapshot of the session
    pub fn broadcast_state(&self, songfest: &Songfest) {
        self.broadcast_to_all(ServerMessage::UpdateState {
            state: songfest.client_state(),
        });
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GamePhase, SongfestSettings};

    #[tokio::test]
    async fn test_new_state_is_lobby() {
        let state = AppState::new();
        assert_eq!(state.songfest.read().await.phase(), GamePhase::Lobby);
    }

    #[tokio::test]
    async fn test_broadcast_state_reaches_subscribers() {
        let state = AppState::new();
        let mut rx = state.broadcast.subscribe();

        {
            let mut songfest = state.songfest.write().await;
            songfest
                .start_songfest(SongfestSettings {
                    songs_per_person: 1,
                    theme: "Covers".to_string(),
                    host: "A".to_string(),
                })
                .unwrap();
            state.broadcast_state(&songfest);
        }

        match rx.recv().await.unwrap() {
            ServerMessage::UpdateState { state } => {
                assert_eq!(state.phase, GamePhase::Open);
                assert_eq!(state.host.as_deref(), Some("A"));
            }
            other => panic!("Expected UpdateState, got {:?}", other),
        }
    }

    #[test]
    fn test_broadcast_without_receivers_does_not_panic() {
        let state = AppState::new();
        state.broadcast_to_all(ServerMessage::EndProcessingSongs);
    }

    #[test]
    fn test_custom_policy_is_used() {
        let policy = ScoringPolicy {
            rating_points: 1,
            ..ScoringPolicy::default()
        };
        let state = AppState::with_policy(policy);
        assert_eq!(state.songfest.try_read().unwrap().policy().rating_points, 1);
    }
}
