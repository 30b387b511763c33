//! WebSocket message dispatch
//!
//! Each handler applies one event to the session while holding the write
//! lock, broadcasts a snapshot if other clients need one, and returns the
//! reply for the calling connection.

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::{AppState, ClaimOutcome};
use crate::types::*;
use std::sync::Arc;

/// Handle a client message and return the optional reply for the caller
pub async fn handle_message(
    msg: ClientMessage,
    connection_id: &str,
    state: &Arc<AppState>,
) -> Option<ServerMessage> {
    match msg {
        ClientMessage::GetState => {
            let songfest = state.songfest.read().await;
            Some(ServerMessage::UpdateState {
                state: songfest.client_state(),
            })
        }

        ClientMessage::StartSongfest(settings) => handle_start_songfest(state, settings).await,

        ClientMessage::StartGame => handle_start_game(state).await,

        ClientMessage::GetPlayerByName { name } => {
            handle_get_player_by_name(state, name.as_deref()).await
        }

        ClientMessage::SubmitSongs { name, songs } => {
            handle_submit_songs(state, &name, songs).await
        }

        ClientMessage::UpdateSocket { name } => {
            handle_update_socket(state, connection_id, &name).await
        }

        ClientMessage::IsThisMySong => {
            let songfest = state.songfest.read().await;
            let player = songfest.player_by_connection(connection_id)?;
            Some(ServerMessage::IsThisYourSong {
                mine: songfest.is_current_submitter(&player.name),
            })
        }

        ClientMessage::RateSong(rating) => handle_rate_song(state, connection_id, rating).await,

        ClientMessage::GetDistributions { kind } => {
            let songfest = state.songfest.read().await;
            Some(ServerMessage::UpdateDistributions {
                distributions: songfest.distributions(kind),
            })
        }

        ClientMessage::GuessSongSubmitter(guess) => {
            handle_guess_song_submitter(state, connection_id, guess).await
        }

        ClientMessage::GetGameSummaryData => {
            let songfest = state.songfest.read().await;
            match songfest.summary() {
                Ok(summary) => Some(ServerMessage::UpdateGameSummaryData { summary }),
                Err(e) => Some(ServerMessage::error(&e)),
            }
        }

        ClientMessage::Reset => {
            let mut songfest = state.songfest.write().await;
            songfest.reset();
            state.broadcast_state(&songfest);
            None
        }

        ClientMessage::NextPhase => {
            let mut songfest = state.songfest.write().await;
            songfest.next_phase();
            Some(ServerMessage::UpdateState {
                state: songfest.client_state(),
            })
        }
    }
}

/// Release whatever player a dropped connection held
pub async fn handle_disconnect(state: &Arc<AppState>, connection_id: &str) {
    let mut songfest = state.songfest.write().await;
    if songfest.disconnect(connection_id) {
        tracing::info!("Released player held by connection {}", connection_id);
    }
}

async fn handle_start_songfest(
    state: &Arc<AppState>,
    settings: SongfestSettings,
) -> Option<ServerMessage> {
    let mut songfest = state.songfest.write().await;
    match songfest.start_songfest(settings) {
        Ok(()) => {
            state.broadcast_state(&songfest);
            None
        }
        Err(e) => Some(ServerMessage::error(&e)),
    }
}

async fn handle_start_game(state: &Arc<AppState>) -> Option<ServerMessage> {
    let mut songfest = state.songfest.write().await;
    match songfest.start_game() {
        Ok(()) => {
            state.broadcast_state(&songfest);
            None
        }
        Err(e) => Some(ServerMessage::error(&e)),
    }
}

async fn handle_get_player_by_name(
    state: &Arc<AppState>,
    name: Option<&str>,
) -> Option<ServerMessage> {
    let mut songfest = state.songfest.write().await;
    match songfest.join(name) {
        Ok(outcome) => {
            if outcome.created {
                state.broadcast_state(&songfest);
            }
            Some(ServerMessage::MyPlayer {
                player: outcome.player,
            })
        }
        Err(e) => {
            tracing::warn!("Player lookup for {:?} rejected: {}", name, e);
            Some(ServerMessage::error(&e))
        }
    }
}

async fn handle_submit_songs(
    state: &Arc<AppState>,
    name: &str,
    songs: Vec<ClipSpec>,
) -> Option<ServerMessage> {
    let mut songfest = state.songfest.write().await;
    match songfest.submit_songs(name, songs) {
        Ok(()) => Some(ServerMessage::EndProcessingSongs),
        Err(e) => {
            tracing::warn!("Submission from {} rejected: {}", name, e);
            Some(ServerMessage::error(&e))
        }
    }
}

async fn handle_update_socket(
    state: &Arc<AppState>,
    connection_id: &str,
    name: &str,
) -> Option<ServerMessage> {
    let mut songfest = state.songfest.write().await;
    let player = match songfest.claim_player(connection_id, name)? {
        ClaimOutcome::Claimed(player) => Some(player),
        ClaimOutcome::Released => None,
    };
    state.broadcast_state(&songfest);
    Some(ServerMessage::MyPlayer { player })
}

async fn handle_rate_song(
    state: &Arc<AppState>,
    connection_id: &str,
    rating: SongRating,
) -> Option<ServerMessage> {
    let mut songfest = state.songfest.write().await;
    let rater = songfest
        .player_by_connection(connection_id)
        .map(|p| p.name.clone());

    let outcome = songfest.rate_song(rater.as_deref(), &rating);
    if outcome.should_broadcast() {
        state.broadcast_state(&songfest);
    }
    None
}

async fn handle_guess_song_submitter(
    state: &Arc<AppState>,
    connection_id: &str,
    guess: Guess,
) -> Option<ServerMessage> {
    let mut songfest = state.songfest.write().await;
    let guesser = songfest
        .player_by_connection(connection_id)
        .map(|p| p.name.clone());

    let outcome = songfest.guess_song(guesser.as_deref(), &guess);
    if outcome.should_broadcast() {
        state.broadcast_state(&songfest);
    }
    None
}
