use crate::state::export::{ClientState, Distributions, GameSummary};
use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    GetState,
    StartSongfest(SongfestSettings),
    StartGame,
    /// Look up a player, creating them if the songfest is open
    GetPlayerByName {
        name: Option<PlayerName>,
    },
    SubmitSongs {
        name: PlayerName,
        songs: Vec<ClipSpec>,
    },
    /// Select (or deselect) a player for this connection
    UpdateSocket {
        name: PlayerName,
    },
    IsThisMySong,
    RateSong(SongRating),
    GetDistributions {
        kind: DistributionKind,
    },
    GuessSongSubmitter(Guess),
    GetGameSummaryData,
    Reset,
    NextPhase,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    UpdateState {
        state: ClientState,
    },
    /// Single-cast: the player bound to (or looked up by) this connection
    MyPlayer {
        player: Option<Player>,
    },
    EndProcessingSongs,
    IsThisYourSong {
        mine: bool,
    },
    UpdateDistributions {
        distributions: Option<Distributions>,
    },
    UpdateGameSummaryData {
        summary: GameSummary,
    },
    Error {
        code: String,
        msg: String,
    },
}

impl ServerMessage {
    pub fn error(err: &crate::error::SongfestError) -> Self {
        ServerMessage::Error {
            code: err.code().to_string(),
            msg: err.to_string(),
        }
    }
}
