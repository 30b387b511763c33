//! Client-facing views of the session.
//!
//! `ClientState` is what every connected client sees; it never contains
//! connection ids and never reveals who submitted the song being played.

use super::game::Songfest;
use crate::error::SongfestResult;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Broadcast-safe snapshot of the whole session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientState {
    pub phase: GamePhase,
    pub songfest_open: bool,
    pub game_in_progress: bool,
    pub theme: String,
    pub songs_per_person: u32,
    pub host: Option<PlayerName>,
    pub players: Vec<PlayerInfo>,
    pub current_song: Option<CurrentSongInfo>,
    pub players_locked_in: Vec<PlayerName>,
}

/// Roster entry as other players see it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerInfo {
    pub name: PlayerName,
    pub claimed: bool,
    pub points: u32,
    pub has_submitted: bool,
    pub locked_in: bool,
}

/// The song being played, without its submitter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrentSongInfo {
    /// 1-based position in the play queue
    pub number: usize,
    pub total: usize,
    pub clip: Option<ClipSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Distributions {
    Rating {
        theme: RatingHistogram,
        liked: RatingHistogram,
    },
    Guessing {
        guesses: BTreeMap<PlayerName, u32>,
    },
}

/// End-of-game data: every song with its submitter revealed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSummary {
    pub generated_at: String,
    pub theme: String,
    pub songs: Vec<SummarySong>,
    /// Highest points first
    pub players: Vec<PlayerStanding>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummarySong {
    pub submitter: PlayerName,
    pub index: usize,
    #[serde(flatten)]
    pub song: Song,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerStanding {
    pub name: PlayerName,
    pub points: u32,
    pub correct_guesses: u32,
}

impl Songfest {
    pub fn client_state(&self) -> ClientState {
        let lock_ins = self.lock_ins();

        let players = self
            .players()
            .map(|p| PlayerInfo {
                name: p.name.clone(),
                claimed: p.is_claimed(),
                points: p.points,
                has_submitted: p.has_submitted(),
                locked_in: lock_ins.already_locked_in(&p.name),
            })
            .collect();

        let current_song = if self.phase().is_playing() {
            self.catalogue().position().map(|number| CurrentSongInfo {
                number,
                total: self.catalogue().len(),
                clip: self.current_song().and_then(|s| s.clip.clone()),
            })
        } else {
            None
        };

        ClientState {
            phase: self.phase(),
            songfest_open: self.songfest_open(),
            game_in_progress: self.game_in_progress(),
            theme: self.theme().to_string(),
            songs_per_person: self.songs_per_person(),
            host: self.host().map(str::to_string),
            players,
            current_song,
            players_locked_in: lock_ins.names(),
        }
    }

    /// Rating histograms or guess tally for the current song
    pub fn distributions(&self, kind: DistributionKind) -> Option<Distributions> {
        let song = self.current_song()?;
        Some(match kind {
            DistributionKind::Rating => Distributions::Rating {
                theme: song.theme_score.clone(),
                liked: song.liked_score.clone(),
            },
            DistributionKind::Guessing => Distributions::Guessing {
                guesses: song.guess_distribution.clone(),
            },
        })
    }

    /// Every played song with its submitter, plus the final standings.
    /// Submitters stay hidden until the game reaches the summary.
    pub fn summary(&self) -> SongfestResult<GameSummary> {
        self.require_phase(GamePhase::Summary, "view the game summary")?;

        let songs = self
            .catalogue()
            .queue()
            .iter()
            .filter_map(|song_ref| {
                self.song(song_ref).map(|song| SummarySong {
                    submitter: song_ref.submitter.clone(),
                    index: song_ref.index,
                    song: song.clone(),
                })
            })
            .collect();

        let mut players: Vec<PlayerStanding> = self
            .players()
            .map(|p| PlayerStanding {
                name: p.name.clone(),
                points: p.points,
                correct_guesses: p.correct_guesses,
            })
            .collect();
        // Stable sort keeps join order among ties
        players.sort_by(|a, b| b.points.cmp(&a.points));

        Ok(GameSummary {
            generated_at: chrono::Utc::now().to_rfc3339(),
            theme: self.theme().to_string(),
            songs,
            players,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SongfestError;

    fn started() -> Songfest {
        let mut songfest = Songfest::default();
        songfest
            .start_songfest(SongfestSettings {
                songs_per_person: 1,
                theme: "Summer".to_string(),
                host: "A".to_string(),
            })
            .unwrap();
        songfest.join(Some("B")).unwrap();
        songfest.join(Some("C")).unwrap();
        for name in ["A", "B", "C"] {
            songfest
                .submit_songs(
                    name,
                    vec![ClipSpec {
                        url: format!("https://example.com/{}", name),
                        start_seconds: 5.0,
                        end_seconds: 35.0,
                    }],
                )
                .unwrap();
        }
        songfest.start_game().unwrap();
        songfest
    }

    #[test]
    fn test_client_state_in_lobby() {
        let state = Songfest::default().client_state();
        assert_eq!(state.phase, GamePhase::Lobby);
        assert!(!state.songfest_open);
        assert!(!state.game_in_progress);
        assert!(state.players.is_empty());
        assert!(state.current_song.is_none());
        assert!(state.host.is_none());
    }

    #[test]
    fn test_client_state_hides_connections_and_submitter() {
        let mut songfest = started();
        songfest.claim_player("secret-connection", "B");

        let state = songfest.client_state();
        let json = serde_json::to_string(&state).unwrap();

        assert!(!json.contains("secret-connection"));
        assert!(!json.contains("submitter"));
        assert!(state.players.iter().find(|p| p.name == "B").unwrap().claimed);

        let current = state.current_song.unwrap();
        assert_eq!(current.number, 1);
        assert_eq!(current.total, 3);
        assert_eq!(current.clip.unwrap().url, "https://example.com/A");
    }

    #[test]
    fn test_client_state_reports_lock_ins() {
        let mut songfest = started();
        songfest.rate_song(
            Some("B"),
            &SongRating {
                liked: Rating::Four,
                theme: Rating::Four,
            },
        );

        let state = songfest.client_state();
        assert_eq!(state.players_locked_in, vec!["B".to_string()]);
        assert!(state.players.iter().find(|p| p.name == "B").unwrap().locked_in);
        assert!(!state.players.iter().find(|p| p.name == "C").unwrap().locked_in);
    }

    #[test]
    fn test_distributions() {
        let mut songfest = started();
        assert!(Songfest::default()
            .distributions(DistributionKind::Rating)
            .is_none());

        songfest.rate_song(
            Some("B"),
            &SongRating {
                liked: Rating::Five,
                theme: Rating::One,
            },
        );

        match songfest.distributions(DistributionKind::Rating) {
            Some(Distributions::Rating { theme, liked }) => {
                assert_eq!(liked.count(Rating::Five), 1);
                assert_eq!(theme.count(Rating::One), 1);
            }
            other => panic!("Expected rating distributions, got {:?}", other),
        }

        match songfest.distributions(DistributionKind::Guessing) {
            Some(Distributions::Guessing { guesses }) => assert!(guesses.is_empty()),
            other => panic!("Expected guess distribution, got {:?}", other),
        }
    }

    #[test]
    fn test_summary_ranks_players() {
        let mut songfest = started();
        songfest.next_phase();
        songfest.guess_song(
            Some("C"),
            &Guess {
                player_name: "A".to_string(),
                time: 0,
            },
        );

        while songfest.phase() != GamePhase::Summary {
            songfest.next_phase();
        }

        let summary = songfest.summary().unwrap();
        assert_eq!(summary.theme, "Summer");
        assert_eq!(summary.songs.len(), 3);
        assert_eq!(summary.songs[0].submitter, "A");
        assert_eq!(summary.songs[0].song.guess_distribution.get("A"), Some(&1));

        assert_eq!(summary.players[0].name, "C");
        assert_eq!(summary.players[0].correct_guesses, 1);
        // Ties keep join order
        assert_eq!(summary.players[1].name, "A");
        assert_eq!(summary.players[2].name, "B");
    }

    #[test]
    fn test_summary_is_withheld_while_playing() {
        let mut songfest = started();
        assert!(matches!(
            songfest.summary(),
            Err(SongfestError::WrongPhase {
                phase: GamePhase::Rating,
                ..
            })
        ));

        songfest.next_phase();
        assert!(songfest.summary().is_err());
        assert!(Songfest::default().summary().is_err());
    }

    #[test]
    fn test_summary_lists_only_played_songs() {
        let mut songfest = Songfest::default();
        songfest
            .start_songfest(SongfestSettings {
                songs_per_person: 1,
                theme: "Summer".to_string(),
                host: "A".to_string(),
            })
            .unwrap();
        songfest.join(Some("B")).unwrap();
        songfest
            .submit_songs(
                "B",
                vec![ClipSpec {
                    url: "https://example.com/B".to_string(),
                    start_seconds: 0.0,
                    end_seconds: 10.0,
                }],
            )
            .unwrap();
        songfest.start_game().unwrap();
        songfest.next_phase();
        songfest.next_phase();

        let summary = songfest.summary().unwrap();
        assert_eq!(summary.songs.len(), 1);
        assert_eq!(summary.songs[0].submitter, "B");
        assert_eq!(summary.players.len(), 2);
    }
}
