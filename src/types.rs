use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Display name chosen by the client. Unique and case-sensitive.
pub type PlayerName = String;
/// Ephemeral transport connection identifier
pub type ConnectionId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    Lobby,
    Open,
    Rating,
    Guessing,
    Summary,
}

impl GamePhase {
    /// True while songs are being played back (rating or guessing)
    pub fn is_playing(&self) -> bool {
        matches!(self, GamePhase::Rating | GamePhase::Guessing)
    }
}

/// Settings supplied by the host when opening a songfest
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SongfestSettings {
    pub songs_per_person: u32,
    pub theme: String,
    pub host: PlayerName,
}

/// A single rating on a 1..=5 scale. Serialized as the bare integer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub enum Rating {
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
}

impl Rating {
    pub const ALL: [Rating; 5] = [
        Rating::One,
        Rating::Two,
        Rating::Three,
        Rating::Four,
        Rating::Five,
    ];

    pub fn value(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u8> for Rating {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Rating::One),
            2 => Ok(Rating::Two),
            3 => Ok(Rating::Three),
            4 => Ok(Rating::Four),
            5 => Ok(Rating::Five),
            other => Err(format!("rating must be between 1 and 5, got {}", other)),
        }
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating as u8
    }
}

/// Both axes of a rating for the current song
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SongRating {
    pub liked: Rating,
    pub theme: Rating,
}

/// A guess at who submitted the current song
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Guess {
    pub player_name: PlayerName,
    /// Milliseconds remaining on the client's guess timer
    pub time: u64,
}

/// Clip metadata as submitted by a client. Never interpreted by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClipSpec {
    pub url: String,
    pub start_seconds: f64,
    pub end_seconds: f64,
}

impl ClipSpec {
    /// Check that the clip window is usable
    pub fn validate(&self) -> Result<(), String> {
        if self.url.trim().is_empty() {
            return Err("Clip URL cannot be empty".to_string());
        }
        if !self.start_seconds.is_finite() || !self.end_seconds.is_finite() {
            return Err("Clip bounds must be finite".to_string());
        }
        if self.start_seconds < 0.0 {
            return Err("Clip cannot start before 0 seconds".to_string());
        }
        if self.end_seconds <= self.start_seconds {
            return Err(format!(
                "Clip end ({}) must be after its start ({})",
                self.end_seconds, self.start_seconds
            ));
        }
        Ok(())
    }
}

/// Count of ratings per value, index 0 holds the number of 1s
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct RatingHistogram([u32; 5]);

impl RatingHistogram {
    pub fn record(&mut self, rating: Rating) {
        self.0[rating.value() as usize - 1] += 1;
    }

    pub fn count(&self, rating: Rating) -> u32 {
        self.0[rating.value() as usize - 1]
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Song {
    /// None until the owning player submits
    pub clip: Option<ClipSpec>,
    pub theme_score: RatingHistogram,
    pub liked_score: RatingHistogram,
    /// Guessed submitter name -> number of guesses
    pub guess_distribution: BTreeMap<PlayerName, u32>,
}

impl Song {
    pub fn is_submitted(&self) -> bool {
        self.clip.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub name: PlayerName,
    pub songs: Vec<Song>,
    #[serde(skip)]
    pub connection_id: Option<ConnectionId>,
    pub points: u32,
    #[serde(default)]
    pub correct_guesses: u32,
}

impl Player {
    pub fn new(name: PlayerName, songs_per_person: u32) -> Self {
        Self {
            name,
            songs: vec![Song::default(); songs_per_person as usize],
            connection_id: None,
            points: 0,
            correct_guesses: 0,
        }
    }

    /// A player is claimed while some connection is bound to it
    pub fn is_claimed(&self) -> bool {
        self.connection_id.is_some()
    }

    pub fn has_submitted(&self) -> bool {
        !self.songs.is_empty() && self.songs.iter().all(Song::is_submitted)
    }
}

/// Which distribution a client wants for the current song
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DistributionKind {
    Rating,
    Guessing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_rejects_out_of_range() {
        assert!(Rating::try_from(0u8).is_err());
        assert!(Rating::try_from(6u8).is_err());
        assert_eq!(Rating::try_from(3u8), Ok(Rating::Three));
    }

    #[test]
    fn test_rating_deserializes_from_integer() {
        let rating: SongRating = serde_json::from_str(r#"{"liked":5,"theme":2}"#).unwrap();
        assert_eq!(rating.liked, Rating::Five);
        assert_eq!(rating.theme, Rating::Two);

        assert!(serde_json::from_str::<SongRating>(r#"{"liked":9,"theme":2}"#).is_err());
    }

    #[test]
    fn test_histogram_counts() {
        let mut histogram = RatingHistogram::default();
        histogram.record(Rating::Five);
        histogram.record(Rating::Five);
        histogram.record(Rating::One);

        assert_eq!(histogram.count(Rating::Five), 2);
        assert_eq!(histogram.count(Rating::One), 1);
        assert_eq!(histogram.count(Rating::Three), 0);
        assert_eq!(histogram.total(), 3);
        assert_eq!(serde_json::to_string(&histogram).unwrap(), "[1,0,0,0,2]");
    }

    #[test]
    fn test_clip_validation() {
        let clip = ClipSpec {
            url: "https://example.com/song".to_string(),
            start_seconds: 10.0,
            end_seconds: 40.0,
        };
        assert!(clip.validate().is_ok());

        let backwards = ClipSpec {
            end_seconds: 5.0,
            ..clip.clone()
        };
        assert!(backwards.validate().is_err());

        let no_url = ClipSpec {
            url: "  ".to_string(),
            ..clip
        };
        assert!(no_url.validate().is_err());
    }

    #[test]
    fn test_new_player_has_empty_slots() {
        let player = Player::new("A".to_string(), 3);
        assert_eq!(player.songs.len(), 3);
        assert!(!player.is_claimed());
        assert!(!player.has_submitted());
    }

    #[test]
    fn test_connection_id_not_serialized() {
        let mut player = Player::new("A".to_string(), 1);
        player.connection_id = Some("conn-1".to_string());
        let json = serde_json::to_string(&player).unwrap();
        assert!(!json.contains("conn-1"));
    }
}
