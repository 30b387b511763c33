use super::catalogue::{self, SongCatalogue, SongRef};
use super::lock_in::LockInTracker;
use super::player::PlayerRegistry;
use super::score::{self, ScoringPolicy};
use crate::error::{SongfestError, SongfestResult};
use crate::types::*;

/// Upper bound on song slots per player
pub const MAX_SONGS_PER_PERSON: u32 = 10;

/// Result of a rating or guess event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockInOutcome {
    /// Nothing changed: unknown player, duplicate, wrong round or own song
    Ignored,
    /// Recorded, but others still have to act
    LockedIn,
    /// Recorded, everyone has acted and the phase already advanced
    RoundComplete,
}

impl LockInOutcome {
    pub fn should_broadcast(&self) -> bool {
        matches!(self, LockInOutcome::RoundComplete)
    }
}

/// Result of looking up (and possibly creating) a player by name
#[derive(Debug, Clone, PartialEq)]
pub struct JoinOutcome {
    pub player: Option<Player>,
    pub created: bool,
}

/// Result of a connection selecting a player
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimOutcome {
    Claimed(Player),
    Released,
}

/// One songfest session: roster, play queue, round lock-ins and phase
#[derive(Debug, Clone)]
pub struct Songfest {
    phase: GamePhase,
    theme: String,
    songs_per_person: u32,
    host: Option<PlayerName>,
    registry: PlayerRegistry,
    catalogue: SongCatalogue,
    lock_ins: LockInTracker,
    policy: ScoringPolicy,
}

impl Songfest {
    pub fn new(policy: ScoringPolicy) -> Self {
        Self {
            phase: GamePhase::Lobby,
            theme: String::new(),
            songs_per_person: 0,
            host: None,
            registry: PlayerRegistry::new(),
            catalogue: SongCatalogue::new(),
            lock_ins: LockInTracker::new(),
            policy,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn songs_per_person(&self) -> u32 {
        self.songs_per_person
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.registry.iter()
    }

    pub fn player_count(&self) -> usize {
        self.registry.len()
    }

    pub(crate) fn catalogue(&self) -> &SongCatalogue {
        &self.catalogue
    }

    pub(crate) fn lock_ins(&self) -> &LockInTracker {
        &self.lock_ins
    }

    pub fn songfest_open(&self) -> bool {
        self.phase != GamePhase::Lobby
    }

    pub fn game_in_progress(&self) -> bool {
        matches!(
            self.phase,
            GamePhase::Rating | GamePhase::Guessing | GamePhase::Summary
        )
    }

    /// Open the songfest with the host's settings (Lobby -> Open)
    pub fn start_songfest(&mut self, settings: SongfestSettings) -> SongfestResult<()> {
        self.require_phase(GamePhase::Lobby, "start a songfest")?;

        let host = settings.host.trim();
        if host.is_empty() {
            return Err(SongfestError::InvalidSettings(
                "Host name cannot be empty".to_string(),
            ));
        }
        if settings.songs_per_person == 0 {
            return Err(SongfestError::InvalidSettings(
                "Each player must submit at least one song".to_string(),
            ));
        }
        if settings.songs_per_person > MAX_SONGS_PER_PERSON {
            return Err(SongfestError::InvalidSettings(format!(
                "At most {} songs per person are allowed",
                MAX_SONGS_PER_PERSON
            )));
        }

        self.theme = settings.theme;
        self.songs_per_person = settings.songs_per_person;
        self.registry.add_player(host, settings.songs_per_person);
        self.host = Some(host.to_string());
        self.phase = GamePhase::Open;

        tracing::info!(
            "Songfest opened by {} (theme: {:?}, {} songs per person)",
            host,
            self.theme,
            self.songs_per_person
        );
        Ok(())
    }

    /// Freeze the play queue and start rating the first song (Open -> Rating)
    pub fn start_game(&mut self) -> SongfestResult<()> {
        self.require_phase(GamePhase::Open, "start the game")?;

        for player in self.registry.iter().filter(|p| !p.has_submitted()) {
            tracing::warn!("Starting game before {} submitted their songs", player.name);
        }

        self.catalogue.freeze(self.registry.iter());
        self.lock_ins.reset();
        self.phase = if self.catalogue.is_empty() {
            GamePhase::Summary
        } else {
            GamePhase::Rating
        };

        tracing::info!(
            "Game started with {} players and {} songs",
            self.registry.len(),
            self.catalogue.len()
        );
        Ok(())
    }

    /// Look up a player by name, creating them while the songfest is open.
    /// Names are trimmed like the host's. An absent or blank name never
    /// creates anyone.
    pub fn join(&mut self, name: Option<&str>) -> SongfestResult<JoinOutcome> {
        let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
            return Ok(JoinOutcome {
                player: None,
                created: false,
            });
        };

        if let Some(existing) = self.registry.get_by_name(Some(name)) {
            return Ok(JoinOutcome {
                player: Some(existing.clone()),
                created: false,
            });
        }

        if self.phase != GamePhase::Open {
            return Err(SongfestError::NotAcceptingPlayers);
        }

        let (player, created) = self.registry.add_player(name, self.songs_per_person);
        Ok(JoinOutcome {
            player: Some(player.clone()),
            created,
        })
    }

    pub fn player_by_name(&self, name: Option<&str>) -> Option<&Player> {
        self.registry.get_by_name(name)
    }

    pub fn player_by_connection(&self, connection_id: &str) -> Option<&Player> {
        self.registry.get_by_connection(connection_id)
    }

    /// Bind a player to a connection, or unbind with None
    pub fn set_ownership(&mut self, name: &str, connection_id: Option<&str>) -> SongfestResult<()> {
        self.registry
            .set_ownership(name, connection_id)
            .map_err(|_| SongfestError::UnknownPlayer(name.to_string()))
    }

    /// A connection selects a player. Selecting the player it already holds
    /// releases it; otherwise any previous selection is dropped first.
    /// Returns None for unknown names.
    pub fn claim_player(&mut self, connection_id: &str, name: &str) -> Option<ClaimOutcome> {
        let player = self.registry.get_by_name(Some(name))?;

        if player.connection_id.as_deref() == Some(connection_id) {
            self.registry.set_ownership(name, None).ok()?;
            tracing::info!("Connection {} released {}", connection_id, name);
            return Some(ClaimOutcome::Released);
        }

        self.registry.set_ownership(name, Some(connection_id)).ok()?;
        tracing::info!("Connection {} claimed {}", connection_id, name);
        self.registry
            .get_by_name(Some(name))
            .map(|p| ClaimOutcome::Claimed(p.clone()))
    }

    /// Release the player bound to a dropped connection. Only done once a
    /// game is in progress; scores and lock-ins are kept.
    pub fn disconnect(&mut self, connection_id: &str) -> bool {
        if !self.game_in_progress() {
            return false;
        }

        let Some(name) = self
            .registry
            .get_by_connection(connection_id)
            .map(|p| p.name.clone())
        else {
            return false;
        };

        tracing::info!("{} disconnected", name);
        self.registry.set_ownership(&name, None).is_ok()
    }

    /// Store a player's clips. Allowed in any phase.
    pub fn submit_songs(&mut self, name: &str, clips: Vec<ClipSpec>) -> SongfestResult<()> {
        let player = self
            .registry
            .get_by_name_mut(name)
            .ok_or_else(|| SongfestError::UnknownPlayer(name.to_string()))?;

        catalogue::submit(player, clips)?;
        tracing::info!("{} submitted {} songs", name, player.songs.len());
        Ok(())
    }

    pub fn current_submitter(&self) -> Option<&str> {
        self.catalogue.current_submitter()
    }

    pub fn is_current_submitter(&self, name: &str) -> bool {
        self.current_submitter() == Some(name)
    }

    pub fn current_song(&self) -> Option<&Song> {
        let song_ref = self.catalogue.current()?;
        self.song(song_ref)
    }

    pub(crate) fn song(&self, song_ref: &SongRef) -> Option<&Song> {
        self.registry
            .get_by_name(Some(&song_ref.submitter))?
            .songs
            .get(song_ref.index)
    }

    /// Players who act this round: everyone except the current submitter
    pub fn eligible_count(&self) -> usize {
        match self.current_submitter() {
            Some(submitter) if self.registry.contains(submitter) => self.registry.len() - 1,
            _ => self.registry.len(),
        }
    }

    /// Rate the current song. Completing the round moves on to guessing.
    pub fn rate_song(&mut self, rater: Option<&str>, rating: &SongRating) -> LockInOutcome {
        if self.phase != GamePhase::Rating {
            tracing::debug!("Ignoring rating outside the rating round");
            return LockInOutcome::Ignored;
        }
        let Some(rater) = self.eligible_actor(rater) else {
            return LockInOutcome::Ignored;
        };
        let Some(current) = self.catalogue.current().cloned() else {
            return LockInOutcome::Ignored;
        };
        let Some(submitter) = self.registry.get_by_name_mut(&current.submitter) else {
            return LockInOutcome::Ignored;
        };

        let points = score::apply_rating(submitter, current.index, rating, &self.policy);
        self.lock_ins.lock_in(&rater);
        tracing::info!(
            "{} rated {}'s song ({} liked, {} theme): +{} points",
            rater,
            current.submitter,
            rating.liked.value(),
            rating.theme.value(),
            points
        );

        self.complete_round_if_done()
    }

    /// Guess who submitted the current song. Completing the round moves on.
    pub fn guess_song(&mut self, guesser: Option<&str>, guess: &Guess) -> LockInOutcome {
        if self.phase != GamePhase::Guessing {
            tracing::debug!("Ignoring guess outside the guessing round");
            return LockInOutcome::Ignored;
        }
        if !self.registry.contains(&guess.player_name) {
            tracing::warn!("Ignoring guess for unknown player {}", guess.player_name);
            return LockInOutcome::Ignored;
        }
        let Some(guesser) = self.eligible_actor(guesser) else {
            return LockInOutcome::Ignored;
        };
        let Some(current) = self.catalogue.current().cloned() else {
            return LockInOutcome::Ignored;
        };

        let Some(song) = self
            .registry
            .get_by_name_mut(&current.submitter)
            .and_then(|p| p.songs.get_mut(current.index))
        else {
            return LockInOutcome::Ignored;
        };
        score::record_guess(song, &guess.player_name);

        let points = match self.registry.get_by_name_mut(&guesser) {
            Some(player) => score::award_guess(player, guess, &current.submitter, &self.policy),
            None => 0,
        };
        self.lock_ins.lock_in(&guesser);
        tracing::info!(
            "{} guessed {} with {}s remaining: +{} points",
            guesser,
            guess.player_name,
            guess.time as f64 / 1000.0,
            points
        );

        self.complete_round_if_done()
    }

    /// Advance the round: rating -> guessing on the same song, guessing ->
    /// rating on the next song or the summary. No-op outside play.
    pub fn next_phase(&mut self) -> GamePhase {
        match self.phase {
            GamePhase::Rating => {
                self.phase = GamePhase::Guessing;
                self.lock_ins.reset();
            }
            GamePhase::Guessing => {
                self.lock_ins.reset();
                self.phase = match self.catalogue.advance() {
                    Some(_) => GamePhase::Rating,
                    None => GamePhase::Summary,
                };
            }
            phase => {
                tracing::debug!("next_phase ignored in {:?}", phase);
                return phase;
            }
        }

        tracing::info!(
            "Phase is now {:?} (song {:?} of {})",
            self.phase,
            self.catalogue.position(),
            self.catalogue.len()
        );
        self.phase
    }

    /// Wipe the session back to an empty lobby
    pub fn reset(&mut self) {
        tracing::info!("Resetting songfest");
        *self = Self::new(self.policy);
    }

    /// Name of a player who may act this round, if the given one may
    fn eligible_actor(&self, name: Option<&str>) -> Option<String> {
        let player = self.registry.get_by_name(name)?;
        if self.is_current_submitter(&player.name) {
            tracing::debug!("{} cannot act on their own song", player.name);
            return None;
        }
        if self.lock_ins.already_locked_in(&player.name) {
            tracing::debug!("{} is already locked in", player.name);
            return None;
        }
        Some(player.name.clone())
    }

    fn complete_round_if_done(&mut self) -> LockInOutcome {
        if self.lock_ins.is_round_complete(self.eligible_count()) {
            tracing::info!("Everyone has locked in for {:?}", self.phase);
            self.next_phase();
            LockInOutcome::RoundComplete
        } else {
            LockInOutcome::LockedIn
        }
    }

    pub(super) fn require_phase(&self, expected: GamePhase, action: &'static str) -> SongfestResult<()> {
        if self.phase != expected {
            tracing::warn!("Rejected attempt to {} in {:?}", action, self.phase);
            return Err(SongfestError::WrongPhase {
                action,
                phase: self.phase,
            });
        }
        Ok(())
    }
}

impl Default for Songfest {
    fn default() -> Self {
        Self::new(ScoringPolicy::default())
    }
}
