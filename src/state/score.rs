//! Point curves and distribution bookkeeping for ratings and guesses.
//!
//! Everything here is a pure function of its inputs so identical games
//! always produce identical scores.

use crate::types::*;
use serde::{Deserialize, Serialize};

/// Tunable point curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    /// Points the submitter earns per rating step on each axis
    pub rating_points: u32,
    /// Flat award for a correct guess
    pub guess_base_points: u32,
    /// Extra points for a correct guess with the full window remaining
    pub guess_speed_points: u32,
    /// Length of the guessing window; remaining time is clamped to it
    pub guess_window_ms: u64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            rating_points: 10,
            guess_base_points: 500,
            guess_speed_points: 500,
            guess_window_ms: 30_000,
        }
    }
}

/// Points the submitter earns from one rating
pub fn rating_points(rating: &SongRating, policy: &ScoringPolicy) -> u32 {
    (rating.liked.value() + rating.theme.value()).saturating_mul(policy.rating_points)
}

/// Points a guess earns. Zero unless the guess names the submitter;
/// otherwise grows linearly with the time left.
pub fn guess_points(guess: &Guess, submitter: &str, policy: &ScoringPolicy) -> u32 {
    if guess.player_name != submitter {
        return 0;
    }

    let speed_bonus = if policy.guess_window_ms == 0 {
        policy.guess_speed_points
    } else {
        let remaining = guess.time.min(policy.guess_window_ms);
        // remaining <= window, so the quotient never exceeds guess_speed_points
        let bonus = u128::from(policy.guess_speed_points) * u128::from(remaining)
            / u128::from(policy.guess_window_ms);
        u32::try_from(bonus).unwrap_or(policy.guess_speed_points)
    };

    policy.guess_base_points.saturating_add(speed_bonus)
}

/// Record a rating on the song and credit its submitter. Returns the points awarded.
pub fn apply_rating(
    submitter: &mut Player,
    song_index: usize,
    rating: &SongRating,
    policy: &ScoringPolicy,
) -> u32 {
    let points = rating_points(rating, policy);
    if let Some(song) = submitter.songs.get_mut(song_index) {
        song.liked_score.record(rating.liked);
        song.theme_score.record(rating.theme);
    }
    submitter.points = submitter.points.saturating_add(points);
    points
}

/// Tally a guessed name on the song
pub fn record_guess(song: &mut Song, guessed: &str) {
    *song
        .guess_distribution
        .entry(guessed.to_string())
        .or_insert(0) += 1;
}

/// Credit a guesser. Returns the points awarded.
pub fn award_guess(
    guesser: &mut Player,
    guess: &Guess,
    submitter: &str,
    policy: &ScoringPolicy,
) -> u32 {
    let points = guess_points(guess, submitter, policy);
    if points > 0 {
        guesser.points = guesser.points.saturating_add(points);
        guesser.correct_guesses += 1;
    }
    points
}
