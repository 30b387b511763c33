use crate::error::{SongfestError, SongfestResult};
use crate::types::*;

/// Position of a song in the play queue: which player, which of their slots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongRef {
    pub submitter: PlayerName,
    pub index: usize,
}

/// Game-long play queue with a cursor on the song being played
#[derive(Debug, Clone, Default)]
pub struct SongCatalogue {
    queue: Vec<SongRef>,
    cursor: Option<usize>,
}

impl SongCatalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the queue from the roster: join order, then each player's slot order.
    /// Only submitted slots are queued. The cursor is placed on the first entry.
    pub fn freeze<'a>(&mut self, players: impl Iterator<Item = &'a Player>) {
        self.queue = players
            .flat_map(|p| {
                p.songs
                    .iter()
                    .enumerate()
                    .filter(|(_, song)| song.is_submitted())
                    .map(move |(index, _)| SongRef {
                        submitter: p.name.clone(),
                        index,
                    })
            })
            .collect();
        self.cursor = if self.queue.is_empty() { None } else { Some(0) };
        tracing::debug!("Play queue frozen with {} songs", self.queue.len());
    }

    /// Move to the next queued song. Returns None once the queue is exhausted.
    pub fn advance(&mut self) -> Option<&SongRef> {
        let next = self.cursor? + 1;
        if next < self.queue.len() {
            self.cursor = Some(next);
            self.queue.get(next)
        } else {
            self.cursor = None;
            None
        }
    }

    pub fn current(&self) -> Option<&SongRef> {
        self.cursor.and_then(|c| self.queue.get(c))
    }

    pub fn current_submitter(&self) -> Option<&str> {
        self.current().map(|r| r.submitter.as_str())
    }

    /// 1-based number of the current song
    pub fn position(&self) -> Option<usize> {
        self.cursor.map(|c| c + 1)
    }

    pub fn queue(&self) -> &[SongRef] {
        &self.queue
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.cursor = None;
    }
}

/// Fill a player's song slots from their clip specs.
///
/// Either every slot is populated or nothing changes.
pub fn submit(player: &mut Player, clips: Vec<ClipSpec>) -> SongfestResult<()> {
    if clips.len() != player.songs.len() {
        return Err(SongfestError::SubmissionCountMismatch {
            expected: player.songs.len(),
            actual: clips.len(),
        });
    }

    if player.songs.iter().any(Song::is_submitted) {
        return Err(SongfestError::AlreadySubmitted(player.name.clone()));
    }

    for (index, clip) in clips.iter().enumerate() {
        clip.validate()
            .map_err(|reason| SongfestError::InvalidClip { index, reason })?;
    }

    for (song, clip) in player.songs.iter_mut().zip(clips) {
        song.clip = Some(clip);
    }

    Ok(())
}
