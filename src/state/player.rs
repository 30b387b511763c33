use crate::types::*;

/// Roster of players in join order, keyed by display name
#[derive(Debug, Clone, Default)]
pub struct PlayerRegistry {
    players: Vec<Player>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a player unless one with this name already exists.
    /// Returns the player and whether it was newly created.
    pub fn add_player(&mut self, name: &str, songs_per_person: u32) -> (&Player, bool) {
        let (idx, created) = match self.position(name) {
            Some(idx) => (idx, false),
            None => {
                tracing::info!("Adding player {}", name);
                self.players
                    .push(Player::new(name.to_string(), songs_per_person));
                (self.players.len() - 1, true)
            }
        };
        (&self.players[idx], created)
    }

    /// Look up a player by name. Absent or empty names never match.
    pub fn get_by_name(&self, name: Option<&str>) -> Option<&Player> {
        let name = name.filter(|n| !n.is_empty())?;
        self.players.iter().find(|p| p.name == name)
    }

    pub fn get_by_name_mut(&mut self, name: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.name == name)
    }

    /// Player currently bound to a connection
    pub fn get_by_connection(&self, connection_id: &str) -> Option<&Player> {
        self.players
            .iter()
            .find(|p| p.connection_id.as_deref() == Some(connection_id))
    }

    /// Bind or unbind a player.
    ///
    /// Binding first releases whichever player held the connection, so a
    /// connection never owns more than one player.
    pub fn set_ownership(
        &mut self,
        name: &str,
        connection_id: Option<&str>,
    ) -> Result<(), String> {
        let idx = self
            .position(name)
            .ok_or_else(|| format!("Player '{}' not found", name))?;

        if let Some(conn) = connection_id {
            for player in self.players.iter_mut() {
                if player.connection_id.as_deref() == Some(conn) {
                    player.connection_id = None;
                }
            }
        }

        self.players[idx].connection_id = connection_id.map(str::to_string);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Players in join order
    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    pub fn clear(&mut self) {
        self.players.clear();
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.players.iter().position(|p| p.name == name)
    }
}
