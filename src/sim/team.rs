//! Team identity
//!
//! Teams are shared values looked up by id. Friend/foe checks compare ids,
//! never colors.

use serde::{Deserialize, Serialize};

/// Stable team number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TeamId(pub u32);

/// A team and its display color
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    /// RGBA, used for health bars, shield rings and the minimap dot
    pub color: [f32; 4],
}

/// Team registry owned by the world
#[derive(Debug, Clone, Default)]
pub struct Teams {
    teams: Vec<Team>,
    next_id: u32,
}

impl Teams {
    /// Register a team and return its id
    pub fn add(&mut self, name: &str, color: [f32; 4]) -> TeamId {
        let id = TeamId(self.next_id);
        self.next_id += 1;
        self.teams.push(Team {
            id,
            name: name.to_string(),
            color,
        });
        id
    }

    pub fn get(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    /// Display color, white for unknown teams
    pub fn color(&self, id: Option<TeamId>) -> [f32; 4] {
        id.and_then(|id| self.get(id))
            .map(|t| t.color)
            .unwrap_or([1.0, 1.0, 1.0, 1.0])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Team> {
        self.teams.iter()
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_color_different_team() {
        let mut teams = Teams::default();
        let red = [1.0, 0.0, 0.0, 1.0];
        let a = teams.add("Alpha", red);
        let b = teams.add("Bravo", red);
        assert_ne!(a, b);
        assert_eq!(teams.color(Some(a)), teams.color(Some(b)));
    }

    #[test]
    fn test_unknown_team_is_white() {
        let teams = Teams::default();
        assert_eq!(teams.color(Some(TeamId(9))), [1.0; 4]);
        assert_eq!(teams.color(None), [1.0; 4]);
    }
}
