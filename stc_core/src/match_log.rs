//! Recorded match-log data model.
//!
//! A [`MatchLog`] is the immutable record of one Pommerman game: an ordered
//! sequence of per-step snapshots of the four agents, the board grid, and
//! every bomb, flame, and power-up item on it. It is loaded once from JSON
//! and only ever read afterwards; all queries over it live in the
//! [`query`](crate::query) module.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// Board cell holding nothing.
pub const CELL_EMPTY: u32 = 0;
/// Indestructible wall cell.
pub const CELL_RIGID: u32 = 1;
/// Destructible wooden crate cell.
pub const CELL_WOODEN: u32 = 2;

/// One board grid: `board[row][col]` cell-type codes, `board_size` squared.
pub type Board = Vec<Vec<u32>>;

/// Power-up kinds as encoded in item records and on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUp {
    /// Carry capacity +1 (code 6)
    ExtraBomb,
    /// Blast strength +1 (code 7)
    BlastRange,
    /// Enables kicking bombs (code 8)
    Kick,
}

impl PowerUp {
    /// Decodes an item-type code; codes outside 6..=8 are reserved.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            6 => Some(PowerUp::ExtraBomb),
            7 => Some(PowerUp::BlastRange),
            8 => Some(PowerUp::Kick),
            _ => None,
        }
    }

    /// The wire code for this power-up.
    pub fn code(self) -> u32 {
        match self {
            PowerUp::ExtraBomb => 6,
            PowerUp::BlastRange => 7,
            PowerUp::Kick => 8,
        }
    }
}

/// One agent's state at a single step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentState {
    pub agent_id: u32,
    pub is_alive: bool,
    /// Board coordinate `[x, z]`
    pub position: [u32; 2],
    pub ammo: u32,
    pub blast_strength: u32,
    pub can_kick: bool,
}

/// A bomb sighting at a single step. The same `bomb_id` reappears at every
/// step the bomb persists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BombState {
    pub position: [u32; 2],
    pub bomber_id: u32,
    /// Steps until detonation
    pub life: u32,
    pub blast_strength: u32,
    #[serde(rename = "bombId")]
    pub bomb_id: u32,
}

/// A flame sighting at a single step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlameState {
    pub position: [u32; 2],
    /// Steps until the flame disappears
    pub life: u32,
}

/// A power-up item lying on the board at a single step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemState {
    pub position: [u32; 2],
    /// Item-type code, see [`PowerUp::from_code`]
    #[serde(rename = "type")]
    pub kind: u32,
}

/// Complete snapshot of the game at one step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepState {
    /// Always exactly four entries, indexed by player id
    pub agents: Vec<AgentState>,
    pub board: Board,
    pub board_size: usize,
    pub step_count: u32,
    pub bombs: Vec<BombState>,
    pub flames: Vec<FlameState>,
    pub items: Vec<ItemState>,
}

/// Outcome record of the match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub id: u32,
    pub name: String,
}

/// An entire recorded match: outcome plus one [`StepState`] per step.
///
/// Step indices are 0-based and contiguous. Once an agent's `is_alive` goes
/// false it stays false for every later step; queries rely on that for
/// early termination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchLog {
    pub result: MatchResult,
    pub game_id: u32,
    pub state: Vec<StepState>,
}

impl MatchLog {
    /// Parses a match log from a JSON string and validates its shape.
    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        let log: MatchLog = serde_json::from_str(json)?;
        log.validate()?;
        Ok(log)
    }

    /// Parses a match log from any reader.
    pub fn from_reader(reader: impl Read) -> Result<Self, LoadError> {
        let log: MatchLog = serde_json::from_reader(reader)?;
        log.validate()?;
        Ok(log)
    }

    /// Loads a match log from a JSON file on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Number of recorded steps.
    pub fn len(&self) -> usize {
        self.state.len()
    }

    /// True when the log holds no steps. Loading rejects such logs, but a
    /// hand-built one can still be empty.
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Board edge length, taken from the first step.
    pub fn board_size(&self) -> usize {
        self.state[0].board_size
    }

    /// Identifier of the recorded game.
    pub fn game_id(&self) -> u32 {
        self.game_id
    }

    /// Rejects logs the query layer cannot index safely: an empty step
    /// sequence, or a step whose agent roster is not exactly four.
    fn validate(&self) -> Result<(), LoadError> {
        if self.state.is_empty() {
            return Err(LoadError::EmptyLog);
        }
        for (step, state) in self.state.iter().enumerate() {
            if state.agents.len() != 4 {
                return Err(LoadError::WrongAgentCount {
                    step,
                    count: state.agents.len(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_LOG: &str = r#"{
        "result": { "id": 1, "name": "Win" },
        "game_id": 7,
        "state": [
            {
                "agents": [
                    { "agent_id": 0, "is_alive": true, "position": [1, 1], "ammo": 1, "blast_strength": 2, "can_kick": false },
                    { "agent_id": 1, "is_alive": true, "position": [9, 1], "ammo": 1, "blast_strength": 2, "can_kick": false },
                    { "agent_id": 2, "is_alive": true, "position": [1, 9], "ammo": 1, "blast_strength": 2, "can_kick": false },
                    { "agent_id": 3, "is_alive": true, "position": [9, 9], "ammo": 1, "blast_strength": 2, "can_kick": false }
                ],
                "board": [[0, 1], [2, 0]],
                "board_size": 2,
                "step_count": 0,
                "bombs": [ { "position": [1, 1], "bomber_id": 0, "life": 9, "blast_strength": 2, "bombId": 5 } ],
                "flames": [ { "position": [3, 3], "life": 2 } ],
                "items": [ { "position": [4, 4], "type": 7 } ]
            }
        ]
    }"#;

    #[test]
    fn test_parse_minimal_log() {
        let log = MatchLog::from_json_str(MINIMAL_LOG).unwrap();

        assert_eq!(log.len(), 1);
        assert_eq!(log.game_id(), 7);
        assert_eq!(log.board_size(), 2);
        assert_eq!(log.result.name, "Win");

        let step = &log.state[0];
        assert_eq!(step.agents.len(), 4);
        assert_eq!(step.bombs[0].bomb_id, 5);
        assert_eq!(step.flames[0].life, 2);
        assert_eq!(step.items[0].kind, 7);
    }

    #[test]
    fn test_reject_empty_log() {
        let json = r#"{ "result": { "id": 0, "name": "Tie" }, "game_id": 1, "state": [] }"#;
        assert!(matches!(
            MatchLog::from_json_str(json),
            Err(LoadError::EmptyLog)
        ));
    }

    #[test]
    fn test_reject_short_roster() {
        let json = r#"{
            "result": { "id": 0, "name": "Tie" },
            "game_id": 1,
            "state": [{
                "agents": [
                    { "agent_id": 0, "is_alive": true, "position": [0, 0], "ammo": 1, "blast_strength": 2, "can_kick": false }
                ],
                "board": [[0]],
                "board_size": 1,
                "step_count": 0,
                "bombs": [],
                "flames": [],
                "items": []
            }]
        }"#;
        assert!(matches!(
            MatchLog::from_json_str(json),
            Err(LoadError::WrongAgentCount { step: 0, count: 1 })
        ));
    }

    #[test]
    fn test_power_up_codes() {
        assert_eq!(PowerUp::from_code(6), Some(PowerUp::ExtraBomb));
        assert_eq!(PowerUp::from_code(7), Some(PowerUp::BlastRange));
        assert_eq!(PowerUp::from_code(8), Some(PowerUp::Kick));
        assert_eq!(PowerUp::from_code(0), None);
        assert_eq!(PowerUp::Kick.code(), 8);
    }
}
