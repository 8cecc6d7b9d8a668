//! JSON export of assembled scenes.
//!
//! Writes a [`CubeScene`] plus run metadata as pretty JSON so external
//! renderers and notebooks can consume the cube without linking the
//! viewer.

use std::fs::File;
use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::scene::CubeScene;
use stc_core::MatchLog;

/// A scene together with where it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneExport {
    /// Path of the source log file
    pub source: String,

    pub game_id: u32,

    /// Total steps in the source log
    pub log_len: usize,

    pub scene: CubeScene,
}

impl SceneExport {
    pub fn new(source: &str, log: &MatchLog, scene: CubeScene) -> Self {
        Self {
            source: source.to_string(),
            game_id: log.game_id(),
            log_len: log.len(),
            scene,
        }
    }

    /// Writes the export as pretty JSON.
    pub fn write_to_file(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_round_trips_through_json() {
        use crate::scene::{SceneBuilder, SceneConfig};
        use stc_core::match_log::{AgentState, MatchResult, StepState};

        let agents = (0..4)
            .map(|id| AgentState {
                agent_id: id,
                is_alive: true,
                position: [id, id],
                ammo: 1,
                blast_strength: 2,
                can_kick: false,
            })
            .collect::<Vec<_>>();
        let step = StepState {
            agents,
            board: vec![vec![0; 11]; 11],
            board_size: 11,
            step_count: 0,
            bombs: Vec::new(),
            flames: Vec::new(),
            items: Vec::new(),
        };
        let log = MatchLog {
            result: MatchResult {
                id: 0,
                name: "Win".to_string(),
            },
            game_id: 42,
            state: vec![step.clone(), step],
        };

        let scene = SceneBuilder::new(&log, SceneConfig::new(0, 1))
            .build()
            .unwrap();
        let export = SceneExport::new("match.json", &log, scene);

        let json = serde_json::to_string(&export).unwrap();
        let back: SceneExport = serde_json::from_str(&json).unwrap();

        assert_eq!(back.game_id, 42);
        assert_eq!(back.log_len, 2);
        assert_eq!(back.scene.agents.len(), export.scene.agents.len());
    }
}
