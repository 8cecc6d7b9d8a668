//! STC Core - Space-Time Cube Replay Analysis for Pommerman
//!
//! This library is the pure data core behind the space-time cube viewer:
//! 1. **Match log**: serde model of a recorded game plus JSON loading
//! 2. **Query layer**: time-indexed projections (trajectories, bombs,
//!    flames, pickups, deaths, bomb density) with typed errors
//! 3. **Mesh generation**: trajectory tube sweeps and heatmap quad grids
//!    as flat vertex/index buffers for an external renderer

pub mod error;
pub mod grid_mesh;
pub mod match_log;
pub mod query;
pub mod tube_mesh;

// Re-export key types for convenience
pub use error::{GeometryError, LoadError, QueryError};
pub use grid_mesh::{build_heatmap, Color, GridMesh, HeatmapStyle};
pub use match_log::{
    AgentState, Board, BombState, FlameState, ItemState, MatchLog, MatchResult, PowerUp,
    StepState,
};
pub use query::{DeathEvent, PathPoint, PLAYER_COUNT};
pub use tube_mesh::{TubeMesh, TubeMeshBuilder};
