//! Space-Time Cube Viewer
//!
//! Batch harness around `stc_core`: loads a recorded Pommerman match,
//! assembles a space-time cube scene for a step window, and either
//! exports it as JSON or streams it to the Rerun viewer (with the
//! `visualization` feature).
//!
//! The cube stacks one board per step along the vertical axis: agent
//! trajectories become tubes, bombs and flames become markers, and the
//! bomb-density heatmap sits at the base.

pub mod export;
pub mod scene;
pub mod visualizer;

pub use export::SceneExport;
pub use scene::{
    AgentTrack, BlockKind, BoardBlock, BombTrack, CubeScale, CubeScene, DeathMarker,
    FlameMarker, PickupMarker, SceneBuilder, SceneConfig, SceneError,
};
pub use visualizer::RerunScene;
