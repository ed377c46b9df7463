//! Graph-driven level layout: takes a connectivity graph and a room template
//! catalog and produces a placed, door-connected, reachable tile level.

pub mod catalog;
pub mod graph;
pub mod level;
pub mod levelgen;
pub mod types;

pub use catalog::{ReplacementCatalog, RoomTemplate, TemplateCatalog};
pub use graph::{Graph, NodeId};
pub use level::Level;
pub use levelgen::{GenerationError, GeneratorConfig, LevelGenerator, generate_level};
pub use types::{CellKind, DesignLabel, Pos};
