//! Game Module
//!
//! Bridge-building systems on top of the engine plumbing.

pub mod builder;
pub mod config;
pub mod mode;
pub mod placement;
pub mod simulation;
pub mod structure;
pub mod types;

pub use builder::{EditOutcome, EditSession, EditState, EntityPicker, MemberPreview, ProximityPicker, Tool};
pub use config::{ConfigError, GameConfig, LevelAnchorConfig};
pub use mode::{Mode, ModeController};
pub use placement::{Placement, ReferenceFrame, StructurePlacer};
pub use simulation::{AssetEvent, LoadingStage, SequenceState, SimEvent, SimulationEngine};
pub use structure::{AnchorKind, GraphError, GraphEvent, JointId, MaterialKind, MemberId, StructureGraph};
pub use types::{SurfaceMesh, SurfaceVertex};
