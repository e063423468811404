//! Placement Module
//!
//! One-shot projection of the edited graph into the simulation scene.

pub mod placer;

pub use placer::{
    MemberShape, PlacedJoint, PlacedMember, Placement, PlacementExtents, ReferenceFrame,
    StructurePlacer, Tube, colors,
};
