//! Structure Module
//!
//! The 2D graph of joints and members a player authors in the editor.

pub mod graph;
pub mod ids;

pub use graph::{
    AnchorKind, GraphError, GraphEvent, GraphSnapshot, Joint, MaterialKind, Member, StructureGraph,
};
pub use ids::{IdGenerator, JointId, MemberId};
