//! Builder Module
//!
//! The 2D editor: tools, picking and the edit session state machine.

pub mod picking;
pub mod session;
pub mod tools;

pub use picking::{EntityPicker, PickKind, Picked, ProximityPicker, perpendicular_distance};
pub use session::{EditOutcome, EditSession};
pub use tools::{EditState, MemberPreview, Tool};
