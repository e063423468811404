//! Builder Tools
//!
//! Tool definitions and the edit state machine's states.

use glam::Vec2;

use crate::game::structure::{JointId, MaterialKind};

/// A toolbar tool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tool {
    /// Nothing selected; clicks are ignored
    None,
    PlaceJoint,
    /// Draw members of one material between two picked joints
    PlaceMember(MaterialKind),
    Delete,
}

impl Tool {
    /// Toolbar label.
    pub fn label(self) -> &'static str {
        match self {
            Tool::None => "None",
            Tool::PlaceJoint => "Add Joint",
            Tool::PlaceMember(MaterialKind::Deck) => "Add Deck",
            Tool::PlaceMember(MaterialKind::Column) => "Add Column",
            Tool::Delete => "Delete",
        }
    }
}

/// Where the edit session is in its tool workflow.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EditState {
    Idle,
    PlacingJoint,
    PlacingMemberAwaitingFirstJoint(MaterialKind),
    PlacingMemberAwaitingSecondJoint {
        material: MaterialKind,
        first: JointId,
    },
    Deleting,
}

impl EditState {
    /// The state a freshly selected tool starts in.
    pub fn for_tool(tool: Tool) -> Self {
        match tool {
            Tool::None => EditState::Idle,
            Tool::PlaceJoint => EditState::PlacingJoint,
            Tool::PlaceMember(material) => EditState::PlacingMemberAwaitingFirstJoint(material),
            Tool::Delete => EditState::Deleting,
        }
    }

    pub fn tool(self) -> Tool {
        match self {
            EditState::Idle => Tool::None,
            EditState::PlacingJoint => Tool::PlaceJoint,
            EditState::PlacingMemberAwaitingFirstJoint(material)
            | EditState::PlacingMemberAwaitingSecondJoint { material, .. } => {
                Tool::PlaceMember(material)
            }
            EditState::Deleting => Tool::Delete,
        }
    }
}

/// Rubber-band line from the first picked joint to the pointer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MemberPreview {
    pub material: MaterialKind,
    pub from: Vec2,
    pub to: Vec2,
}

