//! Asset Loading Stages
//!
//! Assets arrive from outside the core (a file loader, a network fetch, a
//! test). The engine advances through a fixed order of stages and every
//! failure falls back to a placeholder so loading never stalls:
//!
//! | Stage         | On failure                              |
//! |---------------|-----------------------------------------|
//! | `Environment` | two placeholder banks around the span   |
//! | `Vehicle`     | default box dimensions                  |
//! | `Boat`        | no boat, the car starts straight away   |

use glam::Vec3;
use serde::Serialize;

use crate::game::placement::ReferenceFrame;
use crate::physics::TriangleMesh;

/// Length of each placeholder bank along the travel axis.
pub const PLACEHOLDER_BANK_LENGTH: f32 = 3.0;
/// Half extent of the placeholder banks across the travel axis.
pub const PLACEHOLDER_BANK_HALF_WIDTH: f32 = 2.0;
/// Depth of the placeholder banks below their top.
pub const PLACEHOLDER_BANK_DEPTH: f32 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum LoadingStage {
    Environment,
    Vehicle,
    Boat,
    Ready,
}

/// Completion of one asynchronous asset load.
#[derive(Clone, Debug)]
pub enum AssetEvent {
    EnvironmentLoaded(TriangleMesh),
    EnvironmentFailed(String),
    /// Body dimensions of the loaded car model
    VehicleLoaded { size: Vec3 },
    VehicleFailed(String),
    BoatLoaded { size: Vec3 },
    BoatFailed(String),
}

impl AssetEvent {
    /// Stage this event completes.
    pub fn stage(&self) -> LoadingStage {
        match self {
            AssetEvent::EnvironmentLoaded(_) | AssetEvent::EnvironmentFailed(_) => LoadingStage::Environment,
            AssetEvent::VehicleLoaded { .. } | AssetEvent::VehicleFailed(_) => LoadingStage::Vehicle,
            AssetEvent::BoatLoaded { .. } | AssetEvent::BoatFailed(_) => LoadingStage::Boat,
        }
    }
}

/// Two flat banks meeting the structure ends, with nothing between them.
///
/// `span` is the (start, end) of the structure along Z. Bank tops sit at
/// y = 0, which is also the returned frame's anchor baseline.
pub fn placeholder_environment(span: (f32, f32)) -> (TriangleMesh, ReferenceFrame) {
    let (start, end) = (span.0.min(span.1), span.0.max(span.1));
    let w = PLACEHOLDER_BANK_HALF_WIDTH;
    let d = PLACEHOLDER_BANK_DEPTH;
    let left = TriangleMesh::cuboid(
        Vec3::new(-w, -d, start - PLACEHOLDER_BANK_LENGTH),
        Vec3::new(w, 0.0, start),
    );
    let right = TriangleMesh::cuboid(
        Vec3::new(-w, -d, end),
        Vec3::new(w, 0.0, end + PLACEHOLDER_BANK_LENGTH),
    );
    let triangles = left.triangles().iter().chain(right.triangles()).copied().collect();

    let frame = ReferenceFrame {
        center: Vec3::ZERO,
        deck_base_y: 0.0,
    };
    (TriangleMesh::new(triangles), frame)
}
