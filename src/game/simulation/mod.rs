//! Simulation Module
//!
//! Drives a car (after an optional boat) across a placed structure.
//!
//! - [`engine`] - loading stages, sequence control and the per-tick update
//! - [`vehicle`] - ray-probed car physics
//! - [`boat`] - the scripted boat crossing
//! - [`loading`] - asset events and placeholder geometry
//! - [`events`] - simulation events and notifications

pub mod boat;
pub mod engine;
pub mod events;
pub mod loading;
pub mod vehicle;

pub use boat::Boat;
pub use engine::{SequenceState, SimulationEngine, TravelBounds};
pub use events::{Notification, NotificationQueue, SimEvent};
pub use loading::{AssetEvent, LoadingStage, placeholder_environment};
pub use vehicle::{ForwardOutcome, GroundContact, Vehicle, VehicleMotion};
