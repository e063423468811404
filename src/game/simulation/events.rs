//! Simulation events and user-facing notifications.

use serde::Serialize;

/// Something that happened during a tick, in the order it happened.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum SimEvent {
    SequenceStarted,
    BoatArrived,
    VehicleStarted,
    /// Came to rest on a surface
    Landed,
    /// Hit a surface fast enough to bounce off it
    Bounced { impact_speed: f32 },
    TumbleStarted,
    /// A wall-like surface ahead stopped the run
    ObstacleStop,
    ReachedEnd,
    FellOutOfWorld,
    SequenceReset,
}

/// A transient message for the player.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Notification {
    pub message: String,
    /// Seconds until it disappears
    pub remaining: f32,
}

/// Auto-dismissing notifications, oldest first.
#[derive(Clone, Debug, Default)]
pub struct NotificationQueue {
    items: Vec<Notification>,
    lifetime: f32,
}

impl NotificationQueue {
    pub fn new(lifetime: f32) -> Self {
        Self {
            items: Vec::new(),
            lifetime,
        }
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.items.push(Notification {
            message: message.into(),
            remaining: self.lifetime,
        });
    }

    /// Ages every notification and drops the expired ones.
    pub fn tick(&mut self, dt: f32) {
        for item in &mut self.items {
            item.remaining -= dt;
        }
        self.items.retain(|n| n.remaining > 0.0);
    }

    pub fn active(&self) -> &[Notification] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
