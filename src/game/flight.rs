//! Ship flight model shared by the player and AI pilots.
//!
//! Pilots produce a [`Stick`] (pitch/yaw/roll deflection) and a target speed;
//! [`fly`] turns that into orientation and velocity the same way for everyone.
//! Hull probes and the chase camera live here too since both pilot kinds use
//! them unchanged.

mod motion;
mod probes;

#[cfg(test)]
mod tests;

pub use motion::{
    cannon_origins, camera_view, ease_speed, fly, follow_camera, steer_away, steer_toward,
    update_emitters, FlightProfile, Stick, GUN_SPACING,
};
pub use probes::{asteroid_nearby, probe_hull};

use crate::game::ecs::{EntityId, EntityKey, EntityType};

/// Why a ship is being removed this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyCause {
    Asteroid,
    Projectile { shooter: EntityId },
    /// No navigation node could be found for a roaming ship.
    LostNavigation,
    /// The ship's pose became non-finite.
    InvalidPose,
}

/// A ship scheduled for destruction and respawn once the ship pass ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShipDestroyed {
    pub key: EntityKey,
    pub id: EntityId,
    pub kind: EntityType,
    pub cause: DestroyCause,
}
