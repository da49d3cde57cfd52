//! Cubic navigation lattice and A* over it.
//!
//! Nodes are addressed by linear id `x + y*S + z*S*S`. [`NavGrid`] answers
//! "does a node exist here" and the 26-neighbour query; [`Pathfinder`] runs
//! A* on anything implementing [`NavGraph`].

mod astar;
mod grid;


pub use astar::{octile_distance, Pathfinder};
pub use grid::{lattice_capacity, NavGrid, NEIGHBOR_OFFSETS};

use bevy::math::Vec3;
use smallvec::SmallVec;

use crate::game::ecs::NodeId;

/// Graph view consumed by the pathfinder.
pub trait NavGraph {
    fn position(&self, node: NodeId) -> Option<Vec3>;
    fn neighbors(&self, node: NodeId) -> SmallVec<[NodeId; 26]>;
}
