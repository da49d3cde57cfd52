use bevy::math::Vec3;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::NavGraph;
use crate::game::ecs::NodeId;

/// Every `(dx, dy, dz)` in `{-1, 0, 1}^3` except the origin, x fastest.
pub const NEIGHBOR_OFFSETS: [(i32, i32, i32); 26] = {
    let mut offsets = [(0, 0, 0); 26];
    let mut i = 0;
    let mut n = 0;
    while n < 27 {
        let dz = (n / 9) as i32 - 1;
        let dy = ((n / 3) % 3) as i32 - 1;
        let dx = (n % 3) as i32 - 1;
        if !(dx == 0 && dy == 0 && dz == 0) {
            offsets[i] = (dx, dy, dz);
            i += 1;
        }
        n += 1;
    }
    offsets
};

/// `side^3`, if it fits a [`NodeId`].
pub fn lattice_capacity(side: u32) -> Option<u32> {
    side.checked_pow(3)
}

/// Lattice of `side^3` potential node positions.
///
/// The id map is the only record of which nodes exist. Positions are fixed at
/// `origin + (x, y, z) * spacing`.
#[derive(Debug, Clone)]
pub struct NavGrid {
    side: u32,
    spacing: f32,
    origin: Vec3,
    nodes: FxHashMap<NodeId, Vec3>,
}

impl NavGrid {
    pub fn new(side: u32, spacing: f32, origin: Vec3) -> Self {
        Self {
            side,
            spacing,
            origin,
            nodes: FxHashMap::default(),
        }
    }

    /// A grid with every lattice position populated.
    pub fn filled(side: u32, spacing: f32, origin: Vec3) -> Self {
        let mut grid = Self::new(side, spacing, origin);
        for z in 0..side {
            for y in 0..side {
                for x in 0..side {
                    grid.insert_at(x, y, z);
                }
            }
        }
        grid
    }

    pub fn side(&self) -> u32 {
        self.side
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Number of lattice positions, populated or not. `None` when `side^3`
    /// does not fit a [`NodeId`].
    pub fn capacity(&self) -> Option<u32> {
        lattice_capacity(self.side)
    }

    pub fn id_of(&self, x: u32, y: u32, z: u32) -> Option<NodeId> {
        if x >= self.side || y >= self.side || z >= self.side {
            return None;
        }
        let layer = self.side.checked_mul(self.side)?;
        z.checked_mul(layer)?.checked_add(y * self.side + x)
    }

    pub fn coords_of(&self, id: NodeId) -> (u32, u32, u32) {
        let s = self.side.max(1);
        (id % s, (id / s) % s, id / (s * s))
    }

    pub fn lattice_position(&self, x: u32, y: u32, z: u32) -> Vec3 {
        self.origin + Vec3::new(x as f32, y as f32, z as f32) * self.spacing
    }

    /// Populate lattice point `(x, y, z)`. Out-of-range coordinates are ignored.
    pub fn insert_at(&mut self, x: u32, y: u32, z: u32) -> Option<NodeId> {
        let id = self.id_of(x, y, z)?;
        self.nodes.insert(id, self.lattice_position(x, y, z));
        Some(id)
    }

    pub fn insert(&mut self, id: NodeId) -> bool {
        if self.capacity().is_none_or(|capacity| id >= capacity) {
            return false;
        }
        let (x, y, z) = self.coords_of(id);
        self.nodes.insert(id, self.lattice_position(x, y, z));
        true
    }

    pub fn remove(&mut self, id: NodeId) -> Option<Vec3> {
        self.nodes.remove(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, Vec3)> + '_ {
        self.nodes.iter().map(|(id, pos)| (*id, *pos))
    }

    /// Node closest to `position` by squared distance. Ties go to the lower id.
    pub fn nearest(&self, position: Vec3) -> Option<NodeId> {
        self.nodes
            .iter()
            .map(|(id, pos)| (*id, pos.distance_squared(position)))
            .filter(|(_, d)| !d.is_nan())
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
            .map(|(id, _)| id)
    }

    fn exists_at(&self, x: i32, y: i32, z: i32) -> bool {
        if x < 0 || y < 0 || z < 0 {
            return false;
        }
        self.id_of(x as u32, y as u32, z as u32)
            .is_some_and(|id| self.contains(id))
    }

    /// Existing neighbours of `node` in fixed offset order.
    ///
    /// A diagonal neighbour is only returned when every single-axis step that
    /// makes it up also exists, so paths never cut a missing corner.
    pub fn neighbors(&self, node: NodeId) -> SmallVec<[NodeId; 26]> {
        let mut out = SmallVec::new();
        if self.capacity().is_none_or(|capacity| node >= capacity) {
            return out;
        }
        let (cx, cy, cz) = self.coords_of(node);
        let (cx, cy, cz) = (cx as i32, cy as i32, cz as i32);

        for (dx, dy, dz) in NEIGHBOR_OFFSETS {
            let (nx, ny, nz) = (cx + dx, cy + dy, cz + dz);
            if !self.exists_at(nx, ny, nz) {
                continue;
            }

            let axes = dx.abs() + dy.abs() + dz.abs();
            if axes > 1 {
                let blocked = (dx != 0 && !self.exists_at(cx + dx, cy, cz))
                    || (dy != 0 && !self.exists_at(cx, cy + dy, cz))
                    || (dz != 0 && !self.exists_at(cx, cy, cz + dz));
                if blocked {
                    continue;
                }
            }

            if let Some(id) = self.id_of(nx as u32, ny as u32, nz as u32) {
                out.push(id);
            }
        }
        out
    }
}

impl NavGraph for NavGrid {
    fn position(&self, node: NodeId) -> Option<Vec3> {
        self.nodes.get(&node).copied()
    }

    fn neighbors(&self, node: NodeId) -> SmallVec<[NodeId; 26]> {
        NavGrid::neighbors(self, node)
    }
}
