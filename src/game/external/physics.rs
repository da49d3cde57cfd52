use bevy::math::{Mat4, Vec3};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderMeshId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RaycastHit {
    pub hit: bool,
    pub point: Vec3,
    pub collider: Option<ColliderId>,
}

pub trait PhysicsBackend {
    fn load_collider_mesh(&mut self, path: &str) -> ColliderMeshId;
    fn create_collider(&mut self, mesh: ColliderMeshId, transform: Mat4) -> ColliderId;
    fn set_transform(&mut self, collider: ColliderId, transform: Mat4);
    /// Stop `collider` from answering raycasts. Other ids are unaffected.
    fn remove_collider(&mut self, collider: ColliderId);
    /// Closest hit along `direction` (normalized) within `max_length`.
    fn raycast(&self, origin: Vec3, direction: Vec3, max_length: f32) -> RaycastHit;
}

#[derive(Debug, Clone, Copy)]
struct SphereCollider {
    radius: f32,
    centre: Vec3,
}

/// Every collider mesh is approximated by a bounding sphere.
///
/// Mesh radii can be registered per path; unknown paths use the default.
#[derive(Debug)]
pub struct SpherePhysics {
    default_radius: f32,
    radius_by_path: FxHashMap<String, f32>,
    mesh_ids: FxHashMap<String, ColliderMeshId>,
    mesh_radii: Vec<f32>,
    /// Removed colliders leave a `None` so ids stay stable.
    colliders: Vec<Option<SphereCollider>>,
}

impl Default for SpherePhysics {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl SpherePhysics {
    pub fn new(default_radius: f32) -> Self {
        Self {
            default_radius,
            radius_by_path: FxHashMap::default(),
            mesh_ids: FxHashMap::default(),
            mesh_radii: Vec::new(),
            colliders: Vec::new(),
        }
    }

    pub fn with_mesh_radius(mut self, path: &str, radius: f32) -> Self {
        self.radius_by_path.insert(path.to_owned(), radius);
        self
    }

    /// Live colliders.
    pub fn collider_count(&self) -> usize {
        self.colliders.iter().flatten().count()
    }

    pub fn collider_centre(&self, collider: ColliderId) -> Option<Vec3> {
        self.colliders
            .get(collider.0 as usize)
            .and_then(Option::as_ref)
            .map(|c| c.centre)
    }
}

impl PhysicsBackend for SpherePhysics {
    fn load_collider_mesh(&mut self, path: &str) -> ColliderMeshId {
        if let Some(id) = self.mesh_ids.get(path) {
            return *id;
        }
        let id = ColliderMeshId(self.mesh_radii.len() as u32);
        let radius = self
            .radius_by_path
            .get(path)
            .copied()
            .unwrap_or(self.default_radius);
        self.mesh_radii.push(radius);
        self.mesh_ids.insert(path.to_owned(), id);
        id
    }

    fn create_collider(&mut self, mesh: ColliderMeshId, transform: Mat4) -> ColliderId {
        let radius = self
            .mesh_radii
            .get(mesh.0 as usize)
            .copied()
            .unwrap_or(self.default_radius);
        let id = ColliderId(self.colliders.len() as u32);
        self.colliders.push(Some(SphereCollider {
            radius,
            centre: transform.w_axis.truncate(),
        }));
        id
    }

    fn set_transform(&mut self, collider: ColliderId, transform: Mat4) {
        if let Some(Some(sphere)) = self.colliders.get_mut(collider.0 as usize) {
            sphere.centre = transform.w_axis.truncate();
        }
    }

    fn remove_collider(&mut self, collider: ColliderId) {
        if let Some(slot) = self.colliders.get_mut(collider.0 as usize) {
            *slot = None;
        }
    }

    fn raycast(&self, origin: Vec3, direction: Vec3, max_length: f32) -> RaycastHit {
        let mut best: Option<(f32, ColliderId)> = None;

        for (index, sphere) in self.colliders.iter().enumerate() {
            let Some(sphere) = sphere else {
                continue;
            };
            let Some(t) = ray_sphere(origin, direction, sphere.centre, sphere.radius) else {
                continue;
            };
            if t > max_length {
                continue;
            }
            if best.map_or(true, |(best_t, _)| t < best_t) {
                best = Some((t, ColliderId(index as u32)));
            }
        }

        match best {
            Some((t, collider)) => RaycastHit {
                hit: true,
                point: origin + direction * t,
                collider: Some(collider),
            },
            None => RaycastHit::default(),
        }
    }
}

/// Distance along the ray to the first intersection; 0 when starting inside.
fn ray_sphere(origin: Vec3, direction: Vec3, centre: Vec3, radius: f32) -> Option<f32> {
    let to_origin = origin - centre;
    let c = to_origin.length_squared() - radius * radius;
    if c <= 0.0 {
        return Some(0.0);
    }
    let b = to_origin.dot(direction);
    if b > 0.0 {
        return None;
    }
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    Some(-b - discriminant.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raycast_hits_sphere_in_front() {
        let mut physics = SpherePhysics::new(1.0);
        let mesh = physics.load_collider_mesh("rock.glb");
        let id = physics.create_collider(mesh, Mat4::from_translation(Vec3::new(0.0, 0.0, 5.0)));

        let hit = physics.raycast(Vec3::ZERO, Vec3::Z, 10.0);
        assert!(hit.hit);
        assert_eq!(hit.collider, Some(id));
        assert!((hit.point.z - 4.0).abs() < 1e-4);

        let short = physics.raycast(Vec3::ZERO, Vec3::Z, 3.0);
        assert!(!short.hit, "Sphere surface is beyond the ray length");

        let behind = physics.raycast(Vec3::ZERO, Vec3::NEG_Z, 10.0);
        assert!(!behind.hit);
    }

    #[test]
    fn test_set_transform_moves_collider() {
        let mut physics = SpherePhysics::default().with_mesh_radius("big.glb", 3.0);
        let mesh = physics.load_collider_mesh("big.glb");
        assert_eq!(physics.load_collider_mesh("big.glb"), mesh, "Meshes are cached by path");

        let id = physics.create_collider(mesh, Mat4::IDENTITY);
        physics.set_transform(id, Mat4::from_translation(Vec3::new(20.0, 0.0, 0.0)));

        assert!(physics.raycast(Vec3::new(15.0, 0.0, 0.0), Vec3::X, 2.5).hit);
        assert!(!physics.raycast(Vec3::ZERO, Vec3::Y, 100.0).hit);
    }

    #[test]
    fn test_removed_collider_no_longer_hits() {
        let mut physics = SpherePhysics::new(2.0);
        let mesh = physics.load_collider_mesh("rock.glb");
        let gone = physics.create_collider(mesh, Mat4::IDENTITY);
        let kept = physics.create_collider(mesh, Mat4::from_translation(Vec3::new(0.0, 0.0, 10.0)));

        physics.remove_collider(gone);
        physics.remove_collider(gone);

        assert_eq!(physics.collider_count(), 1);
        assert_eq!(physics.collider_centre(gone), None);
        let hit = physics.raycast(Vec3::ZERO, Vec3::Z, 20.0);
        assert_eq!(hit.collider, Some(kept), "Origin inside the removed sphere must not hit it");

        physics.set_transform(gone, Mat4::IDENTITY);
        assert_eq!(physics.collider_count(), 1, "Moving a removed collider does not revive it");
        let third = physics.create_collider(mesh, Mat4::IDENTITY);
        assert_ne!(third, gone, "Ids are never reused");
    }
}
