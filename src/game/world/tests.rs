use super::*;
use crate::game::ecs::{AiControllerComponent, ColliderComponent, ComponentKind, PathStateComponent};
use crate::game::external::{DrawList, SpherePhysics};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn world() -> World {
    let mut render = DrawList::new();
    let mut physics = SpherePhysics::default();
    World::new(ShipAssets::load(&mut render, &mut physics))
}

#[test]
fn test_ids_are_sequential_per_type() {
    let mut world = world();
    let a = world.create_enemy_ship(Vec3::ZERO, false).unwrap();
    let b = world.create_enemy_ship(Vec3::ZERO, false).unwrap();
    let p = world.create_player_ship(false).unwrap();

    assert_eq!(world.entity(a).unwrap().id, 0);
    assert_eq!(world.entity(b).unwrap().id, 1);
    assert_eq!(world.entity(p).unwrap().id, 0, "Player ships count separately");
}

#[test]
fn test_enemy_ship_has_expected_components() {
    let mut world = world();
    let key = world.create_enemy_ship(Vec3::new(1.0, 2.0, 3.0), false).unwrap();
    let entity = world.entity(key).unwrap();

    for kind in [
        ComponentKind::Transform,
        ComponentKind::Renderable,
        ComponentKind::Collider,
        ComponentKind::AiController,
        ComponentKind::Camera,
        ComponentKind::ParticleEmitter,
        ComponentKind::PathState,
        ComponentKind::Lifecycle,
    ] {
        assert!(entity.has_component(kind), "Enemy ship missing {:?}", kind);
    }
    assert!(!entity.has_component(ComponentKind::PlayerInput));
    assert_eq!(world.position(key), Some(Vec3::new(1.0, 2.0, 3.0)));
    assert_eq!(
        world.component::<ColliderComponent>(key).map(|c| c.end_points.len()),
        Some(17)
    );
}

#[test]
fn test_destroy_frees_every_component_chunk() {
    let mut world = world();
    let key = world.create_enemy_ship(Vec3::ZERO, false).unwrap();
    let id = world.entity(key).unwrap().id;
    assert!(world.stats().component_chunks() > 0);

    world.destroy_entity(id, EntityType::EnemyShip).unwrap();

    let stats = world.stats();
    assert_eq!(stats.enemy_ships, 0);
    assert_eq!(stats.entity_chunks, 0);
    assert_eq!(stats.component_chunks(), 0, "All component chunks released");
    assert!(!world.is_live(key));
    assert!(world.ships().is_empty());
    assert_eq!(world.queued_respawns(EntityType::EnemyShip), 0, "destroy_entity does not queue ids");
}

#[test]
fn test_respawn_reuses_destroyed_id_once() {
    let mut world = world();
    for _ in 0..5 {
        world.create_enemy_ship(Vec3::ZERO, false).unwrap();
    }

    world.destroy_ship(3, EntityType::EnemyShip).unwrap();
    assert_eq!(world.queued_respawns(EntityType::EnemyShip), 1);

    let reborn = world.create_enemy_ship(Vec3::ZERO, true).unwrap();
    assert_eq!(world.entity(reborn).unwrap().id, 3);

    let second = world.create_enemy_ship(Vec3::ZERO, true).unwrap();
    assert_ne!(world.entity(second).unwrap().id, 3, "Queue is empty, id 3 must not be reused again");
}

#[test]
fn test_respawn_queue_is_fifo_per_category() {
    let mut world = world();
    for _ in 0..4 {
        world.create_enemy_ship(Vec3::ZERO, false).unwrap();
    }
    world.create_player_ship(false).unwrap();

    world.destroy_ship(2, EntityType::EnemyShip).unwrap();
    world.destroy_ship(0, EntityType::EnemyShip).unwrap();
    world.destroy_ship(0, EntityType::SpaceShip).unwrap();

    let player = world.create_player_ship(true).unwrap();
    let first = world.create_enemy_ship(Vec3::ZERO, true).unwrap();
    let second = world.create_enemy_ship(Vec3::ZERO, true).unwrap();

    assert_eq!(world.entity(player).unwrap().id, 0);
    assert_eq!(world.entity(first).unwrap().id, 2);
    assert_eq!(world.entity(second).unwrap().id, 0);
}

#[test]
fn test_stale_key_does_not_resolve_after_slot_reuse() {
    let mut world = world();
    let old = world.create_enemy_ship(Vec3::ZERO, false).unwrap();
    let _keep = world.create_enemy_ship(Vec3::ZERO, false).unwrap();
    world.destroy_ship(0, EntityType::EnemyShip).unwrap();

    let new = world.create_enemy_ship(Vec3::ONE, true).unwrap();
    assert_eq!(new.slot, old.slot, "Freed entity slot is reused");
    assert!(world.entity(old).is_none(), "Old key must not resolve to the new occupant");
    assert!(world.component::<AiControllerComponent>(old).is_none());
}

#[test]
fn test_destroy_unknown_entity_is_error() {
    let mut world = world();
    assert_eq!(
        world.destroy_ship(9, EntityType::EnemyShip),
        Err(WorldError::EntityNotFound { id: 9, kind: EntityType::EnemyShip })
    );
}

#[test]
fn test_nav_grid_nodes_use_linear_ids() {
    let mut world = world();
    world.build_nav_grid(3, 20.0, Vec3::splat(-100.0)).unwrap();

    assert_eq!(world.grid().len(), 27);
    assert_eq!(world.nodes().len(), 27);

    let id = world.grid().id_of(2, 1, 0).unwrap();
    let key = world.node_entity(id).unwrap();
    assert_eq!(world.entity(key).unwrap().id, id);
    assert_eq!(world.position(key), Some(Vec3::new(-60.0, -80.0, -100.0)));
    assert_eq!(world.find(id, EntityType::Node), Some(key));
}

#[test]
fn test_oversized_grid_is_rejected() {
    let mut world = world();
    world.build_nav_grid(3, 1.0, Vec3::ZERO).unwrap();

    assert_eq!(
        world.build_nav_grid(1626, 1.0, Vec3::ZERO),
        Err(WorldError::GridTooLarge { side: 1626 })
    );
    assert_eq!(world.grid().side(), 3, "Rejected side leaves the current grid in place");
    assert_eq!(world.nodes().len(), 27);
}

#[test]
fn test_destroying_node_removes_it_from_grid() {
    let mut world = world();
    world.build_nav_grid(3, 1.0, Vec3::ZERO).unwrap();
    let centre = world.grid().id_of(1, 1, 1).unwrap();
    let corner = world.grid().id_of(0, 0, 0).unwrap();

    world.destroy_entity(centre, EntityType::Node).unwrap();

    assert!(!world.grid().contains(centre));
    assert!(world.node_entity(centre).is_none());
    assert!(!world.grid().neighbors(corner).contains(&centre));
}

#[test]
fn test_asteroid_randomization_within_spread() {
    let mut world = world();
    let mut physics = SpherePhysics::default();
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..20 {
        let key = world.create_asteroid(&mut physics, &mut rng, 50.0).unwrap();
        let t = world.component::<TransformComponent>(key).unwrap();
        assert!(t.position.abs().max_element() <= 50.0);
        assert!((10.0..100.0).contains(&t.rotation_speed));
        assert!((t.rotation_axis.length() - 1.0).abs() < 1e-5);
    }
    assert_eq!(physics.collider_count(), 20);
    assert_eq!(world.stats().asteroids, 20);
}

#[test]
fn test_nearest_ship_skips_self_and_respects_radius() {
    let mut world = world();
    let me = world.create_enemy_ship(Vec3::ZERO, false).unwrap();
    let near = world.create_enemy_ship(Vec3::new(10.0, 0.0, 0.0), false).unwrap();
    let _far = world.create_enemy_ship(Vec3::new(100.0, 0.0, 0.0), false).unwrap();

    assert_eq!(world.nearest_ship(Vec3::ZERO, me, None).map(|s| s.key), Some(near));
    assert!(world.nearest_ship(Vec3::ZERO, me, Some(5.0)).is_none());

    world.component_mut::<LifecycleComponent>(near).unwrap().is_respawning = true;
    let next = world.nearest_ship(Vec3::ZERO, me, None).unwrap();
    assert_eq!(next.position.x, 100.0, "Respawning ships are invisible to others");
}

#[test]
fn test_cleanup_releases_all_chunks() {
    let mut world = world();
    let mut physics = SpherePhysics::default();
    let mut rng = StdRng::seed_from_u64(1);
    world.build_nav_grid(4, 1.0, Vec3::ZERO).unwrap();
    world.create_player_ship(false).unwrap();
    for _ in 0..3 {
        world.create_enemy_ship(Vec3::ZERO, false).unwrap();
        world.create_asteroid(&mut physics, &mut rng, 10.0).unwrap();
    }

    world.cleanup();

    let stats = world.stats();
    assert_eq!(stats.entity_chunks, 0);
    assert_eq!(stats.component_chunks(), 0);
    assert!(world.entities().is_empty());
    assert!(world.grid().is_empty());
    assert!(world.component::<PathStateComponent>(EntityKey {
        slot: crate::game::memory::SlotHandle { chunk: 0, slot: 0 },
        serial: 0
    })
    .is_none());
}
