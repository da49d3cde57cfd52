use super::*;
use bevy::math::Vec3;

fn ship(store: &mut ComponentStore) -> Entity {
    let mut entity = Entity::new(3, EntityType::EnemyShip, 1);
    entity.add_component(store, TransformComponent::at(Vec3::new(1.0, 2.0, 3.0)));
    entity.add_component(store, AiControllerComponent::default());
    entity.add_component(store, PathStateComponent::default());
    entity
}

#[test]
fn test_get_component_returns_attached_instance() {
    let mut store = ComponentStore::new();
    let entity = ship(&mut store);

    let transform = entity.get_component::<TransformComponent>(&store).unwrap();
    assert_eq!(transform.position, Vec3::new(1.0, 2.0, 3.0));
    assert!(entity.get_component::<CameraComponent>(&store).is_none());
}

#[test]
fn test_component_records_owner_and_mask() {
    let mut store = ComponentStore::new();
    let entity = ship(&mut store);

    let slot = entity.handle_of(ComponentKind::AiController).unwrap();
    let stored = store.ai_controllers.get(slot).unwrap();
    assert_eq!(stored.owner, 3);
    assert_eq!(stored.mask, ComponentKind::AiController.bit());
}

#[test]
fn test_remove_component_frees_slot() {
    let mut store = ComponentStore::new();
    let mut entity = ship(&mut store);

    assert_eq!(entity.remove_component(&mut store, ComponentKind::Transform), Ok(true));
    assert!(entity.get_component::<TransformComponent>(&store).is_none());
    assert!(!entity.has_component(ComponentKind::Transform));
    assert_eq!(store.transforms.len(), 0);
    assert_eq!(store.transforms.chunk_count(), 0, "Last transform gone, chunk released");

    assert_eq!(
        entity.remove_component(&mut store, ComponentKind::Transform),
        Ok(false),
        "Removing an absent kind should report nothing removed"
    );
}

#[test]
fn test_has_component_checks_every_attached_kind() {
    let mut store = ComponentStore::new();
    let entity = ship(&mut store);

    // Transform is first in the list; the others must still be visible.
    assert!(entity.has_component(ComponentKind::Transform));
    assert!(entity.has_component(ComponentKind::AiController));
    assert!(entity.has_component(ComponentKind::PathState));
    assert!(!entity.has_component(ComponentKind::PlayerInput));
}

#[test]
fn test_get_component_mut_writes_through() {
    let mut store = ComponentStore::new();
    let entity = ship(&mut store);

    entity
        .get_component_mut::<PathStateComponent>(&mut store)
        .unwrap()
        .path
        .extend([4, 5, 6]);

    let path = entity.get_component::<PathStateComponent>(&store).unwrap();
    assert_eq!(path.remaining(), &[4, 5, 6]);
}

#[test]
fn test_release_all_empties_every_pool() {
    let mut store = ComponentStore::new();
    let mut entity = ship(&mut store);

    entity.release_all(&mut store).unwrap();

    assert!(entity.components().is_empty());
    for (kind, live, chunks) in store.pool_stats() {
        assert_eq!(live, 0, "{:?} pool should be empty", kind);
        assert_eq!(chunks, 0, "{:?} pool should hold no chunks", kind);
    }
}

#[test]
fn test_kind_bits_are_distinct() {
    let mut seen = 0u32;
    for kind in ComponentKind::ALL {
        assert_eq!(seen & kind.bit(), 0, "{:?} overlaps another kind", kind);
        seen |= kind.bit();
    }
    assert_eq!(ComponentKind::Transform.bit(), 1);
    assert_eq!(ComponentKind::AiController.bit(), 1 << 9);
}

#[test]
fn test_path_state_reset() {
    let mut path = PathStateComponent {
        closest_start_node: Some(7),
        closest_node_called: true,
        has_reached_start_node: true,
        path: vec![1, 2, 3],
        path_index: 2,
        arrival_timer: 0.03,
    };
    path.reset();
    assert_eq!(path, PathStateComponent::default());
}
