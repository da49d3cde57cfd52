use bevy::math::Vec3;
use spacegame::game::ecs::{EntityType, NodeId, TransformComponent};
use spacegame::game::external::{DrawList, SpherePhysics};
use spacegame::game::navigation::{octile_distance, NavGraph, Pathfinder};
use spacegame::game::world::{ShipAssets, World};

fn world_with_grid(side: u32) -> World {
    let mut render = DrawList::new();
    let mut physics = SpherePhysics::default();
    let mut world = World::new(ShipAssets::load(&mut render, &mut physics));
    world.build_nav_grid(side, 1.0, Vec3::ZERO).unwrap();
    world
}

fn route_cost(world: &World, start: NodeId, path: &[NodeId]) -> i32 {
    let grid = world.grid();
    let mut prev = grid.position(start).unwrap();
    let mut cost = 0;
    for node in path {
        let pos = grid.position(*node).unwrap();
        cost += octile_distance(prev, pos);
        prev = pos;
    }
    cost
}

#[test]
fn test_route_over_world_built_grid() {
    let world = world_with_grid(5);
    let grid = world.grid();
    let start = grid.id_of(0, 0, 0).unwrap();
    let goal = grid.id_of(4, 2, 1).unwrap();

    let path = Pathfinder::new().find_path(grid, start, goal);

    assert_eq!(path.last(), Some(&goal));
    // 1 three-axis step, 1 two-axis step, 2 straight steps.
    assert_eq!(route_cost(&world, start, &path), 17 + 14 + 10 + 10);

    // Every waypoint is backed by a live node entity at the same position.
    for node in &path {
        let key = world.node_entity(*node).expect("node entity exists");
        let transform = world.component::<TransformComponent>(key).unwrap();
        assert_eq!(Some(transform.position), grid.position(*node));
    }
}

#[test]
fn test_destroyed_node_entities_reshape_routes() {
    let mut world = world_with_grid(3);
    let start = world.grid().id_of(0, 0, 0).unwrap();
    let goal = world.grid().id_of(1, 1, 0).unwrap();

    let direct = Pathfinder::new().find_path(world.grid(), start, goal);
    assert_eq!(direct, vec![goal], "Open corner allows the diagonal step");

    // Removing one single-axis step of the diagonal forbids cutting the corner.
    let corner = world.grid().id_of(1, 0, 0).unwrap();
    world.destroy_entity(corner, EntityType::Node).unwrap();
    assert!(!world.grid().contains(corner));
    assert!(!world.grid().neighbors(start).contains(&goal));

    let detour = Pathfinder::new().find_path(world.grid(), start, goal);
    assert_eq!(detour.last(), Some(&goal));
    assert!(!detour.contains(&corner));
    assert_eq!(route_cost(&world, start, &detour), 20, "Two straight steps around the missing corner");

    // Recreating the node restores the diagonal.
    world.create_path_node(1, 0, 0).unwrap();
    assert!(world.grid().neighbors(start).contains(&goal));
}

#[test]
fn test_unreachable_goal_is_best_effort() {
    let mut world = world_with_grid(3);
    let goal = world.grid().id_of(2, 2, 2).unwrap();
    let around: Vec<NodeId> = world.grid().neighbors(goal).into_iter().collect();
    for node in around {
        world.destroy_entity(node, EntityType::Node).unwrap();
    }

    let start = world.grid().id_of(0, 0, 0).unwrap();
    let path = Pathfinder::new().find_path(world.grid(), start, goal);

    assert!(!path.contains(&goal));
    assert!(path.iter().all(|n| world.grid().contains(*n)), "Partial path only visits live nodes");
}
