use bevy::math::Vec3;
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::NavGraph;
use crate::game::ecs::NodeId;

/// Octile distance in 3D on whole-unit deltas.
///
/// Axis deltas are truncated to integers, sorted into min/mid/max, and costed
/// as `17` per 3-axis step, `14` per 2-axis step and `10` per straight step.
pub fn octile_distance(a: Vec3, b: Vec3) -> i32 {
    let dx = (a.x - b.x) as i32;
    let dy = (a.y - b.y) as i32;
    let dz = (a.z - b.z) as i32;
    let (dx, dy, dz) = (dx.abs(), dy.abs(), dz.abs());

    let min = dx.min(dy).min(dz);
    let max = dx.max(dy).max(dz);
    let mid = dx + dy + dz - min - max;

    17 * min + 14 * (mid - min) + 10 * (max - mid)
}

#[derive(Clone, Copy, PartialEq, Eq)]
struct State {
    f: i32,
    h: i32,
    node: NodeId,
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.h.cmp(&self.h))
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Per-node search bookkeeping, keyed by node id.
#[derive(Clone, Copy, Debug)]
struct Scratch {
    g: i32,
    h: i32,
    parent: Option<NodeId>,
    open: bool,
    closed: bool,
}

/// Reusable A* search state. One instance lives in the simulation context.
#[derive(Default)]
pub struct Pathfinder {
    open: BinaryHeap<State>,
    scratch: FxHashMap<NodeId, Scratch>,
    last_expanded: usize,
}

impl Pathfinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes popped from the open set by the most recent search.
    pub fn last_expanded(&self) -> usize {
        self.last_expanded
    }

    /// Lowest-cost route from `start` to `goal`, excluding `start`.
    ///
    /// When the goal is unreachable the route to the last expanded node is
    /// returned instead, so callers must check where the path actually ends.
    /// `start == goal` and an unknown `start` both yield an empty path.
    pub fn find_path<G: NavGraph + ?Sized>(&mut self, graph: &G, start: NodeId, goal: NodeId) -> Vec<NodeId> {
        self.open.clear();
        self.scratch.clear();
        self.last_expanded = 0;

        let (Some(start_pos), goal_pos) = (graph.position(start), graph.position(goal)) else {
            return Vec::new();
        };
        let heuristic = |pos: Vec3| goal_pos.map_or(0, |goal_pos| octile_distance(pos, goal_pos));

        let start_h = heuristic(start_pos);
        self.scratch.insert(
            start,
            Scratch {
                g: 0,
                h: start_h,
                parent: None,
                open: true,
                closed: false,
            },
        );
        self.open.push(State {
            f: start_h,
            h: start_h,
            node: start,
        });

        let mut current = start;
        while let Some(State { node, .. }) = self.open.pop() {
            let Some(entry) = self.scratch.get_mut(&node) else {
                continue;
            };
            // Stale heap entry left behind by a cost improvement.
            if entry.closed {
                continue;
            }
            entry.open = false;
            entry.closed = true;
            let current_g = entry.g;
            current = node;
            self.last_expanded += 1;

            if node == goal {
                return self.retrace(start, goal);
            }

            let Some(current_pos) = graph.position(node) else {
                continue;
            };

            for neighbor in graph.neighbors(node) {
                let Some(neighbor_pos) = graph.position(neighbor) else {
                    continue;
                };
                let tentative = current_g + octile_distance(current_pos, neighbor_pos);

                let entry = self.scratch.entry(neighbor).or_insert(Scratch {
                    g: i32::MAX,
                    h: 0,
                    parent: None,
                    open: false,
                    closed: false,
                });
                if entry.closed {
                    continue;
                }
                if tentative < entry.g || !entry.open {
                    entry.g = tentative;
                    entry.h = heuristic(neighbor_pos);
                    entry.parent = Some(node);
                    entry.open = true;
                    self.open.push(State {
                        f: entry.g + entry.h,
                        h: entry.h,
                        node: neighbor,
                    });
                }
            }
        }

        self.retrace(start, current)
    }

    /// Walk parent links back from `end` to `start` and return them start-first,
    /// `start` excluded.
    fn retrace(&self, start: NodeId, end: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut current = end;
        while current != start {
            path.push(current);
            match self.scratch.get(&current).and_then(|s| s.parent) {
                Some(parent) => current = parent,
                None => break,
            }
        }
        path.reverse();
        path
    }
}
