//! Path search over the navigation graph
//!
//! Every strategy searches from the goal back to the start, so following
//! parent links from the start node yields waypoints already in travel
//! order. Search scratch data lives only for the duration of one call.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use glam::Vec2;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::graph::{NavGraph, NodeId};

/// Search strategy used by `find_path`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SearchMode {
    /// Breadth-first search, shortest in edge count
    #[default]
    Bfs,
    /// Greedy best-first search on the Manhattan heuristic, not always shortest
    GreedyBestFirst,
    /// A* on accumulated distance plus the Manhattan heuristic
    AStar,
}

/// Result of pathfinding
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathResult {
    /// Waypoints in world coordinates, start cell first and goal cell last
    pub waypoints: Vec<Vec2>,
    /// Total path length
    pub length: f32,
}

impl PathResult {
    /// Check if no route was found
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Number of waypoints
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }
}

/// Child → parent links toward the search root
type ParentMap = FxHashMap<NodeId, NodeId>;

/// Find a path between two nodes.
///
/// An unreachable goal or an unknown node id yields an empty path.
#[must_use]
pub fn find_path(graph: &NavGraph, mode: SearchMode, start: NodeId, goal: NodeId) -> PathResult {
    if graph.node(start).is_none() || graph.node(goal).is_none() {
        return PathResult::default();
    }

    let parents = match mode {
        SearchMode::Bfs => bfs(graph, goal, start),
        SearchMode::GreedyBestFirst => greedy_best_first(graph, goal, start),
        SearchMode::AStar => astar(graph, goal, start),
    };

    match parents {
        Some(parents) => reconstruct(graph, &parents, start),
        None => {
            log::trace!("No path from node {start} to node {goal} ({mode:?})");
            PathResult::default()
        }
    }
}

/// Manhattan distance between node positions
#[must_use]
pub fn heuristic(graph: &NavGraph, a: NodeId, b: NodeId) -> f32 {
    let a = graph.nodes()[a].position;
    let b = graph.nodes()[b].position;
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

fn bfs(graph: &NavGraph, root: NodeId, target: NodeId) -> Option<ParentMap> {
    let mut parents = ParentMap::default();
    let mut queue = VecDeque::from([root]);

    while let Some(current) = queue.pop_front() {
        if current == target {
            return Some(parents);
        }

        for &next in &graph.nodes()[current].adjacent {
            if next != root && !parents.contains_key(&next) {
                parents.insert(next, current);
                queue.push_back(next);
            }
        }
    }

    None
}

/// Per-node data for one greedy best-first search
#[derive(Debug, Clone, Copy, Default)]
struct GreedyScratch {
    parent: Option<NodeId>,
    heuristic: f32,
    in_open_set: bool,
    in_closed_set: bool,
}

fn greedy_best_first(graph: &NavGraph, root: NodeId, target: NodeId) -> Option<ParentMap> {
    let mut scratch: FxHashMap<NodeId, GreedyScratch> = FxHashMap::default();
    let mut open_set = BinaryHeap::new();
    let mut current = root;

    loop {
        if current == target {
            break;
        }
        scratch.entry(current).or_default().in_closed_set = true;

        for &next in &graph.nodes()[current].adjacent {
            let data = scratch.entry(next).or_default();
            if data.in_closed_set || data.in_open_set {
                continue;
            }
            data.parent = Some(current);
            data.heuristic = heuristic(graph, next, target);
            data.in_open_set = true;
            open_set.push(OpenEntry {
                node: next,
                priority: data.heuristic,
            });
        }

        let entry = open_set.pop()?;
        current = entry.node;
        if let Some(data) = scratch.get_mut(&current) {
            data.in_open_set = false;
        }
    }

    Some(
        scratch
            .into_iter()
            .filter_map(|(node, data)| data.parent.map(|parent| (node, parent)))
            .collect(),
    )
}

/// Per-node data for one A* search
#[derive(Debug, Clone, Copy, Default)]
struct AStarScratch {
    parent: Option<NodeId>,
    heuristic: f32,
    actual_from_start: f32,
    in_open_set: bool,
    in_closed_set: bool,
}

fn astar(graph: &NavGraph, root: NodeId, target: NodeId) -> Option<ParentMap> {
    let mut scratch: FxHashMap<NodeId, AStarScratch> = FxHashMap::default();
    let mut open_set = BinaryHeap::new();

    let root_h = heuristic(graph, root, target);
    scratch.insert(
        root,
        AStarScratch {
            heuristic: root_h,
            in_open_set: true,
            ..Default::default()
        },
    );
    open_set.push(OpenEntry {
        node: root,
        priority: root_h,
    });

    let mut found = false;
    while let Some(OpenEntry { node: current, .. }) = open_set.pop() {
        let data = scratch.entry(current).or_default();
        if data.in_closed_set {
            continue;
        }
        data.in_closed_set = true;
        data.in_open_set = false;
        let current_g = data.actual_from_start;

        if current == target {
            found = true;
            break;
        }

        let current_pos = graph.nodes()[current].position;
        for &next in &graph.nodes()[current].adjacent {
            let tentative_g = current_g + current_pos.distance(graph.nodes()[next].position);
            let h = heuristic(graph, next, target);

            let data = scratch.entry(next).or_default();
            if data.in_closed_set {
                continue;
            }
            if !data.in_open_set || tentative_g < data.actual_from_start {
                data.parent = Some(current);
                data.actual_from_start = tentative_g;
                data.heuristic = h;
                data.in_open_set = true;
                open_set.push(OpenEntry {
                    node: next,
                    priority: data.actual_from_start + data.heuristic,
                });
            }
        }
    }

    found.then(|| {
        scratch
            .into_iter()
            .filter_map(|(node, data)| data.parent.map(|parent| (node, parent)))
            .collect()
    })
}

/// Follow parent links from `start` to the search root
fn reconstruct(graph: &NavGraph, parents: &ParentMap, start: NodeId) -> PathResult {
    let mut waypoints = vec![graph.nodes()[start].position];
    let mut current = start;

    while let Some(&parent) = parents.get(&current) {
        waypoints.push(graph.nodes()[parent].position);
        current = parent;
    }

    let length = calculate_path_length(&waypoints);
    PathResult { waypoints, length }
}

/// Calculate total path length
fn calculate_path_length(waypoints: &[Vec2]) -> f32 {
    waypoints.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Priority queue entry (lowest priority first)
#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    node: NodeId,
    priority: f32,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse for min-heap, ties broken on node id for stable results
        other
            .priority
            .partial_cmp(&self.priority)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
