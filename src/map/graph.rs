//! Walkability graph derived from a grid
//!
//! One node per open cell, edges to the four orthogonal open neighbours.
//! Nodes live in an arena and refer to each other by dense index.

use glam::Vec2;
use smallvec::SmallVec;

use super::grid::{CellIndex, Grid};

/// Dense node id, assigned in grid scan order skipping barriers
pub type NodeId = usize;

/// A single open cell in the navigation graph
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    /// Dense id of this node
    pub id: NodeId,
    /// Cell this node was built from
    pub cell: CellIndex,
    /// World-space center of the cell
    pub position: Vec2,
    /// Orthogonal open neighbours
    pub adjacent: SmallVec<[NodeId; 4]>,
}

/// Navigation graph plus the cell ↔ node index
#[derive(Debug, Clone, Default)]
pub struct NavGraph {
    nodes: Vec<GraphNode>,
    /// Node id for every open cell, `None` for barriers
    cell_to_node: Vec<Option<NodeId>>,
}

impl NavGraph {
    /// Build the graph from a grid.
    ///
    /// Neighbour tests are bounds-checked on both axes, so the first cell of
    /// a row is never linked to the last cell of the previous row.
    #[must_use]
    pub fn build(grid: &Grid) -> Self {
        let mut nodes = Vec::new();
        let mut cell_to_node = vec![None; grid.len()];

        for (cell, &value) in grid.cells().iter().enumerate() {
            if !super::grid::is_barrier_value(value) {
                let id = nodes.len();
                cell_to_node[cell] = Some(id);
                nodes.push(GraphNode {
                    id,
                    cell,
                    position: grid.cell_center(cell),
                    adjacent: SmallVec::new(),
                });
            }
        }

        let cols = grid.cols();
        let rows = grid.rows();
        for node in &mut nodes {
            let (col, row) = grid.coords(node.cell);
            let cell = node.cell;

            let neighbors = [
                (row > 0).then(|| cell - cols),
                (row + 1 < rows).then(|| cell + cols),
                (col > 0).then(|| cell - 1),
                (col + 1 < cols).then(|| cell + 1),
            ];

            node.adjacent = neighbors
                .into_iter()
                .flatten()
                .filter_map(|neighbor| cell_to_node[neighbor])
                .collect();
        }

        let graph = Self {
            nodes,
            cell_to_node,
        };
        log::debug!(
            "Built navigation graph: {} nodes, {} edges",
            graph.len(),
            graph.edge_count()
        );
        graph
    }

    /// All nodes, indexed by `NodeId`
    #[must_use]
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    /// Number of nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of undirected edges
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.adjacent.len()).sum::<usize>() / 2
    }

    /// Iterate over every directed edge `(from, to)`
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.nodes
            .iter()
            .flat_map(|node| node.adjacent.iter().map(move |&to| (node.id, to)))
    }

    /// Node built from exactly this cell
    #[must_use]
    pub fn node_for_cell(&self, cell: CellIndex) -> Option<NodeId> {
        self.cell_to_node.get(cell).copied().flatten()
    }

    /// Node for a cell, falling back to the next open cell in scan order.
    ///
    /// Probes `cell + 1, cell + 2, …` wrapping at the end of the grid. The
    /// result is not necessarily the closest open cell. Returns `None` only
    /// when the graph has no nodes.
    #[must_use]
    pub fn resolve_node(&self, cell: CellIndex) -> Option<NodeId> {
        let len = self.cell_to_node.len();
        if self.nodes.is_empty() || len == 0 {
            return None;
        }

        let cell = cell % len;
        (0..len).find_map(|offset| self.cell_to_node[(cell + offset) % len])
    }
}
