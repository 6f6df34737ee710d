//! Grid map, navigation graph and path search
//!
//! `Map` is built once at level load and only read afterwards, so any number
//! of actors can query it during a tick.

mod generate;
mod graph;
mod grid;
mod search;

use std::path::Path;

use glam::Vec2;
use rand::Rng;

pub use generate::{DEFAULT_MAP_SIZE, DEFAULT_WALKS, generate_level};
pub use graph::{GraphNode, NavGraph, NodeId};
pub use grid::{BARRIER, CellIndex, Grid, OPEN, is_barrier_value};
pub use search::{PathResult, SearchMode, find_path, heuristic};

/// Level map shared by every AI-driven actor
#[derive(Debug, Clone)]
pub struct Map {
    grid: Grid,
    graph: NavGraph,
    mode: SearchMode,
}

impl Map {
    /// Build a map and its navigation graph from a grid
    #[must_use]
    pub fn new(grid: Grid) -> Self {
        let graph = NavGraph::build(&grid);
        Self {
            grid,
            graph,
            mode: SearchMode::default(),
        }
    }

    /// Load a map from a CSV grid file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is malformed
    pub fn load(path: impl AsRef<Path>, world_size: Vec2) -> Result<Self, MapError> {
        Grid::load_csv(path, world_size).map(Self::new)
    }

    /// Generate a random level
    ///
    /// # Errors
    ///
    /// Returns an error if `rows` or `cols` is zero
    pub fn generate<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        walks: usize,
        world_size: Vec2,
        rng: &mut R,
    ) -> Result<Self, MapError> {
        generate_level(rows, cols, walks, world_size, rng).map(Self::new)
    }

    /// Set the search strategy
    #[must_use]
    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the search strategy
    pub fn set_mode(&mut self, mode: SearchMode) {
        self.mode = mode;
    }

    #[must_use]
    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn graph(&self) -> &NavGraph {
        &self.graph
    }

    /// Check whether a rectangle centered on `pos` touches a barrier
    #[must_use]
    pub fn collides_with_barrier(&self, pos: Vec2, width: f32, height: f32) -> bool {
        self.grid.collides_with_barrier(pos, width, height)
    }

    /// Graph node nearest (in scan order) to a world position
    #[must_use]
    pub fn node_at(&self, pos: Vec2) -> Option<NodeId> {
        self.graph
            .resolve_node(self.grid.world_to_cell_clamped(pos))
    }

    /// Find a path between two world positions.
    ///
    /// Positions off the grid are clamped and positions on barriers resolve
    /// to the next open cell. An empty result means no route exists.
    #[must_use]
    pub fn find_path(&self, from: Vec2, to: Vec2) -> PathResult {
        let (Some(start), Some(goal)) = (self.node_at(from), self.node_at(to)) else {
            return PathResult::default();
        };
        find_path(&self.graph, self.mode, start, goal)
    }

    /// Center of a uniformly chosen open cell, `None` if there are none
    #[must_use]
    pub fn random_open_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Vec2> {
        if self.graph.is_empty() {
            return None;
        }
        let id = rng.gen_range(0..self.graph.len());
        Some(self.graph.nodes()[id].position)
    }
}

/// Errors that can occur while loading or building a map
#[derive(Debug, Clone, PartialEq)]
pub enum MapError {
    /// IO error
    Io(String),
    /// Malformed grid table
    Format {
        /// Zero-based row of the offending line
        row: usize,
        /// Zero-based column of the offending cell
        column: usize,
        /// What was wrong
        message: String,
    },
    /// Grid without rows or columns
    Empty,
    /// CSV reader or writer error
    Csv(String),
}

impl std::fmt::Display for MapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Format {
                row,
                column,
                message,
            } => write!(f, "Format error at row {row}, column {column}: {message}"),
            Self::Empty => write!(f, "Grid has no cells"),
            Self::Csv(e) => write!(f, "CSV error: {e}"),
        }
    }
}

impl std::error::Error for MapError {}
