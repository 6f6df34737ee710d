//! Raster grid: cell storage, world/cell conversion and the barrier query

use std::fs;
use std::path::Path;

use glam::Vec2;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use super::MapError;
use crate::physics::Rect;

/// Sparse index into the raw grid (row-major)
pub type CellIndex = usize;

/// Cell value for walkable ground
pub const OPEN: u32 = 0;

/// Smallest cell value treated as a barrier
pub const BARRIER: u32 = 1;

/// Whether a raw cell value blocks movement
#[inline]
#[must_use]
pub fn is_barrier_value(value: u32) -> bool {
    value >= BARRIER
}

/// A row-major raster of cell codes covering a rectangular world area
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<u32>,
    /// World size of one cell
    cell_size: Vec2,
}

impl Grid {
    /// Create a grid from raw cells covering `world_size`
    ///
    /// # Errors
    ///
    /// Returns an error if the grid has no cells or `cells` does not hold
    /// exactly `rows * cols` values
    pub fn new(rows: usize, cols: usize, cells: Vec<u32>, world_size: Vec2) -> Result<Self, MapError> {
        if rows == 0 || cols == 0 {
            return Err(MapError::Empty);
        }
        if cells.len() != rows * cols {
            return Err(MapError::Format {
                row: rows,
                column: 0,
                message: format!("expected {} cells, found {}", rows * cols, cells.len()),
            });
        }

        Ok(Self {
            rows,
            cols,
            cells,
            cell_size: Vec2::new(world_size.x / cols as f32, world_size.y / rows as f32),
        })
    }

    /// Create a grid with every cell open
    ///
    /// # Errors
    ///
    /// Returns an error if `rows` or `cols` is zero
    pub fn open(rows: usize, cols: usize, world_size: Vec2) -> Result<Self, MapError> {
        Self::new(rows, cols, vec![OPEN; rows * cols], world_size)
    }

    /// Parse a comma-separated table of non-negative integers
    ///
    /// A single trailing comma per row is tolerated. Blank lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns `MapError::Format` if a cell is not a non-negative integer or
    /// rows have different lengths, and `MapError::Empty` for an empty table
    pub fn parse_csv(text: &str, world_size: Vec2) -> Result<Self, MapError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let mut cells = Vec::new();
        let mut cols = None;
        let mut rows = 0;

        for record in reader.records() {
            let record = record.map_err(|e| MapError::Csv(e.to_string()))?;
            if record.iter().all(str::is_empty) {
                continue;
            }

            let mut fields: Vec<&str> = record.iter().collect();
            if fields.len() > 1 && fields.last().is_some_and(|f| f.is_empty()) {
                fields.pop();
            }

            for (column, field) in fields.iter().enumerate() {
                let value = field.parse::<u32>().map_err(|_| MapError::Format {
                    row: rows,
                    column,
                    message: format!("`{field}` is not a non-negative integer"),
                })?;
                cells.push(value);
            }

            match cols {
                None => cols = Some(fields.len()),
                Some(expected) if expected != fields.len() => {
                    return Err(MapError::Format {
                        row: rows,
                        column: fields.len(),
                        message: format!("expected {expected} columns, found {}", fields.len()),
                    });
                }
                Some(_) => {}
            }

            rows += 1;
        }

        Self::new(rows, cols.unwrap_or(0), cells, world_size)
    }

    /// Load a grid from a CSV file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is malformed
    pub fn load_csv(path: impl AsRef<Path>, world_size: Vec2) -> Result<Self, MapError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| MapError::Io(e.to_string()))?;
        let grid = Self::parse_csv(&content, world_size)?;

        log::info!(
            "Loaded grid {} ({}x{}, cell {:.1}x{:.1})",
            path.display(),
            grid.rows,
            grid.cols,
            grid.cell_size.x,
            grid.cell_size.y
        );

        Ok(grid)
    }

    /// Render the grid back to the CSV table format
    ///
    /// # Errors
    ///
    /// Returns an error if the CSV writer fails
    pub fn to_csv_string(&self) -> Result<String, MapError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());

        for row in self.cells.chunks(self.cols) {
            writer
                .write_record(row.iter().map(u32::to_string))
                .map_err(|e| MapError::Csv(e.to_string()))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| MapError::Csv(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| MapError::Csv(e.to_string()))
    }

    /// Write the grid to a CSV file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_csv(&self, path: impl AsRef<Path>) -> Result<(), MapError> {
        let table = self.to_csv_string()?;
        fs::write(path, table).map_err(|e| MapError::Io(e.to_string()))
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// World size of a single cell
    #[must_use]
    pub fn cell_size(&self) -> Vec2 {
        self.cell_size
    }

    /// World-space rectangle covered by the whole grid
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::from_top_left(
            Vec2::ZERO,
            self.cell_size.x * self.cols as f32,
            self.cell_size.y * self.rows as f32,
        )
    }

    /// Raw cell values in row-major order
    #[must_use]
    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    /// Raw value of a cell
    #[must_use]
    pub fn cell(&self, index: CellIndex) -> Option<u32> {
        self.cells.get(index).copied()
    }

    /// Overwrite a cell value. Out-of-range indices are ignored.
    pub fn set_cell(&mut self, index: CellIndex, value: u32) {
        if let Some(cell) = self.cells.get_mut(index) {
            *cell = value;
        }
    }

    /// Whether a cell blocks movement. Cells outside the grid are solid.
    #[must_use]
    pub fn is_barrier(&self, index: CellIndex) -> bool {
        self.cell(index).is_none_or(is_barrier_value)
    }

    /// Column and row of a cell
    #[must_use]
    pub fn coords(&self, index: CellIndex) -> (usize, usize) {
        (index % self.cols, index / self.cols)
    }

    /// Cell index for a column and row, if inside the grid
    #[must_use]
    pub fn index(&self, col: usize, row: usize) -> Option<CellIndex> {
        (col < self.cols && row < self.rows).then(|| row * self.cols + col)
    }

    /// Cell containing a world position, or `None` outside the grid
    #[must_use]
    pub fn world_to_cell(&self, pos: Vec2) -> Option<CellIndex> {
        if !pos.is_finite() || pos.x < 0.0 || pos.y < 0.0 {
            return None;
        }

        let col = (pos.x / self.cell_size.x).floor() as usize;
        let row = (pos.y / self.cell_size.y).floor() as usize;
        self.index(col, row)
    }

    /// Cell containing a world position, clamped to the nearest valid cell
    #[must_use]
    pub fn world_to_cell_clamped(&self, pos: Vec2) -> CellIndex {
        let col = (pos.x / self.cell_size.x)
            .floor()
            .clamp(0.0, (self.cols - 1) as f32) as usize;
        let row = (pos.y / self.cell_size.y)
            .floor()
            .clamp(0.0, (self.rows - 1) as f32) as usize;
        row * self.cols + col
    }

    /// World position of a cell's top-left corner
    #[must_use]
    pub fn cell_top_left(&self, index: CellIndex) -> Vec2 {
        let (col, row) = self.coords(index);
        Vec2::new(col as f32, row as f32) * self.cell_size
    }

    /// World position of a cell's center
    #[must_use]
    pub fn cell_center(&self, index: CellIndex) -> Vec2 {
        self.cell_top_left(index) + self.cell_size * 0.5
    }

    /// Footprint of a cell in world space
    #[must_use]
    pub fn cell_rect(&self, index: CellIndex) -> Rect {
        Rect::from_top_left(self.cell_top_left(index), self.cell_size.x, self.cell_size.y)
    }

    /// The up to eight cells touching `index`, without wrapping across rows
    fn surrounding_cells(&self, index: CellIndex) -> SmallVec<[CellIndex; 8]> {
        let (col, row) = self.coords(index);
        let mut result = SmallVec::new();

        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let c = col as i64 + dx;
                let r = row as i64 + dy;
                if c < 0 || r < 0 {
                    continue;
                }
                if let Some(neighbor) = self.index(c as usize, r as usize) {
                    result.push(neighbor);
                }
            }
        }

        result
    }

    /// Check whether a rectangle centered on `pos` touches any barrier cell.
    ///
    /// Starts at the cell under `pos` and spreads to every neighbouring cell
    /// whose footprint overlaps the rectangle, so only cells the rectangle
    /// can touch are ever tested. Only cells inside the grid are tested:
    /// overhang past the edge is open.
    #[must_use]
    pub fn collides_with_barrier(&self, pos: Vec2, width: f32, height: f32) -> bool {
        let query = Rect::from_center(pos, width, height);
        let start = match self.world_to_cell(pos) {
            Some(cell) => cell,
            None => {
                // Off-grid center: the nearest cell is the only way in
                let nearest = self.world_to_cell_clamped(pos);
                if !query.overlaps(&self.cell_rect(nearest)) {
                    return false;
                }
                nearest
            }
        };

        let mut visited = FxHashSet::default();
        let mut to_check = vec![start];
        visited.insert(start);

        while let Some(index) = to_check.pop() {
            if self.is_barrier(index) {
                return true;
            }

            for neighbor in self.surrounding_cells(index) {
                if !visited.contains(&neighbor) && query.overlaps(&self.cell_rect(neighbor)) {
                    visited.insert(neighbor);
                    to_check.push(neighbor);
                }
            }
        }

        false
    }
}
