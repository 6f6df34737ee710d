//! Procedural level generation by random walks

use glam::Vec2;
use rand::Rng;

use super::MapError;
use super::grid::{BARRIER, Grid};

/// Default grid dimension (cells per side)
pub const DEFAULT_MAP_SIZE: usize = 15;

/// Default number of wall-building walks
pub const DEFAULT_WALKS: usize = 10;

/// Generate a level by carving barrier walls with random walks.
///
/// Each walk starts on a random cell and, while it stands on open ground,
/// turns the cell into a barrier and steps to a random orthogonal neighbour,
/// clamped to the grid. A walk stops as soon as it reaches a barrier.
///
/// # Errors
///
/// Returns an error if `rows` or `cols` is zero
pub fn generate_level<R: Rng + ?Sized>(
    rows: usize,
    cols: usize,
    walks: usize,
    world_size: Vec2,
    rng: &mut R,
) -> Result<Grid, MapError> {
    let mut grid = Grid::open(rows, cols, world_size)?;

    for _ in 0..walks {
        let mut col = rng.gen_range(0..cols);
        let mut row = rng.gen_range(0..rows);

        loop {
            let index = row * cols + col;
            if grid.is_barrier(index) {
                break;
            }
            grid.set_cell(index, BARRIER);

            match rng.gen_range(0..4) {
                0 => row = (row + 1).min(rows - 1),
                1 => row = row.saturating_sub(1),
                2 => col = col.saturating_sub(1),
                _ => col = (col + 1).min(cols - 1),
            }
        }
    }

    let barriers = grid.cells().iter().filter(|&&v| v >= BARRIER).count();
    log::debug!("Generated {rows}x{cols} level with {barriers} barrier cells");

    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    const WORLD: Vec2 = Vec2::new(800.0, 800.0);

    #[test]
    fn test_generate_dimensions() {
        let mut rng = SmallRng::seed_from_u64(7);
        let grid = generate_level(DEFAULT_MAP_SIZE, DEFAULT_MAP_SIZE, DEFAULT_WALKS, WORLD, &mut rng)
            .unwrap();

        assert_eq!(grid.rows(), 15);
        assert_eq!(grid.cols(), 15);
        assert_eq!(grid.len(), 225);
    }

    #[test]
    fn test_generate_places_walls() {
        let mut rng = SmallRng::seed_from_u64(3);
        let grid = generate_level(15, 15, 10, WORLD, &mut rng).unwrap();

        let barriers = grid.cells().iter().filter(|&&v| v >= BARRIER).count();
        assert!(barriers > 0);
        assert!(barriers < grid.len());
    }

    #[test]
    fn test_generate_without_walks_is_open() {
        let mut rng = SmallRng::seed_from_u64(3);
        let grid = generate_level(5, 8, 0, WORLD, &mut rng).unwrap();

        assert!(grid.cells().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_generate_is_reproducible() {
        let a = generate_level(15, 15, 10, WORLD, &mut SmallRng::seed_from_u64(42)).unwrap();
        let b = generate_level(15, 15, 10, WORLD, &mut SmallRng::seed_from_u64(42)).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn test_generate_rejects_empty() {
        let mut rng = SmallRng::seed_from_u64(1);

        assert!(matches!(
            generate_level(0, 5, 1, WORLD, &mut rng),
            Err(MapError::Empty)
        ));
    }
}
