//! The grid sampler: walks every pixel of a frame, evaluates its
//! sample point, and collects the escape indices into an EscapeGrid.

use escape::{Bailout, ComplexSample};
use errors::RenderError;
use itertools::iproduct;
use num::Complex;
use planes::{FramePlane, Pixel};

/// A square table of escape indices, stored row-major with row 0 at the
/// top of the image.  Once built it is only ever read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EscapeGrid {
    size: usize,
    cells: Vec<usize>,
}

impl EscapeGrid {
    /// Pixels along either side.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The escape index at a row and column.
    pub fn get(&self, row: usize, column: usize) -> usize {
        self.cells[row * self.size + column]
    }

    /// Iterate over the rows, top first.
    pub fn rows(&self) -> impl Iterator<Item = &[usize]> {
        self.cells.chunks(self.size)
    }

    /// The raw cells, row-major.
    pub fn cells(&self) -> &[usize] {
        &self.cells
    }

    /// The largest escape index in the grid.
    pub fn max_value(&self) -> usize {
        self.cells.iter().cloned().max().unwrap_or(0)
    }
}

/// Evaluate every pixel of a plane.  The buffer is filled completely
/// before the grid is handed back.
pub fn sample_plane(plane: &FramePlane, max_iterations: usize, bailout: Bailout) -> EscapeGrid {
    let size = plane.n_pixels;
    let mut cells = vec![0 as usize; plane.len()];
    for (column, row) in iproduct!(0..size, 0..size) {
        let point = plane.pixel_to_point(&Pixel(column, row));
        cells[row * size + column] = bailout.evaluate(point, max_iterations);
    }
    EscapeGrid { size, cells }
}

/// Sample the square frame centered on (`x_center`, `y_center`) with
/// `n_pixels` samples per side, `resolution` apart, using the default
/// bailout.
pub fn sample_grid(
    x_center: f64,
    y_center: f64,
    resolution: f64,
    n_pixels: usize,
    max_iterations: usize,
) -> Result<EscapeGrid, RenderError> {
    let center: ComplexSample = Complex::new(x_center, y_center);
    let plane = FramePlane::new(center, resolution, n_pixels)?;
    Ok(sample_plane(&plane, max_iterations, Bailout::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use escape::escape_time;

    #[test]
    fn grid_is_square_regardless_of_step() {
        for &(res, n) in &[(0.1, 7), (0.3, 10), (1.0 / 3.0, 9), (0.0000001, 5), (0.01, 1)] {
            let grid = sample_grid(-0.74951145384, 0.04961979335, res, n, 20).unwrap();
            assert_eq!(grid.size(), n);
            assert_eq!(grid.cells().len(), n * n);
            assert_eq!(grid.rows().count(), n);
            assert!(grid.rows().all(|r| r.len() == n));
        }
    }

    #[test]
    fn zero_budget_yields_zeros() {
        let grid = sample_grid(-0.5, 0.0, 0.01, 4, 0).unwrap();
        assert!(grid.cells().iter().all(|&c| c == 0));
    }

    #[test]
    fn bad_geometry_fails_fast() {
        assert!(sample_grid(0.0, 0.0, 0.0, 4, 10).is_err());
        assert!(sample_grid(0.0, 0.0, -0.1, 4, 10).is_err());
        assert!(sample_grid(0.0, 0.0, 0.1, 0, 10).is_err());
        assert!(sample_grid(0.0, 0.0, 1e308, 4, 50).is_err());
    }

    #[test]
    fn top_row_holds_the_largest_imaginary_samples() {
        // Center 0, resolution 1, 4 pixels: columns sample re = -2..1,
        // rows sample im = 1 (top) down to -2 (bottom).
        let grid = sample_grid(0.0, 0.0, 1.0, 4, 30).unwrap();
        for column in 0..4 {
            let re = -2.0 + column as f64;
            assert_eq!(grid.get(0, column), escape_time(Complex::new(re, 1.0), 30));
            assert_eq!(grid.get(3, column), escape_time(Complex::new(re, -2.0), 30));
        }
    }

    #[test]
    fn small_scenario_is_deterministic_and_bounded() {
        let a = sample_grid(-0.5, 0.0, 0.01, 4, 10).unwrap();
        let b = sample_grid(-0.5, 0.0, 0.01, 4, 10).unwrap();
        assert_eq!(a, b);
        assert!(a.cells().iter().all(|&c| c <= 10));
        // Every sample here lies deep inside the main cardioid.
        assert!(a.cells().iter().all(|&c| c == 10));
        assert_eq!(a.max_value(), 10);
    }
}
