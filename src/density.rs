//! Per-cell density accumulation and box-blur smoothing.

use trueno::Vector;

/// Weight of the center cell in one smoothing pass.
const CENTER_WEIGHT: f64 = 4.0;

/// Float grid of accumulated point weight, one value per canvas cell.
///
/// Cells accumulate in `f64`; only the peak search narrows to `f32` for the
/// SIMD reduction, so [`DensityGrid::max`] carries about seven significant
/// digits.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityGrid {
    width: usize,
    height: usize,
    cells: Vec<f64>,
}

impl DensityGrid {
    /// Create a zeroed grid. Each dimension is clamped to at least 1.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            cells: vec![0.0; width * height],
        }
    }

    /// Add `weight` to a cell; out-of-range cells are ignored.
    pub fn accumulate(&mut self, row: isize, col: isize, weight: f64) -> bool {
        let (Ok(row), Ok(col)) = (usize::try_from(row), usize::try_from(col)) else {
            return false;
        };
        if row >= self.height || col >= self.width {
            return false;
        }
        self.cells[row * self.width + col] += weight;
        true
    }

    /// Value of a cell (0 outside the grid).
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        if row < self.height && col < self.width {
            self.cells[row * self.width + col]
        } else {
            0.0
        }
    }

    /// Largest cell value, or 0 for an all-zero grid.
    #[must_use]
    pub fn max(&self) -> f64 {
        let narrowed: Vec<f32> = self.cells.iter().map(|&v| v as f32).collect();
        let max = Vector::from_vec(narrowed).max().unwrap_or(0.0);
        f64::from(max.max(0.0))
    }

    /// Apply `iterations` passes of a 3×3 box blur.
    ///
    /// Each pass replaces a cell by `(4·self + Σ neighbours) / (4 + k)` where
    /// `k` is the number of in-grid neighbours, so edges are not darkened.
    pub fn smooth(&mut self, iterations: usize) {
        for _ in 0..iterations {
            let mut next = vec![0.0f64; self.cells.len()];
            for row in 0..self.height {
                for col in 0..self.width {
                    let mut total = self.cells[row * self.width + col] * CENTER_WEIGHT;
                    let mut count = CENTER_WEIGHT;
                    for dr in -1isize..=1 {
                        for dc in -1isize..=1 {
                            if dr == 0 && dc == 0 {
                                continue;
                            }
                            let r = row as isize + dr;
                            let c = col as isize + dc;
                            if r >= 0 && c >= 0 && (r as usize) < self.height && (c as usize) < self.width {
                                total += self.cells[r as usize * self.width + c as usize];
                                count += 1.0;
                            }
                        }
                    }
                    next[row * self.width + col] = total / count;
                }
            }
            self.cells = next;
        }
    }

    /// Return a smoothed copy, leaving `self` untouched.
    #[must_use]
    pub fn smoothed(&self, iterations: usize) -> Self {
        let mut copy = self.clone();
        copy.smooth(iterations);
        copy
    }
}
