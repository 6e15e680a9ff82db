//! Chart renderers.
//!
//! Each renderer is a pure function from column arrays and an options
//! struct to a string of glyphs and ANSI escapes. Degenerate input yields a
//! placeholder string rather than an error.

mod map;
mod matrix;
mod pie;
mod waffle;

pub use map::{render_map, MapMode, MapOptions, DEFAULT_MAP_HEIGHT, DEFAULT_MAP_WIDTH};
pub use matrix::{render_matrix, AxisKey, MatrixOptions, PivotTable};
pub use pie::{pie_sectors, render_pie, PieOptions, Sector};
pub use waffle::{allocate_cells, render_gauge, render_waffle, GaugeOptions, WaffleOptions};

/// Placeholder returned when a renderer receives no usable rows.
pub const NO_DATA: &str = "No data to display";

/// Placeholder returned when every proportional value is zero.
pub const NO_NONZERO_DATA: &str = "No data to display (all values are zero)";

/// Label for legend entry `i`, falling back to `Item N` (1-based).
pub(crate) fn label_for(labels: &[String], i: usize) -> String {
    labels.get(i).cloned().unwrap_or_else(|| format!("Item {}", i + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_for_fallback() {
        let labels = vec!["a".to_string()];
        assert_eq!(label_for(&labels, 0), "a");
        assert_eq!(label_for(&labels, 2), "Item 3");
    }
}
