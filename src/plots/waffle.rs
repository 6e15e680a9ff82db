//! Waffle charts and progress gauges.
//!
//! A waffle spends a fixed budget of cells (100 by default, so one cell is
//! one percent) across categories and lays them out row-major.

use crate::canvas::{Canvas, Decorations};
use crate::color::Rgb;
use crate::output::{format_human, format_thousands, paint};
use crate::palette::{category_colors, ColorScheme, DISTINCT};

use super::{label_for, NO_DATA, NO_NONZERO_DATA};

/// Split `total_cells` proportionally across `values`.
///
/// Every value but the last gets `round(value / total · total_cells)`
/// (capped at what is left); the last absorbs the remainder, so the counts
/// always sum to `total_cells`. Returns all zeros when the total is zero.
#[must_use]
pub fn allocate_cells(values: &[f64], total_cells: usize) -> Vec<usize> {
    let clean: Vec<f64> = values
        .iter()
        .map(|&v| if v.is_finite() { v.max(0.0) } else { 0.0 })
        .collect();
    let total: f64 = clean.iter().sum();
    if clean.is_empty() || total <= 0.0 {
        return vec![0; clean.len()];
    }

    let mut remaining = total_cells;
    let last = clean.len() - 1;
    clean
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let cells = if i == last {
                remaining
            } else {
                ((v / total * total_cells as f64).round() as usize).min(remaining)
            };
            remaining -= cells;
            cells
        })
        .collect()
}

/// Options for [`render_waffle`].
#[derive(Debug, Clone, PartialEq)]
pub struct WaffleOptions {
    /// Title above the grid.
    pub title: Option<String>,
    /// Cell budget.
    pub total_cells: usize,
    /// Cells per grid row.
    pub cells_per_row: usize,
    /// Glyph for allocated cells.
    pub cell_char: char,
    /// Glyph for unallocated cells.
    pub empty_char: char,
    /// Append the legend.
    pub show_legend: bool,
    /// Show percentages in the legend.
    pub show_percentages: bool,
    /// Category palette.
    pub color_scheme: ColorScheme,
    /// Explicit colors, used when they cover every value.
    pub custom_colors: Option<Vec<Rgb>>,
}

impl Default for WaffleOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl WaffleOptions {
    /// Defaults: 100 cells, 10 per row, `■`/`□`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: None,
            total_cells: 100,
            cells_per_row: 10,
            cell_char: '■',
            empty_char: '□',
            show_legend: true,
            show_percentages: true,
            color_scheme: ColorScheme::Distinct,
            custom_colors: None,
        }
    }

    /// Set the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the cell budget and row length.
    #[must_use]
    pub fn grid(mut self, total_cells: usize, cells_per_row: usize) -> Self {
        self.total_cells = total_cells;
        self.cells_per_row = cells_per_row;
        self
    }

    /// Set the color scheme.
    #[must_use]
    pub fn color_scheme(mut self, scheme: ColorScheme) -> Self {
        self.color_scheme = scheme;
        self
    }

    /// Enable or disable the legend.
    #[must_use]
    pub fn show_legend(mut self, show: bool) -> Self {
        self.show_legend = show;
        self
    }
}

impl batuta_common::display::WithDimensions for WaffleOptions {
    /// Rows of `width` cells (each two columns wide), `height` rows deep.
    fn set_dimensions(&mut self, width: u32, height: u32) {
        self.cells_per_row = ((width as usize + 1) / 2).max(1);
        self.total_cells = self.cells_per_row * (height as usize).max(1);
    }
}

/// Render a waffle chart.
#[must_use]
pub fn render_waffle(values: &[f64], labels: &[String], options: &WaffleOptions) -> String {
    if values.is_empty() {
        return NO_DATA.to_string();
    }
    let total: f64 = values.iter().filter(|v| v.is_finite()).map(|v| v.max(0.0)).sum();
    if total <= 0.0 {
        return NO_NONZERO_DATA.to_string();
    }

    let per_row = options.cells_per_row.max(1);
    let counts = allocate_cells(values, options.total_cells);
    let colors = category_colors(values.len(), options.color_scheme, options.custom_colors.as_deref());

    let rows = options.total_cells.div_ceil(per_row).max(1);
    let mut canvas = Canvas::new(per_row * 2 - 1, rows);
    let mut cell = 0usize;
    for (category, &count) in counts.iter().enumerate() {
        for _ in 0..count {
            put_cell(&mut canvas, cell, per_row, options.cell_char, colors[category]);
            cell += 1;
        }
    }
    for idx in cell..options.total_cells {
        put_cell(&mut canvas, idx, per_row, options.empty_char, Rgb::DIM_GRAY);
    }

    let mut legend = Vec::new();
    if options.show_legend && !labels.is_empty() {
        legend.push("─".repeat(per_row * 2 - 1));
        for (i, (&value, &count)) in values.iter().zip(&counts).enumerate() {
            if count == 0 {
                continue;
            }
            let mut line = paint(&options.cell_char.to_string(), colors[i]);
            line.push(' ');
            line.push_str(&label_for(labels, i));
            if options.show_percentages {
                line.push_str(&format!(" ({:.1}%)", value.max(0.0) / total * 100.0));
            }
            line.push_str(&format!(" = {}", format_human(value.max(0.0))));
            legend.push(line);
        }
    } else {
        legend.push(format!("Total: {}", format_thousands(total, 0)));
    }

    canvas.serialize(
        &Decorations::new()
            .title(options.title.as_deref())
            .title_gap(true)
            .legend(legend),
    )
}

fn put_cell(canvas: &mut Canvas, idx: usize, per_row: usize, glyph: char, color: Rgb) {
    let row = (idx / per_row) as isize;
    let col = (idx % per_row * 2) as isize;
    canvas.set_solid(row, col, glyph, Some(color));
}

/// Options for [`render_gauge`].
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeOptions {
    /// Title above the gauge.
    pub title: Option<String>,
    /// Cells per row.
    pub width: usize,
    /// Rows.
    pub height: usize,
    /// Glyph for filled cells.
    pub filled_char: char,
    /// Glyph for empty cells.
    pub empty_char: char,
    /// Fill color at or above `warning_threshold`.
    pub color_good: Rgb,
    /// Fill color between the thresholds.
    pub color_warning: Rgb,
    /// Fill color below `danger_threshold`.
    pub color_danger: Rgb,
    /// Lowest ratio still considered good.
    pub warning_threshold: f64,
    /// Lowest ratio still considered a warning.
    pub danger_threshold: f64,
}

impl Default for GaugeOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl GaugeOptions {
    /// Defaults: 20×5 cells, thresholds 0.7 and 0.3.
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: None,
            width: 20,
            height: 5,
            filled_char: '█',
            empty_char: '░',
            color_good: DISTINCT[6],
            color_warning: DISTINCT[5],
            color_danger: DISTINCT[3],
            warning_threshold: 0.7,
            danger_threshold: 0.3,
        }
    }

    /// Set the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the thresholds.
    #[must_use]
    pub fn thresholds(mut self, warning: f64, danger: f64) -> Self {
        self.warning_threshold = warning;
        self.danger_threshold = danger;
        self
    }

    /// Fill color for a ratio, checked from the top band down.
    #[must_use]
    pub fn color_for(&self, ratio: f64) -> Rgb {
        if ratio >= self.warning_threshold {
            self.color_good
        } else if ratio >= self.danger_threshold {
            self.color_warning
        } else {
            self.color_danger
        }
    }
}

impl batuta_common::display::WithDimensions for GaugeOptions {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        self.width = (width as usize).max(1);
        self.height = (height as usize).max(1);
    }
}

/// Render `value` out of `total` as a filled block grid.
///
/// A non-positive total yields `"Invalid total value"`.
#[must_use]
pub fn render_gauge(value: f64, total: f64, options: &GaugeOptions) -> String {
    if total.is_nan() || total <= 0.0 {
        return "Invalid total value".to_string();
    }

    let ratio = if value.is_nan() { 0.0 } else { (value / total).clamp(0.0, 1.0) };
    let (width, height) = (options.width.max(1), options.height.max(1));
    let cells = width * height;
    let filled = (ratio * cells as f64).round() as usize;
    let fill = options.color_for(ratio);

    let mut canvas = Canvas::new(width, height);
    for idx in 0..cells {
        let (glyph, color) = if idx < filled {
            (options.filled_char, fill)
        } else {
            (options.empty_char, Rgb::DIM_GRAY)
        };
        canvas.set_solid((idx / width) as isize, (idx % width) as isize, glyph, Some(color));
    }

    let summary = format!(
        "{} / {} ({:.1}%)",
        format_thousands(value, 0),
        format_thousands(total, 0),
        ratio * 100.0
    );
    canvas.serialize(
        &Decorations::new()
            .title(options.title.as_deref())
            .legend(vec![summary]),
    )
}
