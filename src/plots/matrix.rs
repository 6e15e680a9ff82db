//! Matrix heatmaps: pivot (x, y, value) triples and color each cell.
//!
//! Collisions on the same `(y, x)` pair are summed. Axes are sorted by key
//! text with nulls last; an axis with more than `max_rows`/`max_cols` keys
//! keeps only the keys with the largest totals, ordered by total.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::output::{bold, center, format_thousands, paint};
use crate::scale::{Gradient, Normalizer};

use super::NO_DATA;

/// Narrowest cell.
const MIN_CELL_WIDTH: usize = 6;
/// Narrowest cell when values are printed.
const MIN_VALUE_CELL_WIDTH: usize = 8;

/// A row or column key. Sorts by text, with nulls after every text key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AxisKey {
    /// Non-null key, compared by its display text.
    Text(String),
    /// Missing key.
    Null,
}

impl AxisKey {
    /// Display width in characters.
    fn width(&self) -> usize {
        match self {
            Self::Text(text) => text.chars().count(),
            Self::Null => 4,
        }
    }
}

impl fmt::Display for AxisKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Null => f.write_str("null"),
        }
    }
}

impl From<&str> for AxisKey {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for AxisKey {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl<T: Into<AxisKey>> From<Option<T>> for AxisKey {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Summed `(row, column) → value` table with its visible axes.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable {
    /// Visible row keys, in display order.
    pub rows: Vec<AxisKey>,
    /// Visible column keys, in display order.
    pub cols: Vec<AxisKey>,
    cells: HashMap<(AxisKey, AxisKey), f64>,
}

impl PivotTable {
    /// Pivot `y` (rows) against `x` (columns).
    ///
    /// `values[i]` defaults to 1 when missing, so an empty slice counts rows.
    #[must_use]
    pub fn build(x: &[AxisKey], y: &[AxisKey], values: &[f64], max_rows: usize, max_cols: usize) -> Self {
        let mut cells: HashMap<(AxisKey, AxisKey), f64> = HashMap::new();
        for (i, (col, row)) in x.iter().zip(y).enumerate() {
            let value = values.get(i).copied().unwrap_or(1.0);
            *cells.entry((row.clone(), col.clone())).or_insert(0.0) += value;
        }

        let n = x.len().min(y.len());
        let mut cols: Vec<AxisKey> = x[..n].iter().cloned().collect::<BTreeSet<_>>().into_iter().collect();
        let mut rows: Vec<AxisKey> = y[..n].iter().cloned().collect::<BTreeSet<_>>().into_iter().collect();

        if cols.len() > max_cols {
            let totals: HashMap<&AxisKey, f64> = cols
                .iter()
                .map(|c| (c, rows.iter().map(|r| lookup(&cells, r, c)).sum()))
                .collect();
            let mut ranked = cols.clone();
            ranked.sort_by(|a, b| totals[b].total_cmp(&totals[a]));
            ranked.truncate(max_cols);
            log::debug!("matrix: keeping {max_cols} of {} columns", cols.len());
            cols = ranked;
        }

        if rows.len() > max_rows {
            let mut row_totals: HashMap<&AxisKey, f64> = HashMap::new();
            for ((row, _), value) in &cells {
                *row_totals.entry(row).or_insert(0.0) += value;
            }
            let mut ranked = rows.clone();
            ranked.sort_by(|a, b| {
                let ta = row_totals.get(a).copied().unwrap_or(0.0);
                let tb = row_totals.get(b).copied().unwrap_or(0.0);
                tb.total_cmp(&ta)
            });
            ranked.truncate(max_rows);
            log::debug!("matrix: keeping {max_rows} of {} rows", rows.len());
            rows = ranked;
        }

        Self { rows, cols, cells }
    }

    /// Aggregated value of a cell (0 when absent).
    #[must_use]
    pub fn get(&self, row: &AxisKey, col: &AxisKey) -> f64 {
        lookup(&self.cells, row, col)
    }

    /// Extent of the positive visible cells.
    #[must_use]
    pub fn positive_extent(&self) -> Option<Normalizer> {
        let positives: Vec<f64> = self
            .rows
            .iter()
            .flat_map(|r| self.cols.iter().map(move |c| self.get(r, c)))
            .filter(|v| *v > 0.0)
            .collect();
        Normalizer::from_data(&positives)
    }
}

fn lookup(cells: &HashMap<(AxisKey, AxisKey), f64>, row: &AxisKey, col: &AxisKey) -> f64 {
    cells.get(&(row.clone(), col.clone())).copied().unwrap_or(0.0)
}

/// Options for [`render_matrix`].
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixOptions {
    /// Title above the grid.
    pub title: Option<String>,
    /// Caption under the columns.
    pub x_label: Option<String>,
    /// Caption under the row labels.
    pub y_label: Option<String>,
    /// Width used to center the title (natural grid width when unset).
    pub width: Option<usize>,
    /// Print values inside cells instead of solid blocks.
    pub show_values: bool,
    /// Cell color gradient.
    pub gradient: Gradient,
    /// Most rows shown.
    pub max_rows: usize,
    /// Most columns shown.
    pub max_cols: usize,
    /// Decimals of printed values.
    pub precision: usize,
}

impl Default for MatrixOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl MatrixOptions {
    /// Defaults: green-yellow-red, up to 20×20, integer values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: None,
            x_label: None,
            y_label: None,
            width: None,
            show_values: false,
            gradient: Gradient::GreenYellowRed,
            max_rows: 20,
            max_cols: 20,
            precision: 0,
        }
    }

    /// Set the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the axis captions.
    #[must_use]
    pub fn axis_labels(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = Some(x_label.into());
        self.y_label = Some(y_label.into());
        self
    }

    /// Print values in cells.
    #[must_use]
    pub fn show_values(mut self, show: bool) -> Self {
        self.show_values = show;
        self
    }

    /// Set the gradient.
    #[must_use]
    pub fn gradient(mut self, gradient: Gradient) -> Self {
        self.gradient = gradient;
        self
    }

    /// Set the axis limits.
    #[must_use]
    pub fn limits(mut self, max_rows: usize, max_cols: usize) -> Self {
        self.max_rows = max_rows;
        self.max_cols = max_cols;
        self
    }
}

impl batuta_common::display::WithDimensions for MatrixOptions {
    /// Only the width is used; row count is bounded by `max_rows`.
    fn set_dimensions(&mut self, width: u32, _height: u32) {
        self.width = Some(width as usize);
    }
}

/// Render a matrix heatmap of `values` pivoted on `y` (rows) × `x` (columns).
///
/// Returns `"No data to display"` when there are no keys or no positive cells.
#[must_use]
pub fn render_matrix(x: &[AxisKey], y: &[AxisKey], values: &[f64], options: &MatrixOptions) -> String {
    if x.is_empty() || y.is_empty() {
        return NO_DATA.to_string();
    }

    let pivot = PivotTable::build(x, y, values, options.max_rows.max(1), options.max_cols.max(1));
    let Some(scale) = pivot.positive_extent() else {
        return NO_DATA.to_string();
    };

    let label_width = pivot.rows.iter().map(AxisKey::width).max().unwrap_or(5);
    let mut cell_width = MIN_CELL_WIDTH.max(pivot.cols.iter().map(AxisKey::width).max().unwrap_or(5) + 1);
    if options.show_values {
        cell_width = cell_width.max(MIN_VALUE_CELL_WIDTH);
    }
    let grid_width = pivot.cols.len() * cell_width;
    let indent = " ".repeat(label_width + 2);

    let mut lines = Vec::with_capacity(pivot.rows.len() + 8);
    if let Some(title) = options.title.as_deref() {
        let width = options.width.unwrap_or(label_width + 2 + grid_width);
        lines.push(bold(&center(title, width)));
        lines.push(String::new());
    }

    let mut header = indent.clone();
    for col in &pivot.cols {
        header.push_str(&center(&truncate(&col.to_string(), cell_width - 1), cell_width));
    }
    lines.push(header);
    lines.push(format!("{}┬{}", "─".repeat(label_width + 1), "─".repeat(grid_width)));

    for row in &pivot.rows {
        let label = truncate(&row.to_string(), label_width);
        let mut line = format!("{label:>label_width$} │");
        for col in &pivot.cols {
            let value = pivot.get(row, col);
            if value > 0.0 {
                let color = options.gradient.color_at(scale.normalize(value));
                let body = if options.show_values {
                    truncate(&format_thousands(value, options.precision), cell_width - 1)
                } else {
                    "█".repeat(cell_width - 1)
                };
                line.push_str(&paint(&center(&body, cell_width), color));
            } else {
                line.push_str(&" ".repeat(cell_width));
            }
        }
        lines.push(line);
    }

    if options.x_label.is_some() || options.y_label.is_some() {
        lines.push(String::new());
        if let Some(x_label) = options.x_label.as_deref() {
            lines.push(format!("{indent}{}", center(&format!("← {x_label} →"), grid_width)));
        }
        if let Some(y_label) = options.y_label.as_deref() {
            lines.push(center(&format!("↑ {y_label} ↓"), label_width));
        }
    }

    lines.push(String::new());
    lines.push(scale_legend(options.gradient, scale));
    lines.join("\n")
}

fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

fn scale_legend(gradient: Gradient, scale: Normalizer) -> String {
    let (min, max) = scale.extent();
    let [s0, s1, s2, s3, s4] = gradient.swatches();
    format!(
        "Scale: {} {} {} {} {} {} {} {}",
        paint("█", s0),
        format_thousands(min, 0),
        paint("█", s1),
        paint("█", s2),
        format_thousands((min + max) / 2.0, 0),
        paint("█", s3),
        paint("█", s4),
        format_thousands(max, 0),
    )
}
