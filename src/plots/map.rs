//! Geographic point maps.
//!
//! Seven modes share one pipeline: pick a [`Viewport`], project every point
//! onto a [`Canvas`], composite, then serialize with latitude row labels,
//! longitude axis labels and a mode-specific legend.
//!
//! | Mode              | Sub-cells | Coloring                               |
//! |-------------------|-----------|----------------------------------------|
//! | `points`          | Braille   | point label                            |
//! | `blocks`          | half      | point label                            |
//! | `density`/`heatmap` | shade   | 5-step ramp, pre-smoothing maximum     |
//! | `blocks_heatmap`  | full      | green → yellow → red, smoothed maximum |
//! | `braille_heatmap` | Braille   | local density of the point's cell      |
//! | `clusters`        | marker    | cluster id                             |

use std::fmt;

use crate::canvas::{Canvas, Decorations, Half, FULL_BLOCK};
use crate::cluster::identify_clusters;
use crate::color::Rgb;
use crate::density::DensityGrid;
use crate::geometry::{CellPoint, GeoPoint};
use crate::output::paint;
use crate::palette::LabelPalette;
use crate::scale::{DensityRamp, Gradient};
use crate::viewport::{bounds_viewport, select_viewport, Projection, Viewport, ViewportTuning};

use super::NO_DATA;

/// Default canvas width when none is configured.
pub const DEFAULT_MAP_WIDTH: usize = 124;
/// Default canvas height when none is configured.
pub const DEFAULT_MAP_HEIGHT: usize = 26;

/// Rows between latitude labels.
const LAT_LABEL_STRIDE: usize = 5;

/// Braille heatmap color for cells with no measurable density.
const FAINT_GREEN: Rgb = Rgb::new(0, 128, 0);

/// Colors cycled by cluster id.
const CLUSTER_COLORS: [Rgb; 6] = [
    Rgb::new(255, 85, 85),
    Rgb::new(85, 255, 85),
    Rgb::new(255, 255, 85),
    Rgb::new(85, 85, 255),
    Rgb::new(255, 85, 255),
    Rgb::new(85, 255, 255),
];

/// Visual mode of a map render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapMode {
    /// Braille dots, colored by label.
    #[default]
    Points,
    /// Half blocks, colored by label.
    Blocks,
    /// Shade glyphs on the discrete density ramp.
    Density,
    /// Same rendering as [`MapMode::Density`].
    Heatmap,
    /// Size-coded cluster markers.
    Clusters,
    /// Full blocks on the continuous gradient.
    BlocksHeatmap,
    /// Braille dots colored by local density.
    BrailleHeatmap,
}

impl MapMode {
    /// All modes, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Points,
        Self::Blocks,
        Self::Density,
        Self::Heatmap,
        Self::Clusters,
        Self::BlocksHeatmap,
        Self::BrailleHeatmap,
    ];

    /// Parse a mode name, accepting a `map_` prefix; unknown names are points.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let name = name.trim().to_ascii_lowercase().replace('-', "_");
        let name = name.strip_prefix("map_").unwrap_or(&name);
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == name)
            .unwrap_or_default()
    }

    /// Canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Points => "points",
            Self::Blocks => "blocks",
            Self::Density => "density",
            Self::Heatmap => "heatmap",
            Self::Clusters => "clusters",
            Self::BlocksHeatmap => "blocks_heatmap",
            Self::BrailleHeatmap => "braille_heatmap",
        }
    }
}

impl fmt::Display for MapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for [`render_map`].
#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    /// Total width in cells; [`DEFAULT_MAP_WIDTH`] when unset.
    pub width: Option<usize>,
    /// Total height in rows, including the axis row; [`DEFAULT_MAP_HEIGHT`] when unset.
    pub height: Option<usize>,
    /// Title above the map.
    pub title: Option<String>,
    /// Append the mode legend.
    pub show_legend: bool,
    /// Character height / width ratio of the terminal font.
    pub aspect_ratio: f64,
    /// Use the density-adaptive viewport instead of the bounding box.
    pub center_on_density: bool,
    /// Viewport selection constants.
    pub tuning: ViewportTuning,
    /// Blur passes for density and block heatmaps.
    pub density_iterations: usize,
    /// Cluster radius in cells.
    pub cluster_threshold: f64,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl MapOptions {
    /// Defaults: terminal-independent 124×26, aspect 2.0, density centering.
    #[must_use]
    pub fn new() -> Self {
        Self {
            width: None,
            height: None,
            title: None,
            show_legend: true,
            aspect_ratio: 2.0,
            center_on_density: true,
            tuning: ViewportTuning::default(),
            density_iterations: 2,
            cluster_threshold: 2.0,
        }
    }

    /// Set the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the output size.
    #[must_use]
    pub fn size(mut self, width: usize, height: usize) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Set the font aspect ratio.
    #[must_use]
    pub fn aspect_ratio(mut self, ratio: f64) -> Self {
        self.aspect_ratio = ratio;
        self
    }

    /// Enable or disable density-adaptive centering.
    #[must_use]
    pub fn center_on_density(mut self, enabled: bool) -> Self {
        self.center_on_density = enabled;
        self
    }

    /// Enable or disable the legend.
    #[must_use]
    pub fn show_legend(mut self, show: bool) -> Self {
        self.show_legend = show;
        self
    }

    /// Override the viewport constants.
    #[must_use]
    pub fn tuning(mut self, tuning: ViewportTuning) -> Self {
        self.tuning = tuning;
        self
    }

    /// Set the cluster radius.
    #[must_use]
    pub fn cluster_threshold(mut self, threshold: f64) -> Self {
        self.cluster_threshold = threshold;
        self
    }

    /// Canvas size: the configured width and the height minus the axis row.
    fn canvas_size(&self) -> (usize, usize) {
        let width = self.width.unwrap_or(DEFAULT_MAP_WIDTH).max(1);
        let height = self.height.unwrap_or(DEFAULT_MAP_HEIGHT).saturating_sub(1).max(1);
        (width, height)
    }
}

impl batuta_common::display::WithDimensions for MapOptions {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        self.width = Some(width as usize);
        self.height = Some(height as usize);
    }
}

/// Render `points` as a map in the given mode.
///
/// Returns `"No data to display"` for an empty slice.
#[must_use]
pub fn render_map(points: &[GeoPoint], mode: MapMode, options: &MapOptions) -> String {
    let viewport = if options.center_on_density {
        select_viewport(points, options.aspect_ratio, &options.tuning)
    } else {
        bounds_viewport(points, options.aspect_ratio, &options.tuning)
    };
    let Some(viewport) = viewport else {
        return NO_DATA.to_string();
    };

    let (width, height) = options.canvas_size();
    let projection = Projection::new(&viewport, width, height);
    let mut canvas = Canvas::new(width, height);

    log::debug!("rendering {} points as {mode} on {width}x{height}", points.len());

    match mode {
        MapMode::Points => plot_points(&mut canvas, points, &projection),
        MapMode::Blocks => plot_blocks(&mut canvas, points, &projection),
        MapMode::Density | MapMode::Heatmap => {
            plot_density(&mut canvas, points, &projection, options.density_iterations);
        }
        MapMode::BlocksHeatmap => {
            plot_blocks_heatmap(&mut canvas, points, &projection, options.density_iterations);
        }
        MapMode::BrailleHeatmap => plot_braille_heatmap(&mut canvas, points, &projection),
        MapMode::Clusters => {
            plot_clusters(&mut canvas, points, &projection, options.cluster_threshold);
        }
    }

    let legend = if options.show_legend { legend(mode) } else { Vec::new() };
    let decorations = Decorations::new()
        .title(options.title.as_deref())
        .borders(true)
        .row_labels(latitude_labels(&viewport, height))
        .footer(vec![longitude_axis(&viewport, width)])
        .legend(legend);

    canvas.serialize(&decorations)
}

fn label_palette(points: &[GeoPoint]) -> LabelPalette {
    LabelPalette::from_labels(points.iter().filter_map(|p| p.label.as_deref()))
}

fn point_color(palette: &LabelPalette, point: &GeoPoint) -> Option<Rgb> {
    point.label.as_deref().and_then(|label| palette.color_for(label))
}

fn plot_points(canvas: &mut Canvas, points: &[GeoPoint], projection: &Projection) {
    let palette = label_palette(points);
    for point in points {
        let p = projection.project(point.lat, point.lon);
        if canvas.set_braille(p.row, p.col, p.braille_sub_row(), p.braille_sub_col()) {
            if let Some(color) = point_color(&palette, point) {
                canvas.set_color(p.row, p.col, color);
            }
        }
    }
}

fn plot_blocks(canvas: &mut Canvas, points: &[GeoPoint], projection: &Projection) {
    let palette = label_palette(points);
    for point in points {
        let p = projection.project(point.lat, point.lon);
        let half = if p.in_upper_half() { Half::Upper } else { Half::Lower };
        if canvas.set_half_block(p.row, p.col, half) {
            if let Some(color) = point_color(&palette, point) {
                canvas.set_color(p.row, p.col, color);
            }
        }
    }
}

fn accumulate(points: &[GeoPoint], projection: &Projection, width: usize, height: usize) -> DensityGrid {
    let mut grid = DensityGrid::new(width, height);
    for point in points {
        let p = projection.project(point.lat, point.lon);
        grid.accumulate(p.row, p.col, point.weight());
    }
    grid
}

fn plot_density(canvas: &mut Canvas, points: &[GeoPoint], projection: &Projection, iterations: usize) {
    let (width, height) = (canvas.width(), canvas.height());
    let mut grid = accumulate(points, projection, width, height);
    let peak = grid.max();
    grid.smooth(iterations);
    if peak <= 0.0 {
        return;
    }

    for row in 0..height {
        for col in 0..width {
            let value = grid.get(row, col);
            if value <= 0.0 {
                continue;
            }
            let t = (value / peak).min(1.0);
            let glyph = DensityRamp::glyph(t);
            if glyph != ' ' {
                canvas.set_solid(row as isize, col as isize, glyph, Some(DensityRamp::color(t)));
            }
        }
    }
}

fn plot_blocks_heatmap(
    canvas: &mut Canvas,
    points: &[GeoPoint],
    projection: &Projection,
    iterations: usize,
) {
    let (width, height) = (canvas.width(), canvas.height());
    let mut grid = accumulate(points, projection, width, height);
    grid.smooth(iterations);
    let peak = grid.max();
    if peak <= 0.0 {
        return;
    }

    for row in 0..height {
        for col in 0..width {
            let value = grid.get(row, col);
            if value > 0.0 {
                let color = Gradient::GreenYellowRed.color_at(value / peak);
                canvas.set_solid(row as isize, col as isize, FULL_BLOCK, Some(color));
            }
        }
    }
}

fn plot_braille_heatmap(canvas: &mut Canvas, points: &[GeoPoint], projection: &Projection) {
    let local = accumulate(points, projection, canvas.width(), canvas.height()).smoothed(1);
    let peak = local.max();

    for point in points {
        let p = projection.project(point.lat, point.lon);
        if !canvas.set_braille(p.row, p.col, p.braille_sub_row(), p.braille_sub_col()) {
            continue;
        }
        let density = local.get(p.row as usize, p.col as usize);
        let color = if density > 0.0 && peak > 0.0 {
            Gradient::GreenYellowRed.color_at(density / peak)
        } else {
            FAINT_GREEN
        };
        canvas.set_color(p.row, p.col, color);
    }
}

fn plot_clusters(canvas: &mut Canvas, points: &[GeoPoint], projection: &Projection, threshold: f64) {
    let (width, height) = (canvas.width() as isize, canvas.height() as isize);
    let cells: Vec<CellPoint> = points
        .iter()
        .map(|point| projection.project(point.lat, point.lon))
        .filter(|p| (0..height).contains(&p.row) && (0..width).contains(&p.col))
        .map(|p| CellPoint::new(p.row as f64, p.col as f64))
        .collect();

    let clusters = identify_clusters(&cells, threshold);
    log::debug!("{} clusters from {} visible points", clusters.len(), cells.len());

    for (id, cluster) in clusters.iter().enumerate() {
        let row = cluster.centroid.row as isize;
        let col = cluster.centroid.col as isize;
        let color = CLUSTER_COLORS[id % CLUSTER_COLORS.len()];
        if !canvas.set_solid(row, col, cluster.glyph(), Some(color)) {
            continue;
        }
        if cluster.is_labelled() && col + 2 < width {
            let digits: String = cluster.size().to_string().chars().take(3).collect();
            canvas.put_text(row, col + 1, &digits, Some(Rgb::DIM_GRAY));
        }
    }
}

fn latitude_labels(viewport: &Viewport, height: usize) -> Vec<Option<String>> {
    let (max_lat, span) = (viewport.max_lat(), viewport.lat_span);
    (0..height)
        .map(|row| {
            (row % LAT_LABEL_STRIDE == 0).then(|| {
                let frac = if height > 1 { row as f64 / (height - 1) as f64 } else { 0.0 };
                format!("{:6.2}°", max_lat - frac * span)
            })
        })
        .collect()
}

fn longitude_axis(viewport: &Viewport, width: usize) -> String {
    let spacing = (width / 5).max(1);
    let mut axis = String::from(" ");
    for col in (0..width).step_by(spacing) {
        let frac = if width > 1 { col as f64 / (width - 1) as f64 } else { 0.0 };
        let label = format!("{:6.1}°", viewport.min_lon() + frac * viewport.lon_span);
        axis.push_str(&format!("{label:<spacing$}"));
    }
    axis.chars().take(width + 2).collect()
}

fn swatch_legend(glyph: char, stops: [Rgb; 5]) -> String {
    let marks = [" Low  ", "  ", " Medium  ", "  ", " High"];
    let mut line = String::from("Density: ");
    for (color, mark) in stops.into_iter().zip(marks) {
        line.push_str(&paint(&glyph.to_string(), color));
        line.push_str(mark);
    }
    line
}

fn legend(mode: MapMode) -> Vec<String> {
    match mode {
        MapMode::Density | MapMode::Heatmap => {
            let marks = [" Low  ", "  ", "  ", "  ", " High"];
            let glyphs = ['░', '▒', '▓', '█', '█'];
            let mut line = String::from("Density: ");
            for ((glyph, color), mark) in glyphs.into_iter().zip(DensityRamp::COLORS).zip(marks) {
                line.push_str(&paint(&glyph.to_string(), color));
                line.push_str(mark);
            }
            vec![line]
        }
        MapMode::BlocksHeatmap => vec![swatch_legend(FULL_BLOCK, Gradient::GreenYellowRed.swatches())],
        MapMode::BrailleHeatmap => vec![swatch_legend('⣿', Gradient::GreenYellowRed.swatches())],
        MapMode::Clusters => vec!["Clusters: • <5 points  ◉ 5-10  ◎ 10-20  ⊕ >20".to_string()],
        MapMode::Points | MapMode::Blocks => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::strip_ansi;
    use batuta_common::display::WithDimensions;

    fn city_points() -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(40.0, -74.0),
            GeoPoint::new(40.01, -74.01),
            GeoPoint::new(40.02, -73.99),
            GeoPoint::new(40.005, -74.005).with_label("red"),
        ]
    }

    #[test]
    fn test_mode_from_name() {
        assert_eq!(MapMode::from_name("map_blocks_heatmap"), MapMode::BlocksHeatmap);
        assert_eq!(MapMode::from_name("Clusters"), MapMode::Clusters);
        assert_eq!(MapMode::from_name("braille-heatmap"), MapMode::BrailleHeatmap);
        assert_eq!(MapMode::from_name("wat"), MapMode::Points);
        for mode in MapMode::ALL {
            assert_eq!(MapMode::from_name(mode.as_str()), mode);
        }
    }

    #[test]
    fn test_empty_points() {
        for mode in MapMode::ALL {
            assert_eq!(render_map(&[], mode, &MapOptions::new()), NO_DATA);
        }
    }

    #[test]
    fn test_dimensions_and_borders() {
        let out = render_map(&city_points(), MapMode::Points, &MapOptions::new().size(30, 11));
        let plain = strip_ansi(&out);
        let lines: Vec<&str> = plain.lines().collect();

        assert!(lines[0].starts_with('┌'));
        assert_eq!(lines[0].chars().count(), 32);
        // 10 canvas rows between the borders
        assert!(lines[11].starts_with('└'));
        assert!(lines[1].ends_with('°'));
        assert!(lines[12].contains('°'));
    }

    #[test]
    fn test_points_mode_uses_braille_and_label_color() {
        let out = render_map(&city_points(), MapMode::Points, &MapOptions::new().size(40, 12));
        let plain = strip_ansi(&out);
        assert!(plain.chars().any(|c| ('\u{2801}'..='\u{28FF}').contains(&c)));
        assert!(out.contains("\x1b[38;2;255;85;85m"));
    }

    fn crowd() -> Vec<GeoPoint> {
        (0..100)
            .map(|i| GeoPoint::new(40.0 + f64::from(i % 10) * 0.001, -74.0 + f64::from(i / 10) * 0.001))
            .collect()
    }

    fn canvas_body(out: &str) -> String {
        strip_ansi(out)
            .lines()
            .filter(|line| line.starts_with('│'))
            .flat_map(|line| line.chars().skip(1).take_while(|c| *c != '│').collect::<Vec<_>>())
            .collect()
    }

    #[test]
    fn test_every_mode_renders_something() {
        let options = MapOptions::new().size(12, 6);
        for mode in MapMode::ALL {
            let body = canvas_body(&render_map(&crowd(), mode, &options));
            assert!(body.chars().any(|c| c != ' '), "mode {mode} drew nothing");
        }
    }

    #[test]
    fn test_identical_points_stay_in_view() {
        let points = vec![GeoPoint::new(10.0, 10.0); 4];
        let body = canvas_body(&render_map(&points, MapMode::Points, &MapOptions::new().size(30, 11)));
        assert!(body.chars().any(|c| c != ' '));
    }

    #[test]
    fn test_legends_per_mode() {
        let options = MapOptions::new().size(40, 12);
        let clusters = strip_ansi(&render_map(&city_points(), MapMode::Clusters, &options));
        assert!(clusters.contains("Clusters: • <5 points"));

        let heat = strip_ansi(&render_map(&city_points(), MapMode::BlocksHeatmap, &options));
        assert!(heat.contains("Density: █ Low"));

        let points = render_map(&city_points(), MapMode::Points, &options.clone().show_legend(false));
        assert!(!strip_ansi(&points).contains("Density"));
    }

    #[test]
    fn test_title_is_centered_over_frame() {
        let out = render_map(&city_points(), MapMode::Points, &MapOptions::new().size(10, 6).title("NYC"));
        let first = strip_ansi(out.lines().next().expect("title line should exist"));
        assert_eq!(first.chars().count(), 12);
        assert_eq!(first.trim(), "NYC");
    }

    #[test]
    fn test_cluster_label_for_large_cluster() {
        let points: Vec<GeoPoint> = (0..12).map(|_| GeoPoint::new(10.0, 10.0)).collect();
        let out = strip_ansi(&render_map(&points, MapMode::Clusters, &MapOptions::new().size(30, 11)));
        assert!(out.contains("◎12"));
    }

    #[test]
    fn test_with_dimensions() {
        let mut options = MapOptions::new();
        options.set_dimensions(50, 20);
        assert_eq!(options.canvas_size(), (50, 19));
        assert_eq!(MapOptions::new().canvas_size(), (124, 25));
    }
}
