//! Pie charts with aspect-corrected discs and anti-aliased Braille rims.
//!
//! Rasterization runs in two passes over a canvas stretched 2× horizontally
//! (terminal cells are about twice as tall as they are wide):
//!
//! 1. **Fill**: every cell whose center lies inside the ellipse becomes a
//!    full block in the color of the sector containing its angle.
//! 2. **Rim**: cells left blank near the boundary are super-sampled on a
//!    7×9 grid; inside samples light the matching Braille dot, giving a
//!    smooth edge.

use std::f64::consts::{FRAC_PI_2, TAU};

use crate::canvas::{Canvas, Decorations, FULL_BLOCK};
use crate::color::Rgb;
use crate::output::{format_human, paint};
use crate::palette::{category_colors, ColorScheme};

use super::{label_for, NO_DATA, NO_NONZERO_DATA};

/// Fallback terminal size when the caller cannot detect one.
const FALLBACK_TERMINAL: (usize, usize) = (80, 24);

/// Largest radius auto-sizing will pick.
const MAX_AUTO_RADIUS: f64 = 7.0;

/// Smallest radius auto-sizing will pick.
const MIN_AUTO_RADIUS: f64 = 2.2;

/// Bounds of a fixed radius; 60 rows is a 245×96 canvas.
const RADIUS_RANGE: (f64, f64) = (1.0, 60.0);

/// Horizontal compression applied to canvas columns.
const X_STRETCH: f64 = 2.0;

/// Super-sampling grid of the rim pass.
const RIM_SAMPLES: (usize, usize) = (7, 9);

/// Longest legend rule.
const MAX_RULE: usize = 50;

/// One angular slice of the pie.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sector {
    /// Start angle in radians (screen coordinates, y down).
    pub start_angle: f64,
    /// End angle in radians.
    pub end_angle: f64,
    /// Index of the input value.
    pub index: usize,
    /// Fill color of the slice.
    pub color: Rgb,
}

impl Sector {
    /// Angular extent.
    #[must_use]
    pub fn sweep(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    /// True if `angle` (any branch) falls inside this sector.
    #[must_use]
    pub fn contains(&self, angle: f64) -> bool {
        let test = if angle < self.start_angle { angle + TAU } else { angle };
        self.start_angle <= test && test <= self.end_angle
    }
}

/// Split `values` into contiguous sectors starting at the top (−π/2).
///
/// Negative and non-finite values count as zero. Sectors keep input order and
/// take `colors[index]`, cycling when `colors` is shorter than `values`.
/// Returns an empty vector when the total is zero.
#[must_use]
pub fn pie_sectors(values: &[f64], colors: &[Rgb]) -> Vec<Sector> {
    let clean: Vec<f64> = values.iter().map(|&v| sanitize(v)).collect();
    let total: f64 = clean.iter().sum();
    if total <= 0.0 {
        return Vec::new();
    }

    let mut start = -FRAC_PI_2;
    clean
        .iter()
        .enumerate()
        .map(|(index, v)| {
            let end = start + v / total * TAU;
            let sector = Sector {
                start_angle: start,
                end_angle: end,
                index,
                color: colors.get(index % colors.len().max(1)).copied().unwrap_or(Rgb::WHITE),
            };
            start = end;
            sector
        })
        .collect()
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

/// Options for [`render_pie`].
#[derive(Debug, Clone, PartialEq)]
pub struct PieOptions {
    /// Title above the chart.
    pub title: Option<String>,
    /// Vertical radius in rows when `auto_size` is off.
    pub radius: f64,
    /// Append the legend.
    pub show_legend: bool,
    /// Show percentages in the legend.
    pub show_percentages: bool,
    /// Category palette.
    pub color_scheme: ColorScheme,
    /// Explicit colors, used when they cover every value.
    pub custom_colors: Option<Vec<Rgb>>,
    /// Draw the anti-aliased Braille rim.
    pub use_braille: bool,
    /// Derive the radius from the terminal size.
    pub auto_size: bool,
    /// Terminal columns (80 when unknown).
    pub terminal_width: Option<usize>,
    /// Terminal rows (24 when unknown).
    pub terminal_height: Option<usize>,
}

impl Default for PieOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl PieOptions {
    /// Defaults: radius 10, legend with percentages, Braille rim, auto-size.
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: None,
            radius: 10.0,
            show_legend: true,
            show_percentages: true,
            color_scheme: ColorScheme::Distinct,
            custom_colors: None,
            use_braille: true,
            auto_size: true,
            terminal_width: None,
            terminal_height: None,
        }
    }

    /// Set the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Use a fixed radius and disable auto-sizing.
    #[must_use]
    pub fn radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self.auto_size = false;
        self
    }

    /// Set the color scheme.
    #[must_use]
    pub fn color_scheme(mut self, scheme: ColorScheme) -> Self {
        self.color_scheme = scheme;
        self
    }

    /// Set explicit colors.
    #[must_use]
    pub fn custom_colors(mut self, colors: Vec<Rgb>) -> Self {
        self.custom_colors = Some(colors);
        self
    }

    /// Enable or disable the Braille rim.
    #[must_use]
    pub fn use_braille(mut self, enabled: bool) -> Self {
        self.use_braille = enabled;
        self
    }

    /// Enable or disable the legend.
    #[must_use]
    pub fn show_legend(mut self, show: bool) -> Self {
        self.show_legend = show;
        self
    }

    /// Enable or disable legend percentages.
    #[must_use]
    pub fn show_percentages(mut self, show: bool) -> Self {
        self.show_percentages = show;
        self
    }

    /// Set the terminal size used by auto-sizing.
    #[must_use]
    pub fn terminal(mut self, width: usize, height: usize) -> Self {
        self.terminal_width = Some(width);
        self.terminal_height = Some(height);
        self
    }

    /// Radius for `categories` values: fixed, or fitted to the terminal.
    #[must_use]
    pub fn effective_radius(&self, categories: usize) -> f64 {
        if !self.auto_size {
            if !self.radius.is_finite() {
                return RADIUS_RANGE.0;
            }
            return self.radius.clamp(RADIUS_RANGE.0, RADIUS_RANGE.1);
        }
        let term_w = self.terminal_width.unwrap_or(FALLBACK_TERMINAL.0);
        let term_h = self.terminal_height.unwrap_or(FALLBACK_TERMINAL.1);

        // title, legend rule and margins
        let reserved = if self.show_legend { 7 + categories } else { 4 };
        let available = term_h.saturating_sub(reserved).max(8);

        let from_height = (available as f64 / 1.33).floor();
        let from_width = (term_w.saturating_sub(2) as f64 / 3.5).floor();
        from_height.min(from_width).min(MAX_AUTO_RADIUS).max(MIN_AUTO_RADIUS)
    }
}

impl batuta_common::display::WithDimensions for PieOptions {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        self.terminal_width = Some(width as usize);
        self.terminal_height = Some(height as usize);
    }
}

/// Render a pie chart of `values`, labelled by `labels`.
///
/// Empty input yields `"No data to display"`; a zero total yields
/// `"No data to display (all values are zero)"`.
#[must_use]
pub fn render_pie(values: &[f64], labels: &[String], options: &PieOptions) -> String {
    if values.is_empty() {
        return NO_DATA.to_string();
    }
    let colors = category_colors(values.len(), options.color_scheme, options.custom_colors.as_deref());
    let sectors = pie_sectors(values, &colors);
    if sectors.is_empty() {
        return NO_NONZERO_DATA.to_string();
    }

    let radius = options.effective_radius(values.len());
    let radius_x = (radius * X_STRETCH) as usize;
    let width = radius_x * 2 + 5;
    let height = (radius * 1.5) as usize + 6;
    let center = ((width / 2) as f64, (height as f64 / 1.9).floor());

    log::debug!("pie: {} sectors, radius {radius:.1}, canvas {width}x{height}", sectors.len());

    let mut canvas = Canvas::new(width, height);
    fill_disc(&mut canvas, center, radius, &sectors);
    if options.use_braille {
        draw_rim(&mut canvas, center, radius, &sectors);
    }

    let legend = if options.show_legend && !labels.is_empty() {
        legend_lines(values, labels, &sectors, options.show_percentages, width)
    } else {
        Vec::new()
    };

    canvas.serialize(
        &Decorations::new()
            .title(options.title.as_deref())
            .title_gap(true)
            .legend(legend),
    )
}

/// Sector containing the point at offset `(dx, dy)` from the center.
fn sector_at(sectors: &[Sector], dx: f64, dy: f64) -> Option<&Sector> {
    let angle = dy.atan2(dx);
    sectors
        .iter()
        .filter(|s| s.sweep() > 0.0)
        .find(|s| s.contains(angle))
}

fn fill_disc(canvas: &mut Canvas, center: (f64, f64), radius: f64, sectors: &[Sector]) {
    for row in 0..canvas.height() {
        for col in 0..canvas.width() {
            let dx = (col as f64 - center.0) / X_STRETCH;
            let dy = row as f64 - center.1;
            if dx.hypot(dy) > radius {
                continue;
            }
            if let Some(sector) = sector_at(sectors, dx, dy) {
                canvas.set_solid(row as isize, col as isize, FULL_BLOCK, Some(sector.color));
            }
        }
    }
}

fn draw_rim(canvas: &mut Canvas, center: (f64, f64), radius: f64, sectors: &[Sector]) {
    let (cols, rows) = RIM_SAMPLES;
    for row in 0..canvas.height() {
        for col in 0..canvas.width() {
            if !canvas.is_blank(row, col) {
                continue;
            }
            let dist = ((col as f64 - center.0) / X_STRETCH).hypot(row as f64 - center.1);
            if dist < radius - 1.0 || dist > radius + 0.9 {
                continue;
            }

            let mut rim_color = None;
            for sx in 0..cols {
                for sy in 0..rows {
                    let px = col as f64 + (sx as f64 + 0.5) / cols as f64 - 0.5;
                    let py = row as f64 + (sy as f64 + 0.5) / rows as f64 - 0.5;
                    let dx = (px - center.0) / X_STRETCH;
                    let dy = py - center.1;
                    if dx.hypot(dy) > radius {
                        continue;
                    }
                    if let Some(sector) = sector_at(sectors, dx, dy) {
                        canvas.set_braille(row as isize, col as isize, sy * 4 / rows, sx * 2 / cols);
                        rim_color = Some(sector.color);
                    }
                }
            }
            if let Some(color) = rim_color {
                canvas.set_color(row as isize, col as isize, color);
            }
        }
    }
}

fn legend_lines(
    values: &[f64],
    labels: &[String],
    sectors: &[Sector],
    show_percentages: bool,
    width: usize,
) -> Vec<String> {
    let total: f64 = values.iter().map(|&v| sanitize(v)).sum();
    let mut lines = vec!["─".repeat(width.min(MAX_RULE))];

    for sector in sectors {
        let value = sanitize(values[sector.index]);
        if value <= 0.0 {
            continue;
        }
        let mut line = paint("██", sector.color);
        line.push(' ');
        line.push_str(&label_for(labels, sector.index));
        if show_percentages {
            line.push_str(&format!(" ({:.1}%)", value / total * 100.0));
        }
        line.push_str(&format!(" = {}", format_human(value)));
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::strip_ansi;
    use crate::palette::DISTINCT;
    use approx::assert_relative_eq;
    use batuta_common::display::WithDimensions;
    use proptest::prelude::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_empty_and_zero_input() {
        assert_eq!(render_pie(&[], &[], &PieOptions::new()), "No data to display");
        assert_eq!(
            render_pie(&[0.0, -3.0], &labels(&["a", "b"]), &PieOptions::new()),
            "No data to display (all values are zero)"
        );
    }

    #[test]
    fn test_sectors_start_at_top() {
        let sectors = pie_sectors(&[1.0, 3.0], &DISTINCT);
        assert_eq!(sectors.len(), 2);
        assert_relative_eq!(sectors[0].start_angle, -FRAC_PI_2);
        assert_relative_eq!(sectors[0].sweep(), TAU / 4.0, epsilon = 1e-12);
        assert_relative_eq!(sectors[1].end_angle, 3.0 * FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_sector_contains_wraps() {
        let sectors = pie_sectors(&[1.0, 1.0], &DISTINCT);
        // second half runs from π/2 to 3π/2, i.e. the left side
        assert!(sectors[1].contains(std::f64::consts::PI));
        assert!(sectors[1].contains(-std::f64::consts::PI + 0.1));
        assert!(sectors[0].contains(0.0));
        assert!(!sectors[0].contains(std::f64::consts::PI));
    }

    #[test]
    fn test_auto_radius() {
        let options = PieOptions::new().terminal(80, 24);
        assert_relative_eq!(options.effective_radius(3), 7.0);

        let small = PieOptions::new().terminal(20, 10);
        assert_relative_eq!(small.effective_radius(3), 5.0);

        let tiny = PieOptions::new().terminal(8, 10);
        assert_relative_eq!(tiny.effective_radius(3), 2.2);

        assert_relative_eq!(PieOptions::new().radius(4.0).effective_radius(3), 4.0);
    }

    #[test]
    fn test_fixed_radius_is_bounded() {
        assert_relative_eq!(PieOptions::new().radius(1.0e6).effective_radius(3), 60.0);
        assert_relative_eq!(PieOptions::new().radius(f64::INFINITY).effective_radius(3), 1.0);
        assert_relative_eq!(PieOptions::new().radius(-3.0).effective_radius(3), 1.0);

        let out = render_pie(&[1.0, 2.0], &[], &PieOptions::new().radius(1.0e6));
        assert_eq!(out.lines().count(), 96);
    }

    #[test]
    fn test_sectors_carry_colors() {
        let colors = [Rgb::new(1, 1, 1), Rgb::new(2, 2, 2)];
        let sectors = pie_sectors(&[1.0, 0.0, 3.0], &colors);
        assert_eq!(sectors[0].color, colors[0]);
        assert_eq!(sectors[1].color, colors[1]);
        assert_eq!(sectors[2].color, colors[0]);
        assert_eq!(pie_sectors(&[1.0], &[])[0].color, Rgb::WHITE);
    }

    #[test]
    fn test_canvas_size_follows_radius() {
        let out = render_pie(&[1.0, 2.0], &[], &PieOptions::new().radius(7.0));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 16);
        assert!(lines.iter().all(|l| strip_ansi(l).chars().count() == 33));
    }

    #[test]
    fn test_legend_entries() {
        let out = render_pie(
            &[1500.0, 2_500_000.0, 0.0, 10.0],
            &labels(&["small", "huge", "none", "tiny"]),
            &PieOptions::new().terminal(80, 40),
        );
        let plain = strip_ansi(&out);
        assert!(plain.contains("██ small ("));
        assert!(plain.contains("= 1.5K"));
        assert!(plain.contains("huge") && plain.contains("= 2.5M"));
        assert!(plain.contains("= 10"));
        assert!(!plain.contains("none"));
    }

    #[test]
    fn test_legend_hidden_without_labels() {
        let out = strip_ansi(&render_pie(&[1.0, 1.0], &[], &PieOptions::new()));
        assert!(!out.contains('─'));
    }

    #[test]
    fn test_single_value_fills_one_color() {
        let options = PieOptions::new().radius(4.0).custom_colors(vec![Rgb::new(9, 9, 9)]);
        let out = render_pie(&[5.0], &labels(&["only"]), &options);
        assert!(out.contains("\x1b[38;2;9;9;9m█"));
        assert!(out.contains("(100.0%)"));
    }

    #[test]
    fn test_braille_rim_toggle() {
        let is_braille = |c: char| ('\u{2801}'..='\u{28FF}').contains(&c);
        let with_rim = strip_ansi(&render_pie(&[1.0, 2.0, 3.0], &[], &PieOptions::new().radius(6.0)));
        let without = strip_ansi(&render_pie(
            &[1.0, 2.0, 3.0],
            &[],
            &PieOptions::new().radius(6.0).use_braille(false),
        ));
        assert!(with_rim.chars().any(is_braille));
        assert!(!without.chars().any(is_braille));
        assert!(without.contains('█'));
    }

    #[test]
    fn test_title_gap() {
        let out = strip_ansi(&render_pie(&[1.0], &[], &PieOptions::new().radius(3.0).title("Share")));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0].trim(), "Share");
        assert_eq!(lines[1], "");
    }

    #[test]
    fn test_with_dimensions_feeds_auto_size() {
        let mut options = PieOptions::new();
        options.set_dimensions(20, 10);
        assert_relative_eq!(options.effective_radius(3), 5.0);
    }

    proptest! {
        #[test]
        fn prop_sectors_partition_circle(values in prop::collection::vec(0.01f64..1e6, 1..20)) {
            let sectors = pie_sectors(&values, &DISTINCT);
            prop_assert_eq!(sectors.len(), values.len());

            let sweep: f64 = sectors.iter().map(Sector::sweep).sum();
            prop_assert!((sweep - TAU).abs() < 1e-6);

            for pair in sectors.windows(2) {
                prop_assert!((pair[0].end_angle - pair[1].start_angle).abs() < 1e-12);
            }
            prop_assert!((sectors[0].start_angle + FRAC_PI_2).abs() < 1e-12);
        }
    }
}
