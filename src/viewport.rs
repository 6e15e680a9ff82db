//! Density-adaptive viewport selection and lat/lon → cell projection.
//!
//! A map is rarely well served by the bounding box of its points: one
//! outlier on another continent shrinks everything else to a dot. The
//! selector instead centers on the core of the cloud (the `coverage`
//! fraction nearest the centroid), nudges that center towards the densest
//! grid bucket, and sizes the span to a percentile of point distances.
//!
//! Every tuning constant lives in [`ViewportTuning`] so callers (and the
//! YAML config) can override them.

use serde::{Deserialize, Serialize};

use crate::geometry::GeoPoint;

/// Overridable constants for viewport selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportTuning {
    /// Fraction of points the viewport should show.
    pub coverage: f64,
    /// Buckets per axis in the density-peak grid.
    pub grid_size: usize,
    /// Weight of the core centroid in the final center.
    pub core_weight: f64,
    /// Weight of the density peak in the final center.
    pub peak_weight: f64,
    /// Latitude span multiplier.
    pub lat_padding: f64,
    /// Longitude span multiplier.
    pub lon_padding: f64,
    /// Lower bound for both spans.
    pub min_span: f64,
    /// Fractional padding of the bounding-box fallback.
    pub bounds_padding: f64,
}

impl Default for ViewportTuning {
    fn default() -> Self {
        Self {
            coverage: 0.9,
            grid_size: 40,
            core_weight: 0.9,
            peak_weight: 0.1,
            lat_padding: 1.33,
            lon_padding: 1.8,
            min_span: 0.001,
            bounds_padding: 0.1,
        }
    }
}

/// Geographic window shown by a map render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Latitude at the vertical center.
    pub center_lat: f64,
    /// Longitude at the horizontal center.
    pub center_lon: f64,
    /// Total latitude extent.
    pub lat_span: f64,
    /// Total longitude extent.
    pub lon_span: f64,
}

impl Viewport {
    /// Southern edge.
    #[must_use]
    pub fn min_lat(&self) -> f64 {
        self.center_lat - self.lat_span / 2.0
    }

    /// Northern edge.
    #[must_use]
    pub fn max_lat(&self) -> f64 {
        self.center_lat + self.lat_span / 2.0
    }

    /// Western edge.
    #[must_use]
    pub fn min_lon(&self) -> f64 {
        self.center_lon - self.lon_span / 2.0
    }

    /// Eastern edge.
    #[must_use]
    pub fn max_lon(&self) -> f64 {
        self.center_lon + self.lon_span / 2.0
    }

    fn from_bounds(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            center_lat: (min_lat + max_lat) / 2.0,
            center_lon: (min_lon + max_lon) / 2.0,
            lat_span: max_lat - min_lat,
            lon_span: max_lon - min_lon,
        }
    }

    fn with_floor(mut self, min_span: f64) -> Self {
        self.lat_span = self.lat_span.max(min_span);
        self.lon_span = self.lon_span.max(min_span);
        self
    }
}

/// Choose a viewport showing the dense core of `points`.
///
/// Fewer than three points fall back to [`bounds_viewport`]. Returns `None`
/// only for an empty slice.
#[must_use]
pub fn select_viewport(
    points: &[GeoPoint],
    aspect_ratio: f64,
    tuning: &ViewportTuning,
) -> Option<Viewport> {
    if points.len() < 3 {
        return bounds_viewport(points, aspect_ratio, tuning);
    }

    let n = points.len() as f64;
    let centroid_lat = points.iter().map(|p| p.lat).sum::<f64>() / n;
    let centroid_lon = points.iter().map(|p| p.lon).sum::<f64>() / n;
    let cos_lat = centroid_lat.to_radians().cos();

    let mut by_distance: Vec<(f64, &GeoPoint)> = points
        .iter()
        .map(|p| (p.corrected_distance(centroid_lat, centroid_lon, cos_lat), p))
        .collect();
    by_distance.sort_by(|a, b| a.0.total_cmp(&b.0));

    let core_count = (n * tuning.coverage) as usize;
    let (core_lat, core_lon) = if core_count == 0 {
        (centroid_lat, centroid_lon)
    } else {
        let core = &by_distance[..core_count.min(by_distance.len())];
        let k = core.len() as f64;
        (
            core.iter().map(|(_, p)| p.lat).sum::<f64>() / k,
            core.iter().map(|(_, p)| p.lon).sum::<f64>() / k,
        )
    };

    let (center_lat, center_lon) = match density_peak(points, tuning.grid_size) {
        Some((peak_lat, peak_lon)) => (
            tuning.core_weight * core_lat + tuning.peak_weight * peak_lat,
            tuning.core_weight * core_lon + tuning.peak_weight * peak_lon,
        ),
        None => (core_lat, core_lon),
    };

    let mut lat_dists: Vec<f64> = points.iter().map(|p| (p.lat - center_lat).abs()).collect();
    let mut lon_dists: Vec<f64> = points.iter().map(|p| (p.lon - center_lon).abs()).collect();
    lat_dists.sort_by(f64::total_cmp);
    lon_dists.sort_by(f64::total_cmp);
    let percentile = ((n * tuning.coverage) as usize).min(points.len() - 1);

    let mut lat_span = 2.0 * lat_dists[percentile];
    let lon_span = 2.0 * lon_dists[percentile];
    if aspect_ratio > 1.0 {
        lat_span /= aspect_ratio;
    }

    let viewport = Viewport {
        center_lat,
        center_lon,
        lat_span: lat_span.max(tuning.min_span) * tuning.lat_padding,
        lon_span: lon_span.max(tuning.min_span) * tuning.lon_padding,
    }
    .with_floor(tuning.min_span);

    log::debug!(
        "viewport: center=({:.4}, {:.4}) span=({:.4}, {:.4}) from {} points",
        viewport.center_lat,
        viewport.center_lon,
        viewport.lat_span,
        viewport.lon_span,
        points.len()
    );
    Some(viewport)
}

/// Bounding-box viewport with latitude compression and padding.
///
/// A zero-width range is padded by a whole degree on each side.
#[must_use]
pub fn bounds_viewport(
    points: &[GeoPoint],
    aspect_ratio: f64,
    tuning: &ViewportTuning,
) -> Option<Viewport> {
    let first = points.first()?;
    let (mut min_lat, mut max_lat, mut min_lon, mut max_lon) =
        (first.lat, first.lat, first.lon, first.lon);
    for p in &points[1..] {
        min_lat = min_lat.min(p.lat);
        max_lat = max_lat.max(p.lat);
        min_lon = min_lon.min(p.lon);
        max_lon = max_lon.max(p.lon);
    }

    if aspect_ratio > 1.0 {
        let reduction = (max_lat - min_lat) * (1.0 - 1.0 / aspect_ratio) * 0.5;
        min_lat += reduction;
        max_lat -= reduction;
    }

    let pad = |range: f64| {
        let padding = range * tuning.bounds_padding;
        if padding == 0.0 {
            1.0
        } else {
            padding
        }
    };
    let lat_pad = pad(max_lat - min_lat);
    let lon_pad = pad(max_lon - min_lon);

    Some(
        Viewport::from_bounds(
            min_lat - lat_pad,
            max_lat + lat_pad,
            min_lon - lon_pad,
            max_lon + lon_pad,
        )
        .with_floor(tuning.min_span),
    )
}

/// Midpoint of the most populated bucket of a `grid_size²` grid over the
/// bounding box. Ties go to the bucket filled first. A zero-width axis
/// collapses to its single value.
fn density_peak(points: &[GeoPoint], grid_size: usize) -> Option<(f64, f64)> {
    let grid_size = grid_size.max(1);
    let first = points.first()?;
    let (mut min_lat, mut max_lat, mut min_lon, mut max_lon) =
        (first.lat, first.lat, first.lon, first.lon);
    for p in points {
        min_lat = min_lat.min(p.lat);
        max_lat = max_lat.max(p.lat);
        min_lon = min_lon.min(p.lon);
        max_lon = max_lon.max(p.lon);
    }

    let step = |lo: f64, hi: f64| if hi > lo { (hi - lo) / grid_size as f64 } else { 1.0 };
    let lat_step = step(min_lat, max_lat);
    let lon_step = step(min_lon, max_lon);
    let bucket = |v: f64, lo: f64, s: f64| (((v - lo) / s) as usize).min(grid_size - 1);

    let mut counts = vec![0u32; grid_size * grid_size];
    let mut first_seen = Vec::new();
    for p in points {
        let key = bucket(p.lat, min_lat, lat_step) * grid_size + bucket(p.lon, min_lon, lon_step);
        if counts[key] == 0 {
            first_seen.push(key);
        }
        counts[key] += 1;
    }

    let mut best: Option<usize> = None;
    for key in first_seen {
        if best.map_or(true, |b| counts[key] > counts[b]) {
            best = Some(key);
        }
    }
    let key = best?;
    let (lat_idx, lon_idx) = (key / grid_size, key % grid_size);
    let midpoint = |lo: f64, hi: f64, idx: usize, s: f64| {
        if hi > lo {
            lo + (idx as f64 + 0.5) * s
        } else {
            lo
        }
    };
    Some((
        midpoint(min_lat, max_lat, lat_idx, lat_step),
        midpoint(min_lon, max_lon, lon_idx, lon_step),
    ))
}

/// Linear lat/lon → cell mapping for one canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    min_lat: f64,
    min_lon: f64,
    lat_scale: f64,
    lon_scale: f64,
    height: usize,
}

/// A point projected onto the canvas, with its scaled coordinates kept for
/// sub-cell placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    /// Cell row (may be outside the canvas).
    pub row: isize,
    /// Cell column (may be outside the canvas).
    pub col: isize,
    /// Latitude offset in rows from the bottom edge.
    pub lat_scaled: f64,
    /// Longitude offset in columns from the left edge.
    pub lon_scaled: f64,
}

impl Projected {
    /// Braille dot row: higher latitude within the cell lands on higher dots.
    #[must_use]
    pub fn braille_sub_row(&self) -> usize {
        3 - ((self.lat_scaled * 4.0).floor() as i64).rem_euclid(4) as usize
    }

    /// Braille dot column.
    #[must_use]
    pub fn braille_sub_col(&self) -> usize {
        ((self.lon_scaled * 2.0).floor() as i64).rem_euclid(2) as usize
    }

    /// True if the point falls in the upper half of its cell.
    #[must_use]
    pub fn in_upper_half(&self) -> bool {
        (self.lat_scaled * 2.0).rem_euclid(2.0) >= 1.0
    }
}

impl Projection {
    /// Fit `viewport` onto a `width × height` canvas.
    #[must_use]
    pub fn new(viewport: &Viewport, width: usize, height: usize) -> Self {
        let height = height.max(1);
        let width = width.max(1);
        Self {
            min_lat: viewport.min_lat(),
            min_lon: viewport.min_lon(),
            lat_scale: (height - 1) as f64 / viewport.lat_span,
            lon_scale: (width - 1) as f64 / viewport.lon_span,
            height,
        }
    }

    /// Project one coordinate pair.
    #[must_use]
    pub fn project(&self, lat: f64, lon: f64) -> Projected {
        let lat_scaled = (lat - self.min_lat) * self.lat_scale;
        let lon_scaled = (lon - self.min_lon) * self.lon_scale;
        Projected {
            row: (self.height - 1) as isize - lat_scaled.floor() as isize,
            col: lon_scaled.floor() as isize,
            lat_scaled,
            lon_scaled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn pts(coords: &[(f64, f64)]) -> Vec<GeoPoint> {
        coords.iter().map(|&(lat, lon)| GeoPoint::new(lat, lon)).collect()
    }

    #[test]
    fn test_empty_points_have_no_viewport() {
        let tuning = ViewportTuning::default();
        assert!(select_viewport(&[], 2.0, &tuning).is_none());
        assert!(bounds_viewport(&[], 2.0, &tuning).is_none());
    }

    #[test]
    fn test_dense_core_wins_over_outlier() {
        let points = pts(&[(40.0, -74.0), (40.01, -74.01), (51.5, -0.12)]);
        let vp = select_viewport(&points, 2.0, &ViewportTuning::default())
            .expect("viewport should succeed");

        let to_nyc = (vp.center_lat - 40.0).abs() + (vp.center_lon + 74.0).abs();
        let to_london = (vp.center_lat - 51.5).abs() + (vp.center_lon + 0.12).abs();
        assert!(to_nyc < to_london, "center {vp:?} should sit near the NYC pair");
        assert!(vp.center_lon < -60.0);
    }

    #[test]
    fn test_bounds_fallback_for_two_points() {
        let points = pts(&[(10.0, 20.0), (20.0, 40.0)]);
        let vp = select_viewport(&points, 2.0, &ViewportTuning::default())
            .expect("viewport should succeed");

        // latitude 10..20 compressed to 12.5..17.5, then padded by 0.5
        assert_relative_eq!(vp.min_lat(), 12.0, epsilon = 1e-9);
        assert_relative_eq!(vp.max_lat(), 18.0, epsilon = 1e-9);
        assert_relative_eq!(vp.min_lon(), 18.0, epsilon = 1e-9);
        assert_relative_eq!(vp.max_lon(), 42.0, epsilon = 1e-9);
    }

    #[test]
    fn test_bounds_single_point_pads_by_one_degree() {
        let vp = bounds_viewport(&pts(&[(5.0, 5.0)]), 2.0, &ViewportTuning::default())
            .expect("viewport should succeed");
        assert_relative_eq!(vp.lat_span, 2.0);
        assert_relative_eq!(vp.lon_span, 2.0);
        assert_relative_eq!(vp.center_lat, 5.0);
    }

    #[test]
    fn test_density_peak_prefers_crowded_bucket() {
        let points = pts(&[(0.0, 0.0), (10.0, 10.0), (10.0, 10.0)]);
        let (lat, lon) = density_peak(&points, 40).expect("peak should succeed");
        assert!(lat > 9.0 && lon > 9.0);
    }

    #[test]
    fn test_projection_corners() {
        let vp = Viewport {
            center_lat: 5.0,
            center_lon: 5.0,
            lat_span: 10.0,
            lon_span: 10.0,
        };
        let proj = Projection::new(&vp, 11, 11);

        let sw = proj.project(0.0, 0.0);
        assert_eq!((sw.row, sw.col), (10, 0));
        let ne = proj.project(10.0, 10.0);
        assert_eq!((ne.row, ne.col), (0, 10));
        let outside = proj.project(-1.0, 11.0);
        assert_eq!((outside.row, outside.col), (11, 11));
    }

    #[test]
    fn test_sub_cell_positions() {
        let p = Projected {
            row: 0,
            col: 0,
            lat_scaled: 0.9,
            lon_scaled: 0.6,
        };
        assert_eq!(p.braille_sub_row(), 0);
        assert_eq!(p.braille_sub_col(), 1);
        assert!(p.in_upper_half());

        let low = Projected {
            lat_scaled: 0.1,
            lon_scaled: 0.1,
            ..p
        };
        assert_eq!(low.braille_sub_row(), 3);
        assert_eq!(low.braille_sub_col(), 0);
        assert!(!low.in_upper_half());
    }

    proptest! {
        #[test]
        fn prop_identical_points_respect_span_floor(
            lat in -80.0f64..80.0,
            lon in -170.0f64..170.0,
            n in 1usize..12,
        ) {
            let points = vec![GeoPoint::new(lat, lon); n];
            let tuning = ViewportTuning::default();
            let vp = select_viewport(&points, 2.0, &tuning).expect("viewport should succeed");
            prop_assert!(vp.lat_span >= tuning.min_span);
            prop_assert!(vp.lon_span >= tuning.min_span);
            prop_assert!(vp.lat_span.is_finite() && vp.lon_span.is_finite());
        }
    }
}
