//! Geometric primitives for map rendering.
//!
//! [`GeoPoint`] is the input unit of the map renderer; [`CellPoint`] is a
//! point already projected into canvas cell space.

/// A geographic sample with optional magnitude and color label.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Weight used by density and heatmap modes (1 when absent).
    pub value: Option<f64>,
    /// Color name, hex string or free-form category label.
    pub label: Option<String>,
}

impl GeoPoint {
    /// Create an unweighted, unlabelled point.
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            value: None,
            label: None,
        }
    }

    /// Attach a weight.
    #[must_use]
    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    /// Attach a color label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Weight contributed to density grids.
    #[must_use]
    pub fn weight(&self) -> f64 {
        self.value.unwrap_or(1.0)
    }

    /// Distance to another point with longitude scaled by `cos(lat)`.
    ///
    /// Flat-earth approximation; good enough for ranking points by spread.
    #[must_use]
    pub fn corrected_distance(&self, other_lat: f64, other_lon: f64, cos_lat: f64) -> f64 {
        let dlat = self.lat - other_lat;
        let dlon = (self.lon - other_lon) * cos_lat;
        (dlat * dlat + dlon * dlon).sqrt()
    }
}

/// A point in canvas cell coordinates (fractional).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CellPoint {
    /// Row, top to bottom.
    pub row: f64,
    /// Column, left to right.
    pub col: f64,
}

impl CellPoint {
    /// Create a new cell point.
    #[must_use]
    pub const fn new(row: f64, col: f64) -> Self {
        Self { row, col }
    }

    /// Euclidean distance in cell units.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        let dr = self.row - other.row;
        let dc = self.col - other.col;
        (dr * dr + dc * dc).sqrt()
    }

    /// Centroid of a set of points; `None` when empty.
    #[must_use]
    pub fn centroid(points: &[Self]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let n = points.len() as f64;
        let (rows, cols) = points
            .iter()
            .fold((0.0, 0.0), |(r, c), p| (r + p.row, c + p.col));
        Some(Self::new(rows / n, cols / n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_geo_point_builders() {
        let p = GeoPoint::new(1.0, 2.0).with_value(3.0).with_label("red");
        assert_relative_eq!(p.weight(), 3.0);
        assert_eq!(p.label.as_deref(), Some("red"));
        assert_relative_eq!(GeoPoint::new(0.0, 0.0).weight(), 1.0);
    }

    #[test]
    fn test_corrected_distance_shrinks_longitude() {
        let p = GeoPoint::new(60.0, 10.0);
        let cos_lat = 60f64.to_radians().cos();
        assert_relative_eq!(p.corrected_distance(60.0, 0.0, cos_lat), 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_cell_distance() {
        let a = CellPoint::new(0.0, 0.0);
        let b = CellPoint::new(3.0, 4.0);
        assert_relative_eq!(a.distance(b), 5.0);
    }

    #[test]
    fn test_centroid() {
        let pts = [CellPoint::new(0.0, 0.0), CellPoint::new(2.0, 4.0)];
        let c = CellPoint::centroid(&pts).expect("centroid should succeed");
        assert_relative_eq!(c.row, 1.0);
        assert_relative_eq!(c.col, 2.0);
        assert!(CellPoint::centroid(&[]).is_none());
    }
}
