//! Proximity clustering of projected map points.

use crate::geometry::CellPoint;

/// A group of nearby projected points.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    /// Member positions in input order.
    pub members: Vec<CellPoint>,
    /// Mean member position.
    pub centroid: CellPoint,
}

impl Cluster {
    /// Number of members.
    #[must_use]
    pub fn size(&self) -> usize {
        self.members.len()
    }

    /// Size-coded marker glyph.
    #[must_use]
    pub fn glyph(&self) -> char {
        match self.size() {
            0..=4 => '•',
            5..=9 => '◉',
            10..=19 => '◎',
            _ => '⊕',
        }
    }

    /// Whether the size is printed next to the marker.
    #[must_use]
    pub fn is_labelled(&self) -> bool {
        self.size() >= 10
    }
}

/// Single-pass greedy grouping.
///
/// Points are visited in order; each unvisited point seeds a cluster and
/// absorbs every later unvisited point within `threshold` of the seed.
#[must_use]
pub fn identify_clusters(points: &[CellPoint], threshold: f64) -> Vec<Cluster> {
    let mut visited = vec![false; points.len()];
    let mut clusters = Vec::new();

    for (i, &seed) in points.iter().enumerate() {
        if visited[i] {
            continue;
        }
        visited[i] = true;
        let mut members = vec![seed];

        for (j, &other) in points.iter().enumerate().skip(i + 1) {
            if !visited[j] && seed.distance(other) <= threshold {
                visited[j] = true;
                members.push(other);
            }
        }

        let centroid = CellPoint::centroid(&members).unwrap_or(seed);
        clusters.push(Cluster { members, centroid });
    }

    log::trace!("{} points grouped into {} clusters", points.len(), clusters.len());
    clusters
}
