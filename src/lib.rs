//! # Cheshire-Render
//!
//! Terminal rendering engine for query results.
//!
//! Turns already-extracted column arrays into strings of Unicode glyphs and
//! 24-bit ANSI color escapes: Braille and block maps with a density-adaptive
//! viewport, pie charts, waffle charts and gauges, and matrix heatmaps.
//! Renderers are pure functions; the caller prints the result.
//!
//! ## Quick Start
//!
//! ```rust
//! use cheshire_render::prelude::*;
//!
//! let points = vec![
//!     GeoPoint::new(40.71, -74.00),
//!     GeoPoint::new(40.73, -73.99).with_label("red"),
//!     GeoPoint::new(40.75, -73.98),
//! ];
//! let map = render_map(&points, MapMode::Points, &MapOptions::new().size(60, 16));
//! assert!(map.contains('┌'));
//!
//! let pie = render_pie(&[3.0, 1.0], &["a".into(), "b".into()], &PieOptions::new());
//! assert!(pie.contains("75.0%"));
//! ```
//!
//! ## Chart Types
//!
//! - **Map**: points, blocks, density, heatmap, clusters, block and Braille heatmaps
//! - **Pie**: filled disc with an anti-aliased Braille rim
//! - **Waffle / Gauge**: proportional cell grids
//! - **Matrix**: pivoted heatmap with a color scale legend

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only
#![cfg_attr(test, allow(clippy::unwrap_used))]
// Allow common patterns in terminal rendering code
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Core Modules
// ============================================================================

/// Color types and named/hex color resolution.
pub mod color;

/// Categorical palettes and label-to-color assignment.
pub mod palette;

/// Normalization and color gradients.
pub mod scale;

/// Character-cell canvas with Braille and half-block sub-cell plotting.
pub mod canvas;

/// Geographic and cell-space points.
pub mod geometry;

// ============================================================================
// Map Support
// ============================================================================

/// Density-adaptive viewport selection and projection.
pub mod viewport;

/// Weighted density grids with neighbour smoothing.
pub mod density;

/// Greedy proximity clustering in cell space.
pub mod cluster;

// ============================================================================
// Visualization Modules
// ============================================================================

/// Chart renderers (map, pie, waffle, gauge, matrix).
pub mod plots;

/// Terminal encoding (ANSI escapes, number formatting).
pub mod output;

// ============================================================================
// Integration Modules
// ============================================================================

/// Row ingestion from query results.
pub mod data;

/// YAML configuration and dimension/interval parsing.
pub mod config;

/// Live refresh loop.
pub mod refresh;

// ============================================================================
// Error Types
// ============================================================================

/// Error types for cheshire-render operations.
pub mod error;

pub use error::{Error, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and traits for convenient imports.
///
/// ```rust
/// use cheshire_render::prelude::*;
/// ```
pub mod prelude {
    pub use batuta_common::display::WithDimensions;
    pub use crate::color::Rgb;
    pub use crate::error::{Error, Result};
    pub use crate::geometry::GeoPoint;
    pub use crate::palette::ColorScheme;
    pub use crate::plots::{
        render_gauge, render_map, render_matrix, render_pie, render_waffle, AxisKey, GaugeOptions, MapMode,
        MapOptions, MatrixOptions, PieOptions, WaffleOptions,
    };
    pub use crate::scale::Gradient;
    pub use crate::viewport::{Viewport, ViewportTuning};
}

// ============================================================================
// Re-exports
// ============================================================================

/// Re-export trueno for direct access to SIMD operations.
pub use trueno;
