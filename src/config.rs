//! YAML configuration and command-line value parsing.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::palette::ColorScheme;
use crate::plots::MapOptions;
use crate::viewport::ViewportTuning;

/// A width or height: a cell count or a percentage of the terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DimensionSpec {
    /// Absolute size in cells.
    Cells(u16),
    /// `"80%"` or `"100"`.
    Text(String),
}

impl DimensionSpec {
    /// Resolve against the terminal dimension.
    pub fn resolve(&self, terminal: u16) -> Result<u16> {
        match self {
            Self::Cells(0) => Err(Error::InvalidDimension("0".to_string())),
            Self::Cells(n) => Ok(*n),
            Self::Text(text) => parse_dimension(text, terminal),
        }
    }
}

/// Defaults shared by every chart type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDefaults {
    /// Output width; terminal width when unset.
    #[serde(default)]
    pub width: Option<DimensionSpec>,
    /// Output height; terminal height when unset.
    #[serde(default)]
    pub height: Option<DimensionSpec>,
    /// Palette name for categorical charts.
    #[serde(default = "default_color_scheme")]
    pub color_scheme: String,
    /// Append legends.
    #[serde(default = "default_true")]
    pub show_legend: bool,
    /// Print values inside matrix cells.
    #[serde(default)]
    pub show_values: bool,
    /// Size pies from the terminal.
    #[serde(default = "default_true")]
    pub auto_size: bool,
}

fn default_color_scheme() -> String {
    "distinct".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ChartDefaults {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            color_scheme: default_color_scheme(),
            show_legend: true,
            show_values: false,
            auto_size: true,
        }
    }
}

impl ChartDefaults {
    /// Parsed palette; unknown names fall back to distinct.
    #[must_use]
    pub fn scheme(&self) -> ColorScheme {
        ColorScheme::from_name(&self.color_scheme)
    }
}

/// Map renderer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSection {
    /// Character height / width ratio.
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: f64,
    /// Density-adaptive viewport.
    #[serde(default = "default_true")]
    pub center_on_density: bool,
    /// Cluster radius in cells.
    #[serde(default = "default_cluster_threshold")]
    pub cluster_threshold: f64,
    /// Viewport constants (`coverage`, `core_weight`, `min_span`, ...).
    #[serde(flatten)]
    pub tuning: ViewportTuning,
}

fn default_aspect_ratio() -> f64 {
    2.0
}

fn default_cluster_threshold() -> f64 {
    2.0
}

impl Default for MapSection {
    fn default() -> Self {
        Self {
            aspect_ratio: default_aspect_ratio(),
            center_on_density: true,
            cluster_threshold: default_cluster_threshold(),
            tuning: ViewportTuning::default(),
        }
    }
}

/// Live refresh settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefreshSection {
    /// `"5s"`, `"1m"`, ...; empty renders once.
    #[serde(default)]
    pub interval: String,
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Chart-independent defaults.
    #[serde(default)]
    pub chart_defaults: ChartDefaults,
    /// Map settings.
    #[serde(default)]
    pub map: MapSection,
    /// Refresh settings.
    #[serde(default)]
    pub refresh: RefreshSection,
}

impl Config {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a YAML file.
    ///
    /// A missing file is [`Error::ConfigNotFound`]; any other read failure is
    /// [`Error::Io`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::ConfigNotFound(path.display().to_string()),
            _ => Error::Io(e),
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error with line number if parsing fails.
    pub fn parse(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml_ng::from_str(yaml).map_err(|e| {
            let line = e.location().map_or(0, |l| l.line());
            Error::ConfigParse {
                line,
                message: e.to_string(),
            }
        })
    }

    /// Loads configuration with fallback to defaults.
    #[must_use]
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(Error::ConfigNotFound(_)) => Self::default(),
            Err(e) => {
                log::warn!("ignoring config: {e}");
                Self::default()
            }
        }
    }

    /// `<config_dir>/cheshire/cheshire.yaml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("cheshire").join("cheshire.yaml"))
    }

    /// Refresh interval.
    pub fn refresh_interval(&self) -> Result<Duration> {
        parse_interval(&self.refresh.interval)
    }

    /// Map options seeded from the `map` section.
    #[must_use]
    pub fn map_options(&self) -> MapOptions {
        MapOptions::new()
            .aspect_ratio(self.map.aspect_ratio)
            .center_on_density(self.map.center_on_density)
            .cluster_threshold(self.map.cluster_threshold)
            .tuning(self.map.tuning)
            .show_legend(self.chart_defaults.show_legend)
    }
}

/// Parse a width/height: `"80%"` of `terminal`, or a positive integer.
pub fn parse_dimension(value: &str, terminal: u16) -> Result<u16> {
    let value = value.trim();
    let invalid = || Error::InvalidDimension(value.to_string());

    if let Some(pct) = value.strip_suffix('%') {
        let pct: f64 = pct.trim().parse().map_err(|_| invalid())?;
        if !(pct > 0.0 && pct <= 100.0) {
            return Err(invalid());
        }
        return Ok(((f64::from(terminal) * pct / 100.0) as u16).max(1));
    }

    match value.parse::<u16>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(invalid()),
    }
}

/// Parse a refresh interval: `s`, `m` or `h` suffix, a bare number of
/// seconds, or empty for zero.
pub fn parse_interval(value: &str) -> Result<Duration> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(Duration::ZERO);
    }
    let invalid = || Error::InvalidInterval(value.to_string());

    let (number, multiplier) = match value.chars().last() {
        Some('s') => (&value[..value.len() - 1], 1.0),
        Some('m') => (&value[..value.len() - 1], 60.0),
        Some('h') => (&value[..value.len() - 1], 3600.0),
        _ => (value, 1.0),
    };
    let seconds: f64 = number.trim().parse().map_err(|_| invalid())?;
    Duration::try_from_secs_f64(seconds * multiplier).map_err(|_| invalid())
}
