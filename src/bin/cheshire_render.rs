//! cheshire-render - draw query results in the terminal.
//!
//! Reads a JSON array of row objects (from a file or stdin) and renders it
//! as a map, pie, waffle, gauge or matrix heatmap, optionally re-rendering
//! on an interval.

use std::io::{self, Read};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use batuta_common::display::WithDimensions;
use clap::Parser;

use cheshire_render::config::{parse_dimension, parse_interval, Config, DimensionSpec};
use cheshire_render::data::{
    extract_gauge, extract_matrix, extract_proportions, records_from_json, ChartRows, Record, PIE_KEYWORDS,
    WAFFLE_KEYWORDS,
};
use cheshire_render::error::{Error, Result};
use cheshire_render::palette::ColorScheme;
use cheshire_render::plots::{
    render_gauge, render_map, render_matrix, render_pie, render_waffle, GaugeOptions, MapMode, MatrixOptions,
    PieOptions, WaffleOptions, NO_DATA,
};
use cheshire_render::refresh::{RefreshLoop, StopFlag};

#[derive(Parser)]
#[command(name = "cheshire-render")]
#[command(about = "Render query results as terminal charts")]
#[command(version)]
struct Cli {
    /// JSON rows to render: a file path, or "-" for stdin
    #[arg(long, default_value = "-")]
    input: String,

    /// Chart type: map, map_points, map_blocks, map_density, map_heatmap,
    /// map_clusters, map_blocks_heatmap, map_braille_heatmap, pie, waffle,
    /// gauge or matrix
    #[arg(long, default_value = "map")]
    chart: String,

    /// Refresh interval ("5s", "1m", "0.5h"); render once when omitted
    interval: Option<String>,

    /// Configuration file (defaults to <config_dir>/cheshire/cheshire.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Width in cells or percent of the terminal ("80%")
    #[arg(long)]
    width: Option<String>,

    /// Height in rows or percent of the terminal ("50%")
    #[arg(long)]
    height: Option<String>,

    /// Chart title
    #[arg(long)]
    title: Option<String>,

    /// Palette: distinct, gradient, monochrome, rainbow or pastel
    #[arg(long)]
    color_scheme: Option<String>,

    /// Print values inside matrix cells
    #[arg(long)]
    show_values: bool,

    /// Verbose logging on stderr
    #[arg(long)]
    debug: bool,
}

/// Chart selected by `--chart`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChartKind {
    Map(MapMode),
    Pie,
    Waffle,
    Gauge,
    Matrix,
}

impl FromStr for ChartKind {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        let lower = name.trim().to_ascii_lowercase();
        match lower.as_str() {
            "pie" => Ok(Self::Pie),
            "waffle" => Ok(Self::Waffle),
            "gauge" => Ok(Self::Gauge),
            "matrix" | "matrix_heatmap" => Ok(Self::Matrix),
            "map" => Ok(Self::Map(MapMode::Points)),
            other if other.starts_with("map_") || other.starts_with("map-") => {
                let mode = MapMode::from_name(other);
                if mode.as_str() == other.replace('-', "_").trim_start_matches("map_") {
                    Ok(Self::Map(mode))
                } else {
                    Err(Error::UnknownChart(name.to_string()))
                }
            }
            _ => Err(Error::UnknownChart(name.to_string())),
        }
    }
}

/// Resolved output size; `None` leaves the chart's own default.
#[derive(Debug, Clone, Copy)]
struct Size {
    terminal: (u16, u16),
    width: Option<u16>,
    height: Option<u16>,
}

impl Size {
    fn width_or_terminal(&self) -> u16 {
        self.width.unwrap_or(self.terminal.0)
    }

    fn height_or(&self, fallback: u16) -> u16 {
        self.height.unwrap_or(fallback)
    }

    fn explicit(&self) -> Option<(u32, u32)> {
        match (self.width, self.height) {
            (None, None) => None,
            (w, h) => Some((u32::from(w.unwrap_or(self.terminal.0)), u32::from(h.unwrap_or(self.terminal.1)))),
        }
    }
}

/// Terminal size from the tty, then `COLUMNS`/`LINES`, then 80×24.
fn terminal_size() -> (u16, u16) {
    size_or_fallback(crossterm::terminal::size(), |var| std::env::var(var).ok())
}

fn size_or_fallback(queried: io::Result<(u16, u16)>, env: impl Fn(&str) -> Option<String>) -> (u16, u16) {
    match queried {
        Ok((cols, rows)) if cols > 0 && rows > 0 => return (cols, rows),
        Ok(size) => log::debug!("terminal reported {size:?}, using fallback"),
        Err(e) => log::debug!("terminal size unavailable: {e}"),
    }
    let read = |var: &str, fallback: u16| {
        env(var).and_then(|v| v.trim().parse::<u16>().ok()).filter(|&n| n > 0).unwrap_or(fallback)
    };
    (read("COLUMNS", 80), read("LINES", 24))
}

fn resolve_dimension(cli: Option<&str>, config: Option<&DimensionSpec>, terminal: u16) -> Result<Option<u16>> {
    match (cli, config) {
        (Some(text), _) => parse_dimension(text, terminal).map(Some),
        (None, Some(spec)) => spec.resolve(terminal).map(Some),
        (None, None) => Ok(None),
    }
}

fn read_rows(input: &str) -> Result<Vec<Record>> {
    let text = if input == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(input).map_err(|e| Error::Source(format!("{input}: {e}")))?
    };
    records_from_json(&text)
}

struct Renderer {
    kind: ChartKind,
    config: Config,
    size: Size,
    title: Option<String>,
    scheme: ColorScheme,
    show_values: bool,
}

impl Renderer {
    fn render(&self, records: &[Record]) -> String {
        match self.kind {
            ChartKind::Map(mode) => self.map(records, mode),
            ChartKind::Pie => self.pie(records),
            ChartKind::Waffle => self.waffle(records),
            ChartKind::Gauge => self.gauge(records),
            ChartKind::Matrix => self.matrix(records),
        }
    }

    fn map(&self, records: &[Record], mode: MapMode) -> String {
        let points = ChartRows::from_records(records).points();
        let mut options = self.config.map_options();
        // keep the prompt line visible below the map
        let height = self.size.height_or(self.size.terminal.1.saturating_sub(2).max(3));
        options.set_dimensions(u32::from(self.size.width_or_terminal()), u32::from(height));
        options.title.clone_from(&self.title);
        render_map(&points, mode, &options)
    }

    fn pie(&self, records: &[Record]) -> String {
        let data = extract_proportions(records, PIE_KEYWORDS);
        let mut options = PieOptions::new().color_scheme(self.scheme).show_legend(self.config.chart_defaults.show_legend);
        options.auto_size = self.config.chart_defaults.auto_size;
        options.set_dimensions(u32::from(self.size.width_or_terminal()), u32::from(self.size.height_or(self.size.terminal.1)));
        options.title.clone_from(&self.title);
        render_pie(&data.values, &data.labels, &options)
    }

    fn waffle(&self, records: &[Record]) -> String {
        let data = extract_proportions(records, WAFFLE_KEYWORDS);
        let mut options =
            WaffleOptions::new().color_scheme(self.scheme).show_legend(self.config.chart_defaults.show_legend);
        if let Some((w, h)) = self.size.explicit() {
            options.set_dimensions(w, h);
        }
        options.title.clone_from(&self.title);
        render_waffle(&data.values, &data.labels, &options)
    }

    fn gauge(&self, records: &[Record]) -> String {
        let Some((value, total)) = extract_gauge(records) else {
            return NO_DATA.to_string();
        };
        let mut options = GaugeOptions::new();
        if let Some((w, h)) = self.size.explicit() {
            options.set_dimensions(w, h);
        }
        options.title.clone_from(&self.title);
        render_gauge(value, total, &options)
    }

    fn matrix(&self, records: &[Record]) -> String {
        let data = extract_matrix(records);
        let mut options = MatrixOptions::new().show_values(self.show_values);
        if let (Some(x), Some(y)) = (&data.x_label, &data.y_label) {
            options = options.axis_labels(x.as_str(), y.as_str());
        }
        options.set_dimensions(u32::from(self.size.width_or_terminal()), u32::from(self.size.height_or(self.size.terminal.1)));
        options.title.clone_from(&self.title);
        render_matrix(&data.x, &data.y, &data.values, &options)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let config = match &cli.config {
        Some(path) => Config::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => Config::default_path().map(Config::load_or_default).unwrap_or_default(),
    };

    let kind: ChartKind = cli.chart.parse()?;
    let terminal = terminal_size();
    let defaults = &config.chart_defaults;
    let size = Size {
        terminal,
        width: resolve_dimension(cli.width.as_deref(), defaults.width.as_ref(), terminal.0)?,
        height: resolve_dimension(cli.height.as_deref(), defaults.height.as_ref(), terminal.1)?,
    };
    let interval = match &cli.interval {
        Some(text) => parse_interval(text)?,
        None => config.refresh_interval()?,
    };
    if cli.input == "-" && !interval.is_zero() {
        anyhow::bail!("a refresh interval needs --input <file>; stdin can only be read once");
    }
    log::debug!("chart {kind:?}, size {size:?}, interval {interval:?}");

    let renderer = Renderer {
        kind,
        scheme: cli.color_scheme.as_deref().map_or_else(|| defaults.scheme(), ColorScheme::from_name),
        show_values: cli.show_values || defaults.show_values,
        title: cli.title.clone(),
        size,
        config: config.clone(),
    };

    let stop = StopFlag::new();
    let handler_flag = stop.clone();
    ctrlc::set_handler(move || handler_flag.stop()).context("installing Ctrl+C handler")?;

    let refresh = RefreshLoop::new(interval, stop);
    let mut stdout = io::stdout().lock();
    refresh.run(|| read_rows(&cli.input).map(|rows| renderer.render(&rows)), &mut stdout)?;

    Ok(())
}
