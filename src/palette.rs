//! Categorical palettes.
//!
//! Part-of-whole charts color categories by index through a [`ColorScheme`];
//! map points color by label through a [`LabelPalette`]. Both are read-only
//! values built per render call.

use std::collections::HashMap;

use crate::color::{resolve_color, Hsv, Rgb};
use crate::scale::Gradient;

/// Curated colors that stay distinguishable next to each other.
pub const DISTINCT: [Rgb; 16] = [
    Rgb::new(26, 188, 156),  // turquoise
    Rgb::new(52, 152, 219),  // blue
    Rgb::new(155, 89, 182),  // purple
    Rgb::new(231, 76, 60),   // red
    Rgb::new(230, 126, 34),  // orange
    Rgb::new(241, 196, 15),  // yellow
    Rgb::new(46, 204, 113),  // green
    Rgb::new(149, 165, 166), // gray
    Rgb::new(52, 73, 94),    // dark blue
    Rgb::new(192, 57, 43),   // dark red
    Rgb::new(142, 68, 173),  // dark purple
    Rgb::new(39, 174, 96),   // dark green
    Rgb::new(243, 156, 18),  // dark yellow
    Rgb::new(211, 84, 0),    // dark orange
    Rgb::new(41, 128, 185),  // medium blue
    Rgb::new(127, 140, 141), // medium gray
];

/// Base color for the monochrome scheme.
const MONOCHROME_BASE: Rgb = Rgb::new(52, 152, 219);

/// Colors handed out to unrecognised point labels, in first-seen order.
const AUTO_LABEL_COLORS: [&str; 8] = [
    "red", "green", "yellow", "blue", "magenta", "cyan", "orange", "purple",
];

/// Category color scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorScheme {
    /// Fixed curated list, cycled when categories outnumber it.
    #[default]
    Distinct,
    /// Green → yellow → red spread across the categories.
    Gradient,
    /// Shades of one blue, dark to light.
    Monochrome,
    /// Full-saturation hue sweep.
    Rainbow,
    /// Soft hue sweep.
    Pastel,
}

impl ColorScheme {
    /// Parse a scheme by name; unknown names fall back to [`ColorScheme::Distinct`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "gradient" => Self::Gradient,
            "monochrome" => Self::Monochrome,
            "rainbow" => Self::Rainbow,
            "pastel" => Self::Pastel,
            _ => Self::Distinct,
        }
    }

    /// Generate `n` colors.
    #[must_use]
    pub fn colors(self, n: usize) -> Vec<Rgb> {
        let spread = |i: usize| i as f32 / n.saturating_sub(1).max(1) as f32;
        let sweep = |i: usize| i as f32 / n.max(1) as f32;

        (0..n)
            .map(|i| match self {
                Self::Distinct => DISTINCT[i % DISTINCT.len()],
                Self::Gradient => Gradient::GreenYellowRed.color_at(f64::from(spread(i))),
                Self::Monochrome => Rgb::BLACK.lerp(MONOCHROME_BASE, 0.3 + 0.7 * spread(i)),
                Self::Rainbow => Hsv::new(sweep(i), 1.0, 1.0).to_rgb(),
                Self::Pastel => Hsv::new(sweep(i), 0.5, 0.95).to_rgb(),
            })
            .collect()
    }
}

/// Pick category colors: custom colors win when they cover every category.
#[must_use]
pub fn category_colors(n: usize, scheme: ColorScheme, custom: Option<&[Rgb]>) -> Vec<Rgb> {
    match custom {
        Some(custom) if custom.len() >= n => custom[..n].to_vec(),
        _ => scheme.colors(n),
    }
}

/// Maps point labels to colors.
///
/// Labels naming a color (`"red"`, `"#ff8800"`) use it directly; any other
/// label receives the next automatic color the first time it is seen.
#[derive(Debug, Clone, Default)]
pub struct LabelPalette {
    assigned: HashMap<String, Rgb>,
}

impl LabelPalette {
    /// Build a palette from labels in input order.
    pub fn from_labels<'a, I>(labels: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut assigned: HashMap<String, Rgb> = HashMap::new();
        for label in labels {
            if label.is_empty() || resolve_color(label).is_some() || assigned.contains_key(label) {
                continue;
            }
            let name = AUTO_LABEL_COLORS[assigned.len() % AUTO_LABEL_COLORS.len()];
            if let Some(color) = Rgb::from_name(name) {
                assigned.insert(label.to_string(), color);
            }
        }
        Self { assigned }
    }

    /// Color for a label, if it resolves to one.
    #[must_use]
    pub fn color_for(&self, label: &str) -> Option<Rgb> {
        if label.is_empty() {
            return None;
        }
        resolve_color(label).or_else(|| self.assigned.get(label).copied())
    }

    /// Number of labels that received an automatic color.
    #[must_use]
    pub fn auto_assigned(&self) -> usize {
        self.assigned.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_from_name_falls_back() {
        assert_eq!(ColorScheme::from_name("Monochrome"), ColorScheme::Monochrome);
        assert_eq!(ColorScheme::from_name("sparkly"), ColorScheme::Distinct);
    }

    #[test]
    fn test_distinct_cycles() {
        let colors = ColorScheme::Distinct.colors(20);
        assert_eq!(colors.len(), 20);
        assert_eq!(colors[16], colors[0]);
        assert_eq!(colors[19], colors[3]);
    }

    #[test]
    fn test_gradient_runs_green_to_red() {
        let colors = ColorScheme::Gradient.colors(3);
        assert_eq!(colors[0], Rgb::new(0, 255, 0));
        assert_eq!(colors[1], Rgb::new(255, 255, 0));
        assert_eq!(colors[2], Rgb::new(255, 0, 0));
    }

    #[test]
    fn test_monochrome_brightens() {
        let colors = ColorScheme::Monochrome.colors(4);
        assert!(colors[0].b < colors[3].b);
        assert_eq!(colors[3], MONOCHROME_BASE);
    }

    #[test]
    fn test_single_category_schemes() {
        for scheme in [
            ColorScheme::Distinct,
            ColorScheme::Gradient,
            ColorScheme::Monochrome,
            ColorScheme::Rainbow,
            ColorScheme::Pastel,
        ] {
            assert_eq!(scheme.colors(1).len(), 1, "scheme {scheme:?}");
        }
    }

    #[test]
    fn test_custom_colors_need_full_coverage() {
        let custom = [Rgb::RED, Rgb::BLUE];
        assert_eq!(category_colors(2, ColorScheme::Distinct, Some(&custom)), custom.to_vec());
        assert_eq!(
            category_colors(3, ColorScheme::Distinct, Some(&custom)),
            ColorScheme::Distinct.colors(3)
        );
    }

    #[test]
    fn test_label_palette_first_seen_order() {
        let palette = LabelPalette::from_labels(["store", "red", "depot", "store"]);
        assert_eq!(palette.auto_assigned(), 2);
        assert_eq!(palette.color_for("store"), Rgb::from_name("red"));
        assert_eq!(palette.color_for("depot"), Rgb::from_name("green"));
        assert_eq!(palette.color_for("red"), Rgb::from_name("red"));
        assert_eq!(palette.color_for(""), None);
        assert_eq!(palette.color_for("unseen"), None);
    }
}
