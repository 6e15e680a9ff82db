//! Scale functions for value-to-color mappings.
//!
//! Values are first normalized into `[0, 1]` against an observed extent,
//! then mapped through either a continuous [`Gradient`] or the discrete
//! five-step [`DensityRamp`].

use crate::color::Rgb;

/// Linear normalization of values against a `[min, max]` extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalizer {
    min: f64,
    max: f64,
}

impl Normalizer {
    /// Create a normalizer over the given extent.
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Build a normalizer from the extent of `values`.
    ///
    /// Returns `None` for an empty slice.
    #[must_use]
    pub fn from_data(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self::new(min, max))
    }

    /// Map a value into `[0, 1]`.
    ///
    /// A degenerate extent (`min == max`) maps everything to the midpoint.
    #[must_use]
    pub fn normalize(&self, value: f64) -> f64 {
        if self.max > self.min {
            ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
        } else {
            0.5
        }
    }

    /// Get the extent as `(min, max)`.
    #[must_use]
    pub const fn extent(&self) -> (f64, f64) {
        (self.min, self.max)
    }
}

/// Continuous true-color gradients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gradient {
    /// Green → yellow → red.
    #[default]
    GreenYellowRed,
    /// Blue → white → red.
    BlueWhiteRed,
    /// Softer blue → off-white → red.
    CoolWarm,
}

impl Gradient {
    /// Parse a gradient by name; unknown names fall back to green-yellow-red.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "blue_white_red" => Self::BlueWhiteRed,
            "cool_warm" => Self::CoolWarm,
            _ => Self::GreenYellowRed,
        }
    }

    /// Color at normalized position `t` (clamped to `[0, 1]`).
    #[must_use]
    pub fn color_at(self, t: f64) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        // rise: 0 → 1 over the lower half; fall: 1 → 0 over the upper half
        let rise = t * 2.0;
        let fall = 1.0 - (t - 0.5) * 2.0;

        match self {
            Self::GreenYellowRed => {
                if t <= 0.5 {
                    Rgb::new(channel(rise * 255.0), 255, 0)
                } else {
                    Rgb::new(255, channel(fall * 255.0), 0)
                }
            }
            Self::BlueWhiteRed => {
                if t <= 0.5 {
                    let c = channel(rise * 255.0);
                    Rgb::new(c, c, 255)
                } else {
                    let c = channel(fall * 255.0);
                    Rgb::new(255, c, c)
                }
            }
            Self::CoolWarm => {
                if t <= 0.5 {
                    Rgb::new(
                        channel(rise * 255.0),
                        channel(rise * 220.0),
                        255 - channel(rise * 55.0),
                    )
                } else {
                    let warm = (t - 0.5) * 2.0;
                    Rgb::new(
                        255,
                        220 - channel(warm * 140.0),
                        200 - channel(warm * 200.0),
                    )
                }
            }
        }
    }

    /// Five evenly spaced swatches (0, 0.25, 0.5, 0.75, 1) for legends.
    #[must_use]
    pub fn swatches(self) -> [Rgb; 5] {
        [0.0, 0.25, 0.5, 0.75, 1.0].map(|t| self.color_at(t))
    }
}

fn channel(v: f64) -> u8 {
    v.clamp(0.0, 255.0) as u8
}

/// Discrete five-step ramp (blue, cyan, green, yellow, red) with shade glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DensityRamp;

impl DensityRamp {
    /// Shade glyphs from empty to full.
    pub const GLYPHS: [char; 5] = [' ', '░', '▒', '▓', '█'];

    /// Step colors from low to high density.
    pub const COLORS: [Rgb; 5] = [
        Rgb::new(85, 85, 255),
        Rgb::new(85, 255, 255),
        Rgb::new(85, 255, 85),
        Rgb::new(255, 255, 85),
        Rgb::new(255, 85, 85),
    ];

    /// Glyph for normalized density `t`.
    #[must_use]
    pub fn glyph(t: f64) -> char {
        Self::GLYPHS[Self::step(t)]
    }

    /// Color for normalized density `t`, one step per 0.2 band.
    #[must_use]
    pub fn color(t: f64) -> Rgb {
        Self::COLORS[Self::step(t)]
    }

    fn step(t: f64) -> usize {
        let t = if t.is_nan() { 0.0 } else { t.max(0.0) };
        ((t * 5.0) as usize).min(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalizer_range() {
        let n = Normalizer::new(10.0, 20.0);
        assert!((n.normalize(10.0) - 0.0).abs() < f64::EPSILON);
        assert!((n.normalize(15.0) - 0.5).abs() < f64::EPSILON);
        assert!((n.normalize(20.0) - 1.0).abs() < f64::EPSILON);
        assert!((n.normalize(30.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_normalizer_degenerate_is_midpoint() {
        let n = Normalizer::from_data(&[7.0]).expect("non-empty data should succeed");
        assert!((n.normalize(7.0) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_normalizer_empty() {
        assert!(Normalizer::from_data(&[]).is_none());
    }

    #[test]
    fn test_green_yellow_red_endpoints() {
        let g = Gradient::GreenYellowRed;
        assert_eq!(g.color_at(0.0), Rgb::new(0, 255, 0));
        assert_eq!(g.color_at(0.5), Rgb::new(255, 255, 0));
        assert_eq!(g.color_at(1.0), Rgb::new(255, 0, 0));
    }

    #[test]
    fn test_blue_white_red_endpoints() {
        let g = Gradient::BlueWhiteRed;
        assert_eq!(g.color_at(0.0), Rgb::new(0, 0, 255));
        assert_eq!(g.color_at(0.5), Rgb::WHITE);
        assert_eq!(g.color_at(1.0), Rgb::new(255, 0, 0));
    }

    #[test]
    fn test_cool_warm_endpoints() {
        let g = Gradient::CoolWarm;
        assert_eq!(g.color_at(0.0), Rgb::new(0, 0, 255));
        assert_eq!(g.color_at(0.5), Rgb::new(255, 220, 200));
        assert_eq!(g.color_at(1.0), Rgb::new(255, 80, 0));
    }

    #[test]
    fn test_gradient_from_name() {
        assert_eq!(Gradient::from_name("blue_white_red"), Gradient::BlueWhiteRed);
        assert_eq!(Gradient::from_name("cool-warm"), Gradient::CoolWarm);
        assert_eq!(Gradient::from_name("nonsense"), Gradient::GreenYellowRed);
    }

    #[test]
    fn test_gradient_clamps_input() {
        let g = Gradient::GreenYellowRed;
        assert_eq!(g.color_at(-1.0), g.color_at(0.0));
        assert_eq!(g.color_at(3.0), g.color_at(1.0));
        assert_eq!(g.color_at(f64::NAN), g.color_at(0.0));
    }

    #[test]
    fn test_density_ramp_steps() {
        assert_eq!(DensityRamp::color(0.1), DensityRamp::COLORS[0]);
        assert_eq!(DensityRamp::color(0.3), DensityRamp::COLORS[1]);
        assert_eq!(DensityRamp::color(0.99), DensityRamp::COLORS[4]);
        assert_eq!(DensityRamp::glyph(1.0), '█');
        assert_eq!(DensityRamp::glyph(0.5), '▒');
        assert_eq!(DensityRamp::glyph(0.0), ' ');
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        /// Over the upper half, red never falls and green never rises.
        #[test]
        fn prop_green_yellow_red_monotonic(a in 0.5f64..=1.0, b in 0.5f64..=1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let c_lo = Gradient::GreenYellowRed.color_at(lo);
            let c_hi = Gradient::GreenYellowRed.color_at(hi);
            prop_assert!(c_lo.r <= c_hi.r);
            prop_assert!(c_lo.g >= c_hi.g);
        }

        #[test]
        fn prop_normalize_in_unit_interval(
            min in -1e6f64..1e6,
            span in 0.0f64..1e6,
            v in -2e6f64..2e6
        ) {
            let t = Normalizer::new(min, min + span).normalize(v);
            prop_assert!((0.0..=1.0).contains(&t));
        }
    }
}
