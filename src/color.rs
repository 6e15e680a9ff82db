//! Color types and color resolution.
//!
//! All output is 24-bit true color, so colors are plain RGB triples.
//! Named colors approximate the bright ANSI palette most terminals ship with,
//! letting a `color` column of `"red"` or `"#e74c3c"` resolve to the same
//! kind of value.

/// RGB color with 8-bit components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    /// Red component (0-255).
    pub r: u8,
    /// Green component (0-255).
    pub g: u8,
    /// Blue component (0-255).
    pub b: u8,
}

impl Rgb {
    /// Black.
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// White.
    pub const WHITE: Self = Self::new(255, 255, 255);
    /// Pure red.
    pub const RED: Self = Self::new(255, 0, 0);
    /// Pure green.
    pub const GREEN: Self = Self::new(0, 255, 0);
    /// Pure blue.
    pub const BLUE: Self = Self::new(0, 0, 255);
    /// Pure yellow.
    pub const YELLOW: Self = Self::new(255, 255, 0);
    /// Dim gray used for empty cells and secondary labels.
    pub const DIM_GRAY: Self = Self::new(128, 128, 128);

    /// Create a new RGB color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear interpolation between two colors.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let inv_t = 1.0 - t;

        Self::new(
            (f32::from(self.r) * inv_t + f32::from(other.r) * t) as u8,
            (f32::from(self.g) * inv_t + f32::from(other.g) * t) as u8,
            (f32::from(self.b) * inv_t + f32::from(other.b) * t) as u8,
        )
    }

    /// Parse a `#rrggbb` or `rrggbb` hex string.
    ///
    /// Returns `None` for anything else; callers treat that as "no color".
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Look up a named color (case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        NAMED_COLORS
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|&(_, color)| color)
    }
}

/// Named colors understood in `color` columns, mapped to true-color values
/// close to the bright ANSI palette.
const NAMED_COLORS: &[(&str, Rgb)] = &[
    ("red", Rgb::new(255, 85, 85)),
    ("green", Rgb::new(85, 255, 85)),
    ("yellow", Rgb::new(255, 255, 85)),
    ("blue", Rgb::new(85, 85, 255)),
    ("magenta", Rgb::new(255, 85, 255)),
    ("cyan", Rgb::new(85, 255, 255)),
    ("white", Rgb::new(255, 255, 255)),
    ("orange", Rgb::new(255, 135, 0)),
    ("purple", Rgb::new(175, 135, 255)),
    ("pink", Rgb::new(255, 135, 255)),
    ("brown", Rgb::new(175, 95, 0)),
    ("gray", Rgb::new(128, 128, 128)),
    ("grey", Rgb::new(128, 128, 128)),
];

/// Resolve a user-supplied color: a known name first, then a hex string.
#[must_use]
pub fn resolve_color(spec: &str) -> Option<Rgb> {
    Rgb::from_name(spec).or_else(|| Rgb::from_hex(spec))
}

/// HSV color with floating-point components.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hsv {
    /// Hue as a fraction of a full turn (0.0-1.0).
    pub h: f32,
    /// Saturation (0.0-1.0).
    pub s: f32,
    /// Value (0.0-1.0).
    pub v: f32,
}

impl Hsv {
    /// Create a new HSV color.
    #[must_use]
    pub const fn new(h: f32, s: f32, v: f32) -> Self {
        Self { h, s, v }
    }

    /// Convert to RGB.
    #[must_use]
    pub fn to_rgb(self) -> Rgb {
        let sector = (self.h * 6.0).floor();
        let f = self.h * 6.0 - sector;
        let p = self.v * (1.0 - self.s);
        let q = self.v * (1.0 - f * self.s);
        let t = self.v * (1.0 - (1.0 - f) * self.s);

        let (r, g, b) = match (sector as i32).rem_euclid(6) {
            0 => (self.v, t, p),
            1 => (q, self.v, p),
            2 => (p, self.v, t),
            3 => (p, q, self.v),
            4 => (t, p, self.v),
            _ => (self.v, p, q),
        };

        Rgb::new((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
    }
}

impl From<Hsv> for Rgb {
    fn from(hsv: Hsv) -> Self {
        hsv.to_rgb()
    }
}
