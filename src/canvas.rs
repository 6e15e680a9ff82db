//! Character-cell canvas with sub-cell compositing.
//!
//! A [`Canvas`] owns every backing grid a render pass needs: the display
//! glyphs, their optional colors, the Braille dot masks and the half-block
//! flags. Dimensions are fixed at construction. Writes outside the grid are
//! dropped silently, which is how points outside the viewport get clipped.
//!
//! | Strategy      | Sub-cells per cell | Glyphs            |
//! |---------------|-------------------:|-------------------|
//! | Solid         | 1                  | any `char`        |
//! | Braille       | 2 × 4 = 8          | U+2800..U+28FF    |
//! | Half block    | 1 × 2 = 2          | `▀` `▄` `█`       |

use crate::color::Rgb;
use crate::output::{bold, center, push_painted};

/// First codepoint of the Unicode Braille Patterns block.
pub const BRAILLE_BASE: u32 = 0x2800;

/// Dot bit for each `[sub_row][sub_col]` position of a Braille cell.
///
/// Rows run top to bottom, columns left to right.
pub const BRAILLE_DOTS: [[u8; 2]; 4] = [[0x01, 0x08], [0x02, 0x10], [0x04, 0x20], [0x40, 0x80]];

/// Upper half block.
pub const UPPER_HALF: char = '▀';
/// Lower half block.
pub const LOWER_HALF: char = '▄';
/// Full block.
pub const FULL_BLOCK: char = '█';

/// Box-drawing characters used for borders.
mod border {
    pub(super) const HORIZONTAL: char = '─';
    pub(super) const VERTICAL: char = '│';
    pub(super) const TOP_LEFT: char = '┌';
    pub(super) const TOP_RIGHT: char = '┐';
    pub(super) const BOTTOM_LEFT: char = '└';
    pub(super) const BOTTOM_RIGHT: char = '┘';
}

/// Vertical half of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Half {
    /// Top half.
    Upper,
    /// Bottom half.
    Lower,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct HalfFill {
    upper: bool,
    lower: bool,
}

/// What a cell displays; Braille and half-block glyphs are resolved on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum CellKind {
    #[default]
    Blank,
    Solid(char),
    Braille,
    HalfBlock,
}

/// Fixed-size grid of colored character cells.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: usize,
    height: usize,
    kinds: Vec<CellKind>,
    colors: Vec<Option<Rgb>>,
    braille: Vec<u8>,
    halves: Vec<HalfFill>,
}

impl Canvas {
    /// Create a blank canvas. Each dimension is clamped to at least 1.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let cells = width * height;
        Self {
            width,
            height,
            kinds: vec![CellKind::Blank; cells],
            colors: vec![None; cells],
            braille: vec![0; cells],
            halves: vec![HalfFill::default(); cells],
        }
    }

    /// Width in cells.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Height in cells.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn index(&self, row: isize, col: isize) -> Option<usize> {
        let row = usize::try_from(row).ok()?;
        let col = usize::try_from(col).ok()?;
        (row < self.height && col < self.width).then(|| row * self.width + col)
    }

    /// OR one Braille dot into a cell.
    ///
    /// `sub_row` is 0..4 from the top, `sub_col` 0..2 from the left; larger
    /// values are reduced modulo the grid. Returns `false` if the cell is
    /// outside the canvas.
    pub fn set_braille(&mut self, row: isize, col: isize, sub_row: usize, sub_col: usize) -> bool {
        let Some(idx) = self.index(row, col) else {
            return false;
        };
        self.braille[idx] |= BRAILLE_DOTS[sub_row % 4][sub_col % 2];
        self.kinds[idx] = CellKind::Braille;
        true
    }

    /// Mark one half of a cell as filled. Both halves together read as a full block.
    pub fn set_half_block(&mut self, row: isize, col: isize, half: Half) -> bool {
        let Some(idx) = self.index(row, col) else {
            return false;
        };
        match half {
            Half::Upper => self.halves[idx].upper = true,
            Half::Lower => self.halves[idx].lower = true,
        }
        self.kinds[idx] = CellKind::HalfBlock;
        true
    }

    /// Overwrite a cell with a glyph and color.
    pub fn set_solid(&mut self, row: isize, col: isize, glyph: char, color: Option<Rgb>) -> bool {
        let Some(idx) = self.index(row, col) else {
            return false;
        };
        self.kinds[idx] = CellKind::Solid(glyph);
        self.colors[idx] = color;
        true
    }

    /// Set the color of a cell without touching its glyph.
    pub fn set_color(&mut self, row: isize, col: isize, color: Rgb) -> bool {
        let Some(idx) = self.index(row, col) else {
            return false;
        };
        self.colors[idx] = Some(color);
        true
    }

    /// Write `text` left to right from `(row, col)`, clipped at the edge.
    pub fn put_text(&mut self, row: isize, col: isize, text: &str, color: Option<Rgb>) {
        for (offset, ch) in text.chars().enumerate() {
            self.set_solid(row, col + offset as isize, ch, color);
        }
    }

    /// Resolve the glyph shown in a cell.
    #[must_use]
    pub fn glyph(&self, row: usize, col: usize) -> Option<char> {
        let idx = self.index(row as isize, col as isize)?;
        Some(match self.kinds[idx] {
            CellKind::Blank => ' ',
            CellKind::Solid(ch) => ch,
            CellKind::Braille => {
                char::from_u32(BRAILLE_BASE + u32::from(self.braille[idx])).unwrap_or(' ')
            }
            CellKind::HalfBlock => {
                let fill = self.halves[idx];
                match (fill.upper, fill.lower) {
                    (true, true) => FULL_BLOCK,
                    (true, false) => UPPER_HALF,
                    (false, true) => LOWER_HALF,
                    (false, false) => ' ',
                }
            }
        })
    }

    /// Color of a cell, if any.
    #[must_use]
    pub fn color(&self, row: usize, col: usize) -> Option<Rgb> {
        self.index(row as isize, col as isize).and_then(|idx| self.colors[idx])
    }

    /// Accumulated Braille dot mask of a cell.
    #[must_use]
    pub fn braille_mask(&self, row: usize, col: usize) -> Option<u8> {
        self.index(row as isize, col as isize).map(|idx| self.braille[idx])
    }

    /// True if the cell is inside the canvas and has never been drawn on.
    #[must_use]
    pub fn is_blank(&self, row: usize, col: usize) -> bool {
        self.index(row as isize, col as isize)
            .is_some_and(|idx| self.kinds[idx] == CellKind::Blank)
    }

    /// Number of cells that have been drawn on.
    #[must_use]
    pub fn filled_cells(&self) -> usize {
        self.kinds.iter().filter(|k| **k != CellKind::Blank).count()
    }

    /// Render one row of cells, coloring each non-blank colored glyph.
    #[must_use]
    pub fn render_row(&self, row: usize) -> String {
        let mut out = String::with_capacity(self.width * 4);
        for col in 0..self.width {
            let glyph = self.glyph(row, col).unwrap_or(' ');
            match self.color(row, col) {
                Some(color) if glyph != ' ' => {
                    let mut buf = [0u8; 4];
                    push_painted(&mut out, glyph.encode_utf8(&mut buf), color);
                }
                _ => out.push(glyph),
            }
        }
        out
    }

    /// Serialize the canvas with its decorations into one string.
    #[must_use]
    pub fn serialize(&self, decorations: &Decorations) -> String {
        let mut lines = Vec::with_capacity(self.height + 6 + decorations.legend.len());
        let frame_width = if decorations.borders { self.width + 2 } else { self.width };

        if let Some(title) = decorations.title.as_deref() {
            lines.push(bold(&center(title, frame_width)));
            if decorations.title_gap {
                lines.push(String::new());
            }
        }

        let rule: String = std::iter::repeat(border::HORIZONTAL).take(self.width).collect();
        if decorations.borders {
            lines.push(format!("{}{rule}{}", border::TOP_LEFT, border::TOP_RIGHT));
        }

        for row in 0..self.height {
            let mut line = String::new();
            if decorations.borders {
                line.push(border::VERTICAL);
            }
            line.push_str(&self.render_row(row));
            if decorations.borders {
                line.push(border::VERTICAL);
            }
            if let Some(Some(label)) = decorations.row_labels.get(row) {
                line.push(' ');
                line.push_str(label);
            }
            lines.push(line);
        }

        if decorations.borders {
            lines.push(format!("{}{rule}{}", border::BOTTOM_LEFT, border::BOTTOM_RIGHT));
        }

        lines.extend(decorations.footer.iter().cloned());

        if !decorations.legend.is_empty() {
            lines.push(String::new());
            lines.extend(decorations.legend.iter().cloned());
        }

        lines.join("\n")
    }
}

/// Everything drawn around the grid by [`Canvas::serialize`].
#[derive(Debug, Clone, Default)]
pub struct Decorations {
    /// Bold, centered title line.
    pub title: Option<String>,
    /// Insert a blank line after the title.
    pub title_gap: bool,
    /// Draw a box around the grid.
    pub borders: bool,
    /// Optional label appended to the right of each row.
    pub row_labels: Vec<Option<String>>,
    /// Lines directly under the grid (axis labels).
    pub footer: Vec<String>,
    /// Legend lines, separated from the footer by a blank line.
    pub legend: Vec<String>,
}

impl Decorations {
    /// No title, no border, no labels.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title.
    #[must_use]
    pub fn title(mut self, title: Option<&str>) -> Self {
        self.title = title.map(str::to_string);
        self
    }

    /// Add a blank line after the title.
    #[must_use]
    pub fn title_gap(mut self, gap: bool) -> Self {
        self.title_gap = gap;
        self
    }

    /// Enable the box border.
    #[must_use]
    pub fn borders(mut self, borders: bool) -> Self {
        self.borders = borders;
        self
    }

    /// Set the per-row labels.
    #[must_use]
    pub fn row_labels(mut self, labels: Vec<Option<String>>) -> Self {
        self.row_labels = labels;
        self
    }

    /// Set the footer lines.
    #[must_use]
    pub fn footer(mut self, footer: Vec<String>) -> Self {
        self.footer = footer;
        self
    }

    /// Set the legend lines.
    #[must_use]
    pub fn legend(mut self, legend: Vec<String>) -> Self {
        self.legend = legend;
        self
    }
}
