//! RAW image data types

use std::fmt;

use ndarray::Array2;

/// Color of one photosite in the sensor's color filter array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CfaColor {
    Red,
    Green,
    Blue,
    /// Second green (or emerald) filter reported by four-color sensors.
    Emerald,
}

impl CfaColor {
    /// Maps a decoder color index (0=R, 1=G, 2=B, 3=E) to a color.
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Red),
            1 => Some(Self::Green),
            2 => Some(Self::Blue),
            3 => Some(Self::Emerald),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::Red => 0,
            Self::Green => 1,
            Self::Blue => 2,
            Self::Emerald => 3,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Self::Red => 'R',
            Self::Green => 'G',
            Self::Blue => 'B',
            Self::Emerald => 'E',
        }
    }
}

/// The repeating 2×2 color layout, indexed `[row % 2][col % 2]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BayerPattern {
    colors: [[CfaColor; 2]; 2],
}

impl BayerPattern {
    pub const RGGB: BayerPattern = BayerPattern {
        colors: [
            [CfaColor::Red, CfaColor::Green],
            [CfaColor::Green, CfaColor::Blue],
        ],
    };

    pub fn new(colors: [[CfaColor; 2]; 2]) -> Self {
        Self { colors }
    }

    pub fn color_at(&self, row: usize, col: usize) -> CfaColor {
        self.colors[row % 2][col % 2]
    }

    /// The pattern as seen from an origin moved by `(rows, cols)`.
    pub fn shifted(&self, rows: usize, cols: usize) -> Self {
        Self::new([
            [self.color_at(rows, cols), self.color_at(rows, cols + 1)],
            [self.color_at(rows + 1, cols), self.color_at(rows + 1, cols + 1)],
        ])
    }

    /// Whether this is the layout the bundled demosaic kernels expect.
    pub fn is_rggb(&self) -> bool {
        *self == Self::RGGB
    }
}

impl fmt::Display for BayerPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.colors {
            for color in row {
                write!(f, "{}", color.letter())?;
            }
        }
        Ok(())
    }
}

/// Per-position scalars for one 2×2 Bayer tile, indexed `[row % 2][col % 2]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BayerTile(pub [[f32; 2]; 2]);

impl BayerTile {
    pub fn uniform(value: f32) -> Self {
        Self([[value; 2]; 2])
    }

    pub fn from_fn(f: impl Fn(usize, usize) -> f32) -> Self {
        Self([[f(0, 0), f(0, 1)], [f(1, 0), f(1, 1)]])
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.0[row % 2][col % 2]
    }
}

/// Sensor metadata extracted once per raw file.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMetadata {
    /// Layout of the visible plane's top-left 2×2 tile
    pub pattern: BayerPattern,
    /// Decoder's color descriptor (e.g. "RGGB"), kept for diagnostics
    pub color_desc: String,
    /// Black level per color, indexed by `CfaColor::index()`
    pub black_levels: [f32; 4],
    /// Daylight white balance as `[R, G, B]`, green normalized to 1
    pub daylight_wb: [f32; 3],
    /// Actual bits per sample from the sensor (e.g., 12, 14, or 16)
    pub bits_per_sample: u32,
}

impl RawMetadata {
    /// Largest code value the sensor can produce.
    pub fn max_value(&self) -> f32 {
        ((1u64 << self.bits_per_sample) - 1) as f32
    }

    pub fn black_tile(&self) -> BayerTile {
        BayerTile::from_fn(|row, col| self.black_levels[self.pattern.color_at(row, col).index()])
    }

    /// White-balance multipliers per tile position, scaled so a full-well
    /// photosite maps to roughly 1.0.
    pub fn scale_tile(&self) -> BayerTile {
        let max = self.max_value();
        BayerTile::from_fn(|row, col| {
            let wb = match self.pattern.color_at(row, col) {
                CfaColor::Red => self.daylight_wb[0],
                CfaColor::Green | CfaColor::Emerald => self.daylight_wb[1],
                CfaColor::Blue => self.daylight_wb[2],
            };
            wb / max
        })
    }

    /// Metadata for the same sensor seen from a crop origin at `(x, y)`.
    pub fn cropped_at(&self, x: usize, y: usize) -> Self {
        Self {
            pattern: self.pattern.shifted(y, x),
            ..self.clone()
        }
    }
}

/// The visible sensor plane and its metadata, owning all of its memory.
#[derive(Debug, Clone)]
pub struct RawFrame {
    /// Single-channel mosaic, `[height, width]`
    pub plane: Array2<u16>,
    pub metadata: RawMetadata,
}

impl RawFrame {
    pub fn width(&self) -> usize {
        self.plane.ncols()
    }

    pub fn height(&self) -> usize {
        self.plane.nrows()
    }
}
