use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque visual symbol handed to the renderer. Always a CSS hex string;
/// nothing downstream ever does arithmetic on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(String);

impl Color {
    pub fn hex(&self) -> &str {
        &self.0
    }

    fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Color(format!("#{:02x}{:02x}{:02x}", r, g, b))
    }
}

impl From<&str> for Color {
    fn from(hex: &str) -> Self {
        Color(hex.to_string())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Base fill for unclassified maps and the "no" half of binary modes.
pub const DEFAULT_FILL: &str = "#85c1e9";
/// The "yes" half of binary modes.
pub const BINARY_POSITIVE: &str = "#76d7c4";

// ColorBrewer "Paired" qualitative scheme, 12 classes.
const QUALITATIVE: [&str; 12] = [
    "#a6cee3", "#1f78b4", "#b2df8a", "#33a02c", "#fb9a99", "#e31a1c",
    "#fdbf6f", "#ff7f00", "#cab2d6", "#6a3d9a", "#ffff99", "#b15928",
];

// ColorBrewer "Blues" sequential stops, light to dark.
const BLUES: [(u8, u8, u8); 9] = [
    (0xf7, 0xfb, 0xff),
    (0xde, 0xeb, 0xf7),
    (0xc6, 0xdb, 0xef),
    (0x9e, 0xca, 0xe1),
    (0x6b, 0xae, 0xd6),
    (0x42, 0x92, 0xc6),
    (0x21, 0x71, 0xb5),
    (0x08, 0x51, 0x9c),
    (0x08, 0x30, 0x6b),
];

/// Categorical color for the n-th class in encounter order. Cycles past 12.
pub fn qualitative(index: usize) -> Color {
    Color::from(QUALITATIVE[index % QUALITATIVE.len()])
}

/// Sequential single-hue color for t in [0, 1], 0 = lightest, 1 = darkest.
/// Piecewise-linear interpolation between the Blues stops.
pub fn sequential(t: f64) -> Color {
    let t = t.clamp(0.0, 1.0);
    let segments = (BLUES.len() - 1) as f64;
    let position = t * segments;
    let lower = (position.floor() as usize).min(BLUES.len() - 2);
    let frac = position - lower as f64;

    let (r0, g0, b0) = BLUES[lower];
    let (r1, g1, b1) = BLUES[lower + 1];

    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    Color::from_rgb(lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
}
