//! Deterministic route coloring
//!
//! Routes are colored by sampling a colormap at `index / count`, where `index` is the
//! route's position in sorted file order. The colormaps reproduce the 256-entry
//! lookup tables of the gnuplot-style formula palettes, so the same index and count
//! always give the same color.

use std::fmt;
use std::str::FromStr;

/// Number of entries in a sampled lookup table
const LUT_SIZE: usize = 256;

/// An 8-bit RGB color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Format as `#rrggbb`
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Available colormaps
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Colormap {
    /// Black → blue → orange → white
    #[default]
    Gnuplot2,
    /// Black → purple → orange → yellow
    Gnuplot,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown colormap '{0}' (expected one of: gnuplot2, gnuplot)")]
pub struct UnknownColormap(String);

impl Colormap {
    pub fn all() -> &'static [Self] {
        &[Self::Gnuplot2, Self::Gnuplot]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Gnuplot2 => "gnuplot2",
            Self::Gnuplot => "gnuplot",
        }
    }

    /// Color for the route at `index` out of `count` sorted routes
    pub fn color_for(&self, index: usize, count: usize) -> Rgb {
        let x = if count == 0 {
            0.0
        } else {
            index as f64 / count as f64
        };
        self.sample(x)
    }

    /// Sample the lookup table at `x` in `[0, 1]`
    pub fn sample(&self, x: f64) -> Rgb {
        let slot = ((x * LUT_SIZE as f64) as isize).clamp(0, LUT_SIZE as isize - 1) as usize;
        let t = slot as f64 / (LUT_SIZE - 1) as f64;
        let (r, g, b) = self.channels(t);
        Rgb::new(to_byte(r), to_byte(g), to_byte(b))
    }

    fn channels(&self, t: f64) -> (f64, f64, f64) {
        match self {
            Self::Gnuplot2 => {
                let r = t / 0.32 - 0.78125;
                let g = 2.0 * t - 0.84;
                let b = if t < 0.25 {
                    4.0 * t
                } else if t < 0.92 {
                    -2.0 * t + 1.84
                } else {
                    t / 0.08 - 11.5
                };
                (r, g, b)
            }
            Self::Gnuplot => (
                t.sqrt(),
                t.powi(3),
                (t * 2.0 * std::f64::consts::PI).sin(),
            ),
        }
    }
}

/// Clip to `[0, 1]` and truncate to a byte
#[inline]
fn to_byte(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0) as u8
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Colormap {
    type Err = UnknownColormap;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownColormap(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_format() {
        assert_eq!(Rgb::new(255, 0, 16).to_hex(), "#ff0010");
        assert_eq!(Rgb::new(0, 0, 0).to_string(), "#000000");
    }

    #[test]
    fn test_three_routes_get_distinct_known_colors() {
        let colors: Vec<String> = (0..3)
            .map(|i| Colormap::Gnuplot2.color_for(i, 3).to_hex())
            .collect();

        assert_eq!(colors, vec!["#000000", "#4200ff", "#ff7d81"]);
    }

    #[test]
    fn test_colors_are_deterministic() {
        for i in 0..10 {
            assert_eq!(
                Colormap::Gnuplot2.color_for(i, 10),
                Colormap::Gnuplot2.color_for(i, 10)
            );
        }
    }

    #[test]
    fn test_sample_endpoints() {
        assert_eq!(Colormap::Gnuplot2.sample(0.0), Rgb::new(0, 0, 0));
        assert_eq!(Colormap::Gnuplot2.sample(1.0), Rgb::new(255, 255, 255));
        // Out-of-range inputs land on the first/last slot
        assert_eq!(Colormap::Gnuplot2.sample(-3.0), Colormap::Gnuplot2.sample(0.0));
        assert_eq!(Colormap::Gnuplot2.sample(7.0), Colormap::Gnuplot2.sample(1.0));
    }

    #[test]
    fn test_gnuplot_palette() {
        assert_eq!(Colormap::Gnuplot.sample(0.0), Rgb::new(0, 0, 0));
        let top = Colormap::Gnuplot.sample(1.0);
        assert_eq!((top.r, top.g), (255, 255));
        assert_eq!(top.b, 0); // sin(2π) clips to 0
    }

    #[test]
    fn test_zero_count_does_not_divide_by_zero() {
        assert_eq!(Colormap::Gnuplot2.color_for(0, 0), Rgb::new(0, 0, 0));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("gnuplot2".parse::<Colormap>().unwrap(), Colormap::Gnuplot2);
        assert_eq!("GNUPLOT".parse::<Colormap>().unwrap(), Colormap::Gnuplot);
        assert!("viridis".parse::<Colormap>().is_err());
        assert_eq!(Colormap::default().to_string(), "gnuplot2");
    }
}
