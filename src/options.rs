//! Caller-supplied resize options.
//!
//! [`Options`] is the immutable input to the sizing core. The enum-like knobs
//! ([`Algo`], [`Gravity`], [`Format`]) are closed sum types so the placement
//! table and the codec mapping are checked for exhaustiveness. Each one also
//! carries a stable numeric code (`TryFrom<u8>`) for callers that pass
//! options across a process or language boundary, plus `FromStr`/serde names
//! used by the CLI and `config.toml`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A string or numeric code that does not name a known variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: impl fmt::Display) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Resize strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algo {
    /// Letterbox: the whole source is visible, padding fills the rest.
    #[default]
    Fit,
    /// Crop: the canvas is fully covered, overflow is cut away.
    Fill,
}

impl Algo {
    /// Diagnostic label for a raw numeric code; `"invalid"` if unknown.
    pub fn label_for_code(code: i64) -> &'static str {
        u8::try_from(code)
            .ok()
            .and_then(|c| Algo::try_from(c).ok())
            .map(Algo::as_str)
            .unwrap_or("invalid")
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Algo::Fit => "fit",
            Algo::Fill => "fill",
        }
    }
}

impl fmt::Display for Algo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<u8> for Algo {
    type Error = UnknownVariant;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Algo::Fit),
            1 => Ok(Algo::Fill),
            other => Err(UnknownVariant::new("algo", other)),
        }
    }
}

impl FromStr for Algo {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fit" => Ok(Algo::Fit),
            "fill" => Ok(Algo::Fill),
            _ => Err(UnknownVariant::new("algo", s)),
        }
    }
}

/// Anchor used to place the image (FIT) or the crop window (FILL).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gravity {
    #[default]
    Center,
    North,
    South,
    West,
    East,
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Gravity {
    pub const ALL: [Gravity; 9] = [
        Gravity::Center,
        Gravity::North,
        Gravity::South,
        Gravity::West,
        Gravity::East,
        Gravity::NorthWest,
        Gravity::NorthEast,
        Gravity::SouthWest,
        Gravity::SouthEast,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Gravity::Center => "center",
            Gravity::North => "north",
            Gravity::South => "south",
            Gravity::West => "west",
            Gravity::East => "east",
            Gravity::NorthWest => "north_west",
            Gravity::NorthEast => "north_east",
            Gravity::SouthWest => "south_west",
            Gravity::SouthEast => "south_east",
        }
    }
}

impl fmt::Display for Gravity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<u8> for Gravity {
    type Error = UnknownVariant;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Gravity::ALL
            .get(code as usize)
            .copied()
            .ok_or_else(|| UnknownVariant::new("gravity", code))
    }
}

impl FromStr for Gravity {
    type Err = UnknownVariant;

    /// Accepts `north_west`, `north-west` and `northwest` spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Gravity::ALL
            .into_iter()
            .find(|g| g.as_str().replace('_', "") == normalized)
            .ok_or_else(|| UnknownVariant::new("gravity", s))
    }
}

/// Output codec.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Jpeg,
    Webp,
    Png,
}

impl Format {
    /// File extension used for output paths and as the encoder hint.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Jpeg => "jpg",
            Format::Webp => "webp",
            Format::Png => "png",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Format::Jpeg => "jpeg",
            Format::Webp => "webp",
            Format::Png => "png",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<u8> for Format {
    type Error = UnknownVariant;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Format::Jpeg),
            1 => Ok(Format::Webp),
            2 => Ok(Format::Png),
            other => Err(UnknownVariant::new("format", other)),
        }
    }
}

impl FromStr for Format {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(Format::Jpeg),
            "webp" => Ok(Format::Webp),
            "png" => Ok(Format::Png),
            _ => Err(UnknownVariant::new("format", s)),
        }
    }
}

/// Letterbox padding colour for FIT, stored as `[r, g, b]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Background(pub [u8; 3]);

impl Background {
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }
}

impl FromStr for Background {
    type Err = UnknownVariant;

    /// Parses `R,G,B` (decimal) or `#rrggbb`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || UnknownVariant::new("background", s);
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
            return Ok(Self([channel(0)?, channel(2)?, channel(4)?]));
        }
        let parts: Vec<u8> = s
            .split(',')
            .map(|p| p.trim().parse::<u8>().map_err(|_| invalid()))
            .collect::<Result<_, _>>()?;
        match parts.as_slice() {
            [r, g, b] => Ok(Self([*r, *g, *b])),
            _ => Err(invalid()),
        }
    }
}

/// Requested output size, strategy, and encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    /// Explicit target width; 0 uses the source width.
    pub width: u32,
    /// Explicit target height; 0 uses the source height.
    pub height: u32,
    /// Bound on the longer side. Wins over `max_height` and `max_width`.
    pub max_side: u32,
    pub max_width: u32,
    /// Wins over `max_width`.
    pub max_height: u32,
    pub algo: Algo,
    pub gravity: Gravity,
    pub background: Background,
    pub format: Format,
    /// 0–100, 0 meaning "format default". Out-of-range values are clamped.
    pub quality: i32,
    /// JPEG only.
    pub progressive: bool,
}
