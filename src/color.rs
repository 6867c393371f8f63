//! Fill color parsing
//!
//! The bucket tool only accepts opaque `#RRGGBB` colors. The leading `#` is
//! optional and hex digits are case-insensitive. There is no alpha channel,
//! no 3-digit short form and no named colors.

use image::Rgba;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for color parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Input string was empty
    #[error("empty color string")]
    Empty,
    /// Invalid length (must be exactly 6 hex chars after the optional '#')
    #[error("invalid color length {0}, expected 6 hex digits")]
    InvalidLength(usize),
    /// Contains non-hex characters
    #[error("invalid hex character '{0}'")]
    InvalidHex(char),
}

/// An opaque 8-bit-per-channel color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// The color as a fully opaque RGBA pixel.
    pub fn opaque(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, 255])
    }

    /// Format as uppercase `#RRGGBB`.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for Rgb {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_color(s)
    }
}

impl TryFrom<String> for Rgb {
    type Error = ColorError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        parse_color(&s)
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_hex()
    }
}

/// Parse a `#RRGGBB` color string.
///
/// # Examples
///
/// ```
/// use bucketfill::color::{parse_color, Rgb};
///
/// assert_eq!(parse_color("#FF8000").unwrap(), Rgb::new(255, 128, 0));
/// assert_eq!(parse_color("ff8000").unwrap(), Rgb::new(255, 128, 0));
/// assert!(parse_color("#F80").is_err());
/// assert!(parse_color("red").is_err());
/// ```
///
/// # Errors
///
/// Returns `ColorError` if the input is empty, has the wrong length, or
/// contains a non-hex character.
pub fn parse_color(s: &str) -> Result<Rgb, ColorError> {
    if s.is_empty() {
        return Err(ColorError::Empty);
    }

    let hex = s.strip_prefix('#').unwrap_or(s);

    // Validate all characters are hex before looking at the length, so
    // "notacolor" reports the offending character
    for c in hex.chars() {
        if !c.is_ascii_hexdigit() {
            return Err(ColorError::InvalidHex(c));
        }
    }

    if hex.len() != 6 {
        return Err(ColorError::InvalidLength(hex.len()));
    }

    Ok(Rgb {
        r: parse_hex_pair(&hex[0..2])?,
        g: parse_hex_pair(&hex[2..4])?,
        b: parse_hex_pair(&hex[4..6])?,
    })
}

/// Parse a single hex digit (0-9, A-F, a-f) to u8 (0-15)
fn parse_hex_digit(c: u8) -> Result<u8, ColorError> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(ColorError::InvalidHex(c as char)),
    }
}

/// Parse a two-character hex string to u8 (0-255)
fn parse_hex_pair(s: &str) -> Result<u8, ColorError> {
    let bytes = s.as_bytes();
    let high = parse_hex_digit(bytes[0])?;
    let low = parse_hex_digit(bytes[1])?;
    Ok(high * 16 + low)
}
