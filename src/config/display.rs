//! Presentation options for the rendered widget.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer};

/// Arrangement of the post items inside the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    #[default]
    Grid,
    List,
    Masonry,
    Carousel,
}

impl Layout {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::Grid => "grid",
            Layout::List => "list",
            Layout::Masonry => "masonry",
            Layout::Carousel => "carousel",
        }
    }
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "grid" => Ok(Layout::Grid),
            "list" => Ok(Layout::List),
            "masonry" => Ok(Layout::Masonry),
            "carousel" => Ok(Layout::Carousel),
            _ => Err(format!("Unknown layout: {}", s)),
        }
    }
}

/// Visual style of each post card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CardStyle {
    #[default]
    Modern,
    Classic,
    Minimal,
}

impl CardStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardStyle::Modern => "modern",
            CardStyle::Classic => "classic",
            CardStyle::Minimal => "minimal",
        }
    }
}

impl FromStr for CardStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "modern" => Ok(CardStyle::Modern),
            "classic" => Ok(CardStyle::Classic),
            "minimal" => Ok(CardStyle::Minimal),
            _ => Err(format!("Unknown card style: {}", s)),
        }
    }
}

/// How the publication date is shown in the meta row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateFormat {
    /// `Jan 5, 2024`
    #[default]
    Absolute,
    /// `3 days ago`
    Relative,
}

impl FromStr for DateFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "absolute" => Ok(DateFormat::Absolute),
            "relative" => Ok(DateFormat::Relative),
            _ => Err(format!("Unknown date format: {}", s)),
        }
    }
}

/// Size tier requested from the image host when rewriting thumbnail URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThumbnailQuality {
    Low,
    #[default]
    Medium,
    High,
}

impl ThumbnailQuality {
    /// Target width in pixels.
    pub fn width(&self) -> u32 {
        match self {
            ThumbnailQuality::Low => 150,
            ThumbnailQuality::Medium => 300,
            ThumbnailQuality::High => 600,
        }
    }
}

impl FromStr for ThumbnailQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(ThumbnailQuality::Low),
            "medium" => Ok(ThumbnailQuality::Medium),
            "high" => Ok(ThumbnailQuality::High),
            _ => Err(format!("Unknown thumbnail quality: {}", s)),
        }
    }
}

/// Column count of grid-like layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Columns {
    #[default]
    Auto,
    Fixed(u8),
}

impl fmt::Display for Columns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Columns::Auto => f.write_str("auto"),
            Columns::Fixed(n) => write!(f, "{}", n),
        }
    }
}

impl FromStr for Columns {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Columns::Auto);
        }
        s.parse::<u8>()
            .map(Columns::Fixed)
            .map_err(|_| format!("Invalid columns value: {}", s))
    }
}

/// Deserialize any of the option enums from a case-insensitive name.
pub(crate) fn deserialize_from_str<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr<Err = String>,
{
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(de::Error::custom)
}

/// Columns accept either `"auto"` or a bare integer.
pub(crate) fn deserialize_columns<'de, D>(deserializer: D) -> Result<Columns, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Count(i64),
        Name(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Count(n) => Ok(Columns::Fixed(n.clamp(0, u8::MAX as i64) as u8)),
        Raw::Name(s) => s.parse().map_err(de::Error::custom),
    }
}
