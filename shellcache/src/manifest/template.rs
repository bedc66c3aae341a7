//! Tile server URL templates.
//!
//! A template is a URL with four placeholders, in Leaflet style:
//! `https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png`
//!
//! The long spellings `{subdomain}` and `{zoom}` are accepted as aliases for
//! `{s}` and `{z}`. Every placeholder must appear exactly once.
//!
//! The same template drives both directions: [`TileTemplate::render`] builds
//! the precache URLs and [`TileTemplate::matches`] recognises tile requests at
//! fetch time. Matching uses an anchored regex in which every literal
//! character of the template is escaped, so `.tile.openstreetmap.org` only
//! matches that exact host.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::coord::TileCoord;

/// Default OpenStreetMap tile server template.
pub const DEFAULT_TILE_TEMPLATE: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Errors raised while parsing a tile URL template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("Tile template is missing the {0} placeholder")]
    MissingPlaceholder(&'static str),

    #[error("Tile template repeats the {0} placeholder")]
    DuplicatePlaceholder(&'static str),

    #[error("Tile template has unknown placeholder {{{0}}}")]
    UnknownPlaceholder(String),

    #[error("Tile template has an unterminated placeholder")]
    Unterminated,

    #[error("Tile template pattern failed to compile: {0}")]
    Pattern(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placeholder {
    Subdomain,
    Zoom,
    X,
    Y,
}

impl Placeholder {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "s" | "subdomain" => Some(Self::Subdomain),
            "z" | "zoom" => Some(Self::Zoom),
            "x" => Some(Self::X),
            "y" => Some(Self::Y),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Subdomain => "{s}",
            Self::Zoom => "{z}",
            Self::X => "{x}",
            Self::Y => "{y}",
        }
    }

    fn group(self) -> &'static str {
        match self {
            Self::Subdomain => r"(?P<s>[A-Za-z0-9-]+)",
            Self::Zoom => r"(?P<z>\d{1,2})",
            Self::X => r"(?P<x>\d{1,10})",
            Self::Y => r"(?P<y>\d{1,10})",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Placeholder),
}

/// A parsed tile server URL template.
#[derive(Debug, Clone)]
pub struct TileTemplate {
    source: String,
    segments: Vec<Segment>,
    pattern: Regex,
}

impl TileTemplate {
    /// Parses a template string.
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        let segments = tokenize(template)?;

        for required in [
            Placeholder::Subdomain,
            Placeholder::Zoom,
            Placeholder::X,
            Placeholder::Y,
        ] {
            let count = segments
                .iter()
                .filter(|s| **s == Segment::Field(required))
                .count();
            match count {
                0 => return Err(TemplateError::MissingPlaceholder(required.label())),
                1 => {}
                _ => return Err(TemplateError::DuplicatePlaceholder(required.label())),
            }
        }

        let mut pattern = String::from("^");
        for segment in &segments {
            match segment {
                Segment::Literal(text) => pattern.push_str(&regex::escape(text)),
                Segment::Field(field) => pattern.push_str(field.group()),
            }
        }
        pattern.push('$');

        let pattern = Regex::new(&pattern).map_err(|e| TemplateError::Pattern(e.to_string()))?;

        Ok(Self {
            source: template.to_string(),
            segments,
            pattern,
        })
    }

    /// The template string as configured.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Substitutes a tile and subdomain into the template.
    pub fn render(&self, tile: &TileCoord, subdomain: &str) -> String {
        let mut url = String::with_capacity(self.source.len() + 16);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => url.push_str(text),
                Segment::Field(Placeholder::Subdomain) => url.push_str(subdomain),
                Segment::Field(Placeholder::Zoom) => url.push_str(&tile.zoom.to_string()),
                Segment::Field(Placeholder::X) => url.push_str(&tile.x.to_string()),
                Segment::Field(Placeholder::Y) => url.push_str(&tile.y.to_string()),
            }
        }
        url
    }

    /// Recognises a URL produced by this template.
    ///
    /// Returns the tile and subdomain, or `None` if the URL does not match or
    /// its coordinates fall outside the tile grid.
    pub fn matches(&self, url: &str) -> Option<(TileCoord, String)> {
        let captures = self.pattern.captures(url)?;

        let zoom = captures.name("z")?.as_str().parse::<u8>().ok()?;
        let x = captures.name("x")?.as_str().parse::<u32>().ok()?;
        let y = captures.name("y")?.as_str().parse::<u32>().ok()?;
        let subdomain = captures.name("s")?.as_str().to_string();

        let tile = TileCoord::new(zoom, x, y)?;
        Some((tile, subdomain))
    }
}

/// The parsed OpenStreetMap template, compiled once.
fn default_template() -> &'static TileTemplate {
    static TEMPLATE: OnceLock<TileTemplate> = OnceLock::new();
    TEMPLATE.get_or_init(|| TileTemplate::parse(DEFAULT_TILE_TEMPLATE).expect("built-in tile template"))
}

impl Default for TileTemplate {
    fn default() -> Self {
        default_template().clone()
    }
}

impl FromStr for TileTemplate {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TileTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl PartialEq for TileTemplate {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

fn tokenize(template: &str) -> Result<Vec<Segment>, TemplateError> {
    let mut segments = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        if open > 0 {
            segments.push(Segment::Literal(rest[..open].to_string()));
        }
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or(TemplateError::Unterminated)?;
        let name = &after[..close];
        let field = Placeholder::parse(name)
            .ok_or_else(|| TemplateError::UnknownPlaceholder(name.to_string()))?;
        segments.push(Segment::Field(field));
        rest = &after[close + 1..];
    }

    if !rest.is_empty() {
        segments.push(Segment::Literal(rest.to_string()));
    }

    Ok(segments)
}
