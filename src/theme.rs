//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use crate::piece::CellColor;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Piece colours in [`CellColor`] declaration order.
const PIECE_ORDER: [CellColor; 7] = [
    CellColor::Cyan,
    CellColor::Yellow,
    CellColor::Purple,
    CellColor::Green,
    CellColor::Red,
    CellColor::Blue,
    CellColor::Orange,
];

/// Piece palette and UI colours, optionally loaded from a theme file.
#[derive(Debug, Clone)]
pub struct Theme {
    pieces: [Color; 7],
    /// Playfield background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (score, level).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Hints and secondary text.
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_map(&HashMap::new())
    }
}

impl Theme {
    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Default colours if path is None or the file does not exist; unknown keys
    /// and unparsable values fall back per key.
    pub fn load(path: Option<&Path>) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::default()),
        };
        let s = std::fs::read_to_string(path)?;
        Ok(Self::from_map(&parse_theme_file(&s)))
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str, fallback: Color| {
            map.get(key)
                .and_then(|v| parse_hex(v).ok())
                .unwrap_or(fallback)
        };
        let pieces = PIECE_ORDER.map(|c| get(c.theme_key(), default_piece_color(c)));
        Self {
            pieces,
            bg: get("main_bg", Color::Rgb(0x10, 0x10, 0x14)),
            div_line: get("div_line", Color::Rgb(0x3F, 0x44, 0x4F)),
            main_fg: get("main_fg", Color::Rgb(0xAB, 0xB2, 0xBF)),
            title: get("title", Color::Rgb(0xE5, 0xC0, 0x7B)),
            inactive_fg: get("inactive_fg", Color::Rgb(0x5C, 0x63, 0x70)),
        }
    }

    /// Colour for a piece / locked cell.
    #[inline]
    pub fn piece_color(&self, color: CellColor) -> Color {
        self.pieces[color as usize]
    }
}

fn default_piece_color(color: CellColor) -> Color {
    parse_hex(color.hex()).unwrap_or(Color::White)
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(stripped) = line.strip_prefix("theme[") {
            if let Some(end) = stripped.find(']') {
                let key = stripped[..end].trim();
                let rest = stripped[end + 1..].trim();
                if let Some(eq) = rest.find('=') {
                    let value = rest[eq + 1..]
                        .trim()
                        .trim_matches('"')
                        .trim_matches('\'')
                        .to_string();
                    if !value.is_empty() {
                        map.insert(key.to_string(), value);
                    }
                }
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| {
        s.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or_else(|| ThemeError::InvalidHex(s.to_string()))
    };
    let (r, g, b) = match s.len() {
        6 => (channel(0..2)?, channel(2..4)?, channel(4..6)?),
        3 => (channel(0..1)? * 17, channel(1..2)? * 17, channel(2..3)? * 17),
        _ => return Err(ThemeError::InvalidHex(s.to_string())),
    };
    Ok(Color::Rgb(r, g, b))
}
