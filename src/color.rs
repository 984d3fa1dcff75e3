//! Background and text color overrides.
//!
//! Users may override a theme's background and text colors. An override is
//! either unset (the theme default applies) or a [`Color`] that is safe to
//! drop into an inline `style` attribute.
//!
//! Parsing is `csscolorparser`'s: hex (`#rgb`, `#rgba`, `#rrggbb`,
//! `#rrggbbaa`), the CSS named colors including `transparent`, and the
//! `rgb()`/`rgba()`/`hsl()`/`hsla()`/`hwb()` functions. Words that are not
//! color names and functions with malformed arguments are rejected.
//!
//! A parsed color is stored in canonical hex form (`#rrggbb`, or
//! `#rrggbbaa` when translucent), so whatever reaches a `style` attribute
//! is plain hex and cannot escape its declaration.

use std::fmt;
use thiserror::Error;

/// The preset palette offered by the color picker.
pub const PRESET_COLORS: [&str; 20] = [
    "#000000", "#ffffff", "#f44336", "#e91e63", "#9c27b0", "#673ab7", "#3f51b5", "#2196f3",
    "#03a9f4", "#00bcd4", "#009688", "#4caf50", "#8bc34a", "#cddc39", "#ffeb3b", "#ffc107",
    "#ff9800", "#ff5722", "#795548", "#607d8b",
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    #[error("invalid color {0:?}: expected #hex, a color keyword, or rgb()/hsl()")]
    Invalid(String),
}

/// A validated CSS color value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Color {
    css: String,
    rgba: [u8; 4],
}

impl Color {
    pub fn parse(input: &str) -> Result<Color, ColorError> {
        let parsed = csscolorparser::parse(input.trim())
            .map_err(|_| ColorError::Invalid(input.to_string()))?;
        Ok(Color::from_rgba(parsed.to_rgba8()))
    }

    fn from_rgba(rgba: [u8; 4]) -> Color {
        let [r, g, b, a] = rgba;
        let css = if a == u8::MAX {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        };
        Color { css, rgba }
    }

    /// Opaque white, the canvas for formats without an alpha channel.
    pub fn white() -> Color {
        Color::from_rgba([255, 255, 255, 255])
    }

    pub fn as_str(&self) -> &str {
        &self.css
    }

    /// Red, green and blue channels; alpha is ignored.
    pub fn rgb(&self) -> [u8; 3] {
        let [r, g, b, _] = self.rgba;
        [r, g, b]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.css)
    }
}

impl std::str::FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s)
    }
}

/// Parse an override value where the empty string means "unset".
pub fn parse_override(input: &str) -> Result<Option<Color>, ColorError> {
    if input.trim().is_empty() {
        Ok(None)
    } else {
        Color::parse(input).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_hex_forms() {
        for value in ["#fff", "#ffff", "#1e1e1e", "#1E1E1E80"] {
            assert!(Color::parse(value).is_ok(), "{value} should parse");
        }
        assert_eq!(Color::parse("#ABCDEF").unwrap().as_str(), "#abcdef");
        assert_eq!(Color::parse("#f00").unwrap().as_str(), "#ff0000");
        assert_eq!(Color::parse(" #1E1E1E80 ").unwrap().as_str(), "#1e1e1e80");
    }

    #[test]
    fn rejects_malformed_hex() {
        for value in ["#", "#ff", "#fffff", "#ggg", "#1234567"] {
            assert!(Color::parse(value).is_err(), "{value} should be rejected");
        }
    }

    #[test]
    fn accepts_named_colors_and_functions() {
        assert_eq!(Color::parse("Transparent").unwrap().as_str(), "#00000000");
        assert_eq!(Color::parse("rebeccapurple").unwrap().as_str(), "#663399");
        assert_eq!(Color::parse("white").unwrap().as_str(), "#ffffff");
        assert_eq!(Color::parse("rgb(255, 0, 0)").unwrap().as_str(), "#ff0000");
        assert_eq!(Color::parse("rgba(0, 0, 0, 0.5)").unwrap().rgb(), [0, 0, 0]);
        assert!(Color::parse("hsl(120, 50%, 40%)").is_ok());
        assert!(Color::parse("hsl(120deg 50% 40%)").is_ok());
        assert!(Color::parse("rgb(0 0 0 / 50%)").is_ok());
    }

    #[test]
    fn rejects_unknown_words_and_malformed_functions() {
        for value in ["notacolor", "reddish", "rgb(,,,)", "rgb()", "hsl(a, b, c)"] {
            assert!(Color::parse(value).is_err(), "{value:?} should be rejected");
        }
    }

    #[test]
    fn rejects_declaration_escapes() {
        for value in [
            "red;position:fixed",
            "#fff;",
            "rgb(0,0,0);color:red",
            "url(x)",
            "\"red\"",
            "red}",
            "<b>",
            "calc(1px)",
        ] {
            assert!(Color::parse(value).is_err(), "{value:?} should be rejected");
        }
    }

    #[test]
    fn empty_override_is_unset() {
        assert_eq!(parse_override("").unwrap(), None);
        assert_eq!(parse_override("   ").unwrap(), None);
        assert_eq!(parse_override("#000").unwrap().unwrap().as_str(), "#000000");
        assert!(parse_override("nope!").is_err());
        assert!(parse_override("notacolor").is_err());
    }

    #[test]
    fn preset_palette_is_valid() {
        for preset in PRESET_COLORS {
            assert_eq!(Color::parse(preset).unwrap().as_str(), preset);
        }
    }

    #[test]
    fn rgb_channels() {
        assert_eq!(Color::white().rgb(), [255, 255, 255]);
        assert_eq!(Color::parse("#f00").unwrap().rgb(), [255, 0, 0]);
        assert_eq!(Color::parse("#1E1E1E80").unwrap().rgb(), [30, 30, 30]);
        assert_eq!(Color::parse("black").unwrap().rgb(), [0, 0, 0]);
        assert_eq!(Color::parse("rgb(1, 2, 3)").unwrap().rgb(), [1, 2, 3]);
    }
}
