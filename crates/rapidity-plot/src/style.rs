use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Dash pattern of a step curve.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineDash {
    #[default]
    Solid,
    Dashed,
    Dotted,
    DashDot,
}

impl LineDash {
    fn parse(part: &str) -> Option<Self> {
        let dash = match part.to_ascii_lowercase().as_str() {
            "-" | "solid" => Self::Solid,
            "--" | "dashed" => Self::Dashed,
            ":" | "dotted" => Self::Dotted,
            "-." | "dashdot" => Self::DashDot,
            _ => return None,
        };
        Some(dash)
    }

    /// Keyword used in style tokens.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::Dashed => "dashed",
            Self::Dotted => "dotted",
            Self::DashDot => "dashdot",
        }
    }

    /// Value for the SVG `stroke-dasharray` attribute, if any.
    #[must_use]
    pub fn svg_dasharray(self) -> Option<&'static str> {
        match self {
            Self::Solid => None,
            Self::Dashed => Some("6 3"),
            Self::Dotted => Some("2 2"),
            Self::DashDot => Some("6 2 2 2"),
        }
    }

    /// Matplotlib `linestyle` shorthand.
    #[must_use]
    pub fn matplotlib(self) -> &'static str {
        match self {
            Self::Solid => "-",
            Self::Dashed => "--",
            Self::Dotted => ":",
            Self::DashDot => "-.",
        }
    }
}

/// Error returned for a malformed style token.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseStyleError {
    #[display("unknown style part '{part}' (expected a dash style or a color)")]
    UnknownPart { part: String },
    #[display("style part '{part}' conflicts with an earlier {kind}")]
    Conflicting { part: String, kind: &'static str },
}

/// Line style and color of one series.
///
/// Parsed from a style token: comma-separated parts in any order, each either
/// a dash keyword (`solid`/`-`, `dashed`/`--`, `dotted`/`:`, `dashdot`/`-.`)
/// or a color (CSS name or `#rrggbb`). Missing parts default to a solid black
/// line.
///
/// # Examples
///
/// ```
/// use rapidity_plot::{Color, LineDash, SeriesStyle};
///
/// let style: SeriesStyle = "dashed, steelblue".parse().unwrap();
/// assert_eq!(style.dash, LineDash::Dashed);
/// assert_eq!(style.color, Color::rgb(70, 130, 180));
/// assert_eq!(style, "--,steelblue".parse().unwrap());
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SeriesStyle {
    pub dash: LineDash,
    pub color: Color,
}

impl SeriesStyle {
    #[must_use]
    pub fn new(dash: LineDash, color: Color) -> Self {
        Self { dash, color }
    }
}

impl FromStr for SeriesStyle {
    type Err = ParseStyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut dash = None;
        let mut color = None;
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            if let Some(parsed) = LineDash::parse(part) {
                if dash.replace(parsed).is_some() {
                    return Err(ParseStyleError::Conflicting {
                        part: part.to_owned(),
                        kind: "dash style",
                    });
                }
            } else if let Ok(parsed) = part.parse::<Color>() {
                if color.replace(parsed).is_some() {
                    return Err(ParseStyleError::Conflicting {
                        part: part.to_owned(),
                        kind: "color",
                    });
                }
            } else {
                return Err(ParseStyleError::UnknownPart {
                    part: part.to_owned(),
                });
            }
        }
        Ok(Self {
            dash: dash.unwrap_or_default(),
            color: color.unwrap_or_default(),
        })
    }
}

impl TryFrom<String> for SeriesStyle {
    type Error = ParseStyleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SeriesStyle> for String {
    fn from(style: SeriesStyle) -> Self {
        style.to_string()
    }
}

impl fmt::Display for SeriesStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.dash.name(), self.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_short_and_long_forms() {
        let short: SeriesStyle = "--,indianred".parse().unwrap();
        let long: SeriesStyle = "dashed, indianred".parse().unwrap();
        assert_eq!(short, long);
        assert_eq!(short.dash, LineDash::Dashed);
    }

    #[test]
    fn test_order_free_and_defaults() {
        let style: SeriesStyle = "#336699, dotted".parse().unwrap();
        assert_eq!(style.dash, LineDash::Dotted);
        assert_eq!(style.color, Color::rgb(0x33, 0x66, 0x99));

        let color_only: SeriesStyle = "seagreen".parse().unwrap();
        assert_eq!(color_only.dash, LineDash::Solid);

        let empty: SeriesStyle = "".parse().unwrap();
        assert_eq!(empty, SeriesStyle::default());
        assert_eq!(empty.color, Color::BLACK);
    }

    #[test]
    fn test_rejects_unknown_and_conflicting_parts() {
        assert_eq!(
            "wavy, red".parse::<SeriesStyle>(),
            Err(ParseStyleError::UnknownPart {
                part: "wavy".to_owned()
            })
        );
        assert!(matches!(
            "red, blue".parse::<SeriesStyle>(),
            Err(ParseStyleError::Conflicting { kind: "color", .. })
        ));
        assert!(matches!(
            "--, :".parse::<SeriesStyle>(),
            Err(ParseStyleError::Conflicting {
                kind: "dash style",
                ..
            })
        ));
    }

    #[test]
    fn test_display_parses_back() {
        let style = SeriesStyle::new(LineDash::DashDot, Color::rgb(1, 2, 3));
        assert_eq!(style.to_string(), "dashdot, #010203");
        assert_eq!(style.to_string().parse(), Ok(style));
    }

    #[test]
    fn test_serializes_as_token() {
        let style: SeriesStyle = "--,steelblue".parse().unwrap();
        let json = serde_json::to_string(&style).unwrap();
        assert_eq!(json, r#""dashed, #4682b4""#);
        let back: SeriesStyle = serde_json::from_str(&json).unwrap();
        assert_eq!(back, style);
    }
}
