use std::{fmt, str::FromStr};

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Error returned when a color name or hex code is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown color '{name}'")]
pub struct ParseColorError {
    pub name: String,
}

// CSS4 names, the same table matplotlib accepts for named colors.
const NAMED_COLORS: &[(&str, Color)] = &[
    ("black", Color::rgb(0, 0, 0)),
    ("white", Color::rgb(255, 255, 255)),
    ("gray", Color::rgb(128, 128, 128)),
    ("grey", Color::rgb(128, 128, 128)),
    ("darkgray", Color::rgb(169, 169, 169)),
    ("darkgrey", Color::rgb(169, 169, 169)),
    ("dimgray", Color::rgb(105, 105, 105)),
    ("dimgrey", Color::rgb(105, 105, 105)),
    ("silver", Color::rgb(192, 192, 192)),
    ("red", Color::rgb(255, 0, 0)),
    ("darkred", Color::rgb(139, 0, 0)),
    ("crimson", Color::rgb(220, 20, 60)),
    ("firebrick", Color::rgb(178, 34, 34)),
    ("indianred", Color::rgb(205, 92, 92)),
    ("salmon", Color::rgb(250, 128, 114)),
    ("tomato", Color::rgb(255, 99, 71)),
    ("coral", Color::rgb(255, 127, 80)),
    ("orange", Color::rgb(255, 165, 0)),
    ("darkorange", Color::rgb(255, 140, 0)),
    ("gold", Color::rgb(255, 215, 0)),
    ("goldenrod", Color::rgb(218, 165, 32)),
    ("yellow", Color::rgb(255, 255, 0)),
    ("olive", Color::rgb(128, 128, 0)),
    ("yellowgreen", Color::rgb(154, 205, 50)),
    ("green", Color::rgb(0, 128, 0)),
    ("darkgreen", Color::rgb(0, 100, 0)),
    ("forestgreen", Color::rgb(34, 139, 34)),
    ("seagreen", Color::rgb(46, 139, 87)),
    ("mediumseagreen", Color::rgb(60, 179, 113)),
    ("limegreen", Color::rgb(50, 205, 50)),
    ("lime", Color::rgb(0, 255, 0)),
    ("teal", Color::rgb(0, 128, 128)),
    ("darkcyan", Color::rgb(0, 139, 139)),
    ("cyan", Color::rgb(0, 255, 255)),
    ("turquoise", Color::rgb(64, 224, 208)),
    ("cadetblue", Color::rgb(95, 158, 160)),
    ("steelblue", Color::rgb(70, 130, 180)),
    ("royalblue", Color::rgb(65, 105, 225)),
    ("cornflowerblue", Color::rgb(100, 149, 237)),
    ("dodgerblue", Color::rgb(30, 144, 255)),
    ("deepskyblue", Color::rgb(0, 191, 255)),
    ("skyblue", Color::rgb(135, 206, 235)),
    ("blue", Color::rgb(0, 0, 255)),
    ("mediumblue", Color::rgb(0, 0, 205)),
    ("darkblue", Color::rgb(0, 0, 139)),
    ("navy", Color::rgb(0, 0, 128)),
    ("slateblue", Color::rgb(106, 90, 205)),
    ("rebeccapurple", Color::rgb(102, 51, 153)),
    ("purple", Color::rgb(128, 0, 128)),
    ("darkviolet", Color::rgb(148, 0, 211)),
    ("mediumpurple", Color::rgb(147, 112, 219)),
    ("orchid", Color::rgb(218, 112, 214)),
    ("magenta", Color::rgb(255, 0, 255)),
    ("fuchsia", Color::rgb(255, 0, 255)),
    ("deeppink", Color::rgb(255, 20, 147)),
    ("hotpink", Color::rgb(255, 105, 180)),
    ("pink", Color::rgb(255, 192, 203)),
    ("brown", Color::rgb(165, 42, 42)),
    ("saddlebrown", Color::rgb(139, 69, 19)),
    ("sienna", Color::rgb(160, 82, 45)),
    ("chocolate", Color::rgb(210, 105, 30)),
    ("tan", Color::rgb(210, 180, 140)),
    ("maroon", Color::rgb(128, 0, 0)),
    ("slategray", Color::rgb(112, 128, 144)),
    ("slategrey", Color::rgb(112, 128, 144)),
];

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Looks up a CSS color name, ignoring ASCII case.
    #[must_use]
    pub fn named(name: &str) -> Option<Self> {
        NAMED_COLORS
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(name))
            .map(|(_, color)| *color)
    }

    /// Parses `#rrggbb` or `#rgb`.
    #[must_use]
    pub fn from_hex(code: &str) -> Option<Self> {
        let digits = code.strip_prefix('#')?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match digits.len() {
            6 => Some(Self::rgb(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            3 => {
                let short = |i: usize| channel(&digits[i..=i]).map(|v| v * 17);
                Some(Self::rgb(short(0)?, short(1)?, short(2)?))
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::from_hex(s)
            .or_else(|| Self::named(s))
            .ok_or_else(|| ParseColorError { name: s.to_owned() })
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_colors_used_by_default_sweep() {
        assert_eq!("steelblue".parse(), Ok(Color::rgb(70, 130, 180)));
        assert_eq!("seagreen".parse(), Ok(Color::rgb(46, 139, 87)));
        assert_eq!("IndianRed".parse(), Ok(Color::rgb(205, 92, 92)));
    }

    #[test]
    fn test_hex_codes() {
        assert_eq!("#4682b4".parse(), Ok(Color::rgb(70, 130, 180)));
        assert_eq!("#fff".parse(), Ok(Color::rgb(255, 255, 255)));
        assert!("#12345".parse::<Color>().is_err());
        assert!("#gg0000".parse::<Color>().is_err());
    }

    #[test]
    fn test_unknown_name() {
        let err = "blurple".parse::<Color>().unwrap_err();
        assert_eq!(err.name, "blurple");
    }

    #[test]
    fn test_display_is_hex() {
        assert_eq!(Color::rgb(70, 130, 180).to_string(), "#4682b4");
    }
}
