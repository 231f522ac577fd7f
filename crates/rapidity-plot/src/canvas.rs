use std::fmt;

use crate::color::Color;

/// Stroke used for lines and polylines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
    pub dash: Option<&'static str>,
}

impl Stroke {
    #[must_use]
    pub fn solid(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            dash: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAnchor {
    #[default]
    Start,
    Middle,
    End,
}

impl TextAnchor {
    fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f64,
    pub anchor: TextAnchor,
    pub bold: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 10.0,
            anchor: TextAnchor::Start,
            bold: false,
        }
    }
}

#[derive(Debug, Clone)]
enum Element {
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        stroke: Stroke,
    },
    Polyline {
        points: Vec<(f64, f64)>,
        stroke: Stroke,
    },
    Rect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        fill: Color,
        stroke: Option<Stroke>,
    },
    Text {
        x: f64,
        y: f64,
        content: String,
        style: TextStyle,
        rotate: Option<f64>,
    },
}

/// Deferred-mode SVG canvas; coordinates are in points.
///
/// Elements are recorded in call order and serialized by the [`fmt::Display`]
/// impl, so later elements are drawn on top of earlier ones. All numbers are
/// written with fixed precision, which keeps the output deterministic.
#[derive(Debug, Clone)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    elements: Vec<Element>,
}

impl Canvas {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            elements: Vec::new(),
        }
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: Stroke) {
        self.elements.push(Element::Line {
            x1,
            y1,
            x2,
            y2,
            stroke,
        });
    }

    pub fn polyline(&mut self, points: Vec<(f64, f64)>, stroke: Stroke) {
        if points.len() >= 2 {
            self.elements.push(Element::Polyline { points, stroke });
        }
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: Color, stroke: Option<Stroke>) {
        self.elements.push(Element::Rect {
            x,
            y,
            w,
            h,
            fill,
            stroke,
        });
    }

    pub fn text(&mut self, x: f64, y: f64, content: &str, style: TextStyle) {
        self.push_text(x, y, content, style, None);
    }

    pub fn text_rotated(&mut self, x: f64, y: f64, content: &str, style: TextStyle, angle: f64) {
        self.push_text(x, y, content, style, Some(angle));
    }

    fn push_text(
        &mut self,
        x: f64,
        y: f64,
        content: &str,
        style: TextStyle,
        rotate: Option<f64>,
    ) {
        if content.is_empty() {
            return;
        }
        self.elements.push(Element::Text {
            x,
            y,
            content: content.to_owned(),
            style,
            rotate,
        });
    }

    /// Rough text width; no font metrics are available, so an average glyph
    /// width of 0.55 em is assumed.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn estimate_text_width(content: &str, size: f64) -> f64 {
        content.chars().count() as f64 * size * 0.55
    }

    /// Serializes the canvas into a complete SVG document.
    #[must_use]
    pub fn finish_svg(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height,
        )?;
        writeln!(
            f,
            r#"<rect width="{}" height="{}" fill="white" />"#,
            self.width, self.height
        )?;
        for element in &self.elements {
            write_element(f, element)?;
        }
        writeln!(f, "</svg>")
    }
}

fn write_element(f: &mut fmt::Formatter<'_>, element: &Element) -> fmt::Result {
    match element {
        Element::Line {
            x1,
            y1,
            x2,
            y2,
            stroke,
        } => {
            write!(
                f,
                r#"<line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}""#
            )?;
            write_stroke(f, stroke)?;
            writeln!(f, " />")
        }
        Element::Polyline { points, stroke } => {
            f.write_str(r#"<polyline points=""#)?;
            for (i, (x, y)) in points.iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{x:.2},{y:.2}")?;
            }
            f.write_str(r#"" fill="none""#)?;
            write_stroke(f, stroke)?;
            f.write_str(r#" stroke-linejoin="miter""#)?;
            writeln!(f, " />")
        }
        Element::Rect {
            x,
            y,
            w,
            h,
            fill,
            stroke,
        } => {
            write!(
                f,
                r#"<rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" fill="{fill}""#
            )?;
            if let Some(stroke) = stroke {
                write_stroke(f, stroke)?;
            }
            writeln!(f, " />")
        }
        Element::Text {
            x,
            y,
            content,
            style,
            rotate,
        } => {
            write!(
                f,
                r#"<text x="{x:.2}" y="{y:.2}" font-family="sans-serif" font-size="{:.1}" text-anchor="{}""#,
                style.size,
                style.anchor.as_str(),
            )?;
            if style.bold {
                f.write_str(r#" font-weight="bold""#)?;
            }
            if let Some(angle) = rotate {
                write!(f, r#" transform="rotate({angle:.1},{x:.2},{y:.2})""#)?;
            }
            writeln!(f, ">{}</text>", escape_xml(content))
        }
    }
}

fn write_stroke(f: &mut fmt::Formatter<'_>, stroke: &Stroke) -> fmt::Result {
    write!(
        f,
        r#" stroke="{}" stroke-width="{:.2}""#,
        stroke.color, stroke.width
    )?;
    if let Some(dash) = stroke.dash {
        write!(f, r#" stroke-dasharray="{dash}""#)?;
    }
    Ok(())
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_structure() {
        let mut canvas = Canvas::new(200.0, 100.0);
        canvas.line(0.0, 0.0, 10.0, 10.0, Stroke::solid(Color::BLACK, 1.0));
        let svg = canvas.finish_svg();
        assert!(svg.starts_with("<svg "));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains(
            r##"<line x1="0.00" y1="0.00" x2="10.00" y2="10.00" stroke="#000000" stroke-width="1.00" />"##
        ));
    }

    #[test]
    fn test_text_is_escaped() {
        let mut canvas = Canvas::new(10.0, 10.0);
        canvas.text(1.0, 2.0, "a < b & \"c\"", TextStyle::default());
        let svg = canvas.finish_svg();
        assert!(svg.contains(">a &lt; b &amp; &quot;c&quot;</text>"));
    }

    #[test]
    fn test_polyline_with_dash() {
        let mut canvas = Canvas::new(10.0, 10.0);
        let stroke = Stroke {
            color: Color::rgb(70, 130, 180),
            width: 1.5,
            dash: Some("6 3"),
        };
        canvas.polyline(vec![(0.0, 1.0), (2.0, 3.0)], stroke);
        canvas.polyline(vec![(0.0, 1.0)], stroke);
        let svg = canvas.finish_svg();
        assert_eq!(svg.matches("<polyline").count(), 1);
        assert!(svg.contains(r#"points="0.00,1.00 2.00,3.00""#));
        assert!(svg.contains(r##"stroke="#4682b4""##));
        assert!(svg.contains(r#"stroke-dasharray="6 3""#));
    }

    #[test]
    fn test_empty_text_is_skipped() {
        let mut canvas = Canvas::new(10.0, 10.0);
        canvas.text(0.0, 0.0, "", TextStyle::default());
        assert!(!canvas.finish_svg().contains("<text"));
    }
}
