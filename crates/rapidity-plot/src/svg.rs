use crate::{
    axis::Axis,
    canvas::{Canvas, Stroke, TextAnchor, TextStyle},
    color::Color,
    figure::{Figure, FigureRenderer},
};

const FRAME_COLOR: Color = Color::rgb(0x33, 0x33, 0x33);
const LEGEND_BORDER: Color = Color::rgb(0xcc, 0xcc, 0xcc);

/// Renders a [`Figure`] as a standalone SVG document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvgRenderer {
    pub width: f64,
    pub height: f64,
    pub line_width: f64,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self {
            width: 720.0,
            height: 480.0,
            line_width: 1.5,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PlotArea {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

impl SvgRenderer {
    fn plot_area(&self) -> PlotArea {
        PlotArea {
            left: 70.0,
            right: self.width - 20.0,
            top: 40.0,
            bottom: self.height - 55.0,
        }
    }
}

impl FigureRenderer for SvgRenderer {
    fn render(&self, figure: &Figure) -> String {
        let area = self.plot_area();
        let x_axis = Axis::exact(figure.x_range.0, figure.x_range.1, 9)
            .with_label(figure.frame.x_label.clone());
        let y_axis = Axis::auto(0.0, figure.max_height() * 1.1, 6)
            .with_label(figure.frame.y_label.clone());

        let mut canvas = Canvas::new(self.width, self.height);
        draw_axes(&mut canvas, area, &x_axis, &y_axis);

        canvas.text(
            f64::midpoint(area.left, area.right),
            area.top - 14.0,
            &figure.frame.title,
            TextStyle {
                size: 13.0,
                anchor: TextAnchor::Middle,
                bold: true,
            },
        );

        for curve in &figure.curves {
            let points = curve
                .points()
                .into_iter()
                .map(|(x, y)| {
                    (
                        x_axis.data_to_pixel(x, area.left, area.right),
                        y_axis.data_to_pixel(y, area.bottom, area.top),
                    )
                })
                .collect();
            canvas.polyline(
                points,
                Stroke {
                    color: curve.style.color,
                    width: self.line_width,
                    dash: curve.style.dash.svg_dasharray(),
                },
            );
        }

        draw_legend(&mut canvas, area, figure, self.line_width);
        canvas.finish_svg()
    }
}

fn draw_axes(canvas: &mut Canvas, area: PlotArea, x_axis: &Axis, y_axis: &Axis) {
    let frame = Stroke::solid(FRAME_COLOR, 1.0);
    let tick_style = TextStyle {
        size: 10.0,
        anchor: TextAnchor::Middle,
        bold: false,
    };

    for (&value, label) in x_axis.ticks.iter().zip(&x_axis.tick_labels) {
        let x = x_axis.data_to_pixel(value, area.left, area.right);
        canvas.line(x, area.bottom, x, area.bottom + 5.0, frame);
        canvas.text(x, area.bottom + 17.0, label, tick_style);
    }
    for (&value, label) in y_axis.ticks.iter().zip(&y_axis.tick_labels) {
        let y = y_axis.data_to_pixel(value, area.bottom, area.top);
        canvas.line(area.left - 5.0, y, area.left, y, frame);
        canvas.text(
            area.left - 8.0,
            y + 3.5,
            label,
            TextStyle {
                anchor: TextAnchor::End,
                ..tick_style
            },
        );
    }

    canvas.rect(
        area.left,
        area.top,
        area.right - area.left,
        area.bottom - area.top,
        Color::rgb(255, 255, 255),
        Some(frame),
    );

    let label_style = TextStyle {
        size: 12.0,
        anchor: TextAnchor::Middle,
        bold: false,
    };
    canvas.text(
        f64::midpoint(area.left, area.right),
        area.bottom + 40.0,
        &x_axis.label,
        label_style,
    );
    canvas.text_rotated(
        area.left - 50.0,
        f64::midpoint(area.top, area.bottom),
        &y_axis.label,
        label_style,
        -90.0,
    );
}

fn draw_legend(canvas: &mut Canvas, area: PlotArea, figure: &Figure, line_width: f64) {
    let entries: Vec<_> = figure
        .curves
        .iter()
        .filter(|curve| !curve.label.is_empty())
        .collect();
    if entries.is_empty() {
        return;
    }

    let font_size = 10.0;
    let row_height = 16.0;
    let swatch = 24.0;
    let padding = 8.0;
    let text_width = entries
        .iter()
        .map(|curve| Canvas::estimate_text_width(&curve.label, font_size))
        .fold(0.0, f64::max);

    let box_width = padding * 3.0 + swatch + text_width;
    #[expect(clippy::cast_precision_loss)]
    let box_height = padding * 2.0 + row_height * entries.len() as f64;
    let box_x = area.right - box_width - 10.0;
    let box_y = area.top + 10.0;

    canvas.rect(
        box_x,
        box_y,
        box_width,
        box_height,
        Color::rgb(255, 255, 255),
        Some(Stroke::solid(LEGEND_BORDER, 1.0)),
    );

    let mut y = box_y + padding + row_height / 2.0;
    for curve in entries {
        let x = box_x + padding;
        canvas.line(
            x,
            y,
            x + swatch,
            y,
            Stroke {
                color: curve.style.color,
                width: line_width,
                dash: curve.style.dash.svg_dasharray(),
            },
        );
        canvas.text(
            x + swatch + padding,
            y + 3.5,
            &curve.label,
            TextStyle {
                size: font_size,
                ..TextStyle::default()
            },
        );
        y += row_height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        figure::{Frame, StepCurve},
        style::SeriesStyle,
    };

    fn figure() -> Figure {
        Figure {
            frame: Frame::new("Rapidity <primary>", "y", "n"),
            x_range: (-10.0, 10.0),
            curves: vec![
                StepCurve {
                    label: "5.00 GeV string".into(),
                    style: "--,steelblue".parse().unwrap(),
                    edges: vec![-10.0, 0.0, 10.0],
                    heights: vec![3.0, 4.0],
                },
                StepCurve {
                    label: "20.00 GeV string".into(),
                    style: "seagreen".parse().unwrap(),
                    edges: vec![-10.0, 0.0, 10.0],
                    heights: vec![1.0, 2.0],
                },
            ],
        }
    }

    #[test]
    fn test_one_polyline_per_curve_in_order() {
        let svg = SvgRenderer::default().render(&figure());
        assert_eq!(svg.matches("<polyline").count(), 2);
        let first = svg.find("#4682b4").unwrap();
        let second = svg.find("#2e8b57").unwrap();
        assert!(first < second);
        assert!(svg.contains(r#"stroke-dasharray="6 3""#));
    }

    #[test]
    fn test_frame_text_and_legend() {
        let svg = SvgRenderer::default().render(&figure());
        assert!(svg.contains("Rapidity &lt;primary&gt;"));
        assert!(svg.contains(">y</text>"));
        assert!(svg.contains(">n</text>"));
        assert!(svg.contains(">5.00 GeV string</text>"));
        assert!(svg.contains(">20.00 GeV string</text>"));
        assert!(svg.contains(">-10</text>"));
        assert!(svg.contains(">10</text>"));
    }

    #[test]
    fn test_empty_figure_renders_frame_only() {
        let empty = Figure {
            frame: Frame::new("empty", "x", "y"),
            x_range: (0.0, 1.0),
            curves: vec![],
        };
        let svg = SvgRenderer::default().render(&empty);
        assert!(svg.contains("<svg"));
        assert!(!svg.contains("<polyline"));
        assert!(svg.contains(">empty</text>"));
    }

    #[test]
    fn test_unlabelled_curves_have_no_legend() {
        let mut figure = figure();
        for curve in &mut figure.curves {
            curve.label.clear();
            curve.style = SeriesStyle::default();
        }
        let svg = SvgRenderer::default().render(&figure);
        assert!(!svg.contains(&format!(r#"stroke="{LEGEND_BORDER}""#)));
    }

    #[test]
    fn test_render_is_deterministic() {
        let renderer = SvgRenderer::default();
        assert_eq!(renderer.render(&figure()), renderer.render(&figure()));
    }
}
