use std::fmt::{self, Write as _};

use crate::figure::{Figure, FigureRenderer};

/// Renders a [`Figure`] as a self-contained matplotlib script.
///
/// The script embeds the bin edges and heights of every curve and, when run,
/// saves the plot as a PDF next to itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatplotlibRenderer;

impl FigureRenderer for MatplotlibRenderer {
    fn render(&self, figure: &Figure) -> String {
        let mut script = String::new();
        // Writing into a `String` cannot fail.
        let _ = write_script(&mut script, figure);
        script
    }
}

fn write_script(out: &mut String, figure: &Figure) -> fmt::Result {
    writeln!(out, "#!/usr/bin/env python3")?;
    writeln!(out, "from pathlib import Path")?;
    writeln!(out)?;
    writeln!(out, "import matplotlib.pyplot as plt")?;
    writeln!(out)?;
    writeln!(out, "CURVES = [")?;
    for curve in &figure.curves {
        writeln!(out, "    {{")?;
        writeln!(out, "        \"label\": {},", py_str(&curve.label))?;
        writeln!(
            out,
            "        \"linestyle\": {},",
            py_str(curve.style.dash.matplotlib())
        )?;
        writeln!(
            out,
            "        \"color\": {},",
            py_str(&curve.style.color.to_hex())
        )?;
        writeln!(out, "        \"edges\": {},", py_list(&curve.edges))?;
        writeln!(out, "        \"heights\": {},", py_list(&curve.heights))?;
        writeln!(out, "    }},")?;
    }
    writeln!(out, "]")?;
    writeln!(out)?;
    writeln!(out)?;
    writeln!(out, "def main():")?;
    writeln!(out, "    fig, ax = plt.subplots(figsize=(7.2, 4.8))")?;
    writeln!(out, "    for curve in CURVES:")?;
    writeln!(out, "        ax.stairs(")?;
    writeln!(out, "            curve[\"heights\"],")?;
    writeln!(out, "            curve[\"edges\"],")?;
    writeln!(out, "            linestyle=curve[\"linestyle\"],")?;
    writeln!(out, "            color=curve[\"color\"],")?;
    writeln!(out, "            label=curve[\"label\"] or None,")?;
    writeln!(out, "        )")?;
    writeln!(out, "    ax.set_title({})", py_str(&figure.frame.title))?;
    writeln!(out, "    ax.set_xlabel({})", py_str(&figure.frame.x_label))?;
    writeln!(out, "    ax.set_ylabel({})", py_str(&figure.frame.y_label))?;
    writeln!(
        out,
        "    ax.set_xlim({}, {})",
        py_float(figure.x_range.0),
        py_float(figure.x_range.1)
    )?;
    writeln!(out, "    ax.set_ylim(bottom=0)")?;
    writeln!(out, "    if any(curve[\"label\"] for curve in CURVES):")?;
    writeln!(out, "        ax.legend(loc=\"upper right\")")?;
    writeln!(out, "    fig.tight_layout()")?;
    writeln!(out, "    fig.savefig(Path(__file__).with_suffix(\".pdf\"))")?;
    writeln!(out)?;
    writeln!(out)?;
    writeln!(out, "if __name__ == \"__main__\":")?;
    writeln!(out, "    main()")?;
    Ok(())
}

fn py_str(value: &str) -> String {
    let mut literal = String::with_capacity(value.len() + 2);
    literal.push('"');
    for c in value.chars() {
        match c {
            '\\' => literal.push_str("\\\\"),
            '"' => literal.push_str("\\\""),
            '\n' => literal.push_str("\\n"),
            '\r' => literal.push_str("\\r"),
            '\t' => literal.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(literal, "\\u{:04x}", u32::from(c));
            }
            c => literal.push(c),
        }
    }
    literal.push('"');
    literal
}

fn py_float(value: f64) -> String {
    if value.is_nan() {
        "float(\"nan\")".to_owned()
    } else if value.is_infinite() {
        if value > 0.0 {
            "float(\"inf\")".to_owned()
        } else {
            "float(\"-inf\")".to_owned()
        }
    } else {
        // `Debug` prints the shortest representation that round-trips.
        format!("{value:?}")
    }
}

fn py_list(values: &[f64]) -> String {
    let items: Vec<_> = values.iter().map(|&v| py_float(v)).collect();
    format!("[{}]", items.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::{Frame, StepCurve};

    fn figure() -> Figure {
        Figure {
            frame: Frame::new("dn/dy of \"primary\" hadrons", "y", "n"),
            x_range: (-10.0, 10.0),
            curves: vec![StepCurve {
                label: "5.00 GeV string".into(),
                style: "--,steelblue".parse().unwrap(),
                edges: vec![-10.0, 0.0, 10.0],
                heights: vec![0.5, 2.0],
            }],
        }
    }

    #[test]
    fn test_script_embeds_curve_data() {
        let script = MatplotlibRenderer.render(&figure());
        assert!(script.contains("\"edges\": [-10.0, 0.0, 10.0],"));
        assert!(script.contains("\"heights\": [0.5, 2.0],"));
        assert!(script.contains("\"linestyle\": \"--\","));
        assert!(script.contains("\"color\": \"#4682b4\","));
        assert!(script.contains("ax.stairs("));
        assert!(script.contains("ax.set_xlim(-10.0, 10.0)"));
    }

    #[test]
    fn test_strings_are_escaped() {
        let script = MatplotlibRenderer.render(&figure());
        assert!(script.contains(r#"ax.set_title("dn/dy of \"primary\" hadrons")"#));
        assert_eq!(py_str("a\\b\nc"), r#""a\\b\nc""#);
    }

    #[test]
    fn test_non_finite_floats() {
        assert_eq!(py_float(f64::NAN), "float(\"nan\")");
        assert_eq!(py_float(f64::NEG_INFINITY), "float(\"-inf\")");
        assert_eq!(py_float(1e-7), "1e-7");
    }

    #[test]
    fn test_empty_figure() {
        let empty = Figure {
            frame: Frame::default(),
            x_range: (0.0, 1.0),
            curves: vec![],
        };
        let script = MatplotlibRenderer.render(&empty);
        assert!(script.contains("CURVES = [\n]"));
        assert!(script.contains("ax.set_xlim(0.0, 1.0)"));
    }
}
