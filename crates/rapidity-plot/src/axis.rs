/// Linear axis with "nice number" ticks and data-to-pixel mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub min: f64,
    pub max: f64,
    pub label: String,
    pub ticks: Vec<f64>,
    pub tick_labels: Vec<String>,
}

impl Axis {
    /// Axis spanning exactly `[min, max]`, ticked at multiples of a nice step.
    ///
    /// Histogram ranges are kept as given so the curves fill the frame.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn exact(min: f64, max: f64, target_ticks: usize) -> Self {
        let (min, max) = if max > min { (min, max) } else { (min, min + 1.0) };
        let step = nice_step((max - min) / (target_ticks.max(2) - 1) as f64);
        let first = (min / step).ceil() * step;
        let ticks = tick_values(first, max, step);
        Self::with_ticks(min, max, ticks, step)
    }

    /// Axis covering `[data_min, data_max]`, expanded outward to nice tick values.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn auto(data_min: f64, data_max: f64, target_ticks: usize) -> Self {
        let (data_min, data_max) = if data_max > data_min {
            (data_min, data_max)
        } else {
            (data_min, data_min + 1.0)
        };
        let step = nice_step((data_max - data_min) / (target_ticks.max(2) - 1) as f64);
        let min = (data_min / step).floor() * step;
        let max = (data_max / step).ceil() * step;
        let ticks = tick_values(min, max, step);
        Self::with_ticks(min, max, ticks, step)
    }

    fn with_ticks(min: f64, max: f64, ticks: Vec<f64>, step: f64) -> Self {
        let tick_labels = ticks.iter().map(|&v| format_tick(v, step)).collect();
        Self {
            min,
            max,
            label: String::new(),
            ticks,
            tick_labels,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Maps a data value onto the pixel interval `[px_min, px_max]`.
    #[must_use]
    pub fn data_to_pixel(&self, value: f64, px_min: f64, px_max: f64) -> f64 {
        let frac = (value - self.min) / (self.max - self.min);
        px_min + frac * (px_max - px_min)
    }
}

fn tick_values(first: f64, last: f64, step: f64) -> Vec<f64> {
    // Multiply instead of accumulating so ticks do not drift.
    (0_u32..)
        .map(|i| first + f64::from(i) * step)
        .take_while(|v| *v <= last + step * 0.01)
        .take(1000)
        .map(|v| if v.abs() < step * 1e-9 { 0.0 } else { v })
        .collect()
}

fn nice_step(rough: f64) -> f64 {
    let exp = rough.abs().log10().floor();
    let frac = rough / 10.0_f64.powf(exp);
    let nice_frac = if frac <= 1.5 {
        1.0
    } else if frac <= 3.5 {
        2.0
    } else if frac <= 7.5 {
        5.0
    } else {
        10.0
    };
    nice_frac * 10.0_f64.powf(exp)
}

#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step >= 1.0 {
        0
    } else {
        (-step.log10().floor()) as usize
    };
    format!("{value:.decimals$}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_keeps_range() {
        let axis = Axis::exact(-10.0, 10.0, 6);
        assert_eq!(axis.min, -10.0);
        assert_eq!(axis.max, 10.0);
        assert_eq!(axis.ticks, vec![-10.0, -5.0, 0.0, 5.0, 10.0]);
        assert_eq!(axis.tick_labels, vec!["-10", "-5", "0", "5", "10"]);
    }

    #[test]
    fn test_auto_expands_to_nice_values() {
        let axis = Axis::auto(0.0, 0.83, 5);
        assert_eq!(axis.min, 0.0);
        assert!(axis.max >= 0.83);
        assert_eq!(axis.tick_labels.first().map(String::as_str), Some("0.0"));
    }

    #[test]
    fn test_degenerate_range_is_widened() {
        let axis = Axis::auto(0.0, 0.0, 5);
        assert!(axis.max > axis.min);
        assert!(!axis.ticks.is_empty());
    }

    #[test]
    fn test_data_to_pixel() {
        let axis = Axis::exact(0.0, 100.0, 5);
        assert!((axis.data_to_pixel(50.0, 0.0, 500.0) - 250.0).abs() < 1e-9);
        // Inverted pixel interval for y axes.
        assert!((axis.data_to_pixel(100.0, 400.0, 0.0)).abs() < 1e-9);
    }

    #[test]
    fn test_nice_step_values() {
        assert!((nice_step(3.2) - 2.0).abs() < 1e-9);
        assert!((nice_step(0.7) - 0.5).abs() < 1e-9);
        assert!((nice_step(15.0) - 10.0).abs() < 1e-9);
        assert!((nice_step(4.5) - 5.0).abs() < 1e-9);
    }
}
