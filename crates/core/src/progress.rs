//! Progress presentation helpers shared by the reporter and the client
//! view model.

/// Zero baseline for elapsed-time displays.
pub const ZERO_ELAPSED: &str = "00:00:00";

/// How a percent value should be rendered.
///
/// The backend signals "this step finished without a known sub-progress"
/// by omitting the percent or sending a non-finite value; that renders as
/// a full, unlabelled bar rather than a crash or a blank widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PercentDisplay {
    /// A concrete percentage in `[0, 100]`.
    Known(f64),
    /// Indeterminate: render the bar saturated with no label.
    Saturated,
}

impl PercentDisplay {
    /// Classify a raw percent field from a progress event.
    pub fn from_percent(percent: Option<f64>) -> Self {
        match percent {
            Some(p) if p.is_finite() => PercentDisplay::Known(p),
            _ => PercentDisplay::Saturated,
        }
    }

    /// Bar width in percent.
    pub fn width_percent(&self) -> f64 {
        match self {
            PercentDisplay::Known(p) => *p,
            PercentDisplay::Saturated => 100.0,
        }
    }

    /// Text label, one decimal place; empty for the saturated form.
    pub fn label(&self) -> String {
        match self {
            PercentDisplay::Known(p) => format!("{p:.1}%"),
            PercentDisplay::Saturated => String::new(),
        }
    }
}

impl Default for PercentDisplay {
    fn default() -> Self {
        PercentDisplay::Known(0.0)
    }
}

/// Format a duration in whole seconds as `HH:MM:SS`.
pub fn format_hms(total_secs: u64) -> String {
    let h = total_secs / 3600;
    let m = (total_secs % 3600) / 60;
    let s = total_secs % 60;
    format!("{h:02}:{m:02}:{s:02}")
}
