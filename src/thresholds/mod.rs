pub mod stacking;

pub use stacking::{stack_indicators, Indicator, IndicatorKind, PlacedIndicator};

use serde::Serialize;

use crate::models::{Metric, Rating};

/// Official Core Web Vitals boundaries: values below `good` are good, values
/// below `needs_improvement` need improvement, anything else is poor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Thresholds {
    pub good: f64,
    pub needs_improvement: f64,
}

pub const CLS_THRESHOLDS: Thresholds = Thresholds {
    good: 0.1,
    needs_improvement: 0.25,
};

pub const LCP_THRESHOLDS: Thresholds = Thresholds {
    good: 2500.0,
    needs_improvement: 4000.0,
};

pub const INP_THRESHOLDS: Thresholds = Thresholds {
    good: 200.0,
    needs_improvement: 500.0,
};

pub const TTFB_THRESHOLDS: Thresholds = Thresholds {
    good: 800.0,
    needs_improvement: 1800.0,
};

/// Full width of the CLS scale.
const CLS_SCALE_MAX: f64 = 0.5;

pub fn thresholds(metric: Metric) -> Thresholds {
    match metric {
        Metric::Cls => CLS_THRESHOLDS,
        Metric::Lcp => LCP_THRESHOLDS,
        Metric::Inp => INP_THRESHOLDS,
        Metric::Ttfb => TTFB_THRESHOLDS,
    }
}

pub fn rate(metric: Metric, value: f64) -> Rating {
    let bounds = thresholds(metric);
    if value < bounds.good {
        Rating::Good
    } else if value < bounds.needs_improvement {
        Rating::NeedsImprovement
    } else {
        Rating::Poor
    }
}

/// Position of `value` on the metric's visual scale, in percent.
///
/// Time-based scales span to twice the needs-improvement threshold.
pub fn position(metric: Metric, value: f64) -> f64 {
    let scale_max = match metric {
        Metric::Cls => CLS_SCALE_MAX,
        _ => thresholds(metric).needs_improvement * 2.0,
    };

    (value / scale_max * 100.0).clamp(0.0, 100.0)
}
