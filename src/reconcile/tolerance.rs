use crate::models::Metric;

const CLS_FLOOR: f64 = 0.0005;
const TIME_FLOOR_MS: f64 = 1.0;
const RELATIVE: f64 = 0.001;

/// Largest difference at which two values of `metric` count as the same
/// measurement, scaled from `reference`.
pub fn tolerance(metric: Metric, reference: f64) -> f64 {
    let floor = if metric.is_time_based() {
        TIME_FLOOR_MS
    } else {
        CLS_FLOOR
    };

    floor.max(reference * RELATIVE)
}

/// `a` and `b` match when `|a - b| <= tolerance(metric, a)`.
///
/// The tolerance is taken from the first operand only, so the test is not
/// symmetric; callers pass pairs in a fixed order.
pub fn values_match(metric: Metric, a: f64, b: f64) -> bool {
    (a - b).abs() <= tolerance(metric, a)
}
