use serde_json::Value;

use crate::models::Metric;

use super::types::{FieldData, FieldMetric, Insight, LabData, LabProbe, LabShape, PsiExtraction};

const MAX_INSIGHTS: usize = 10;
const INSIGHT_SCORE_CEILING: f64 = 0.9;

/// Audits that are metrics rather than actionable findings.
const METRIC_AUDITS: [&str; 7] = [
    "cumulative-layout-shift",
    "largest-contentful-paint",
    "first-contentful-paint",
    "speed-index",
    "total-blocking-time",
    "interactive",
    "max-potential-fid",
];

fn field_key(metric: Metric) -> &'static str {
    match metric {
        Metric::Cls => "CUMULATIVE_LAYOUT_SHIFT_SCORE",
        Metric::Lcp => "LARGEST_CONTENTFUL_PAINT_MS",
        Metric::Inp => "INTERACTION_TO_NEXT_PAINT",
        Metric::Ttfb => "EXPERIMENTAL_TIME_TO_FIRST_BYTE",
    }
}

/// Reports arrive either bare or wrapped as `{ "data": report }`.
fn report_root(report: &Value) -> &Value {
    match report.get("data") {
        Some(data) if data.is_object() => data,
        _ => report,
    }
}

pub fn extract_report(report: &Value) -> PsiExtraction {
    let root = report_root(report);
    let (lab_shape, lab_data) = match probe_lab(root) {
        LabProbe::Found { shape, data } => (Some(shape), data),
        LabProbe::NotFound => (None, LabData::default()),
    };

    PsiExtraction {
        field_data: extract_field(root),
        lab_data,
        lab_shape,
        insights: extract_insights(root),
    }
}

pub fn extract_field(root: &Value) -> FieldData {
    let metrics = root.pointer("/loadingExperience/metrics");
    let read = |metric: Metric| -> Option<FieldMetric> {
        let entry = metrics?.get(field_key(metric))?;
        let percentile = entry.get("percentile")?.as_f64()?;
        // CLS percentiles are reported in hundredths.
        let value = match metric {
            Metric::Cls => percentile / 100.0,
            _ => percentile,
        };
        Some(FieldMetric {
            value,
            category: entry
                .get("category")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    };

    FieldData {
        cls: read(Metric::Cls),
        lcp: read(Metric::Lcp),
        inp: read(Metric::Inp),
        ttfb: read(Metric::Ttfb),
    }
}

/// Tries each known lab shape in order; the first that yields any value wins.
pub fn probe_lab(root: &Value) -> LabProbe {
    let shapes = [
        (LabShape::LighthouseAudits, lighthouse_lab(root)),
        (LabShape::Metrics, keyed_lab(root.get("metrics"))),
        (LabShape::LabData, keyed_lab(root.get("labData"))),
    ];

    shapes
        .into_iter()
        .find(|(_, data)| !data.is_empty())
        .map(|(shape, data)| LabProbe::Found { shape, data })
        .unwrap_or(LabProbe::NotFound)
}

fn lighthouse_lab(root: &Value) -> LabData {
    let audit = |id: &str| {
        root.pointer(&format!("/lighthouseResult/audits/{id}/numericValue"))
            .and_then(Value::as_f64)
    };

    LabData {
        cls: audit("cumulative-layout-shift"),
        lcp: audit("largest-contentful-paint"),
    }
}

fn keyed_lab(section: Option<&Value>) -> LabData {
    let Some(section) = section.filter(|s| s.is_object()) else {
        return LabData::default();
    };

    let read = |keys: &[&str]| {
        keys.iter()
            .filter_map(|key| section.get(*key))
            .find_map(numeric)
    };

    LabData {
        cls: read(&["cls", "cumulativeLayoutShift", "cumulative-layout-shift"]),
        lcp: read(&["lcp", "largestContentfulPaint", "largest-contentful-paint"]),
    }
}

/// A bare number or an object carrying `numericValue` / `value`.
fn numeric(value: &Value) -> Option<f64> {
    value.as_f64().or_else(|| {
        value
            .get("numericValue")
            .or_else(|| value.get("value"))
            .and_then(Value::as_f64)
    })
}

pub fn extract_insights(root: &Value) -> Vec<Insight> {
    let Some(audits) = root
        .pointer("/lighthouseResult/audits")
        .and_then(Value::as_object)
    else {
        return Vec::new();
    };

    let mut insights: Vec<Insight> = audits
        .iter()
        .filter(|(id, _)| !METRIC_AUDITS.contains(&id.as_str()))
        .filter_map(|(id, audit)| {
            let score = audit.get("score")?.as_f64()?;
            if score >= INSIGHT_SCORE_CEILING {
                return None;
            }
            Some(Insight {
                id: id.clone(),
                title: audit.get("title")?.as_str()?.to_string(),
                display_value: audit
                    .get("displayValue")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                score,
                savings_ms: audit
                    .pointer("/details/overallSavingsMs")
                    .and_then(Value::as_f64),
            })
        })
        .collect();

    insights.sort_by(|a, b| {
        let a_savings = a.savings_ms.unwrap_or(-1.0);
        let b_savings = b.savings_ms.unwrap_or(-1.0);
        b_savings
            .total_cmp(&a_savings)
            .then_with(|| a.id.cmp(&b.id))
    });
    insights.truncate(MAX_INSIGHTS);
    insights
}
