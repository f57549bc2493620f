use serde::Serialize;

use crate::{
    attribution::{attribute, ElementAttribution},
    models::{Metric, Rating},
    thresholds::rate,
    timeline::LargestContentfulPaintEntry,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LcpSnapshot {
    pub value: f64,
    pub element: Option<ElementAttribution>,
    pub rating: Rating,
    pub size: Option<f64>,
    pub url: Option<String>,
}

/// Tracks the current largest-contentful-paint candidate. Later candidates
/// replace earlier ones.
#[derive(Debug, Default)]
pub struct LcpCollector {
    value: f64,
    element: Option<ElementAttribution>,
    size: Option<f64>,
    url: Option<String>,
}

impl LcpCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Only the last entry of a batch is relevant.
    pub fn record_batch(&mut self, batch: &[LargestContentfulPaintEntry]) -> Option<LcpSnapshot> {
        let candidate = batch.last()?;

        self.value = candidate.start_time;
        self.size = Some(candidate.size);
        self.url = candidate.url.clone().filter(|url| !url.is_empty());
        self.element = candidate
            .element
            .as_ref()
            .map(|node| attribute(node.as_ref()));

        Some(self.snapshot())
    }

    pub fn snapshot(&self) -> LcpSnapshot {
        LcpSnapshot {
            value: self.value,
            element: self.element.clone(),
            rating: rate(Metric::Lcp, self.value),
            size: self.size,
            url: self.url.clone(),
        }
    }
}
