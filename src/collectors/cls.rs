use std::collections::VecDeque;

use serde::Serialize;

use crate::{
    attribution::{attribute, selector, ElementAttribution},
    models::{Metric, Rating},
    thresholds::rate,
    timeline::{LayoutShiftEntry, LayoutShiftSource, Viewport},
};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = false;

use crate::log_debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftSourceSummary {
    pub selector: Option<String>,
    pub shift_estimate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftSummary {
    pub value: f64,
    pub start_time: f64,
    pub sources: Vec<ShiftSourceSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClsSnapshot {
    pub value: f64,
    pub element: Option<ElementAttribution>,
    pub rating: Rating,
    pub shift_count: u64,
    pub entries: Vec<ShiftSummary>,
}

/// Running cumulative layout shift for one page.
#[derive(Debug)]
pub struct ClsCollector {
    viewport: Viewport,
    cls_value: f64,
    largest_shift: f64,
    largest_element: Option<ElementAttribution>,
    shift_count: u64,
    log: VecDeque<ShiftSummary>,
    log_cap: usize,
}

impl ClsCollector {
    pub fn new(viewport: Viewport, log_cap: usize) -> Self {
        Self {
            viewport,
            cls_value: 0.0,
            largest_shift: 0.0,
            largest_element: None,
            shift_count: 0,
            log: VecDeque::new(),
            log_cap: log_cap.max(1),
        }
    }

    pub fn value(&self) -> f64 {
        self.cls_value
    }

    /// Folds one entry into the total. Returns a snapshot only for entries
    /// that count (no recent input).
    pub fn record(&mut self, entry: &LayoutShiftEntry) -> Option<ClsSnapshot> {
        if entry.had_recent_input {
            log_debug!("ignoring input-driven shift {:.4}", entry.value);
            return None;
        }

        self.cls_value += entry.value;
        self.shift_count += 1;

        let estimates: Vec<f64> = entry
            .sources
            .iter()
            .map(|source| shift_estimate(source, self.viewport))
            .collect();

        let top_source = estimates
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(index, _)| &entry.sources[index]);

        if entry.value > self.largest_shift {
            self.largest_shift = entry.value;
            // A largest shift without a node clears the element of any older one.
            self.largest_element = top_source
                .and_then(|source| source.node.as_ref())
                .map(|node| attribute(node.as_ref()));
        }

        let sources = entry
            .sources
            .iter()
            .zip(estimates)
            .map(|(source, shift_estimate)| ShiftSourceSummary {
                selector: source.node.as_ref().map(|node| selector(node.as_ref())),
                shift_estimate,
            })
            .collect();

        self.log.push_back(ShiftSummary {
            value: entry.value,
            start_time: entry.start_time,
            sources,
        });
        while self.log.len() > self.log_cap {
            self.log.pop_front();
        }

        log_debug!(
            "layout shift {:.4} at {:.0}ms, cls now {:.4}",
            entry.value,
            entry.start_time,
            self.cls_value
        );

        Some(self.snapshot())
    }

    pub fn snapshot(&self) -> ClsSnapshot {
        ClsSnapshot {
            value: self.cls_value,
            element: self.largest_element.clone(),
            rating: rate(Metric::Cls, self.cls_value),
            shift_count: self.shift_count,
            entries: self.log.iter().cloned().collect(),
        }
    }
}

/// `(|dx| + |dy|) * max(current area, previous area) / viewport area`
pub fn shift_estimate(source: &LayoutShiftSource, viewport: Viewport) -> f64 {
    let dx = (source.current_rect.x - source.previous_rect.x).abs();
    let dy = (source.current_rect.y - source.previous_rect.y).abs();
    let area = source
        .current_rect
        .area()
        .max(source.previous_rect.area());
    let viewport_area = viewport.area().max(1.0);

    (dx + dy) * (area / viewport_area)
}
