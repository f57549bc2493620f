use serde::Serialize;

use crate::{
    models::{Metric, Rating},
    thresholds::rate,
    timeline::{NavigationTiming, PaintEntry},
};

pub const FIRST_CONTENTFUL_PAINT: &str = "first-contentful-paint";

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationSnapshot {
    pub ttfb: Option<f64>,
    pub dom_load: Option<f64>,
    pub page_load: Option<f64>,
    pub fcp: Option<f64>,
    pub rating: Option<Rating>,
}

/// One-shot navigation timings plus first contentful paint.
#[derive(Debug, Default)]
pub struct NavigationCollector {
    timing: Option<NavigationTiming>,
    fcp: Option<f64>,
}

impl NavigationCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` until the first response byte has a timestamp.
    pub fn ttfb(&self) -> Option<f64> {
        self.timing
            .filter(|timing| timing.response_start > 0.0)
            .map(|timing| (timing.response_start - timing.request_start).max(0.0))
    }

    /// The navigation entry is read once; repeats are ignored.
    pub fn record_navigation(&mut self, timing: NavigationTiming) -> Option<NavigationSnapshot> {
        if self.timing.is_some() {
            return None;
        }
        self.timing = Some(timing);
        Some(self.snapshot())
    }

    pub fn record_paint(&mut self, entries: &[PaintEntry]) -> Option<NavigationSnapshot> {
        if self.fcp.is_some() {
            return None;
        }
        let fcp = entries
            .iter()
            .find(|entry| entry.name == FIRST_CONTENTFUL_PAINT)?;
        self.fcp = Some(fcp.start_time);
        Some(self.snapshot())
    }

    pub fn snapshot(&self) -> NavigationSnapshot {
        let ttfb = self.ttfb();
        let since_start = |end: f64, start: f64| (end > 0.0).then(|| end - start);

        NavigationSnapshot {
            ttfb,
            dom_load: self
                .timing
                .and_then(|t| since_start(t.dom_content_loaded_event_end, t.start_time)),
            page_load: self
                .timing
                .and_then(|t| since_start(t.load_event_end, t.start_time)),
            fcp: self.fcp,
            rating: ttfb.map(|value| rate(Metric::Ttfb, value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing() -> NavigationTiming {
        NavigationTiming {
            start_time: 0.0,
            request_start: 120.0,
            response_start: 1020.0,
            dom_content_loaded_event_end: 1800.0,
            load_event_end: 0.0,
        }
    }

    #[test]
    fn ttfb_is_response_minus_request_start() {
        let mut collector = NavigationCollector::new();
        let snapshot = collector.record_navigation(timing()).unwrap();

        assert_eq!(snapshot.ttfb, Some(900.0));
        assert_eq!(snapshot.rating, Some(Rating::NeedsImprovement));
        assert_eq!(snapshot.dom_load, Some(1800.0));
        assert_eq!(snapshot.page_load, None);
        assert!(collector.record_navigation(timing()).is_none());
    }

    #[test]
    fn missing_response_start_is_not_a_fast_ttfb() {
        let mut collector = NavigationCollector::new();
        let snapshot = collector
            .record_navigation(NavigationTiming {
                response_start: 0.0,
                ..timing()
            })
            .unwrap();

        assert_eq!(snapshot.ttfb, None);
        assert_eq!(snapshot.rating, None);
        assert_eq!(snapshot.dom_load, Some(1800.0));
    }

    #[test]
    fn first_contentful_paint_is_captured_once() {
        let mut collector = NavigationCollector::new();
        assert!(collector
            .record_paint(&[PaintEntry {
                name: "first-paint".into(),
                start_time: 300.0,
            }])
            .is_none());

        let snapshot = collector
            .record_paint(&[PaintEntry {
                name: FIRST_CONTENTFUL_PAINT.into(),
                start_time: 420.0,
            }])
            .unwrap();
        assert_eq!(snapshot.fcp, Some(420.0));
        assert!(snapshot.ttfb.is_none());

        assert!(collector
            .record_paint(&[PaintEntry {
                name: FIRST_CONTENTFUL_PAINT.into(),
                start_time: 999.0,
            }])
            .is_none());
    }
}
