use serde::Serialize;
use url::Url;

use crate::{
    error::VitalsError,
    models::{InboundMessage, Metric, Source},
    thresholds::{position, stack_indicators, Indicator, IndicatorKind, PlacedIndicator},
};

use super::state::{CombinationState, MetricState};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SourcePositions {
    pub local: Option<f64>,
    pub field: Option<f64>,
    pub lab: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricView {
    pub metric: Metric,
    pub state: MetricState,
    pub combination: CombinationState,
    pub positions: SourcePositions,
    pub indicators: Vec<PlacedIndicator>,
}

/// Everything the presentation layer needs, captured in one consistent read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSnapshot {
    pub page_url: Option<String>,
    pub metrics: Vec<MetricView>,
    pub global: CombinationState,
}

impl EngineSnapshot {
    pub fn metric(&self, metric: Metric) -> &MetricView {
        &self.metrics[metric.index()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// A field or lab report for another page.
    DiscardedStale,
}

/// Tri-source state for the four metrics of the observed page.
#[derive(Debug, Default)]
pub struct ReconciliationEngine {
    page_url: Option<String>,
    states: [MetricState; 4],
    combinations: [CombinationState; 4],
}

impl ReconciliationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_page(url: &str) -> Self {
        let mut engine = Self::new();
        engine.reset_for_page(url);
        engine
    }

    pub fn page_url(&self) -> Option<&str> {
        self.page_url.as_deref()
    }

    pub fn set_local(&mut self, metric: Metric, value: Option<f64>) {
        self.store(metric, Source::Local, value);
    }

    pub fn set_field(&mut self, metric: Metric, value: Option<f64>) {
        self.store(metric, Source::Field, value);
    }

    /// Lab values exist only for CLS and LCP; anything else is rejected and
    /// leaves the state untouched.
    pub fn set_lab(&mut self, metric: Metric, value: Option<f64>) -> Result<(), VitalsError> {
        if !metric.supports_lab() {
            return Err(VitalsError::LabUnsupported { metric });
        }
        self.store(metric, Source::Lab, value);
        Ok(())
    }

    fn store(&mut self, metric: Metric, source: Source, value: Option<f64>) {
        let value = value.filter(|v| v.is_finite());
        let index = metric.index();
        self.states[index].set(source, value);
        self.combinations[index] = self.states[index].combination(metric);
        log_debug!(
            "{} {} = {:?}, combination {:?}",
            metric,
            source.as_str(),
            value,
            self.combinations[index]
        );
    }

    /// Clears every value; the page has changed.
    pub fn reset_for_page(&mut self, url: &str) {
        self.page_url = Some(normalize_url(url));
        self.states = Default::default();
        self.combinations = Default::default();
    }

    pub fn apply(&mut self, message: &InboundMessage) -> Result<ApplyOutcome, VitalsError> {
        if let Some(url) = message.url() {
            if !self.is_current_page(url) {
                log_warn!(
                    "discarding {} {} for {} (observing {:?})",
                    message.source().as_str(),
                    message.metric(),
                    url,
                    self.page_url
                );
                return Ok(ApplyOutcome::DiscardedStale);
            }
        }

        let metric = message.metric();
        match message.source() {
            Source::Local => self.set_local(metric, message.value()),
            Source::Field => self.set_field(metric, message.value()),
            Source::Lab => self.set_lab(metric, message.value())?,
        }
        Ok(ApplyOutcome::Applied)
    }

    fn is_current_page(&self, url: &str) -> bool {
        self.page_url
            .as_deref()
            .is_some_and(|current| current == normalize_url(url))
    }

    pub fn state(&self, metric: Metric) -> MetricState {
        self.states[metric.index()]
    }

    pub fn combination(&self, metric: Metric) -> CombinationState {
        self.combinations[metric.index()]
    }

    /// Whether any metric shows each kind of agreement; drives the legend.
    pub fn global_combination(&self) -> CombinationState {
        self.combinations
            .iter()
            .fold(CombinationState::default(), |acc, c| acc.union(*c))
    }

    pub fn positions(&self, metric: Metric) -> SourcePositions {
        let state = self.state(metric);
        SourcePositions {
            local: state.local.map(|v| position(metric, v)),
            field: state.field.map(|v| position(metric, v)),
            lab: state.lab.map(|v| position(metric, v)),
        }
    }

    /// Source markers plus combination badges, stacked where they collide.
    /// A badge sits at the position of the first source in its pair.
    pub fn indicators(&self, metric: Metric) -> Vec<PlacedIndicator> {
        let positions = self.positions(metric);
        let combination = self.combination(metric);

        let mut indicators: Vec<Indicator> = [
            (Source::Local, positions.local),
            (Source::Field, positions.field),
            (Source::Lab, positions.lab),
        ]
        .into_iter()
        .filter_map(|(source, position)| {
            position.map(|position| Indicator {
                kind: IndicatorKind::Source(source),
                position,
            })
        })
        .collect();

        let badges = [
            (combination.all_sources, IndicatorKind::AllSources, positions.local),
            (combination.local_field, IndicatorKind::LocalField, positions.local),
            (combination.local_lab, IndicatorKind::LocalLab, positions.local),
            (combination.field_lab, IndicatorKind::FieldLab, positions.field),
        ];
        for (active, kind, position) in badges {
            if let (true, Some(position)) = (active, position) {
                indicators.push(Indicator { kind, position });
            }
        }

        stack_indicators(&indicators)
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            page_url: self.page_url.clone(),
            metrics: Metric::ALL
                .iter()
                .map(|&metric| MetricView {
                    metric,
                    state: self.state(metric),
                    combination: self.combination(metric),
                    positions: self.positions(metric),
                    indicators: self.indicators(metric),
                })
                .collect(),
            global: self.global_combination(),
        }
    }
}

/// Fragments never change what PSI or the page measures.
pub fn normalize_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => url.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thresholds::IndicatorKind;

    const PAGE: &str = "https://shop.example/products/42";

    #[test]
    fn setters_touch_only_their_source() {
        let mut engine = ReconciliationEngine::for_page(PAGE);
        engine.set_field(Metric::Lcp, Some(2400.0));
        engine.set_local(Metric::Lcp, Some(2400.5));

        let state = engine.state(Metric::Lcp);
        assert_eq!(state.field, Some(2400.0));
        assert_eq!(state.local, Some(2400.5));
        assert_eq!(state.lab, None);
        assert!(engine.combination(Metric::Lcp).local_field);
        let local_position = engine.positions(Metric::Lcp).local.unwrap();
        assert!((local_position - 30.00625).abs() < 1e-9);
        assert!(engine.state(Metric::Cls).is_empty());
    }

    #[test]
    fn exclusive_combination_with_three_values() {
        let mut engine = ReconciliationEngine::for_page(PAGE);
        engine.set_local(Metric::Inp, Some(100.0));
        engine.set_field(Metric::Inp, Some(100.05));
        // INP has no lab data; use LCP for the three-source case.
        assert!(engine.set_lab(Metric::Inp, Some(500.0)).is_err());

        engine.set_local(Metric::Lcp, Some(100.0));
        engine.set_field(Metric::Lcp, Some(100.05));
        engine.set_lab(Metric::Lcp, Some(500.0)).unwrap();
        assert_eq!(
            engine.combination(Metric::Lcp),
            CombinationState {
                local_field: true,
                ..Default::default()
            }
        );
    }

    #[test]
    fn lab_ttfb_is_never_populated() {
        let mut engine = ReconciliationEngine::for_page(PAGE);
        assert!(matches!(
            engine.set_lab(Metric::Ttfb, Some(100.0)),
            Err(VitalsError::LabUnsupported { metric: Metric::Ttfb })
        ));
        let message = InboundMessage::Lab {
            metric: Metric::Ttfb,
            value: Some(100.0),
            url: None,
        };
        assert!(engine.apply(&message).is_err());
        assert_eq!(engine.state(Metric::Ttfb).lab, None);
    }

    #[test]
    fn reset_clears_all_sources_and_global_state() {
        let mut engine = ReconciliationEngine::for_page(PAGE);
        engine.set_local(Metric::Cls, Some(0.2));
        engine.set_field(Metric::Cls, Some(0.2));
        assert!(engine.global_combination().local_field);

        engine.reset_for_page("https://shop.example/cart");
        assert_eq!(engine.state(Metric::Cls), MetricState::default());
        assert!(!engine.global_combination().any());
        assert_eq!(engine.page_url(), Some("https://shop.example/cart"));
    }

    #[test]
    fn global_combination_ors_metrics() {
        let mut engine = ReconciliationEngine::for_page(PAGE);
        engine.set_local(Metric::Cls, Some(0.05));
        engine.set_lab(Metric::Cls, Some(0.05)).unwrap();
        engine.set_field(Metric::Ttfb, Some(600.0));
        engine.set_local(Metric::Ttfb, Some(600.4));

        let global = engine.global_combination();
        assert!(global.local_lab);
        assert!(global.local_field);
        assert!(!global.field_lab);
        assert!(!global.all_sources);
    }

    #[test]
    fn stale_reports_are_discarded() {
        let mut engine = ReconciliationEngine::for_page(PAGE);
        let stale = InboundMessage::Field {
            metric: Metric::Lcp,
            value: Some(3000.0),
            url: Some("https://shop.example/products/41".into()),
        };
        assert_eq!(engine.apply(&stale).unwrap(), ApplyOutcome::DiscardedStale);
        assert_eq!(engine.state(Metric::Lcp).field, None);

        let current = InboundMessage::Field {
            metric: Metric::Lcp,
            value: Some(3000.0),
            url: Some(format!("{PAGE}#reviews")),
        };
        assert_eq!(engine.apply(&current).unwrap(), ApplyOutcome::Applied);
        assert_eq!(engine.state(Metric::Lcp).field, Some(3000.0));
    }

    #[test]
    fn tagged_report_without_observed_page_is_discarded() {
        let mut engine = ReconciliationEngine::new();
        let message = InboundMessage::Lab {
            metric: Metric::Cls,
            value: Some(0.1),
            url: Some(PAGE.into()),
        };
        assert_eq!(engine.apply(&message).unwrap(), ApplyOutcome::DiscardedStale);
    }

    #[test]
    fn non_finite_values_are_stored_as_null() {
        let mut engine = ReconciliationEngine::for_page(PAGE);
        engine.set_local(Metric::Lcp, Some(f64::NAN));
        assert_eq!(engine.state(Metric::Lcp).local, None);
    }

    #[test]
    fn indicators_include_badges_and_stack() {
        let mut engine = ReconciliationEngine::for_page(PAGE);
        engine.set_field(Metric::Lcp, Some(2400.0));
        engine.set_local(Metric::Lcp, Some(2400.5));

        let indicators = engine.indicators(Metric::Lcp);
        assert_eq!(indicators.len(), 3);
        assert!(indicators
            .iter()
            .any(|i| i.kind == IndicatorKind::LocalField && i.level > 0));
        assert_eq!(indicators.iter().filter(|i| i.level == 0).count(), 1);

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.metrics.len(), 4);
        assert_eq!(snapshot.metric(Metric::Lcp).indicators, indicators);
    }
}
