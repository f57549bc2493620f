use std::collections::{HashMap, VecDeque};

use serde::Serialize;

use crate::{
    attribution::{attribute, ElementAttribution},
    models::{Metric, Rating},
    thresholds::rate,
    timeline::{EventTimingEntry, ManualInteraction, NodeRef},
};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = false;

use crate::log_debug;

pub const DEFAULT_HISTORY_CAP: usize = 10;
/// Per-interaction maxima kept before older interactions are forgotten.
pub const MAX_TRACKED_INTERACTIONS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MeasurementMethod {
    EventTiming,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InpStatus {
    Waiting,
    Measured,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRecord {
    pub interaction_id: u64,
    pub duration: f64,
    pub start_time: f64,
    pub name: String,
    pub target: Option<String>,
    pub element: Option<ElementAttribution>,
    pub method: MeasurementMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InpSnapshot {
    pub value: Option<f64>,
    pub entries: Vec<InteractionRecord>,
    pub rating: Option<Rating>,
    pub status: InpStatus,
    pub element: Option<ElementAttribution>,
}

/// Worst interaction latency seen on the page.
#[derive(Debug)]
pub struct InpCollector {
    durations: HashMap<u64, f64>,
    max_inp: Option<f64>,
    element: Option<ElementAttribution>,
    history: VecDeque<InteractionRecord>,
    history_cap: usize,
    last_sent: Option<i64>,
    next_manual_id: u64,
}

impl InpCollector {
    pub fn new(history_cap: usize) -> Self {
        Self {
            durations: HashMap::new(),
            max_inp: None,
            element: None,
            history: VecDeque::new(),
            history_cap: history_cap.max(1),
            last_sent: None,
            next_manual_id: 1,
        }
    }

    pub fn max_inp(&self) -> Option<f64> {
        self.max_inp
    }

    /// Longest duration recorded for one logical interaction.
    pub fn interaction_duration(&self, interaction_id: u64) -> Option<f64> {
        self.durations.get(&interaction_id).copied()
    }

    /// Returns a snapshot only when the rounded worst latency changed.
    pub fn record_entry(&mut self, entry: &EventTimingEntry) -> Option<InpSnapshot> {
        let interaction_id = entry.interaction()?;
        self.observe(
            interaction_id,
            &entry.name,
            entry.start_time,
            entry.duration,
            entry.target.as_ref(),
            MeasurementMethod::EventTiming,
        );
        self.take_update()
    }

    /// Fallback path: every manual input event is its own interaction.
    pub fn record_manual(&mut self, interaction: &ManualInteraction) -> Option<InpSnapshot> {
        let interaction_id = self.next_manual_id;
        self.next_manual_id += 1;

        self.observe(
            interaction_id,
            interaction.kind.as_str(),
            interaction.dispatched_at,
            interaction.duration(),
            interaction.target.as_ref(),
            MeasurementMethod::Manual,
        );
        self.take_update()
    }

    fn observe(
        &mut self,
        interaction_id: u64,
        name: &str,
        start_time: f64,
        duration: f64,
        target: Option<&NodeRef>,
        method: MeasurementMethod,
    ) {
        let slot = self.durations.entry(interaction_id).or_insert(0.0);
        if duration > *slot {
            *slot = duration;
        }
        let duration = *slot;

        if self.durations.len() > MAX_TRACKED_INTERACTIONS {
            // Forgotten interactions are already folded into `max_inp`.
            self.durations.retain(|id, _| *id == interaction_id);
        }

        if self.max_inp.is_some_and(|max| duration <= max) {
            return;
        }

        let element = target.map(|node| attribute(node.as_ref()));
        log_debug!(
            "new worst interaction {} ({}) {:.0}ms",
            interaction_id,
            name,
            duration
        );

        self.max_inp = Some(duration);
        self.element = element.clone();
        self.history.push_front(InteractionRecord {
            interaction_id,
            duration,
            start_time,
            name: name.to_string(),
            target: element.as_ref().map(|e| e.selector.clone()),
            element,
            method,
        });
        self.history.truncate(self.history_cap);
    }

    fn take_update(&mut self) -> Option<InpSnapshot> {
        let rounded = self.max_inp.map(|value| value.round() as i64);
        if rounded.is_none() || rounded == self.last_sent {
            return None;
        }
        self.last_sent = rounded;
        Some(self.snapshot())
    }

    pub fn snapshot(&self) -> InpSnapshot {
        InpSnapshot {
            value: self.max_inp,
            entries: self.history.iter().cloned().collect(),
            rating: self.max_inp.map(|value| rate(Metric::Inp, value)),
            status: if self.max_inp.is_some() {
                InpStatus::Measured
            } else {
                InpStatus::Waiting
            },
            element: self.element.clone(),
        }
    }
}
