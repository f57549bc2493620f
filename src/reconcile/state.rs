use serde::{Deserialize, Serialize};

use crate::models::{Metric, Source};

use super::tolerance::values_match;

/// Local, field and lab values of one metric for the observed page.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricState {
    pub local: Option<f64>,
    pub field: Option<f64>,
    pub lab: Option<f64>,
}

impl MetricState {
    pub fn get(&self, source: Source) -> Option<f64> {
        match source {
            Source::Local => self.local,
            Source::Field => self.field,
            Source::Lab => self.lab,
        }
    }

    pub(crate) fn set(&mut self, source: Source, value: Option<f64>) {
        match source {
            Source::Local => self.local = value,
            Source::Field => self.field = value,
            Source::Lab => self.lab = value,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.local.is_none() && self.field.is_none() && self.lab.is_none()
    }

    /// Which sources agree within tolerance.
    ///
    /// With all three values present at most one flag is set, checked in the
    /// order all-sources, local-field, local-lab, field-lab. With fewer
    /// values every available pair is tested on its own.
    pub fn combination(&self, metric: Metric) -> CombinationState {
        let pair = |a: Option<f64>, b: Option<f64>| match (a, b) {
            (Some(a), Some(b)) => values_match(metric, a, b),
            _ => false,
        };

        let local_field = pair(self.local, self.field);
        let local_lab = pair(self.local, self.lab);
        let field_lab = pair(self.field, self.lab);

        let mut combination = CombinationState::default();

        if self.local.is_some() && self.field.is_some() && self.lab.is_some() {
            if local_field && local_lab && field_lab {
                combination.all_sources = true;
            } else if local_field {
                combination.local_field = true;
            } else if local_lab {
                combination.local_lab = true;
            } else if field_lab {
                combination.field_lab = true;
            }
        } else {
            combination.local_field = local_field;
            combination.local_lab = local_lab;
            combination.field_lab = field_lab;
        }

        combination
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinationState {
    pub local_field: bool,
    pub local_lab: bool,
    pub field_lab: bool,
    pub all_sources: bool,
}

impl CombinationState {
    pub fn any(&self) -> bool {
        self.local_field || self.local_lab || self.field_lab || self.all_sources
    }

    pub fn union(self, other: CombinationState) -> CombinationState {
        CombinationState {
            local_field: self.local_field || other.local_field,
            local_lab: self.local_lab || other.local_lab,
            field_lab: self.field_lab || other.field_lab,
            all_sources: self.all_sources || other.all_sources,
        }
    }
}
