use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::VitalsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Cls,
    Lcp,
    Inp,
    Ttfb,
}

impl Metric {
    pub const ALL: [Metric; 4] = [Metric::Cls, Metric::Lcp, Metric::Inp, Metric::Ttfb];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Cls => "cls",
            Metric::Lcp => "lcp",
            Metric::Inp => "inp",
            Metric::Ttfb => "ttfb",
        }
    }

    /// CLS is a unitless score; everything else is measured in milliseconds.
    pub fn is_time_based(&self) -> bool {
        !matches!(self, Metric::Cls)
    }

    /// Lab runs have no real server round-trip or user input, so only
    /// CLS and LCP carry lab values.
    pub fn supports_lab(&self) -> bool {
        matches!(self, Metric::Cls | Metric::Lcp)
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Metric::Cls => 0,
            Metric::Lcp => 1,
            Metric::Inp => 2,
            Metric::Ttfb => 3,
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Local,
    Field,
    Lab,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Local => "local",
            Source::Field => "field",
            Source::Lab => "lab",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rating {
    Good,
    NeedsImprovement,
    Poor,
}

impl Rating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Good => "good",
            Rating::NeedsImprovement => "needs-improvement",
            Rating::Poor => "poor",
        }
    }
}

/// One measurement of one metric from one source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSnapshot {
    pub metric: Metric,
    pub source: Source,
    pub value: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl MetricSnapshot {
    pub fn new(metric: Metric, source: Source, value: Option<f64>) -> Result<Self, VitalsError> {
        if source == Source::Lab && !metric.supports_lab() {
            return Err(VitalsError::LabUnsupported { metric });
        }

        Ok(Self {
            metric,
            source,
            value,
            timestamp: Utc::now(),
        })
    }
}
