use serde::{Deserialize, Serialize};

use crate::attribution::ElementAttribution;

use super::{Metric, Rating, Source};

/// Payloads accepted by the reconciliation engine.
///
/// Local values come from the in-page collectors; field and lab values are
/// produced by the PSI extractor and may be tagged with the page they
/// describe so stale reports can be discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum InboundMessage {
    #[serde(rename_all = "camelCase")]
    Local {
        metric: Metric,
        value: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        element: Option<ElementAttribution>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rating: Option<Rating>,
    },
    #[serde(rename_all = "camelCase")]
    Field {
        metric: Metric,
        value: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Lab {
        metric: Metric,
        value: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
}

impl InboundMessage {
    pub fn metric(&self) -> Metric {
        match self {
            InboundMessage::Local { metric, .. }
            | InboundMessage::Field { metric, .. }
            | InboundMessage::Lab { metric, .. } => *metric,
        }
    }

    pub fn source(&self) -> Source {
        match self {
            InboundMessage::Local { .. } => Source::Local,
            InboundMessage::Field { .. } => Source::Field,
            InboundMessage::Lab { .. } => Source::Lab,
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            InboundMessage::Local { value, .. }
            | InboundMessage::Field { value, .. }
            | InboundMessage::Lab { value, .. } => *value,
        }
    }

    /// Page the report was fetched for. Local messages are always for the
    /// page they were observed on.
    pub fn url(&self) -> Option<&str> {
        match self {
            InboundMessage::Local { .. } => None,
            InboundMessage::Field { url, .. } | InboundMessage::Lab { url, .. } => url.as_deref(),
        }
    }
}
