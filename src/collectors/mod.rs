pub mod cls;
pub mod inp;
pub mod lcp;
pub mod navigation;

pub use cls::{ClsCollector, ClsSnapshot};
pub use inp::{InpCollector, InpSnapshot, InpStatus, MeasurementMethod};
pub use lcp::{LcpCollector, LcpSnapshot};
pub use navigation::{NavigationCollector, NavigationSnapshot};

use serde::Serialize;

use crate::models::{InboundMessage, Metric};

/// What a collector publishes after processing an entry or a settle timer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum CollectorUpdate {
    Cls(ClsSnapshot),
    Lcp(LcpSnapshot),
    Inp(InpSnapshot),
    Navigation(NavigationSnapshot),
}

impl CollectorUpdate {
    pub fn metric(&self) -> Metric {
        match self {
            CollectorUpdate::Cls(_) => Metric::Cls,
            CollectorUpdate::Lcp(_) => Metric::Lcp,
            CollectorUpdate::Inp(_) => Metric::Inp,
            CollectorUpdate::Navigation(_) => Metric::Ttfb,
        }
    }

    /// The local-source message the reconciliation engine consumes.
    pub fn to_inbound(&self) -> InboundMessage {
        match self {
            CollectorUpdate::Cls(snapshot) => InboundMessage::Local {
                metric: Metric::Cls,
                value: Some(snapshot.value),
                element: snapshot.element.clone(),
                rating: Some(snapshot.rating),
            },
            CollectorUpdate::Lcp(snapshot) => InboundMessage::Local {
                metric: Metric::Lcp,
                value: Some(snapshot.value),
                element: snapshot.element.clone(),
                rating: Some(snapshot.rating),
            },
            CollectorUpdate::Inp(snapshot) => InboundMessage::Local {
                metric: Metric::Inp,
                value: snapshot.value,
                element: snapshot.element.clone(),
                rating: snapshot.rating,
            },
            CollectorUpdate::Navigation(snapshot) => InboundMessage::Local {
                metric: Metric::Ttfb,
                value: snapshot.ttfb,
                element: None,
                rating: snapshot.rating,
            },
        }
    }
}

/// Receives collector output. The extension shell forwards these over
/// runtime messaging; in-process consumers feed them to the engine.
pub trait MetricSink: Send + Sync {
    fn emit(&self, update: CollectorUpdate);
}
