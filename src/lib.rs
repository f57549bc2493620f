//! Core Web Vitals measurement and reconciliation for the vitals-lens
//! extension.
//!
//! Collectors observe the page's performance timeline and publish local
//! CLS, LCP, INP and TTFB values. The reconciliation engine merges them with
//! PageSpeed Insights field and lab values and works out which sources agree.

pub mod attribution;
pub mod collectors;
pub mod commands;
pub mod error;
pub mod models;
pub mod monitor;
pub mod psi;
pub mod reconcile;
pub mod settings;
pub mod thresholds;
pub mod timeline;
mod utils;

pub use attribution::{attribute, ElementAttribution};
pub use collectors::{CollectorUpdate, MetricSink};
pub use commands::AppState;
pub use error::{DomError, PsiError, TimelineError, VitalsError};
pub use models::{InboundMessage, Metric, MetricSnapshot, Rating, Source};
pub use monitor::PageMonitor;
pub use psi::{PsiClient, PsiExtraction};
pub use reconcile::{
    tolerance, CombinationState, EngineHandle, EngineSnapshot, MetricState, ReconciliationEngine,
};
pub use settings::{MonitorSettings, SettingsStore};
pub use utils::logging::init_logging;
