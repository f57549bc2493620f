mod client;
pub mod extract;
mod types;

pub use client::PsiClient;
pub use extract::{extract_report, probe_lab};
pub use types::{
    FieldData, FieldMetric, Insight, LabData, LabProbe, LabShape, PsiExtraction,
};
