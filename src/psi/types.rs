use serde::{Deserialize, Serialize};

use crate::models::{InboundMessage, Metric};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMetric {
    pub value: f64,
    /// CrUX bucket, e.g. `FAST`, `AVERAGE`, `SLOW`.
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldData {
    pub cls: Option<FieldMetric>,
    pub lcp: Option<FieldMetric>,
    pub inp: Option<FieldMetric>,
    pub ttfb: Option<FieldMetric>,
}

impl FieldData {
    pub fn get(&self, metric: Metric) -> Option<&FieldMetric> {
        match metric {
            Metric::Cls => self.cls.as_ref(),
            Metric::Lcp => self.lcp.as_ref(),
            Metric::Inp => self.inp.as_ref(),
            Metric::Ttfb => self.ttfb.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        Metric::ALL.iter().all(|metric| self.get(*metric).is_none())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabData {
    pub cls: Option<f64>,
    pub lcp: Option<f64>,
}

impl LabData {
    pub fn is_empty(&self) -> bool {
        self.cls.is_none() && self.lcp.is_none()
    }
}

/// Where in the report the lab values were found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LabShape {
    LighthouseAudits,
    Metrics,
    LabData,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LabProbe {
    Found { shape: LabShape, data: LabData },
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub id: String,
    pub title: String,
    pub display_value: Option<String>,
    pub score: f64,
    pub savings_ms: Option<f64>,
}

/// The parts of a PSI report the extension uses.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PsiExtraction {
    pub field_data: FieldData,
    pub lab_data: LabData,
    pub lab_shape: Option<LabShape>,
    pub insights: Vec<Insight>,
}

impl PsiExtraction {
    /// Field and lab messages for the engine, tagged with the page they
    /// were fetched for. Missing values are sent as null so a refreshed
    /// report clears what it no longer has.
    pub fn messages(&self, url: &str) -> Vec<InboundMessage> {
        let mut messages: Vec<InboundMessage> = Metric::ALL
            .iter()
            .map(|&metric| InboundMessage::Field {
                metric,
                value: self.field_data.get(metric).map(|m| m.value),
                url: Some(url.to_string()),
            })
            .collect();

        messages.push(InboundMessage::Lab {
            metric: Metric::Cls,
            value: self.lab_data.cls,
            url: Some(url.to_string()),
        });
        messages.push(InboundMessage::Lab {
            metric: Metric::Lcp,
            value: self.lab_data.lcp,
            url: Some(url.to_string()),
        });

        messages
    }
}
