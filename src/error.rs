use crate::models::Metric;

/// Rejections raised by the reconciliation engine and snapshot constructors.
#[derive(Debug, thiserror::Error)]
pub enum VitalsError {
    #[error("lab data is not collected for {metric}")]
    LabUnsupported { metric: Metric },
}

/// The browser could not provide a performance-timeline capability.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimelineError {
    #[error("entry type '{0}' is not supported")]
    Unsupported(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("node is detached from the document")]
    Detached,

    #[error("node does not expose {0}")]
    MissingApi(&'static str),
}

/// Failures while fetching a PageSpeed Insights report.
#[derive(Debug, thiserror::Error)]
pub enum PsiError {
    #[error("invalid page url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("PSI returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("unexpected PSI response: {0}")]
    InvalidResponse(String),
}

impl PsiError {
    /// Short text suitable for showing to the user in the popup.
    pub fn user_message(&self) -> String {
        match self {
            PsiError::InvalidUrl { .. } => {
                "This page can't be analyzed by PageSpeed Insights.".to_string()
            }
            PsiError::Network(_) => {
                "Could not reach PageSpeed Insights. Check your connection and try again."
                    .to_string()
            }
            PsiError::Timeout { secs } => {
                format!("PageSpeed Insights did not respond within {secs} seconds.")
            }
            PsiError::Http { status: 429, .. } => {
                "PageSpeed Insights rate limit reached. Try again in a minute.".to_string()
            }
            PsiError::Http { message, .. } => format!("PageSpeed Insights error: {message}"),
            PsiError::InvalidResponse(_) => {
                "PageSpeed Insights returned a report we could not read.".to_string()
            }
        }
    }
}
