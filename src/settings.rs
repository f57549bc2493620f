use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

pub const DEFAULT_PSI_ENDPOINT: &str =
    "https://www.googleapis.com/pagespeedonline/v5/runPagespeed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PsiStrategy {
    Mobile,
    Desktop,
}

impl PsiStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PsiStrategy::Mobile => "mobile",
            PsiStrategy::Desktop => "desktop",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PsiSettings {
    pub api_key: Option<String>,
    pub strategy: PsiStrategy,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for PsiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            strategy: PsiStrategy::Mobile,
            endpoint: DEFAULT_PSI_ENDPOINT.into(),
            timeout_secs: 45,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorSettings {
    /// Delay before the catch-all CLS snapshot for pages that never shift.
    pub cls_settle_ms: u64,
    /// Delay before re-sending LCP for candidates replayed from the buffer.
    pub lcp_settle_ms: u64,
    pub navigation_settle_ms: u64,
    pub inp_history_cap: usize,
    pub cls_log_cap: usize,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            cls_settle_ms: 1000,
            lcp_settle_ms: 2000,
            navigation_settle_ms: 1500,
            inp_history_cap: 10,
            cls_log_cap: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    pub psi: PsiSettings,
    pub collectors: CollectorSettings,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<MonitorSettings>,
}

impl SettingsStore {
    /// Missing or unreadable JSON falls back to defaults.
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log::warn!("Ignoring malformed settings at {}: {err}", path.display());
                MonitorSettings::default()
            })
        } else {
            MonitorSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, MonitorSettings> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, MonitorSettings> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn all(&self) -> MonitorSettings {
        self.read().clone()
    }

    pub fn psi(&self) -> PsiSettings {
        self.read().psi.clone()
    }

    pub fn collectors(&self) -> CollectorSettings {
        self.read().collectors.clone()
    }

    pub fn update_psi(&self, settings: PsiSettings) -> Result<()> {
        let mut guard = self.write();
        guard.psi = settings;
        self.persist(&guard)
    }

    pub fn update_collectors(&self, settings: CollectorSettings) -> Result<()> {
        let mut guard = self.write();
        guard.collectors = settings;
        self.persist(&guard)
    }

    fn persist(&self, data: &MonitorSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory {}", parent.display())
            })?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;
        let data: MonitorSettings = serde_json::from_str(&contents)?;
        *self.write() = data;
        Ok(())
    }
}
