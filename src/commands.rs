use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use log::info;

use crate::{
    models::InboundMessage,
    monitor::PageMonitor,
    psi::{PsiClient, PsiExtraction},
    reconcile::{ApplyOutcome, EngineHandle, EngineSnapshot, ReconciliationEngine},
    settings::{CollectorSettings, MonitorSettings, PsiSettings, SettingsStore},
    timeline::PerformanceTimeline,
};

/// State shared by the commands the extension shell invokes.
pub struct AppState {
    pub(crate) engine: EngineHandle,
    pub(crate) settings: SettingsStore,
}

impl AppState {
    pub fn new(settings_path: PathBuf) -> Result<Self> {
        Ok(Self {
            engine: EngineHandle::new(ReconciliationEngine::new()),
            settings: SettingsStore::new(settings_path)?,
        })
    }

    pub fn engine(&self) -> &EngineHandle {
        &self.engine
    }
}

/// The active tab navigated; everything known about the old page is dropped.
pub fn begin_page(state: &AppState, url: String) -> Result<EngineSnapshot, String> {
    info!("observing {url}");
    state.engine.reset_for_page(&url);
    Ok(state.engine.snapshot())
}

/// Starts collecting on a freshly loaded page, feeding the engine with the
/// current collector settings. Must run inside the tokio runtime.
pub fn start_monitor(
    state: &AppState,
    timeline: Arc<dyn PerformanceTimeline>,
) -> Result<PageMonitor, String> {
    let mut monitor = PageMonitor::new(
        timeline,
        Arc::new(state.engine.clone()),
        state.settings.collectors(),
    );
    monitor.start();
    Ok(monitor)
}

pub fn apply_message(state: &AppState, message: InboundMessage) -> Result<EngineSnapshot, String> {
    state.engine.apply(&message).map_err(|e| e.to_string())?;
    Ok(state.engine.snapshot())
}

pub fn get_snapshot(state: &AppState) -> Result<EngineSnapshot, String> {
    Ok(state.engine.snapshot())
}

/// Fetches PSI for `url` and merges its field and lab values. Values for a
/// page the user has since left are discarded by the engine.
pub async fn analyze_with_psi(state: &AppState, url: String) -> Result<PsiExtraction, String> {
    let client = PsiClient::new(&state.settings.psi());
    let extraction = client.fetch(&url).await.map_err(|e| e.user_message())?;

    let mut stale = 0;
    for message in extraction.messages(&url) {
        match state.engine.apply(&message).map_err(|e| e.to_string())? {
            ApplyOutcome::Applied => {}
            ApplyOutcome::DiscardedStale => stale += 1,
        }
    }
    if stale > 0 {
        info!("{stale} PSI values for {url} arrived after navigation and were dropped");
    }

    Ok(extraction)
}

pub fn get_settings(state: &AppState) -> Result<MonitorSettings, String> {
    Ok(state.settings.all())
}

pub fn update_psi_settings(state: &AppState, settings: PsiSettings) -> Result<(), String> {
    state
        .settings
        .update_psi(settings)
        .map_err(|e| e.to_string())
}

/// Takes effect for monitors started after the update.
pub fn update_collector_settings(
    state: &AppState,
    settings: CollectorSettings,
) -> Result<(), String> {
    state
        .settings
        .update_collectors(settings)
        .map_err(|e| e.to_string())
}
