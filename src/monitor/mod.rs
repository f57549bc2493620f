mod loop_worker;

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use anyhow::{Context, Result};
use log::info;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
    collectors::{
        ClsCollector, CollectorUpdate, InpCollector, LcpCollector, MetricSink, NavigationCollector,
    },
    settings::CollectorSettings,
    timeline::{InputKind, ListenerOptions, ObserveOptions, PerformanceTimeline},
};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_warn;

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

pub(crate) struct Collectors {
    cls: Mutex<ClsCollector>,
    lcp: Mutex<LcpCollector>,
    inp: Mutex<InpCollector>,
    navigation: Mutex<NavigationCollector>,
}

/// Owns the collectors for one page load.
///
/// A new page load gets a new monitor; observers registered by `start` live
/// until `stop` (or drop of the page), never cancelled mid-entry.
pub struct PageMonitor {
    timeline: Arc<dyn PerformanceTimeline>,
    sink: Arc<dyn MetricSink>,
    settings: CollectorSettings,
    collectors: Arc<Collectors>,
    handles: Vec<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl PageMonitor {
    pub fn new(
        timeline: Arc<dyn PerformanceTimeline>,
        sink: Arc<dyn MetricSink>,
        settings: CollectorSettings,
    ) -> Self {
        let viewport = timeline.viewport();
        let collectors = Collectors {
            cls: Mutex::new(ClsCollector::new(viewport, settings.cls_log_cap)),
            lcp: Mutex::new(LcpCollector::new()),
            inp: Mutex::new(InpCollector::new(settings.inp_history_cap)),
            navigation: Mutex::new(NavigationCollector::new()),
        };

        Self {
            timeline,
            sink,
            settings,
            collectors: Arc::new(collectors),
            handles: Vec::new(),
            cancel_token: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.cancel_token.is_some()
    }

    /// Registers every observer and spawns one task per collector. Calling it
    /// again only re-sends the current INP snapshot.
    pub fn start(&mut self) {
        if self.is_running() {
            let snapshot = lock(&self.collectors.inp).snapshot();
            self.sink.emit(CollectorUpdate::Inp(snapshot));
            return;
        }

        let cancel_token = CancellationToken::new();
        self.start_cls(&cancel_token);
        self.start_lcp(&cancel_token);
        self.start_inp(&cancel_token);
        self.start_navigation(&cancel_token);
        self.cancel_token = Some(cancel_token);

        info!("page monitor started with {} collector tasks", self.handles.len());
    }

    fn spawn<F>(&mut self, task: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        self.handles.push(tokio::spawn(task));
    }

    fn start_cls(&mut self, cancel_token: &CancellationToken) {
        match self.timeline.observe_layout_shift(ObserveOptions::default()) {
            Ok(stream) => self.spawn(loop_worker::cls_loop(
                stream,
                Duration::from_millis(self.settings.cls_settle_ms),
                self.collectors.clone(),
                self.sink.clone(),
                cancel_token.clone(),
            )),
            Err(err) => log_warn!("CLS collection disabled: {err}"),
        }
    }

    fn start_lcp(&mut self, cancel_token: &CancellationToken) {
        match self
            .timeline
            .observe_largest_contentful_paint(ObserveOptions::default())
        {
            Ok(stream) => self.spawn(loop_worker::lcp_loop(
                stream,
                Duration::from_millis(self.settings.lcp_settle_ms),
                self.collectors.clone(),
                self.sink.clone(),
                cancel_token.clone(),
            )),
            Err(err) => log_warn!("LCP collection disabled: {err}"),
        }
    }

    fn start_inp(&mut self, cancel_token: &CancellationToken) {
        let options = ObserveOptions {
            buffered: true,
            duration_threshold: Some(0.0),
        };

        match self.timeline.observe_event_timing(options) {
            Ok(stream) => self.spawn(loop_worker::inp_event_loop(
                stream,
                self.collectors.clone(),
                self.sink.clone(),
                cancel_token.clone(),
            )),
            Err(err) => {
                log_warn!("event timing unavailable ({err}), falling back to manual INP");
                let listener = ListenerOptions {
                    passive: true,
                    capture: true,
                };
                match self.timeline.listen_input(&InputKind::TRACKED, listener) {
                    Ok(inputs) => self.spawn(loop_worker::inp_manual_loop(
                        inputs,
                        self.collectors.clone(),
                        self.sink.clone(),
                        cancel_token.clone(),
                    )),
                    Err(err) => log_warn!("INP collection disabled: {err}"),
                }
            }
        }

        let waiting = lock(&self.collectors.inp).snapshot();
        self.sink.emit(CollectorUpdate::Inp(waiting));
    }

    fn start_navigation(&mut self, cancel_token: &CancellationToken) {
        let navigation = self
            .timeline
            .observe_navigation()
            .map_err(|err| log_warn!("navigation timing unavailable: {err}"))
            .ok();
        let paint = self
            .timeline
            .observe_paint(ObserveOptions::default())
            .map_err(|err| log_warn!("paint timing unavailable: {err}"))
            .ok();

        if navigation.is_none() && paint.is_none() {
            return;
        }

        self.spawn(loop_worker::navigation_loop(
            navigation,
            paint,
            Duration::from_millis(self.settings.navigation_settle_ms),
            self.collectors.clone(),
            self.sink.clone(),
            cancel_token.clone(),
        ));
    }

    /// Latest state of every collector, for a popup that opens late.
    pub fn current(&self) -> Vec<CollectorUpdate> {
        vec![
            CollectorUpdate::Cls(lock(&self.collectors.cls).snapshot()),
            CollectorUpdate::Lcp(lock(&self.collectors.lcp).snapshot()),
            CollectorUpdate::Inp(lock(&self.collectors.inp).snapshot()),
            CollectorUpdate::Navigation(lock(&self.collectors.navigation).snapshot()),
        ]
    }

    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        for handle in self.handles.drain(..) {
            handle.await.context("collector task failed to join")?;
        }
        Ok(())
    }
}

impl Drop for PageMonitor {
    fn drop(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
    }
}
