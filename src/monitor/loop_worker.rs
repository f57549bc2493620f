use std::{sync::Arc, time::Duration};

use tokio::{sync::mpsc::UnboundedReceiver, time};
use tokio_util::sync::CancellationToken;

use crate::{
    collectors::{CollectorUpdate, MetricSink},
    timeline::{
        EntryStream, EventTimingEntry, LargestContentfulPaintEntry, LayoutShiftEntry,
        ManualInteraction, NavigationTiming, PaintEntry,
    },
};

use super::{lock, Collectors};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = false;

use crate::log_debug;

async fn next<T>(stream: &mut Option<UnboundedReceiver<T>>) -> Option<T> {
    match stream {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Feeds one observer stream into `on_item` until the page goes away, and
/// fires `on_settle` once after `settle`. Returns early once the stream has
/// closed and the settle timer has fired.
async fn drive<T>(
    mut stream: Option<UnboundedReceiver<T>>,
    settle: Option<Duration>,
    cancel_token: CancellationToken,
    mut on_item: impl FnMut(T),
    mut on_settle: impl FnMut(),
) {
    let timer = time::sleep(settle.unwrap_or_default());
    tokio::pin!(timer);
    let mut settled = settle.is_none();

    loop {
        if stream.is_none() && settled {
            break;
        }

        tokio::select! {
            _ = cancel_token.cancelled() => break,
            _ = &mut timer, if !settled => {
                settled = true;
                on_settle();
            }
            item = next(&mut stream), if stream.is_some() => match item {
                Some(item) => on_item(item),
                None => stream = None,
            },
        }
    }
}

fn emit_all(sink: &dyn MetricSink, updates: Vec<CollectorUpdate>) {
    for update in updates {
        sink.emit(update);
    }
}

pub(super) async fn cls_loop(
    stream: EntryStream<LayoutShiftEntry>,
    settle: Duration,
    collectors: Arc<Collectors>,
    sink: Arc<dyn MetricSink>,
    cancel_token: CancellationToken,
) {
    drive(
        Some(stream),
        Some(settle),
        cancel_token,
        |batch| {
            let updates: Vec<CollectorUpdate> = {
                let mut cls = lock(&collectors.cls);
                let updates = batch
                    .iter()
                    .filter_map(|entry| cls.record(entry))
                    .map(CollectorUpdate::Cls)
                    .collect();
                updates
            };
            emit_all(sink.as_ref(), updates);
        },
        || {
            let snapshot = lock(&collectors.cls).snapshot();
            log_debug!("cls settle snapshot {:.4}", snapshot.value);
            sink.emit(CollectorUpdate::Cls(snapshot));
        },
    )
    .await;
}

pub(super) async fn lcp_loop(
    stream: EntryStream<LargestContentfulPaintEntry>,
    settle: Duration,
    collectors: Arc<Collectors>,
    sink: Arc<dyn MetricSink>,
    cancel_token: CancellationToken,
) {
    drive(
        Some(stream),
        Some(settle),
        cancel_token,
        |batch| {
            let update = lock(&collectors.lcp).record_batch(&batch);
            if let Some(snapshot) = update {
                sink.emit(CollectorUpdate::Lcp(snapshot));
            }
        },
        || {
            let snapshot = lock(&collectors.lcp).snapshot();
            log_debug!("lcp settle snapshot {:.0}ms", snapshot.value);
            sink.emit(CollectorUpdate::Lcp(snapshot));
        },
    )
    .await;
}

pub(super) async fn inp_event_loop(
    stream: EntryStream<EventTimingEntry>,
    collectors: Arc<Collectors>,
    sink: Arc<dyn MetricSink>,
    cancel_token: CancellationToken,
) {
    drive(
        Some(stream),
        None,
        cancel_token,
        |batch| {
            let updates: Vec<CollectorUpdate> = {
                let mut inp = lock(&collectors.inp);
                let updates = batch
                    .iter()
                    .filter_map(|entry| inp.record_entry(entry))
                    .map(CollectorUpdate::Inp)
                    .collect();
                updates
            };
            emit_all(sink.as_ref(), updates);
        },
        || {},
    )
    .await;
}

pub(super) async fn inp_manual_loop(
    inputs: UnboundedReceiver<ManualInteraction>,
    collectors: Arc<Collectors>,
    sink: Arc<dyn MetricSink>,
    cancel_token: CancellationToken,
) {
    drive(
        Some(inputs),
        None,
        cancel_token,
        |interaction| {
            let update = lock(&collectors.inp).record_manual(&interaction);
            if let Some(snapshot) = update {
                sink.emit(CollectorUpdate::Inp(snapshot));
            }
        },
        || {},
    )
    .await;
}

pub(super) async fn navigation_loop(
    mut navigation: Option<EntryStream<NavigationTiming>>,
    mut paint: Option<EntryStream<PaintEntry>>,
    settle: Duration,
    collectors: Arc<Collectors>,
    sink: Arc<dyn MetricSink>,
    cancel_token: CancellationToken,
) {
    let timer = time::sleep(settle);
    tokio::pin!(timer);
    let mut settled = false;

    loop {
        if settled && navigation.is_none() && paint.is_none() {
            break;
        }

        let update = tokio::select! {
            _ = cancel_token.cancelled() => break,
            _ = &mut timer, if !settled => {
                settled = true;
                Some(lock(&collectors.navigation).snapshot())
            }
            batch = next(&mut navigation), if navigation.is_some() => match batch {
                Some(batch) => {
                    let mut collector = lock(&collectors.navigation);
                    let snapshot = batch
                        .into_iter()
                        .filter_map(|timing| collector.record_navigation(timing))
                        .last();
                    snapshot
                }
                None => {
                    navigation = None;
                    None
                }
            },
            batch = next(&mut paint), if paint.is_some() => match batch {
                Some(batch) => {
                    let snapshot = lock(&collectors.navigation).record_paint(&batch);
                    snapshot
                }
                None => {
                    paint = None;
                    None
                }
            },
        };

        if let Some(snapshot) = update {
            sink.emit(CollectorUpdate::Navigation(snapshot));
        }
    }
}
