mod dom;
mod entries;
#[cfg(test)]
pub(crate) mod fake;

pub use dom::{BoundingBox, DomNode, NaturalSize, NodeRef};
pub use entries::{
    EventTimingEntry, InputKind, LargestContentfulPaintEntry, LayoutShiftEntry,
    LayoutShiftSource, ManualInteraction, NavigationTiming, PaintEntry, Rect, Viewport,
};

use tokio::sync::mpsc::UnboundedReceiver;

use crate::error::TimelineError;

/// Batches delivered by one `PerformanceObserver` callback, in arrival order.
pub type EntryStream<T> = UnboundedReceiver<Vec<T>>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserveOptions {
    /// Replay entries recorded before the observer attached.
    pub buffered: bool,
    /// Only meaningful for `event` entries.
    pub duration_threshold: Option<f64>,
}

impl Default for ObserveOptions {
    fn default() -> Self {
        Self {
            buffered: true,
            duration_threshold: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerOptions {
    pub passive: bool,
    pub capture: bool,
}

/// Performance-timeline capabilities of the observed page.
///
/// Every `observe_*` call registers one observer that lives for the lifetime
/// of the page. `Err` means the browser lacks the API or entry type and the
/// caller must degrade instead of failing.
pub trait PerformanceTimeline: Send + Sync {
    fn viewport(&self) -> Viewport;

    fn observe_layout_shift(
        &self,
        options: ObserveOptions,
    ) -> Result<EntryStream<LayoutShiftEntry>, TimelineError>;

    fn observe_largest_contentful_paint(
        &self,
        options: ObserveOptions,
    ) -> Result<EntryStream<LargestContentfulPaintEntry>, TimelineError>;

    fn observe_event_timing(
        &self,
        options: ObserveOptions,
    ) -> Result<EntryStream<EventTimingEntry>, TimelineError>;

    fn observe_paint(&self, options: ObserveOptions) -> Result<EntryStream<PaintEntry>, TimelineError>;

    /// Yields the single navigation entry once it is available.
    fn observe_navigation(&self) -> Result<EntryStream<NavigationTiming>, TimelineError>;

    fn listen_input(
        &self,
        kinds: &[InputKind],
        options: ListenerOptions,
    ) -> Result<UnboundedReceiver<ManualInteraction>, TimelineError>;
}
