use serde::{Deserialize, Serialize};

use super::NodeRef;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }
}

#[derive(Debug, Clone)]
pub struct LayoutShiftSource {
    pub node: Option<NodeRef>,
    pub previous_rect: Rect,
    pub current_rect: Rect,
}

#[derive(Debug, Clone)]
pub struct LayoutShiftEntry {
    pub value: f64,
    pub had_recent_input: bool,
    pub start_time: f64,
    pub sources: Vec<LayoutShiftSource>,
}

#[derive(Debug, Clone)]
pub struct LargestContentfulPaintEntry {
    pub start_time: f64,
    pub size: f64,
    pub url: Option<String>,
    pub element: Option<NodeRef>,
}

/// An `event` timing entry. Browsers report `interactionId == 0` for events
/// that are not part of an interaction.
#[derive(Debug, Clone)]
pub struct EventTimingEntry {
    pub name: String,
    pub start_time: f64,
    pub duration: f64,
    pub interaction_id: Option<u64>,
    pub target: Option<NodeRef>,
}

impl EventTimingEntry {
    pub fn interaction(&self) -> Option<u64> {
        self.interaction_id.filter(|id| *id != 0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaintEntry {
    pub name: String,
    pub start_time: f64,
}

/// The fields of `PerformanceNavigationTiming` the navigation collector reads.
/// All values are relative to navigation start (`start_time`, normally 0).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationTiming {
    pub start_time: f64,
    pub request_start: f64,
    pub response_start: f64,
    pub dom_content_loaded_event_end: f64,
    pub load_event_end: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Pointerdown,
    Click,
    Keydown,
}

impl InputKind {
    pub const TRACKED: [InputKind; 3] = [InputKind::Pointerdown, InputKind::Click, InputKind::Keydown];

    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Pointerdown => "pointerdown",
            InputKind::Click => "click",
            InputKind::Keydown => "keydown",
        }
    }
}

/// An input event seen by the manual fallback listener, with the timestamp of
/// the first animation frame after it was dispatched.
#[derive(Debug, Clone)]
pub struct ManualInteraction {
    pub kind: InputKind,
    pub dispatched_at: f64,
    pub next_frame_at: f64,
    pub target: Option<NodeRef>,
}

impl ManualInteraction {
    pub fn duration(&self) -> f64 {
        (self.next_frame_at - self.dispatched_at).max(0.0)
    }
}
