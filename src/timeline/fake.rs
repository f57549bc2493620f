//! In-memory stand-ins for the DOM and the performance timeline.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::*;
use crate::error::{DomError, TimelineError};

#[derive(Debug, Clone, Default)]
pub struct FakeNode {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: HashMap<String, String>,
    styles: HashMap<String, String>,
    rect: Option<BoundingBox>,
    natural: Option<NaturalSize>,
    current_src: Option<String>,
    text: Option<String>,
    position: Option<usize>,
}

impl FakeNode {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            rect: Some(BoundingBox::default()),
            position: Some(1),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_classes(mut self, classes: &[&str]) -> Self {
        self.classes = classes.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_style(mut self, property: &str, value: &str) -> Self {
        self.styles.insert(property.to_string(), value.to_string());
        self
    }

    pub fn with_box(mut self, rect: BoundingBox) -> Self {
        self.rect = Some(rect);
        self
    }

    pub fn with_natural_size(mut self, size: NaturalSize) -> Self {
        self.natural = Some(size);
        self
    }

    pub fn with_current_src(mut self, src: &str) -> Self {
        self.current_src = Some(src.to_string());
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn with_position(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    /// No parent, no layout box, no computed style.
    pub fn detached(mut self) -> Self {
        self.rect = None;
        self.position = None;
        self
    }

    pub fn into_ref(self) -> NodeRef {
        Arc::new(self)
    }
}

impl DomNode for FakeNode {
    fn tag_name(&self) -> String {
        self.tag.clone()
    }

    fn id(&self) -> Option<String> {
        self.id.clone()
    }

    fn class_list(&self) -> Vec<String> {
        self.classes.clone()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.get(name).cloned()
    }

    fn computed_style_value(&self, property: &str) -> Result<Option<String>, DomError> {
        if self.rect.is_none() {
            return Err(DomError::Detached);
        }
        Ok(self.styles.get(property).cloned())
    }

    fn bounding_box(&self) -> Result<BoundingBox, DomError> {
        self.rect.ok_or(DomError::Detached)
    }

    fn natural_size(&self) -> Option<NaturalSize> {
        self.natural
    }

    fn current_src(&self) -> Option<String> {
        self.current_src.clone()
    }

    fn text_content(&self) -> Option<String> {
        self.text.clone()
    }

    fn sibling_position(&self) -> Result<usize, DomError> {
        self.position.ok_or(DomError::MissingApi("parentElement"))
    }
}

/// A page whose observers are fed by the test through `push_*`.
pub struct FakeTimeline {
    viewport: Viewport,
    unsupported: HashSet<&'static str>,
    layout_shift: Mutex<Option<UnboundedSender<Vec<LayoutShiftEntry>>>>,
    lcp: Mutex<Option<UnboundedSender<Vec<LargestContentfulPaintEntry>>>>,
    event: Mutex<Option<UnboundedSender<Vec<EventTimingEntry>>>>,
    paint: Mutex<Option<UnboundedSender<Vec<PaintEntry>>>>,
    navigation: Mutex<Option<UnboundedSender<Vec<NavigationTiming>>>>,
    input: Mutex<Option<UnboundedSender<ManualInteraction>>>,
    /// Every registration attempt, with the options it asked for.
    pub observe_calls: Mutex<Vec<ObserveCall>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObserveCall {
    Entries(&'static str, Option<ObserveOptions>),
    Input(Vec<InputKind>, ListenerOptions),
}

impl ObserveCall {
    pub fn entry_type(&self) -> &'static str {
        match self {
            ObserveCall::Entries(entry_type, _) => *entry_type,
            ObserveCall::Input(..) => "input",
        }
    }
}

impl FakeTimeline {
    pub fn new() -> Self {
        Self {
            viewport: Viewport {
                width: 1000.0,
                height: 800.0,
            },
            unsupported: HashSet::new(),
            layout_shift: Mutex::new(None),
            lcp: Mutex::new(None),
            event: Mutex::new(None),
            paint: Mutex::new(None),
            navigation: Mutex::new(None),
            input: Mutex::new(None),
            observe_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn without(mut self, entry_type: &'static str) -> Self {
        self.unsupported.insert(entry_type);
        self
    }

    pub fn options_for(&self, entry_type: &str) -> Option<ObserveOptions> {
        self.observe_calls
            .lock()
            .unwrap()
            .iter()
            .find_map(|call| match call {
                ObserveCall::Entries(name, options) if *name == entry_type => *options,
                _ => None,
            })
    }

    fn register<T>(
        &self,
        call: ObserveCall,
        slot: &Mutex<Option<UnboundedSender<T>>>,
    ) -> Result<UnboundedReceiver<T>, TimelineError> {
        let entry_type = call.entry_type();
        self.observe_calls.lock().unwrap().push(call);
        if self.unsupported.contains(entry_type) {
            return Err(TimelineError::Unsupported(entry_type));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        *slot.lock().unwrap() = Some(tx);
        Ok(rx)
    }

    fn push<T>(slot: &Mutex<Option<UnboundedSender<T>>>, value: T) {
        if let Some(tx) = slot.lock().unwrap().as_ref() {
            tx.send(value).expect("observer receiver dropped");
        }
    }

    pub fn push_layout_shift(&self, batch: Vec<LayoutShiftEntry>) {
        Self::push(&self.layout_shift, batch);
    }

    pub fn push_lcp(&self, batch: Vec<LargestContentfulPaintEntry>) {
        Self::push(&self.lcp, batch);
    }

    pub fn push_event(&self, batch: Vec<EventTimingEntry>) {
        Self::push(&self.event, batch);
    }

    pub fn push_paint(&self, batch: Vec<PaintEntry>) {
        Self::push(&self.paint, batch);
    }

    pub fn push_navigation(&self, timing: NavigationTiming) {
        Self::push(&self.navigation, vec![timing]);
    }

    pub fn push_input(&self, interaction: ManualInteraction) {
        Self::push(&self.input, interaction);
    }
}

impl PerformanceTimeline for FakeTimeline {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn observe_layout_shift(
        &self,
        options: ObserveOptions,
    ) -> Result<EntryStream<LayoutShiftEntry>, TimelineError> {
        self.register(ObserveCall::Entries("layout-shift", Some(options)), &self.layout_shift)
    }

    fn observe_largest_contentful_paint(
        &self,
        options: ObserveOptions,
    ) -> Result<EntryStream<LargestContentfulPaintEntry>, TimelineError> {
        self.register(
            ObserveCall::Entries("largest-contentful-paint", Some(options)),
            &self.lcp,
        )
    }

    fn observe_event_timing(
        &self,
        options: ObserveOptions,
    ) -> Result<EntryStream<EventTimingEntry>, TimelineError> {
        self.register(ObserveCall::Entries("event", Some(options)), &self.event)
    }

    fn observe_paint(&self, options: ObserveOptions) -> Result<EntryStream<PaintEntry>, TimelineError> {
        self.register(ObserveCall::Entries("paint", Some(options)), &self.paint)
    }

    fn observe_navigation(&self) -> Result<EntryStream<NavigationTiming>, TimelineError> {
        self.register(ObserveCall::Entries("navigation", None), &self.navigation)
    }

    fn listen_input(
        &self,
        kinds: &[InputKind],
        options: ListenerOptions,
    ) -> Result<UnboundedReceiver<ManualInteraction>, TimelineError> {
        self.register(ObserveCall::Input(kinds.to_vec(), options), &self.input)
    }
}
