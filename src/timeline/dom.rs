use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::error::DomError;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub width: f64,
    pub height: f64,
    pub top: f64,
    pub left: f64,
}

/// Intrinsic size of a media resource (`naturalWidth`/`naturalHeight`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NaturalSize {
    pub width: f64,
    pub height: f64,
}

/// The slice of a DOM element the attributor needs.
///
/// Implemented over the real DOM by the extension shell and by plain structs
/// in tests. Calls that can throw in a browser (detached nodes, missing
/// layout) return `Result`; everything else is optional data.
pub trait DomNode: Send + Sync + fmt::Debug {
    fn tag_name(&self) -> String;

    fn id(&self) -> Option<String>;

    fn class_list(&self) -> Vec<String>;

    fn attribute(&self, name: &str) -> Option<String>;

    fn computed_style_value(&self, property: &str) -> Result<Option<String>, DomError>;

    fn bounding_box(&self) -> Result<BoundingBox, DomError>;

    /// `Some` only for media elements that have decoded a resource.
    fn natural_size(&self) -> Option<NaturalSize> {
        None
    }

    /// The source the browser actually selected (`currentSrc`).
    fn current_src(&self) -> Option<String> {
        None
    }

    fn text_content(&self) -> Option<String>;

    /// 1-indexed position among the parent's element children, `Err` when
    /// the node has no parent.
    fn sibling_position(&self) -> Result<usize, DomError>;
}

pub type NodeRef = Arc<dyn DomNode>;
