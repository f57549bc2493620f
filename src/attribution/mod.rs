use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::timeline::{BoundingBox, DomNode};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = false;

use crate::log_debug;

const TEXT_SNIPPET_CHARS: usize = 200;

const RELEVANT_ATTRIBUTES: [&str; 7] = [
    "loading",
    "decoding",
    "fetchpriority",
    "sizes",
    "srcset",
    "data-src",
    "data-lazy",
];

/// Natural versus displayed size of a media element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NaturalDimensions {
    pub natural_width: f64,
    pub natural_height: f64,
    pub displayed_width: f64,
    pub displayed_height: f64,
}

/// Descriptive fingerprint of the node implicated in a metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementAttribution {
    pub tag_name: String,
    pub id: Option<String>,
    pub class_list: Vec<String>,
    pub selector: String,
    pub bounding_box: Option<BoundingBox>,
    pub natural_dimensions: Option<NaturalDimensions>,
    pub primary_source: Option<String>,
    pub text_snippet: Option<String>,
    pub relevant_attributes: BTreeMap<String, String>,
}

/// Builds the attribution for `node`. Introspection failures leave the
/// affected fields empty instead of failing the whole attribution.
pub fn attribute(node: &dyn DomNode) -> ElementAttribution {
    let tag_name = node.tag_name().to_ascii_lowercase();
    let id = node.id().filter(|id| !id.is_empty());
    let class_list: Vec<String> = node
        .class_list()
        .into_iter()
        .filter(|class| !class.is_empty())
        .collect();

    let bounding_box = match node.bounding_box() {
        Ok(rect) => Some(rect),
        Err(err) => {
            log_debug!("bounding box unavailable for <{}>: {}", tag_name, err);
            None
        }
    };

    let natural_dimensions = node.natural_size().map(|natural| {
        let displayed = bounding_box.unwrap_or_default();
        NaturalDimensions {
            natural_width: natural.width,
            natural_height: natural.height,
            displayed_width: displayed.width,
            displayed_height: displayed.height,
        }
    });

    let selector = build_selector(node, &tag_name, id.as_deref(), &class_list);
    let primary_source = resolve_primary_source(node);

    let text_snippet = node
        .text_content()
        .map(|text| text.trim().chars().take(TEXT_SNIPPET_CHARS).collect::<String>())
        .filter(|text| !text.is_empty());

    let relevant_attributes = RELEVANT_ATTRIBUTES
        .iter()
        .filter_map(|name| node.attribute(name).map(|value| (name.to_string(), value)))
        .collect();

    ElementAttribution {
        tag_name,
        id,
        class_list,
        selector,
        bounding_box,
        natural_dimensions,
        primary_source,
        text_snippet,
        relevant_attributes,
    }
}

/// Just the selector part of [`attribute`], for callers that label many
/// nodes and never show the rest.
pub fn selector(node: &dyn DomNode) -> String {
    let tag_name = node.tag_name().to_ascii_lowercase();
    let id = node.id().filter(|id| !id.is_empty());
    let first_class: Vec<String> = node
        .class_list()
        .into_iter()
        .filter(|class| !class.is_empty())
        .take(1)
        .collect();
    build_selector(node, &tag_name, id.as_deref(), &first_class)
}

/// `#id`, else `tag.firstClass`, else `tag:nth-child(n)`; a bare tag when the
/// node has no parent to count siblings in.
fn build_selector(node: &dyn DomNode, tag_name: &str, id: Option<&str>, classes: &[String]) -> String {
    if let Some(id) = id {
        return format!("#{id}");
    }

    if let Some(first) = classes.first() {
        return format!("{tag_name}.{first}");
    }

    match node.sibling_position() {
        Ok(position) => format!("{tag_name}:nth-child({position})"),
        Err(err) => {
            log_debug!("no sibling position for <{}>: {}", tag_name, err);
            tag_name.to_string()
        }
    }
}

/// `currentSrc` > `src` > computed `background-image` URL.
fn resolve_primary_source(node: &dyn DomNode) -> Option<String> {
    if let Some(current) = node.current_src().filter(|src| !src.is_empty()) {
        return Some(current);
    }

    if let Some(src) = node.attribute("src").filter(|src| !src.is_empty()) {
        return Some(src);
    }

    match node.computed_style_value("background-image") {
        Ok(Some(value)) => parse_css_url(&value),
        Ok(None) => None,
        Err(err) => {
            log_debug!("computed style unavailable: {}", err);
            None
        }
    }
}

/// First `url(...)` in a CSS value, with surrounding quotes removed.
pub fn parse_css_url(value: &str) -> Option<String> {
    let start = value.find("url(")? + "url(".len();
    let rest = &value[start..];
    let end = rest.find(')')?;
    let url = rest[..end].trim().trim_matches(|c| c == '"' || c == '\'').trim();

    if url.is_empty() {
        None
    } else {
        Some(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::fake::FakeNode;
    use crate::timeline::NaturalSize;

    #[test]
    fn selector_prefers_id_then_class_then_position() {
        let with_id = FakeNode::new("DIV").with_id("hero").with_classes(&["banner"]);
        assert_eq!(attribute(&with_id).selector, "#hero");

        let with_class = FakeNode::new("DIV").with_classes(&["banner", "wide"]);
        assert_eq!(attribute(&with_class).selector, "div.banner");

        let positional = FakeNode::new("P").with_position(3);
        assert_eq!(attribute(&positional).selector, "p:nth-child(3)");
    }

    #[test]
    fn selector_only_matches_full_attribution() {
        let nodes = [
            FakeNode::new("DIV").with_id("hero").with_classes(&["banner"]),
            FakeNode::new("DIV").with_classes(&["", "wide"]),
            FakeNode::new("LI").with_position(4),
            FakeNode::new("SECTION").detached(),
        ];
        for node in &nodes {
            assert_eq!(selector(node), attribute(node).selector);
        }
        assert_eq!(selector(&nodes[1]), "div.wide");
    }

    #[test]
    fn orphan_node_degrades_to_tag_selector() {
        let orphan = FakeNode::new("SECTION").detached();
        let attribution = attribute(&orphan);
        assert_eq!(attribution.selector, "section");
        assert!(attribution.bounding_box.is_none());
        assert!(attribution.primary_source.is_none());
    }

    #[test]
    fn primary_source_priority() {
        let img = FakeNode::new("IMG")
            .with_current_src("https://cdn.test/hero-2x.webp")
            .with_attribute("src", "https://cdn.test/hero.jpg");
        assert_eq!(
            attribute(&img).primary_source.as_deref(),
            Some("https://cdn.test/hero-2x.webp")
        );

        let img = FakeNode::new("IMG").with_attribute("src", "https://cdn.test/hero.jpg");
        assert_eq!(
            attribute(&img).primary_source.as_deref(),
            Some("https://cdn.test/hero.jpg")
        );

        let div = FakeNode::new("DIV").with_style(
            "background-image",
            "linear-gradient(red, blue), url(\"https://cdn.test/bg.png\")",
        );
        assert_eq!(
            attribute(&div).primary_source.as_deref(),
            Some("https://cdn.test/bg.png")
        );
    }

    #[test]
    fn parse_css_url_handles_quotes_and_none() {
        assert_eq!(parse_css_url("url('a.png')").as_deref(), Some("a.png"));
        assert_eq!(parse_css_url("url(b.png)").as_deref(), Some("b.png"));
        assert_eq!(parse_css_url("none"), None);
        assert_eq!(parse_css_url("url()"), None);
    }

    #[test]
    fn media_dimensions_and_attributes() {
        let img = FakeNode::new("IMG")
            .with_box(BoundingBox {
                width: 400.0,
                height: 300.0,
                top: 10.0,
                left: 20.0,
            })
            .with_natural_size(NaturalSize {
                width: 1600.0,
                height: 1200.0,
            })
            .with_attribute("loading", "lazy")
            .with_attribute("alt", "ignored");

        let attribution = attribute(&img);
        let dims = attribution.natural_dimensions.unwrap();
        assert_eq!(dims.natural_width, 1600.0);
        assert_eq!(dims.displayed_width, 400.0);
        assert_eq!(attribution.relevant_attributes.len(), 1);
        assert_eq!(attribution.relevant_attributes["loading"], "lazy");
    }

    #[test]
    fn text_snippet_is_truncated() {
        let long_text = "x".repeat(500);
        let node = FakeNode::new("P").with_text(&format!("  {long_text}  "));
        let snippet = attribute(&node).text_snippet.unwrap();
        assert_eq!(snippet.chars().count(), 200);

        let blank = FakeNode::new("P").with_text("   ");
        assert!(attribute(&blank).text_snippet.is_none());
    }
}
