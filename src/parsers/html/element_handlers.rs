//! Per-node filter dispatch.
//!
//! Every node of the document is classified here into an [`Action`].
//!
//! # Dispatch order
//!
//! 1. Text is left alone.
//! 2. Closing markers are kept when their tag is known. Orphans of unknown tags are
//!    dropped on their own, without touching anything around them.
//! 3. Empty and prohibited tag names are removed.
//! 4. Tags with a dedicated [`TagFilter`] are handed over to it. The filter gets its
//!    own copy of the element and fully owns the verdict.
//! 5. Tags outside the whitelist are removed.
//! 6. Everything else goes through the generic attribute pass.
//!
//! Tag filters are a closed set. Adding one means adding a variant to
//! [`TagFilter`] and a branch to [`TagFilter::for_tag`].

use crate::utils::url::{validate_uri, UriPolicy};

use super::actions::Action;
use super::attribute_handlers::run_attribute_filters;
use super::complex_element_handlers::{filter_audio, filter_iframe, filter_image, filter_video};
use super::dom::{Element, Node};
use super::utils::{is_allowed_tag, is_prohibited_rel, is_prohibited_tag};

/// The only `<script>` type that survives
const STRUCTURED_DATA_TYPE: &str = "application/ld+json";

/// Presentational `<span>` attributes from the `<font>` era
const SPAN_LEGACY_ATTRS: &[&str] = &["color", "face", "size"];

/// Tags with a dedicated filter
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagFilter {
    Script,
    Style,
    Link,
    Span,
    TableCell,
    Anchor,
    Image,
    Video,
    Audio,
    Iframe,
}

impl TagFilter {
    pub fn for_tag(tag_name: &str) -> Option<Self> {
        let filter = match tag_name {
            "script" => TagFilter::Script,
            "style" => TagFilter::Style,
            "link" => TagFilter::Link,
            "span" => TagFilter::Span,
            "td" => TagFilter::TableCell,
            "a" => TagFilter::Anchor,
            "img" => TagFilter::Image,
            "video" => TagFilter::Video,
            "audio" => TagFilter::Audio,
            "iframe" => TagFilter::Iframe,
            _ => return None,
        };
        Some(filter)
    }

    pub fn apply(self, element: Element) -> Action {
        match self {
            TagFilter::Script => filter_script(element),
            TagFilter::Style => Action::remove_with_children(),
            TagFilter::Link => filter_link(element),
            TagFilter::Span => filter_span(element),
            TagFilter::TableCell => filter_table_cell(element),
            TagFilter::Anchor => filter_anchor(element),
            TagFilter::Image => filter_image(element),
            TagFilter::Video => filter_video(element),
            TagFilter::Audio => filter_audio(element),
            TagFilter::Iframe => filter_iframe(element),
        }
    }
}

fn filter_script(element: Element) -> Action {
    match element.get_attr("type") {
        Some(script_type) if script_type == STRUCTURED_DATA_TYPE => {
            Action::modify(run_attribute_filters(element))
        }
        _ => Action::remove_with_children(),
    }
}

fn filter_link(element: Element) -> Action {
    if element.get_attr("rel").is_some_and(is_prohibited_rel) {
        return Action::remove();
    }
    Action::modify(run_attribute_filters(element))
}

fn filter_span(mut element: Element) -> Action {
    for attr_name in SPAN_LEGACY_ATTRS {
        element.remove_attr(attr_name);
    }
    Action::modify(run_attribute_filters(element))
}

fn filter_table_cell(mut element: Element) -> Action {
    element.remove_attr("background");
    Action::modify(run_attribute_filters(element))
}

fn filter_anchor(mut element: Element) -> Action {
    let href_is_valid = element
        .get_attr("href")
        .map_or(true, |href| validate_uri(href, &UriPolicy::anchor()));
    if !href_is_valid {
        element.remove_attr("href");
    }

    element.remove_attr("track");
    element.set_attr("target", "_blank");

    Action::modify(run_attribute_filters(element))
}

/// Classifies a single node
pub fn run_filters(node: &Node) -> Action {
    let element = match node {
        Node::Text(_) => return Action::Ignore,
        Node::Element(element) => element,
    };
    let tag_name = element.name();

    if element.is_closing() {
        if is_allowed_tag(tag_name) || TagFilter::for_tag(tag_name).is_some() {
            return Action::Ignore;
        }
        return Action::remove_keep_children();
    }

    if tag_name.is_empty() || is_prohibited_tag(tag_name) {
        return Action::remove();
    }

    if let Some(filter) = TagFilter::for_tag(tag_name) {
        return filter.apply(element.clone());
    }

    if !is_allowed_tag(tag_name) {
        return Action::remove();
    }

    Action::modify(run_attribute_filters(element.clone()))
}
