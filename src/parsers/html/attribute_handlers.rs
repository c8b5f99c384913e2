//! Generic attribute filters.
//!
//! These run on every element that reaches the generic pass, including elements
//! rebuilt by the tag-specific filters.

use crate::parsers::css::normalize_styles;
use crate::utils::is_event_or_namespace_attr;

use super::actions::Component;
use super::dom::Element;
use super::utils::is_allowed_layout;

/// Attributes with a dedicated filter
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeFilter {
    Style,
    Layout,
}

impl AttributeFilter {
    pub fn for_attr(attr_name: &str) -> Option<Self> {
        match attr_name {
            "style" => Some(AttributeFilter::Style),
            "layout" => Some(AttributeFilter::Layout),
            _ => None,
        }
    }

    /// Runs the filter against the element in place; returns whether anything changed
    pub fn apply(self, element: &mut Element, styles: &mut Option<String>) -> bool {
        match self {
            AttributeFilter::Style => filter_style(element, styles),
            AttributeFilter::Layout => filter_layout(element),
        }
    }
}

/// Moves the inline style out of the element so it can become a class
fn filter_style(element: &mut Element, styles: &mut Option<String>) -> bool {
    match element.remove_attr("style") {
        Some(style) => {
            if let Some(normalized) = normalize_styles(&style) {
                *styles = Some(normalized);
            }
            true
        }
        None => false,
    }
}

fn filter_layout(element: &mut Element) -> bool {
    match element.get_attr("layout") {
        Some(layout) if !is_allowed_layout(layout) => {
            element.remove_attr("layout");
            true
        }
        _ => false,
    }
}

/// Runs every applicable attribute filter and wraps the result as a component
pub fn run_attribute_filters(mut element: Element) -> Component {
    let mut styles = None;

    for attr_name in element.attr_names() {
        if let Some(filter) = AttributeFilter::for_attr(&attr_name) {
            filter.apply(&mut element, &mut styles);
        }
        if is_event_or_namespace_attr(&attr_name) {
            element.remove_attr(&attr_name);
        }
    }

    Component::new(element).with_styles(styles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::dom::Attribute;

    #[test]
    fn style_attribute_becomes_pending_styles() {
        let element = Element::new(
            "p",
            vec![
                Attribute::new("style", "margin: 0; color: red"),
                Attribute::new("id", "x"),
            ],
        );
        let component = run_attribute_filters(element);

        assert_eq!(component.styles.as_deref(), Some("color:red;margin:0;"));
        assert!(!component.element.has_attr("style"));
        assert_eq!(component.element.get_attr("id"), Some("x"));
    }

    #[test]
    fn empty_style_is_dropped_without_styles() {
        let element = Element::new("p", vec![Attribute::new("style", "")]);
        let component = run_attribute_filters(element);

        assert_eq!(component.styles, None);
        assert!(!component.element.has_attr("style"));
    }

    #[test]
    fn unknown_layout_is_removed() {
        let bad = Element::new("amp-img", vec![Attribute::new("layout", "floating")]);
        let good = Element::new("amp-img", vec![Attribute::new("layout", "responsive")]);

        assert!(!run_attribute_filters(bad).element.has_attr("layout"));
        assert_eq!(
            run_attribute_filters(good).element.get_attr("layout"),
            Some("responsive")
        );
    }

    #[test]
    fn event_and_namespace_attributes_are_removed() {
        let element = Element::new(
            "div",
            vec![
                Attribute::new("onclick", "steal()"),
                Attribute::new("xmlns", "http://www.w3.org/1999/xhtml"),
                Attribute::new("title", "ok"),
            ],
        );
        let component = run_attribute_filters(element);

        assert_eq!(component.element.attr_names(), vec!["title"]);
    }
}
