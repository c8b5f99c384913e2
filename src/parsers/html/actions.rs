//! Filter verdicts.
//!
//! Every element that goes through the filters produces exactly one [`Action`].

use super::dom::Element;
use super::utils::is_void_tag;

/// A rewritten element plus the follow-up work the walker has to do for it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Component {
    pub element: Element,
    /// Normalized inline style to be turned into a class
    pub styles: Option<String>,
    /// Width/height must be looked up from the resource before serialization
    pub needs_dimensions: bool,
}

impl Component {
    pub fn new(element: Element) -> Self {
        Component {
            element,
            styles: None,
            needs_dimensions: false,
        }
    }

    pub fn with_styles(mut self, styles: Option<String>) -> Self {
        self.styles = styles;
        self
    }
}

/// One item of a replacement sequence
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Replacement {
    Component(Component),
    /// Closing marker for an element opened earlier in the same sequence
    Close(String),
    /// Literal markup
    Text(String),
}

/// Ordered replacement for a single element
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Insertion {
    items: Vec<Replacement>,
    end_tag: Option<String>,
}

impl Insertion {
    /// A single modified element that keeps its original closing marker
    pub fn modify(component: Component) -> Self {
        Insertion {
            items: vec![Replacement::Component(component)],
            end_tag: None,
        }
    }

    /// Appends an item.
    ///
    /// The sequence has to start with a component; anything else pushed first is
    /// dropped. A non-void first component decides the closing marker that gets
    /// appended once the sequence has been spliced in.
    pub fn push(&mut self, item: Replacement) -> &mut Self {
        if self.items.is_empty() {
            let Replacement::Component(component) = &item else {
                return self;
            };

            let tag_name = component.element.name();
            if tag_name.is_empty() {
                return self;
            }
            if !is_void_tag(tag_name) {
                self.end_tag = Some(tag_name.to_string());
            }
        }

        self.items.push(item);
        self
    }

    pub fn push_component(&mut self, component: Component) -> &mut Self {
        self.push(Replacement::Component(component))
    }

    pub fn items(&self) -> &[Replacement] {
        &self.items
    }

    pub fn end_tag(&self) -> Option<&str> {
        self.end_tag.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_parts(self) -> (Vec<Replacement>, Option<String>) {
        (self.items, self.end_tag)
    }
}

/// The filters' verdict for one node
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Ignore,
    /// Delete the element; `remove_children` overrides the configured policy when set
    Remove { remove_children: Option<bool> },
    Insert(Insertion),
}

impl Action {
    pub fn remove() -> Self {
        Action::Remove {
            remove_children: None,
        }
    }

    pub fn remove_keep_children() -> Self {
        Action::Remove {
            remove_children: Some(false),
        }
    }

    pub fn remove_with_children() -> Self {
        Action::Remove {
            remove_children: Some(true),
        }
    }

    pub fn modify(component: Component) -> Self {
        Action::Insert(Insertion::modify(component))
    }
}

impl From<Insertion> for Action {
    fn from(insertion: Insertion) -> Self {
        if insertion.is_empty() {
            Action::Ignore
        } else {
            Action::Insert(insertion)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_component_decides_end_tag() {
        let mut insertion = Insertion::default();
        insertion.push_component(Component::new(Element::new("div", vec![])));
        insertion.push_component(Component::new(Element::new("amp-img", vec![])));

        assert_eq!(insertion.end_tag(), Some("div"));
        assert_eq!(insertion.items().len(), 2);
    }

    #[test]
    fn void_first_component_needs_no_end_tag() {
        let mut insertion = Insertion::default();
        insertion.push_component(Component::new(Element::new("img", vec![])));

        assert_eq!(insertion.end_tag(), None);
    }

    #[test]
    fn sequence_must_start_with_component() {
        let mut insertion = Insertion::default();
        insertion.push(Replacement::Text("x".to_string()));
        insertion.push(Replacement::Close("p".to_string()));

        assert!(insertion.is_empty());
        assert_eq!(Action::from(insertion), Action::Ignore);
    }

    #[test]
    fn modify_keeps_original_close() {
        let action = Action::modify(Component::new(Element::new("p", vec![])));

        let Action::Insert(insertion) = action else {
            panic!("expected an insertion");
        };
        assert_eq!(insertion.end_tag(), None);
    }
}
