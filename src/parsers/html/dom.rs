use std::ops::{Index, RangeInclusive};

use super::serializer::{render_document, render_node};
use super::utils::is_void_tag;

/// A single attribute, kept in document order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    /// Empty for boolean (valueless) attributes
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Attribute {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An opening tag or the closing marker of one
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    name: String,
    attrs: Vec<Attribute>,
    closing: bool,
}

impl Element {
    /// Creates an opening element; a repeated attribute name keeps its last value
    pub fn new(name: impl Into<String>, attrs: Vec<Attribute>) -> Self {
        let mut element = Element {
            name: name.into(),
            attrs: Vec::with_capacity(attrs.len()),
            closing: false,
        };
        for attr in attrs {
            element.set_attr(&attr.name, attr.value);
        }
        element
    }

    /// Creates the closing marker for a previously opened tag
    pub fn closing(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            attrs: Vec::new(),
            closing: true,
        }
    }

    /// Same attributes under a different tag name
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            attrs: self.attrs.clone(),
            closing: self.closing,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_closing(&self) -> bool {
        self.closing
    }

    pub fn is_void(&self) -> bool {
        is_void_tag(&self.name)
    }

    pub fn get_attr(&self, attr_name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|attr| attr.name == attr_name)
            .map(|attr| attr.value.as_str())
    }

    pub fn has_attr(&self, attr_name: &str) -> bool {
        self.attrs.iter().any(|attr| attr.name == attr_name)
    }

    /// Sets an attribute, keeping its position if it already exists
    pub fn set_attr(&mut self, attr_name: &str, attr_value: impl Into<String>) {
        if attr_name.is_empty() {
            return;
        }

        let attr_value = attr_value.into();
        match self.attrs.iter_mut().find(|attr| attr.name == attr_name) {
            Some(existing) => existing.value = attr_value,
            None => self.attrs.push(Attribute::new(attr_name, attr_value)),
        }
    }

    pub fn remove_attr(&mut self, attr_name: &str) -> Option<String> {
        let position = self.attrs.iter().position(|attr| attr.name == attr_name)?;
        Some(self.attrs.remove(position).value)
    }

    /// Independent copy of all attributes
    pub fn attrs(&self) -> Vec<Attribute> {
        self.attrs.clone()
    }

    pub fn attr_names(&self) -> Vec<String> {
        self.attrs.iter().map(|attr| attr.name.clone()).collect()
    }

    pub(crate) fn attrs_iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attrs.iter()
    }
}

/// One unit of the flattened document
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Literal markup, rendered as-is
    Text(String),
}

impl Node {
    pub fn element(name: impl Into<String>, attrs: Vec<Attribute>) -> Self {
        Node::Element(Element::new(name, attrs))
    }

    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn closing(name: impl Into<String>) -> Self {
        Node::Element(Element::closing(name))
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    /// The node as an opening element (closing markers and text give `None`)
    pub fn as_opening(&self) -> Option<&Element> {
        self.as_element().filter(|element| !element.is_closing())
    }

    pub fn render(&self) -> String {
        render_node(self)
    }
}

/// Flat, ordered sequence of nodes.
///
/// There are no parent/child links: nesting is recovered by matching tag names
/// and counting depth (see [`Document::find_matching_close`]).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    pub fn new(nodes: Vec<Node>) -> Self {
        Document { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.nodes.get_mut(index)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }

    /// Overwrites the node at `index`; out-of-range indices append
    pub fn replace(&mut self, index: usize, node: Node) {
        match self.nodes.get_mut(index) {
            Some(slot) => *slot = node,
            None => self.nodes.push(node),
        }
    }

    /// Inserts before `index`; out-of-range indices append
    pub fn insert(&mut self, index: usize, node: Node) {
        let index = index.min(self.nodes.len());
        self.nodes.insert(index, node);
    }

    pub fn remove(&mut self, index: usize) -> Option<Node> {
        (index < self.nodes.len()).then(|| self.nodes.remove(index))
    }

    pub fn remove_range(&mut self, range: RangeInclusive<usize>) -> usize {
        let start = *range.start();
        let end = (*range.end()).min(self.nodes.len().saturating_sub(1));
        if start > end || start >= self.nodes.len() {
            return 0;
        }
        self.nodes.drain(start..=end).count()
    }

    /// Locates the closing marker paired with the opening element at `start`.
    ///
    /// Void elements are their own boundary. Same-named elements opened in between
    /// are counted so that their closing markers are skipped. `None` means the
    /// input is malformed (no opener at `start`, or no zero-depth close).
    pub fn find_matching_close(&self, start: usize) -> Option<usize> {
        let opening = self.nodes.get(start)?.as_opening()?;
        if opening.is_void() {
            return Some(start);
        }

        let mut depth = 0usize;
        for (offset, node) in self.nodes[start + 1..].iter().enumerate() {
            let Some(element) = node.as_element() else {
                continue;
            };
            if !element.name().eq_ignore_ascii_case(opening.name()) {
                continue;
            }

            if element.is_closing() {
                if depth == 0 {
                    return Some(start + 1 + offset);
                }
                depth -= 1;
            } else {
                depth += 1;
            }
        }

        None
    }

    pub fn render(&self) -> String {
        render_document(&self.nodes)
    }
}

impl Index<usize> for Document {
    type Output = Node;

    fn index(&self, index: usize) -> &Node {
        &self.nodes[index]
    }
}

impl From<Vec<Node>> for Document {
    fn from(nodes: Vec<Node>) -> Self {
        Document::new(nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(name: &str) -> Node {
        Node::element(name, vec![])
    }

    #[test]
    fn attribute_operations() {
        let mut element = Element::new(
            "a",
            vec![Attribute::new("href", "/x"), Attribute::new("hidden", "")],
        );

        assert_eq!(element.get_attr("href"), Some("/x"));
        assert_eq!(element.get_attr("hidden"), Some(""));
        assert_eq!(element.get_attr("title"), None);

        element.set_attr("href", "/y");
        element.set_attr("title", "t");
        assert_eq!(element.attr_names(), vec!["href", "hidden", "title"]);
        assert_eq!(element.get_attr("href"), Some("/y"));

        assert_eq!(element.remove_attr("hidden"), Some(String::new()));
        assert_eq!(element.remove_attr("hidden"), None);
        assert!(!element.has_attr("hidden"));
    }

    #[test]
    fn attribute_copy_is_independent() {
        let element = Element::new("p", vec![Attribute::new("class", "a")]);
        let mut copy = element.attrs();
        copy[0].value = "changed".to_string();

        assert_eq!(element.get_attr("class"), Some("a"));
    }

    #[test]
    fn void_tags() {
        assert!(Element::new("img", vec![]).is_void());
        assert!(Element::new("BR", vec![]).is_void());
        assert!(!Element::new("div", vec![]).is_void());
        assert!(!Element::new("amp-img", vec![]).is_void());
    }

    #[test]
    fn matching_close_skips_nested_same_name() {
        // <div><div>x</div></div>
        let document = Document::new(vec![
            open("div"),
            open("div"),
            Node::text("x"),
            Node::closing("div"),
            Node::closing("div"),
        ]);

        assert_eq!(document.find_matching_close(0), Some(4));
        assert_eq!(document.find_matching_close(1), Some(3));
    }

    #[test]
    fn matching_close_for_void_is_itself() {
        let document = Document::new(vec![open("p"), open("img"), Node::closing("p")]);

        assert_eq!(document.find_matching_close(1), Some(1));
    }

    #[test]
    fn matching_close_reports_malformed_input() {
        let document = Document::new(vec![open("div"), open("div"), Node::closing("div")]);

        assert_eq!(document.find_matching_close(0), None);
        assert_eq!(document.find_matching_close(2), None);
        assert_eq!(document.find_matching_close(10), None);
    }

    #[test]
    fn splice_primitives() {
        let mut document = Document::new(vec![open("a"), Node::text("b"), Node::closing("a")]);

        document.insert(1, Node::text("x"));
        assert_eq!(document.len(), 4);
        document.replace(0, open("span"));
        assert_eq!(document[0].as_element().map(Element::name), Some("span"));

        assert_eq!(document.remove_range(1..=2), 2);
        assert_eq!(document.len(), 2);
        assert_eq!(document.remove_range(5..=9), 0);
        assert!(document.remove(7).is_none());
    }
}
