//! Rewrite driver.
//!
//! Walks the flat document with a live cursor, asks the filters for an
//! [`Action`] per node and applies it in place.
//!
//! # Cursor rules
//!
//! - `Ignore` advances by one.
//! - `Remove` deletes at the cursor and does not advance: whatever slides into
//!   the cursor position still has to be filtered.
//! - `Insert` overwrites the node at the cursor with the first item, inserts the
//!   rest right after it and moves past everything it inserted, so replacement
//!   content is never filtered twice.
//!
//! All mutations happen at or after the cursor. Positions recorded for dimension
//! lookups therefore stay valid until the walk is over.

use std::collections::HashSet;

use crate::network::enrichment::DimensionLookup;
use crate::parsers::css::{append_class, ClassRegistry};

use super::actions::{Action, Insertion, Replacement};
use super::dom::{Document, Node};
use super::element_handlers::run_filters;

/// One source of truth for "do children go with a removed element"
#[derive(Clone, Debug, PartialEq, Eq)]
enum RemovalLayer {
    /// Tags that always lose their children
    RemoveChildrenTags(HashSet<String>),
    /// Tags that always keep their children
    KeepChildrenTags(HashSet<String>),
    /// Whatever the filter asked for
    ActionOverride,
    Default(bool),
}

impl RemovalLayer {
    fn decide(&self, tag_name: &str, action_override: Option<bool>) -> Option<bool> {
        match self {
            RemovalLayer::RemoveChildrenTags(tags) => tags.contains(tag_name).then_some(true),
            RemovalLayer::KeepChildrenTags(tags) => tags.contains(tag_name).then_some(false),
            RemovalLayer::ActionOverride => action_override,
            RemovalLayer::Default(remove_children) => Some(*remove_children),
        }
    }
}

/// Child-removal policy, evaluated highest priority first:
/// remove-children tags, keep-children tags, the action's own override, the default.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemovalPolicy {
    layers: Vec<RemovalLayer>,
}

impl RemovalPolicy {
    pub fn new<S: AsRef<str>>(
        remove_children: bool,
        keep_children_tags: &[S],
        remove_children_tags: &[S],
    ) -> Self {
        let normalize = |tags: &[S]| -> HashSet<String> {
            tags.iter()
                .map(|tag| tag.as_ref().trim().to_ascii_lowercase())
                .filter(|tag| !tag.is_empty())
                .collect()
        };
        let keep = normalize(keep_children_tags);
        let remove = normalize(remove_children_tags);

        for tag in keep.intersection(&remove) {
            tracing::warn!(tag = %tag, "tag listed both to keep and to remove children; removing");
        }

        RemovalPolicy {
            layers: vec![
                RemovalLayer::RemoveChildrenTags(remove),
                RemovalLayer::KeepChildrenTags(keep),
                RemovalLayer::ActionOverride,
                RemovalLayer::Default(remove_children),
            ],
        }
    }

    /// Whether removing `tag_name` also removes everything between its open and close
    pub fn removes_children(&self, tag_name: &str, action_override: Option<bool>) -> bool {
        let tag_name = tag_name.to_ascii_lowercase();
        self.layers
            .iter()
            .find_map(|layer| layer.decide(&tag_name, action_override))
            .unwrap_or(true)
    }
}

impl Default for RemovalPolicy {
    fn default() -> Self {
        RemovalPolicy::new::<&str>(true, &[], &[])
    }
}

/// Removes the element at `index` according to the policy; returns how many nodes went away.
///
/// If the element's closing marker can't be found only the node itself is removed.
/// When children are kept the closing marker goes first so that `index` stays valid.
pub fn remove_element(
    document: &mut Document,
    index: usize,
    policy: &RemovalPolicy,
    action_override: Option<bool>,
) -> usize {
    let Some(tag_name) = document
        .get(index)
        .and_then(Node::as_element)
        .map(|element| element.name().to_string())
    else {
        return document.remove(index).map_or(0, |_| 1);
    };

    let Some(close) = document.find_matching_close(index) else {
        tracing::debug!(tag = %tag_name, index, "no matching close, removing single node");
        return document.remove(index).map_or(0, |_| 1);
    };

    if close == index {
        return document.remove(index).map_or(0, |_| 1);
    }

    if policy.removes_children(&tag_name, action_override) {
        document.remove_range(index..=close)
    } else {
        document.remove(close);
        document.remove(index);
        2
    }
}

/// What the walk leaves behind for the later stages
#[derive(Debug, Default)]
pub struct WalkOutcome {
    pub classes: ClassRegistry,
    pub lookups: Vec<DimensionLookup>,
}

/// Rewrites the whole document in place
pub fn walk(document: &mut Document, policy: &RemovalPolicy, class_prefix: &str) -> WalkOutcome {
    let mut walker = Walker::new(policy, class_prefix);
    walker.run(document);
    walker.finish()
}

struct Walker<'a> {
    policy: &'a RemovalPolicy,
    classes: ClassRegistry,
    lookups: Vec<DimensionLookup>,
}

impl<'a> Walker<'a> {
    fn new(policy: &'a RemovalPolicy, class_prefix: &str) -> Self {
        Walker {
            policy,
            classes: ClassRegistry::new(class_prefix),
            lookups: Vec::new(),
        }
    }

    fn run(&mut self, document: &mut Document) {
        let mut cursor = 0;

        while cursor < document.len() {
            match run_filters(&document[cursor]) {
                Action::Ignore => cursor += 1,
                Action::Remove { remove_children } => {
                    remove_element(document, cursor, self.policy, remove_children);
                }
                Action::Insert(insertion) => {
                    cursor = self.splice(document, cursor, insertion);
                }
            }
        }
    }

    /// Applies an insertion at `cursor` and returns the next position to filter
    fn splice(&mut self, document: &mut Document, cursor: usize, insertion: Insertion) -> usize {
        // Looked up before anything moves
        let original_close = match insertion.end_tag() {
            Some(_) => document
                .find_matching_close(cursor)
                .filter(|&close| close != cursor),
            None => None,
        };

        let (items, end_tag) = insertion.into_parts();
        if items.is_empty() {
            return cursor + 1;
        }

        let inserted = items.len();
        for (offset, item) in items.into_iter().enumerate() {
            let position = cursor + offset;
            let node = self.materialize(item, position);
            if offset == 0 {
                document.replace(position, node);
            } else {
                document.insert(position, node);
            }
        }

        let mut next = cursor + inserted;
        if let Some(end_tag) = end_tag {
            match original_close {
                Some(close) => document.replace(close + inserted - 1, Node::closing(end_tag)),
                None => {
                    document.insert(next, Node::closing(end_tag));
                    next += 1;
                }
            }
        }

        next
    }

    fn materialize(&mut self, item: Replacement, position: usize) -> Node {
        match item {
            Replacement::Component(component) => {
                let mut element = component.element;

                if let Some(styles) = component.styles.as_deref() {
                    let class_name = self.classes.class_for(styles);
                    append_class(&mut element, &class_name);
                }

                if component.needs_dimensions {
                    if let Some(locator) = element.get_attr("src") {
                        self.lookups.push(DimensionLookup::new(locator, position));
                    }
                }

                Node::Element(element)
            }
            Replacement::Close(tag_name) => Node::closing(tag_name),
            Replacement::Text(text) => Node::Text(text),
        }
    }

    fn finish(self) -> WalkOutcome {
        WalkOutcome {
            classes: self.classes,
            lookups: self.lookups,
        }
    }
}
