//! HTML rewriting.
//!
//! Split into submodules, leaves first:
//!
//! - `utils`: tag tables and their predicates
//! - `dom`: flat document model
//! - `serializer`: rendering nodes back to markup
//! - `parser`: tokenizer adapter
//! - `actions`: filter verdicts
//! - `attribute_handlers`: generic attribute pass
//! - `element_handlers`: per-node dispatch and simple tag filters
//! - `complex_element_handlers`: media and embed filters
//! - `walker`: the rewrite driver

pub mod actions;
pub mod attribute_handlers;
pub mod complex_element_handlers;
pub mod dom;
pub mod element_handlers;
pub mod parser;
pub mod serializer;
pub mod utils;
pub mod walker;

pub use actions::{Action, Component, Insertion, Replacement};
pub use dom::{Attribute, Document, Element, Node};
pub use element_handlers::{run_filters, TagFilter};
pub use parser::{decode_input, html_to_document, parse_document};
pub use serializer::{render_document, render_node};
pub use utils::{is_void_tag, WHITESPACES};
pub use walker::{remove_element, walk, RemovalPolicy, WalkOutcome};
