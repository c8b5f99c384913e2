//! # Parsers module
//!
//! Markup and style handling.
//!
//! # Module organization
//!
//! - `html` - tokenizing, the flat document, filters and the rewrite driver
//! - `css` - inline style normalization and the generated stylesheet

pub mod css;
pub mod html;

// Re-export commonly used items for convenience
pub use css::{assemble_stylesheet, normalize_styles, ClassRegistry};
pub use html::{html_to_document, parse_document, walk, Document, RemovalPolicy};
