//! # Utilities
//!
//! Stateless string predicates shared by the filters:
//!
//! - URI shape and scheme validation
//! - Embed provider host detection
//! - Attribute-name wildcards and inline CSS property extraction
//!
//! # Modules
//!
//! - `url` - URI parsing, validation policies and path/query helpers
//! - `matchers` - precompiled patterns for hosts, attributes and styles

pub mod matchers;
pub mod url;

// Re-export commonly used items for convenience
pub use matchers::{
    extract_declaration, is_event_or_namespace_attr, is_invalid_dimension, is_valid_class_prefix,
    EmbedProvider, FacebookEmbed,
};
pub use url::{
    is_absolute_uri, is_secure_uri, last_path_segment, query_param, validate_uri, UriPolicy, Url,
};
