//! # TransAmp
//!
//! Rewrites arbitrary HTML into AMP-compatible markup: a tag whitelist,
//! attribute sanitization, inline styles turned into generated classes, and
//! media components sized from their declared or probed dimensions.
//!
//! ## Module organization
//!
//! - `core` - the engine, its options and the translation result
//! - `parsers` - tokenizing, the flat document, filters, style handling
//! - `network` - image dimension probing, caching and enrichment
//! - `utils` - URI validation and precompiled matchers
//! - `env` - configuration from environment variables
//!
//! ```rust,no_run
//! use transamp::core::{TransAmp, TransAmpOptions};
//!
//! # async fn run() -> Result<(), transamp::core::TransAmpError> {
//! let engine = TransAmp::new(TransAmpOptions::default())?;
//! let translation = engine.translate("<p style=\"color:red\">Hi</p>").await;
//! assert_eq!(translation.html, "<p class=\"saniamp0\">Hi</p>");
//! assert_eq!(translation.styles, ".saniamp0{color:red;}");
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod env;
pub mod network;
pub mod parsers;
pub mod utils;

// Re-export commonly used items for convenience
pub use core::{TransAmp, TransAmpError, TransAmpOptions, Translation};
pub use network::{DimensionCache, DimensionProbe, Dimensions, HttpProbe, ProbeError};
pub use parsers::html::{Document, RemovalPolicy};
