//! # Network module
//!
//! Everything that leaves the process: remote image probing and the
//! post-rewrite stage that applies probed sizes to the document.
//!
//! # Module organization
//!
//! - `probe` - the probe seam and its HTTP implementation
//! - `cache` - dimension cache shared across translations
//! - `enrichment` - fan-out/fan-in over the recorded lookups

pub mod cache;
pub mod enrichment;
pub mod probe;

// Re-export commonly used items for convenience
pub use cache::{identity_cache_key, CacheKeyFn, CacheStats, DimensionCache};
pub use enrichment::{enrich_dimensions, DimensionLookup, EnrichmentReport};
pub use probe::{sniff_dimensions, DimensionProbe, Dimensions, HttpProbe, ProbeError};
