//! The translation engine.
//!
//! [`TransAmp`] ties the stages together: tokenize, rewrite, enrich, serialize.
//! One engine can serve any number of translations; the only state they share
//! is the dimension cache.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::env::EnvConfig;
use crate::network::cache::{identity_cache_key, CacheKeyFn, DimensionCache};
use crate::network::enrichment::enrich_dimensions;
use crate::network::probe::{DimensionProbe, HttpProbe, ProbeError};
use crate::parsers::css::assemble_stylesheet;
use crate::parsers::html::dom::Document;
use crate::parsers::html::parser::{html_to_document, parse_document};
use crate::parsers::html::walker::{walk, RemovalPolicy, WalkOutcome};
use crate::utils::is_valid_class_prefix;

pub const DEFAULT_CLASS_PREFIX: &str = "saniamp";
pub const DEFAULT_USER_AGENT: &str = concat!("transamp/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum TransAmpError {
    #[error("could not set up the image probe: {0}")]
    Client(#[from] ProbeError),
}

/// Engine configuration
#[derive(Clone)]
pub struct TransAmpOptions {
    /// Prefix of generated class names; invalid values fall back to the default
    pub class_prefix: String,
    /// Whether removed elements take their children with them
    pub remove_children: bool,
    pub keep_children_tags: Vec<String>,
    pub remove_children_tags: Vec<String>,
    pub cache_dimensions: bool,
    /// Maps an image locator to its cache key; identity when `None`
    pub dimension_cache_key: Option<CacheKeyFn>,
    pub probe_timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

impl Default for TransAmpOptions {
    fn default() -> Self {
        TransAmpOptions {
            class_prefix: DEFAULT_CLASS_PREFIX.to_string(),
            remove_children: true,
            keep_children_tags: Vec::new(),
            remove_children_tags: Vec::new(),
            cache_dimensions: true,
            dimension_cache_key: None,
            probe_timeout: None,
            user_agent: None,
        }
    }
}

impl fmt::Debug for TransAmpOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransAmpOptions")
            .field("class_prefix", &self.class_prefix)
            .field("remove_children", &self.remove_children)
            .field("keep_children_tags", &self.keep_children_tags)
            .field("remove_children_tags", &self.remove_children_tags)
            .field("cache_dimensions", &self.cache_dimensions)
            .field("dimension_cache_key", &self.dimension_cache_key.is_some())
            .field("probe_timeout", &self.probe_timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl TransAmpOptions {
    /// Defaults overlaid with whatever the environment sets
    pub fn from_env() -> Self {
        Self::default().with_env(&EnvConfig::from_env())
    }

    pub fn with_env(mut self, config: &EnvConfig) -> Self {
        if let Some(class_prefix) = &config.class_prefix {
            self.class_prefix = class_prefix.clone();
        }
        if let Some(remove_children) = config.remove_children {
            self.remove_children = remove_children;
        }
        if let Some(tags) = &config.keep_children_tags {
            self.keep_children_tags = tags.clone();
        }
        if let Some(tags) = &config.remove_children_tags {
            self.remove_children_tags = tags.clone();
        }
        if let Some(cache_dimensions) = config.cache_dimensions {
            self.cache_dimensions = cache_dimensions;
        }
        if let Some(timeout) = config.probe_timeout {
            self.probe_timeout = Some(timeout);
        }
        if let Some(user_agent) = &config.user_agent {
            self.user_agent = Some(user_agent.clone());
        }
        self
    }

    /// The configured prefix if usable, the default otherwise
    pub fn effective_class_prefix(&self) -> String {
        let prefix = self.class_prefix.trim().to_lowercase();
        if is_valid_class_prefix(&prefix) {
            prefix
        } else {
            tracing::warn!(
                prefix = %self.class_prefix,
                "invalid class prefix, using \"{}\"",
                DEFAULT_CLASS_PREFIX
            );
            DEFAULT_CLASS_PREFIX.to_string()
        }
    }

    pub fn removal_policy(&self) -> RemovalPolicy {
        RemovalPolicy::new(
            self.remove_children,
            &self.keep_children_tags,
            &self.remove_children_tags,
        )
    }
}

/// Result of one translation
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct Translation {
    /// Rewritten markup
    pub html: String,
    /// Minified rules for every generated class
    pub styles: String,
}

/// HTML to AMP rewrite engine
pub struct TransAmp {
    class_prefix: String,
    policy: RemovalPolicy,
    cache: DimensionCache,
    cache_key: CacheKeyFn,
    probe: Arc<dyn DimensionProbe>,
}

impl TransAmp {
    /// Engine that probes images over HTTP
    pub fn new(options: TransAmpOptions) -> Result<Self, TransAmpError> {
        let user_agent = options.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        let probe = HttpProbe::new(options.probe_timeout, user_agent)?;
        Ok(Self::with_probe(options, Arc::new(probe)))
    }

    /// Engine with a caller-supplied probe
    pub fn with_probe(options: TransAmpOptions, probe: Arc<dyn DimensionProbe>) -> Self {
        let cache = if options.cache_dimensions {
            DimensionCache::new()
        } else {
            DimensionCache::disabled()
        };

        TransAmp {
            class_prefix: options.effective_class_prefix(),
            policy: options.removal_policy(),
            cache,
            cache_key: options
                .dimension_cache_key
                .clone()
                .unwrap_or_else(identity_cache_key),
            probe,
        }
    }

    /// Rewrites a markup string.
    ///
    /// Dimension probes are spawned as Tokio tasks, so this has to be awaited
    /// inside a Tokio runtime.
    pub async fn translate(&self, markup: &str) -> Translation {
        self.translate_document(parse_document(markup)).await
    }

    /// Rewrites raw bytes in the given charset
    pub async fn translate_bytes(&self, data: &[u8], encoding: &str) -> Translation {
        self.translate_document(html_to_document(data, encoding)).await
    }

    async fn translate_document(&self, mut document: Document) -> Translation {
        let input_nodes = document.len();

        let WalkOutcome { classes, lookups } =
            walk(&mut document, &self.policy, &self.class_prefix);

        let report = enrich_dimensions(
            &mut document,
            lookups,
            self.probe.clone(),
            &self.cache,
            &self.cache_key,
            &self.policy,
        )
        .await;

        tracing::info!(
            input_nodes,
            output_nodes = document.len(),
            classes = classes.len(),
            cache_hits = report.cache_hits,
            probed = report.probed,
            removed_after_probe = report.removed,
            "translation finished"
        );

        Translation {
            html: document.render(),
            styles: assemble_stylesheet(&classes),
        }
    }

    pub fn class_prefix(&self) -> &str {
        &self.class_prefix
    }

    /// The dimension cache shared by this engine's translations
    pub fn cache(&self) -> &DimensionCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_class_prefix_falls_back() {
        for prefix in ["", "amp-x", "9x", "has space"] {
            let options = TransAmpOptions {
                class_prefix: prefix.to_string(),
                ..TransAmpOptions::default()
            };
            assert_eq!(options.effective_class_prefix(), DEFAULT_CLASS_PREFIX);
        }

        let options = TransAmpOptions {
            class_prefix: "Site".to_string(),
            ..TransAmpOptions::default()
        };
        assert_eq!(options.effective_class_prefix(), "site");
    }

    #[test]
    fn test_env_overlay() {
        let config = EnvConfig {
            remove_children: Some(false),
            remove_children_tags: Some(vec!["font".to_string()]),
            probe_timeout: Some(Duration::from_secs(5)),
            ..EnvConfig::default()
        };
        let options = TransAmpOptions::default().with_env(&config);

        assert!(!options.remove_children);
        assert_eq!(options.remove_children_tags, vec!["font"]);
        assert_eq!(options.probe_timeout, Some(Duration::from_secs(5)));
        assert_eq!(options.class_prefix, DEFAULT_CLASS_PREFIX);
        assert!(options.cache_dimensions);
    }

    #[test]
    fn test_removal_policy_from_options() {
        let options = TransAmpOptions {
            remove_children: false,
            remove_children_tags: vec!["font".to_string()],
            ..TransAmpOptions::default()
        };
        let policy = options.removal_policy();

        assert!(policy.removes_children("font", None));
        assert!(!policy.removes_children("blink", None));
    }
}
