//! Dimension enrichment.
//!
//! Runs after the rewrite pass over the lookups it recorded. Cached sizes are
//! applied straight away; every other distinct cache key gets exactly one probe
//! task, all tasks run concurrently and the stage returns only once each of them
//! has finished. Elements whose probe failed are removed afterwards, last
//! position first, so the positions still waiting to be removed don't move.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::task::JoinSet;

use crate::parsers::html::dom::Document;
use crate::parsers::html::walker::{remove_element, RemovalPolicy};

use super::cache::{CacheKeyFn, DimensionCache};
use super::probe::{DimensionProbe, Dimensions};

/// A component whose size has to be looked up before serialization
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DimensionLookup {
    pub locator: String,
    /// Index of the component in the rewritten document
    pub position: usize,
}

impl DimensionLookup {
    pub fn new(locator: impl Into<String>, position: usize) -> Self {
        DimensionLookup {
            locator: locator.into(),
            position,
        }
    }
}

/// Counters for one enrichment run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EnrichmentReport {
    pub cache_hits: usize,
    pub probed: usize,
    pub applied: usize,
    pub removed: usize,
}

struct PendingKey {
    locator: String,
    positions: Vec<usize>,
}

fn apply_dimensions(document: &mut Document, position: usize, dimensions: Dimensions) -> bool {
    let Some(element) = document.get_mut(position).and_then(|node| node.as_element_mut()) else {
        return false;
    };

    element.set_attr("width", dimensions.width.to_string());
    element.set_attr("height", dimensions.height.to_string());
    true
}

/// Resolves every lookup against the cache or the probe and updates the document
pub async fn enrich_dimensions(
    document: &mut Document,
    lookups: Vec<DimensionLookup>,
    probe: Arc<dyn DimensionProbe>,
    cache: &DimensionCache,
    cache_key: &CacheKeyFn,
    policy: &RemovalPolicy,
) -> EnrichmentReport {
    let mut report = EnrichmentReport::default();
    if lookups.is_empty() {
        return report;
    }

    // Group by key, keeping first-seen order
    let mut order: Vec<String> = Vec::new();
    let mut pending: HashMap<String, PendingKey> = HashMap::new();
    for lookup in lookups {
        let key = cache_key(&lookup.locator);
        pending
            .entry(key.clone())
            .or_insert_with(|| {
                order.push(key);
                PendingKey {
                    locator: lookup.locator.clone(),
                    positions: Vec::new(),
                }
            })
            .positions
            .push(lookup.position);
    }

    let mut tasks = JoinSet::new();
    for key in &order {
        let Some(entry) = pending.get(key) else {
            continue;
        };

        if let Some(dimensions) = cache.get(key) {
            tracing::debug!(key = %key, ?dimensions, "dimension cache hit");
            report.cache_hits += 1;
            for &position in &entry.positions {
                if apply_dimensions(document, position, dimensions) {
                    report.applied += 1;
                }
            }
            pending.remove(key);
            continue;
        }

        let probing = probe.probe(&entry.locator);
        let key = key.clone();
        tasks.spawn(async move { (key, probing.await) });
        report.probed += 1;
    }

    let mut failed: Vec<usize> = Vec::new();
    let mut resolved: HashSet<String> = HashSet::new();

    while let Some(joined) = tasks.join_next().await {
        let (key, outcome) = match joined {
            Ok(finished) => finished,
            Err(e) => {
                tracing::warn!("dimension probe task failed: {}", e);
                continue;
            }
        };
        resolved.insert(key.clone());

        let Some(entry) = pending.get(&key) else {
            continue;
        };

        match outcome {
            Ok(dimensions) => {
                tracing::debug!(locator = %entry.locator, ?dimensions, "probed image dimensions");
                cache.insert(key.as_str(), dimensions);
                for &position in &entry.positions {
                    if apply_dimensions(document, position, dimensions) {
                        report.applied += 1;
                    }
                }
            }
            Err(e) => {
                tracing::warn!(locator = %entry.locator, "could not determine image dimensions: {}", e);
                failed.extend_from_slice(&entry.positions);
            }
        }
    }

    // Keys whose task panicked or was cancelled count as failures too
    for (key, entry) in &pending {
        if !resolved.contains(key) {
            failed.extend_from_slice(&entry.positions);
        }
    }

    failed.sort_unstable_by(|a, b| b.cmp(a));
    failed.dedup();
    for position in failed {
        if remove_element(document, position, policy, None) > 0 {
            report.removed += 1;
        }
    }

    report
}
