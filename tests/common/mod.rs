// Shared helpers for integration tests
//
// Provides a scripted dimension probe and engine builders

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use futures::FutureExt;

use transamp::core::{TransAmp, TransAmpOptions};
use transamp::network::{DimensionProbe, Dimensions, ProbeError};

/// Probe that answers from a fixed table and records every request
#[derive(Default)]
pub struct FakeProbe {
    sizes: HashMap<String, Dimensions>,
    requests: Mutex<Vec<String>>,
}

impl FakeProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, locator: &str, width: u32, height: u32) -> Self {
        self.sizes
            .insert(locator.to_string(), Dimensions::new(width, height));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl DimensionProbe for FakeProbe {
    fn probe(&self, locator: &str) -> BoxFuture<'static, Result<Dimensions, ProbeError>> {
        self.requests.lock().unwrap().push(locator.to_string());
        let result = self
            .sizes
            .get(locator)
            .copied()
            .ok_or_else(|| ProbeError::Undecodable(format!("no image at {locator}")));

        async move {
            // Let the other probes of the same call get going first
            tokio::task::yield_now().await;
            result
        }
        .boxed()
    }
}

/// Engine with default options and the given probe
pub fn engine_with(probe: Arc<FakeProbe>) -> TransAmp {
    TransAmp::with_probe(TransAmpOptions::default(), probe)
}

/// Engine with custom options and a probe that knows no images
pub fn engine_with_options(options: TransAmpOptions) -> TransAmp {
    TransAmp::with_probe(options, Arc::new(FakeProbe::new()))
}

/// Engine with default options and a probe that knows no images
pub fn default_engine() -> TransAmp {
    engine_with_options(TransAmpOptions::default())
}
