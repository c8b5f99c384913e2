//! Remote image dimension probing.
//!
//! Only the head of the resource is downloaded: after every received chunk the
//! buffered bytes are handed to the image header decoders, and the transfer is
//! dropped as soon as they report a size.

use std::io::Cursor;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use image::{ImageError, ImageReader};
use thiserror::Error;

use crate::utils::url::is_absolute_uri;

/// Upper bound on how much of a resource is buffered while looking for a header
pub const MAX_PROBE_BYTES: usize = 1024 * 1024;

/// Enough bytes for every supported format's magic number
const FORMAT_SNIFF_BYTES: usize = 32;

/// Pixel size of an image
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Dimensions { width, height }
    }
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("not an absolute http(s) locator: {0}")]
    NotAbsolute(String),

    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("could not decode image header: {0}")]
    Undecodable(String),

    #[error("empty response")]
    Empty,

    #[error("no image header within the first {0} bytes")]
    TooLarge(usize),
}

/// Resolves an absolute locator to the pixel size of the image behind it
pub trait DimensionProbe: Send + Sync {
    fn probe(&self, locator: &str) -> BoxFuture<'static, Result<Dimensions, ProbeError>>;
}

/// Reads dimensions out of a possibly incomplete image prefix.
///
/// `Ok(None)` means more bytes are needed. With `complete` set the data is known
/// to be everything there is, so an incomplete header becomes an error.
pub fn sniff_dimensions(bytes: &[u8], complete: bool) -> Result<Option<Dimensions>, ProbeError> {
    if bytes.is_empty() {
        return if complete { Err(ProbeError::Empty) } else { Ok(None) };
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ProbeError::Undecodable(e.to_string()))?;

    if reader.format().is_none() {
        if complete || bytes.len() >= FORMAT_SNIFF_BYTES {
            return Err(ProbeError::Undecodable("unrecognized image format".to_string()));
        }
        return Ok(None);
    }

    match reader.into_dimensions() {
        Ok((width, height)) => Ok(Some(Dimensions::new(width, height))),
        Err(e @ ImageError::Unsupported(_)) => Err(ProbeError::Undecodable(e.to_string())),
        Err(e) if complete => Err(ProbeError::Undecodable(e.to_string())),
        Err(_) => Ok(None),
    }
}

/// Probe backed by an HTTP client
#[derive(Clone, Debug)]
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    /// Builds a client; without a timeout requests may wait as long as the server lets them
    pub fn new(timeout: Option<Duration>, user_agent: &str) -> Result<Self, ProbeError> {
        let mut builder = reqwest::Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(HttpProbe {
            client: builder.build()?,
        })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        HttpProbe { client }
    }

    async fn fetch_dimensions(
        client: reqwest::Client,
        locator: String,
    ) -> Result<Dimensions, ProbeError> {
        if !is_absolute_uri(&locator) {
            return Err(ProbeError::NotAbsolute(locator));
        }

        let mut response = client.get(locator.trim()).send().await?.error_for_status()?;
        let mut buffer = Vec::new();

        while let Some(chunk) = response.chunk().await? {
            buffer.extend_from_slice(&chunk);

            // Returning drops `response`, which aborts the rest of the transfer
            if let Some(dimensions) = sniff_dimensions(&buffer, false)? {
                tracing::trace!(locator = %locator, bytes = buffer.len(), "image header found");
                return Ok(dimensions);
            }
            if buffer.len() >= MAX_PROBE_BYTES {
                return Err(ProbeError::TooLarge(MAX_PROBE_BYTES));
            }
        }

        sniff_dimensions(&buffer, true)?.ok_or(ProbeError::Empty)
    }
}

impl DimensionProbe for HttpProbe {
    fn probe(&self, locator: &str) -> BoxFuture<'static, Result<Dimensions, ProbeError>> {
        Self::fetch_dimensions(self.client.clone(), locator.to_string()).boxed()
    }
}
