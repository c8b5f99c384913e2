pub use url::{ParseError, Url};

use super::matchers::{absolute_secure_uri, absolute_uri};

/// Schemes an anchor may link to besides relative references
pub const ANCHOR_PROTOCOLS: &[&str] = &[
    "ftp",
    "geo",
    "http",
    "https",
    "mailto",
    "maps",
    "bbmi",
    "fb-messenger",
    "intent",
    "line",
    "skype",
    "sms",
    "snapchat",
    "tel",
    "tg",
    "threema",
    "twitter",
    "viber",
    "webcal",
    "web+mastodon",
];

const DEFAULT_PROTOCOLS: &[&str] = &["http", "https"];

/// Rules a URI has to satisfy to be kept
#[derive(Clone, Copy, Debug)]
pub struct UriPolicy<'a> {
    pub allow_empty: bool,
    pub allow_relative: bool,
    pub force_secure: bool,
    pub allowed_protocols: &'a [&'a str],
}

impl Default for UriPolicy<'_> {
    fn default() -> Self {
        UriPolicy {
            allow_empty: false,
            allow_relative: false,
            force_secure: false,
            allowed_protocols: DEFAULT_PROTOCOLS,
        }
    }
}

impl UriPolicy<'static> {
    /// Policy used for `<a href>`: relative references and a fixed list of app schemes
    pub fn anchor() -> Self {
        UriPolicy {
            allow_empty: true,
            allow_relative: true,
            force_secure: false,
            allowed_protocols: ANCHOR_PROTOCOLS,
        }
    }
}

/// Checks a URI against the given policy
pub fn validate_uri(uri: &str, policy: &UriPolicy) -> bool {
    let uri = uri.trim();

    if uri.is_empty() {
        return policy.allow_empty;
    }

    match Url::parse(uri) {
        Ok(parsed) => {
            let scheme = parsed.scheme();

            if policy.force_secure && scheme != "https" {
                return false;
            }

            policy
                .allowed_protocols
                .iter()
                .any(|protocol| protocol.eq_ignore_ascii_case(scheme))
        }
        // No scheme at all, e.g. "/path", "../img.png", "#top", "//host/path"
        Err(ParseError::RelativeUrlWithoutBase) => policy.allow_relative && !policy.force_secure,
        Err(_) => false,
    }
}

/// Returns true for locators starting with `http:` or `https:`
pub fn is_absolute_uri(uri: &str) -> bool {
    absolute_uri().is_match(uri)
}

/// Returns true for locators starting with `https:`
pub fn is_secure_uri(uri: &str) -> bool {
    absolute_secure_uri().is_match(uri)
}

/// Last non-empty path segment of a parsed URL (e.g. the video id of an embed URL)
pub fn last_path_segment(url: &Url) -> Option<String> {
    url.path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(str::to_string)
}

/// Percent-decoded value of the first query parameter with the given name
pub fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}
