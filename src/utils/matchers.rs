//! Precompiled patterns used by the filters.
//!
//! Every pattern is compiled once on first use and shared afterwards.

use std::sync::OnceLock;

use regex::Regex;

use super::url::Url;

fn compile(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("matcher patterns are valid regexes"))
}

pub(crate) fn absolute_uri() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    compile(&CELL, r"(?i)^\s*https?:")
}

pub(crate) fn absolute_secure_uri() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    compile(&CELL, r"(?i)^\s*https:")
}

fn event_or_namespace_attr() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    compile(&CELL, r"(?i)^(on|xml)[a-z]+")
}

fn invalid_dimension() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    compile(&CELL, r"(?i)(%|auto)")
}

fn class_prefix() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    compile(&CELL, r"^[a-z][a-z0-9_-]*$")
}

fn youtube_host() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    compile(
        &CELL,
        r"(?i)(^|\.)(youtube\.com|youtube-nocookie\.com|youtu\.be)$",
    )
}

fn vimeo_host() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    compile(&CELL, r"(?i)(^|\.)vimeo\.com$")
}

fn facebook_host() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    compile(&CELL, r"(?i)(^|\.)facebook\.com$")
}

fn facebook_video_path() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    compile(&CELL, r"(?i)/videos/")
}

fn facebook_post_path() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    compile(&CELL, r"(?i)/posts/")
}

/// Attributes starting with `on` (event handlers) or `xml` (namespace tricks)
pub fn is_event_or_namespace_attr(attr_name: &str) -> bool {
    event_or_namespace_attr().is_match(attr_name)
}

/// Width/height values the layout system can't use (`100%`, `auto`, missing)
pub fn is_invalid_dimension(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(value) => value.trim().is_empty() || invalid_dimension().is_match(value),
    }
}

/// Prefixes reserved by the component runtime
const RESERVED_CLASS_PREFIXES: &[&str] = &["amp-", "i-amp-", "-amp-"];

/// A usable prefix for generated class names: lowercase identifier, not reserved
pub fn is_valid_class_prefix(prefix: &str) -> bool {
    class_prefix().is_match(prefix)
        && !RESERVED_CLASS_PREFIXES
            .iter()
            .any(|reserved| prefix.starts_with(reserved))
}

/// Embed providers that get a dedicated element instead of a generic sandboxed iframe
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmbedProvider {
    YouTube,
    Vimeo,
    Facebook,
}

impl EmbedProvider {
    /// Detects the provider from the host of a parsed embed URL
    pub fn detect(url: &Url) -> Option<Self> {
        let host = url.host_str()?;

        if youtube_host().is_match(host) {
            Some(EmbedProvider::YouTube)
        } else if vimeo_host().is_match(host) {
            Some(EmbedProvider::Vimeo)
        } else if facebook_host().is_match(host) {
            Some(EmbedProvider::Facebook)
        } else {
            None
        }
    }
}

/// How a Facebook permalink should be presented
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FacebookEmbed {
    Post,
    Video,
}

impl FacebookEmbed {
    pub fn classify(permalink: &str) -> Option<Self> {
        if facebook_video_path().is_match(permalink) {
            Some(FacebookEmbed::Video)
        } else if facebook_post_path().is_match(permalink) {
            Some(FacebookEmbed::Post)
        } else {
            None
        }
    }
}

/// Pulls a single property out of an inline style declaration.
///
/// Returns the declaration without that property and the property's value, if it was present.
/// The last occurrence wins, as it would in a browser.
pub fn extract_declaration(style: &str, property: &str) -> (String, Option<String>) {
    let mut remaining = Vec::new();
    let mut extracted = None;

    for declaration in style.split(';') {
        let matched = declaration
            .split_once(':')
            .filter(|(name, _)| name.trim().eq_ignore_ascii_case(property))
            .map(|(_, value)| value.trim().to_string());

        match matched {
            Some(value) if !value.is_empty() => extracted = Some(value),
            Some(_) => {}
            None if declaration.trim().is_empty() => {}
            None => remaining.push(declaration.trim()),
        }
    }

    let mut rest = remaining.join(";");
    if !rest.is_empty() {
        rest.push(';');
    }

    (rest, extracted)
}
