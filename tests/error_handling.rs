// Error handling tests
//
// Malformed input, failing probes and bad configuration never abort a translation

mod common {
    include!("common/mod.rs");
}

use std::sync::Arc;

use common::{default_engine, engine_with, engine_with_options, FakeProbe};
use transamp::core::{TransAmpOptions, DEFAULT_CLASS_PREFIX};
use transamp::env::{engine, probe, EnvVar};
use transamp::network::{sniff_dimensions, ProbeError};

/// Unbalanced markup is rewritten without panicking
#[tokio::test]
async fn test_malformed_markup() {
    let engine = default_engine();

    let translation = engine.translate("<div><p>open<span>never closed").await;
    assert_eq!(translation.html, "<div><p>open<span>never closed");

    let translation = engine.translate("</div></p>text<").await;
    assert!(translation.html.contains("text"));

    let translation = engine.translate("<p style=\"\">x</p><p style=\";;\">y</p>").await;
    assert_eq!(translation.html, "<p>x</p><p>y</p>");
    assert!(translation.styles.is_empty());
}

/// Stray closing tags of removed elements disappear
#[tokio::test]
async fn test_orphan_closing_tags() {
    let engine = default_engine();
    let translation = engine.translate("a</custom>b</video>c").await;

    assert!(!translation.html.contains("</custom>"));
    assert!(translation.html.starts_with("ab"));
}

/// Insecure or relative embeds are dropped
#[tokio::test]
async fn test_unusable_embeds_removed() {
    let engine = default_engine();
    let translation = engine
        .translate(
            "<iframe src=\"http://insecure.test/\">x</iframe>\
             <iframe src=\"/local\"></iframe><img src=\"/rel.png\"><p>ok</p>",
        )
        .await;

    assert_eq!(translation.html, "<p>ok</p>");
}

/// One failed probe removes only its own elements
#[tokio::test]
async fn test_partial_probe_failure() {
    let probe = Arc::new(FakeProbe::new().with_image("https://x.test/good.png", 5, 5));
    let engine = engine_with(probe.clone());

    let translation = engine
        .translate(
            "<img src=\"https://x.test/bad.png\"><p>mid</p>\
             <img src=\"https://x.test/good.png\"><img src=\"https://x.test/bad.png\">",
        )
        .await;

    assert_eq!(translation.html.matches("<amp-img").count(), 1);
    assert!(translation.html.contains("good.png"));
    assert!(!translation.html.contains("bad.png"));
    assert!(translation.html.starts_with("<p>mid</p>"));
    assert_eq!(probe.requests().len(), 2);
}

/// A bad class prefix falls back to the default
#[tokio::test]
async fn test_invalid_class_prefix_option() {
    let engine = engine_with_options(TransAmpOptions {
        class_prefix: "amp-nope".to_string(),
        ..TransAmpOptions::default()
    });

    assert_eq!(engine.class_prefix(), DEFAULT_CLASS_PREFIX);
    let translation = engine.translate("<p style=\"color:red\">x</p>").await;
    assert_eq!(translation.html, "<p class=\"saniamp0\">x</p>");
}

/// Environment values are validated by their accessors
#[test]
fn test_env_parse_errors() {
    let error = engine::RemoveChildren::parse("maybe").unwrap_err();
    assert_eq!(error.variable, "TRANSAMP_REMOVE_CHILDREN");
    assert!(error.to_string().contains("Invalid boolean value"));

    assert!(engine::ClassPrefix::parse("-x").is_err());
    assert!(probe::Timeout::parse("0").is_err());
    assert!(probe::Timeout::parse("601").is_err());
    assert!(probe::Timeout::parse("abc").is_err());
    assert!(probe::UserAgent::parse("   ").is_err());
}

/// Probe errors describe what went wrong
#[test]
fn test_probe_error_messages() {
    let error = sniff_dimensions(b"plain text that is long enough to be sniffed", false)
        .unwrap_err();
    assert!(matches!(error, ProbeError::Undecodable(_)));

    assert_eq!(ProbeError::Empty.to_string(), "empty response");
    assert_eq!(
        ProbeError::NotAbsolute("/a.png".to_string()).to_string(),
        "not an absolute http(s) locator: /a.png"
    );
}
