//! Media and embed filters.
//!
//! These filters rebuild the element under a component tag instead of just
//! sanitizing it, so they return multi-item insertions with their own closing
//! markers rather than a plain modification.
//!
//! ## Sizing
//!
//! Components need explicit `width`/`height` to lay out. When the source element
//! has none (or uses `%`/`auto`), videos and embeds fall back to a fixed aspect
//! ratio, while images ask for their real size to be probed after the rewrite.

use crate::parsers::css::normalize_styles;
use crate::utils::url::{is_absolute_uri, is_secure_uri, last_path_segment, query_param, Url};
use crate::utils::{extract_declaration, is_invalid_dimension, EmbedProvider, FacebookEmbed};

use super::actions::{Action, Component, Insertion, Replacement};
use super::attribute_handlers::run_attribute_filters;
use super::dom::{Attribute, Element};

/// Literal width/height pair used when the source carries no usable size
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ratio {
    pub width: &'static str,
    pub height: &'static str,
}

pub const RATIO_16_9: Ratio = Ratio {
    width: "480",
    height: "270",
};

pub const RATIO_FACEBOOK_POST: Ratio = Ratio {
    width: "552",
    height: "310",
};

pub const RATIO_FACEBOOK_VIDEO: Ratio = Ratio {
    width: "476",
    height: "316",
};

/// Sandbox flags for generic embeds that don't declare their own
pub const DEFAULT_IFRAME_SANDBOX: &str = "allow-scripts allow-same-origin allow-popups";

const YOUTUBE_THUMBNAIL_HOST: &str = "https://i.ytimg.com/vi";

fn has_invalid_dimensions(element: &Element) -> bool {
    is_invalid_dimension(element.get_attr("width"))
        || is_invalid_dimension(element.get_attr("height"))
}

fn apply_ratio(element: &mut Element, ratio: Ratio) {
    element.set_attr("layout", "responsive");
    element.set_attr("width", ratio.width);
    element.set_attr("height", ratio.height);
}

/// Keeps the source dimension when usable, falling back to the ratio's
fn dimension_or(source: &Element, attr_name: &str, fallback: &str) -> String {
    match source.get_attr(attr_name) {
        Some(value) if !is_invalid_dimension(Some(value)) => value.to_string(),
        _ => fallback.to_string(),
    }
}

fn single(component: Component) -> Action {
    let mut insertion = Insertion::default();
    insertion.push_component(component);
    insertion.into()
}

/// `<img>` becomes `<amp-img>`.
///
/// A `max-width` in the inline style can't live on the component itself, so it is
/// hoisted into a wrapping `<div>` that is inserted in front of the image.
pub fn filter_image(mut element: Element) -> Action {
    if !element.get_attr("src").is_some_and(is_absolute_uri) {
        return Action::remove();
    }

    let mut insertion = Insertion::default();

    if let Some(style) = element.get_attr("style").map(str::to_string) {
        let (rest, max_width) = extract_declaration(&style, "max-width");
        if let Some(max_width) = max_width {
            if rest.is_empty() {
                element.remove_attr("style");
            } else {
                element.set_attr("style", rest);
            }

            let wrapper_styles = normalize_styles(&format!("max-width:{max_width};"));
            insertion.push_component(Component::new(Element::new("div", vec![])).with_styles(wrapper_styles));
        }
    }

    let mut amp_img = element.renamed("amp-img");
    let needs_dimensions = has_invalid_dimensions(&amp_img);
    if needs_dimensions {
        amp_img.set_attr("layout", "responsive");
    }

    let mut component = run_attribute_filters(amp_img);
    component.needs_dimensions = needs_dimensions;
    insertion.push_component(component);

    if insertion.end_tag() != Some("amp-img") {
        insertion.push(Replacement::Close("amp-img".to_string()));
    }

    insertion.into()
}

fn filter_media(element: Element, tag_name: &str) -> Action {
    let mut media = element.renamed(tag_name);
    if has_invalid_dimensions(&media) {
        apply_ratio(&mut media, RATIO_16_9);
    }
    single(run_attribute_filters(media))
}

/// `<video>` becomes `<amp-video>`
pub fn filter_video(element: Element) -> Action {
    filter_media(element, "amp-video")
}

/// `<audio>` becomes `<amp-audio>`
pub fn filter_audio(element: Element) -> Action {
    filter_media(element, "amp-audio")
}

/// `<iframe>` becomes a provider component or a sandboxed `<amp-iframe>`
pub fn filter_iframe(element: Element) -> Action {
    let Some(url) = element
        .get_attr("src")
        .filter(|src| is_absolute_uri(src))
        .and_then(|src| Url::parse(src.trim()).ok())
    else {
        return Action::remove();
    };

    match EmbedProvider::detect(&url) {
        Some(EmbedProvider::YouTube) => youtube_embed(&url),
        Some(EmbedProvider::Vimeo) => vimeo_embed(&url),
        Some(EmbedProvider::Facebook) => facebook_embed(&element, &url),
        None => generic_embed(element, &url),
    }
}

fn video_component(tag_name: &str, video_id: &str) -> Component {
    let mut video = Element::new(tag_name, vec![]);
    apply_ratio(&mut video, RATIO_16_9);
    video.set_attr("data-videoid", video_id);
    run_attribute_filters(video)
}

fn youtube_embed(url: &Url) -> Action {
    // `watch?v=` links carry the id in the query instead of the path
    let Some(video_id) = query_param(url, "v").or_else(|| last_path_segment(url)) else {
        return Action::remove();
    };

    let placeholder = Element::new(
        "amp-img",
        vec![
            Attribute::new("src", format!("{YOUTUBE_THUMBNAIL_HOST}/{video_id}/hqdefault.jpg")),
            Attribute::new("placeholder", ""),
            Attribute::new("layout", "fill"),
        ],
    );

    let mut insertion = Insertion::default();
    insertion
        .push_component(video_component("amp-youtube", &video_id))
        .push_component(Component::new(placeholder))
        .push(Replacement::Close("amp-img".to_string()));
    insertion.into()
}

fn vimeo_embed(url: &Url) -> Action {
    match last_path_segment(url) {
        Some(video_id) => single(video_component("amp-vimeo", &video_id)),
        None => Action::remove(),
    }
}

fn facebook_embed(source: &Element, url: &Url) -> Action {
    let Some(permalink) = query_param(url, "href").filter(|href| is_absolute_uri(href)) else {
        return Action::remove();
    };
    let permalink = permalink.trim().trim_end_matches('/');

    let mut facebook = Element::new("amp-facebook", vec![]);
    let ratio = match FacebookEmbed::classify(permalink) {
        Some(FacebookEmbed::Video) => {
            facebook.set_attr("data-embed-as", "video");
            RATIO_FACEBOOK_VIDEO
        }
        Some(FacebookEmbed::Post) => RATIO_FACEBOOK_POST,
        None => return Action::remove(),
    };

    facebook.set_attr("layout", "responsive");
    facebook.set_attr("width", dimension_or(source, "width", ratio.width));
    facebook.set_attr("height", dimension_or(source, "height", ratio.height));
    facebook.set_attr("data-href", permalink);

    single(run_attribute_filters(facebook))
}

fn generic_embed(element: Element, url: &Url) -> Action {
    if !is_secure_uri(url.as_str()) {
        return Action::remove();
    }

    let mut amp_iframe = element.renamed("amp-iframe");
    if !amp_iframe.has_attr("sandbox") {
        amp_iframe.set_attr("sandbox", DEFAULT_IFRAME_SANDBOX);
    }
    if has_invalid_dimensions(&amp_iframe) {
        apply_ratio(&mut amp_iframe, RATIO_16_9);
    }

    single(run_attribute_filters(amp_iframe))
}
