/// Tags that never have a closing marker
pub const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Legacy or dangerous tags that are always removed
pub const PROHIBITED_TAGS: &[&str] = &[
    "base", "frame", "frameset", "object", "param", "applet", "embed",
];

/// Tags passed through the generic attribute filters when no tag-specific filter exists
pub const ALLOWED_TAGS: &[&str] = &[
    // Document metadata
    "html", "head", "body", "title", "meta", "link", "noscript",
    // Sectioning
    "article", "aside", "footer", "header", "main", "nav", "section", "address", "hgroup",
    "h1", "h2", "h3", "h4", "h5", "h6",
    // Grouping
    "p", "hr", "pre", "blockquote", "ol", "ul", "li", "dl", "dt", "dd", "figure", "figcaption",
    "div",
    // Text-level
    "a", "em", "strong", "small", "s", "cite", "q", "dfn", "abbr", "data", "time", "code",
    "var", "samp", "kbd", "sub", "sup", "i", "b", "u", "mark", "ruby", "rb", "rt", "rtc", "rp",
    "bdi", "bdo", "span", "br", "wbr", "ins", "del",
    // Media children
    "source", "track",
    // Tables
    "table", "caption", "colgroup", "col", "tbody", "thead", "tfoot", "tr", "td", "th",
    // Form display
    "button", "label", "fieldset", "legend", "select", "option", "optgroup", "datalist",
    "textarea", "progress", "meter", "output",
    // Interactive
    "details", "summary",
    // AMP components
    "amp-img", "amp-anim", "amp-video", "amp-audio", "amp-iframe", "amp-youtube", "amp-vimeo",
    "amp-facebook", "amp-carousel", "amp-pixel",
];

/// `layout` attribute values understood by the layout system
pub const ALLOWED_LAYOUTS: &[&str] = &[
    "nodisplay",
    "fixed",
    "responsive",
    "fixed-height",
    "fill",
    "container",
    "flex-item",
    "intrinsic",
];

/// `rel` values that make a `<link>` unusable
pub const PROHIBITED_RELS: &[&str] = &["stylesheet", "preconnect", "prerender", "prefetch"];

/// Tags whose content the tokenizer must treat as raw text
pub const RAW_TEXT_TAGS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "title", "textarea",
];

/// ASCII whitespace characters
pub const WHITESPACES: &[char] = &[' ', '\t', '\n', '\x0c', '\r'];

fn contains_ignore_case(table: &[&str], tag_name: &str) -> bool {
    table.iter().any(|entry| entry.eq_ignore_ascii_case(tag_name))
}

/// Checks whether a tag is void (self-closing, never paired with a closing marker)
pub fn is_void_tag(tag_name: &str) -> bool {
    contains_ignore_case(VOID_TAGS, tag_name)
}

pub fn is_prohibited_tag(tag_name: &str) -> bool {
    contains_ignore_case(PROHIBITED_TAGS, tag_name)
}

pub fn is_allowed_tag(tag_name: &str) -> bool {
    contains_ignore_case(ALLOWED_TAGS, tag_name)
}

pub fn is_allowed_layout(layout: &str) -> bool {
    ALLOWED_LAYOUTS.contains(&layout.trim())
}

/// True if any whitespace-separated token of a `rel` value is prohibited
pub fn is_prohibited_rel(rel: &str) -> bool {
    rel.split(WHITESPACES)
        .any(|token| contains_ignore_case(PROHIBITED_RELS, token))
}
