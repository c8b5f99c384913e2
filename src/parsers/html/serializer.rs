use super::dom::{Element, Node};

/// Escapes an attribute value for use inside double quotes
pub fn escape_attr_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Escapes character data so that it renders literally
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Reverses [`escape_text`]
fn unescape_text(text: &str) -> String {
    let mut unescaped = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(at) = rest.find('&') {
        unescaped.push_str(&rest[..at]);
        rest = &rest[at..];
        let (literal, len) = if rest.starts_with("&amp;") {
            ('&', 5)
        } else if rest.starts_with("&lt;") {
            ('<', 4)
        } else if rest.starts_with("&gt;") {
            ('>', 4)
        } else {
            ('&', 1)
        };
        unescaped.push(literal);
        rest = &rest[len..];
    }
    unescaped.push_str(rest);
    unescaped
}

/// Script content goes out raw, but must never close its element early
fn render_script_text(text: &str, buf: &mut String) {
    let raw = unescape_text(text);
    let mut rest = raw.as_str();
    while let Some(at) = rest.find("</") {
        buf.push_str(&rest[..at]);
        let tail = &rest[at + 2..];
        if tail
            .get(..6)
            .is_some_and(|name| name.eq_ignore_ascii_case("script"))
        {
            buf.push_str("<\\/");
        } else {
            buf.push_str("</");
        }
        rest = tail;
    }
    buf.push_str(rest);
}

fn opens_script(node: &Node) -> bool {
    node.as_element()
        .is_some_and(|element| !element.is_closing() && element.name() == "script")
}

fn render_element(element: &Element, buf: &mut String) {
    if element.is_closing() {
        buf.push_str("</");
        buf.push_str(element.name());
        buf.push('>');
        return;
    }

    buf.push('<');
    buf.push_str(element.name());
    for attr in element.attrs_iter() {
        buf.push(' ');
        buf.push_str(&attr.name);
        // Boolean attributes are rendered without a value
        if !attr.value.is_empty() {
            buf.push_str("=\"");
            buf.push_str(&escape_attr_value(&attr.value));
            buf.push('"');
        }
    }
    if element.is_void() {
        buf.push('/');
    }
    buf.push('>');
}

fn render_into(node: &Node, buf: &mut String) {
    match node {
        Node::Element(element) => render_element(element, buf),
        Node::Text(text) => buf.push_str(text),
    }
}

/// Renders a single node back to markup
pub fn render_node(node: &Node) -> String {
    let mut buf = String::new();
    render_into(node, &mut buf);
    buf
}

/// Renders a sequence of nodes, in order, into one string.
///
/// Text directly inside an opening `script` is raw script data, so it is
/// rendered unescaped. Text anywhere else keeps its escaping.
pub fn render_document(nodes: &[Node]) -> String {
    let mut buf = String::new();
    let mut previous: Option<&Node> = None;
    for node in nodes {
        match node {
            Node::Text(text) if previous.is_some_and(opens_script) => {
                render_script_text(text, &mut buf)
            }
            _ => render_into(node, &mut buf),
        }
        previous = Some(node);
    }
    buf
}
