//! Inline style handling.
//!
//! Inline `style` attributes are not allowed in the output. Each one is
//! normalized into a canonical declaration block, mapped to a generated class
//! name, and the classes are emitted together as a single stylesheet.

use std::collections::HashMap;

use crate::parsers::html::dom::Element;

/// Property names whose scrolling values conflict with the layout system
const OVERFLOW_NAMES: &[&str] = &["overflow", "overflow-x", "overflow-y"];
const OVERFLOW_PROHIBITED_VALUES: &[&str] = &["auto", "scroll"];

fn strip_important(value: &str) -> &str {
    let trimmed = value.trim_end();
    let lowered = trimmed.to_ascii_lowercase();
    match lowered.rfind("!important") {
        Some(position) if lowered[position..].trim_end() == "!important" => {
            trimmed[..position].trim_end()
        }
        _ => trimmed,
    }
}

/// Characters that would end the generated rule or the `style` element holding it
const RULE_BREAKING_CHARS: &[char] = &['{', '}', '<'];

fn breaks_rule(text: &str) -> bool {
    text.contains(RULE_BREAKING_CHARS)
}

fn is_prohibited_overflow(name: &str, value: &str) -> bool {
    OVERFLOW_NAMES
        .iter()
        .any(|overflow| overflow.eq_ignore_ascii_case(name))
        && OVERFLOW_PROHIBITED_VALUES
            .iter()
            .any(|prohibited| prohibited.eq_ignore_ascii_case(value))
}

/// Canonicalizes an inline style declaration block.
///
/// Declarations are trimmed, stripped of `!important`, filtered, sorted and joined
/// with a trailing `;`. A declaration containing `{`, `}` or `<` is dropped whole.
/// Returns `None` if nothing survives.
pub fn normalize_styles(style: &str) -> Option<String> {
    let mut declarations: Vec<String> = style
        .split(';')
        .filter_map(|declaration| {
            let (name, value) = declaration.split_once(':')?;
            let name = name.trim();
            let value = strip_important(value).trim();

            if name.is_empty()
                || value.is_empty()
                || breaks_rule(name)
                || breaks_rule(value)
                || is_prohibited_overflow(name, value)
            {
                return None;
            }

            Some(format!("{name}:{value}"))
        })
        .collect();

    if declarations.is_empty() {
        return None;
    }

    declarations.sort();
    let mut normalized = declarations.join(";");
    normalized.push(';');
    Some(normalized)
}

/// Appends a class name to an element's `class` attribute
pub fn append_class(element: &mut Element, class_name: &str) {
    if class_name.is_empty() {
        return;
    }

    let classes = match element.get_attr("class").map(str::trim) {
        Some(current) if !current.is_empty() => format!("{current} {class_name}"),
        _ => class_name.to_string(),
    };
    element.set_attr("class", classes);
}

/// Insertion-ordered map from normalized declaration blocks to generated class names
#[derive(Clone, Debug, Default)]
pub struct ClassRegistry {
    prefix: String,
    entries: Vec<(String, String)>,
    lookup: HashMap<String, usize>,
}

impl ClassRegistry {
    pub fn new(prefix: impl Into<String>) -> Self {
        ClassRegistry {
            prefix: prefix.into(),
            entries: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    /// Class name for a normalized declaration block, allocating one on first sight
    pub fn class_for(&mut self, declarations: &str) -> String {
        if let Some(&index) = self.lookup.get(declarations) {
            return self.entries[index].1.clone();
        }

        let class_name = format!("{}{}", self.prefix, self.entries.len());
        tracing::debug!(class = %class_name, styles = declarations, "allocated style class");

        self.lookup
            .insert(declarations.to_string(), self.entries.len());
        self.entries
            .push((declarations.to_string(), class_name.clone()));
        class_name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (declarations, class name) pairs in allocation order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(declarations, class_name)| (declarations.as_str(), class_name.as_str()))
    }
}

/// Emits one minified `.class{declarations}` rule per registered class
pub fn assemble_stylesheet(classes: &ClassRegistry) -> String {
    classes
        .entries()
        .map(|(declarations, class_name)| format!(".{class_name}{{{declarations}}}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_order_and_spacing() {
        assert_eq!(
            normalize_styles(" margin : 0 ; color:red"),
            Some("color:red;margin:0;".to_string())
        );
        assert_eq!(
            normalize_styles("color:red;margin:0;"),
            normalize_styles("margin:0;color:red;")
        );
    }

    #[test]
    fn drops_declarations_that_break_the_rule() {
        assert_eq!(
            normalize_styles("color:red}body{display:none;margin:0"),
            Some("margin:0;".to_string())
        );
        assert_eq!(
            normalize_styles("x:</style><script>y()</script>"),
            None
        );
        assert_eq!(normalize_styles("a{b:c"), None);
    }

    #[test]
    fn strips_important() {
        assert_eq!(
            normalize_styles("color: red !important;"),
            Some("color:red;".to_string())
        );
        assert_eq!(
            normalize_styles("color: red!IMPORTANT"),
            Some("color:red;".to_string())
        );
    }

    #[test]
    fn drops_scrolling_overflow() {
        assert_eq!(
            normalize_styles("overflow:auto;overflow-y: scroll;color:blue"),
            Some("color:blue;".to_string())
        );
        assert_eq!(
            normalize_styles("overflow:hidden"),
            Some("overflow:hidden;".to_string())
        );
        assert_eq!(normalize_styles("overflow-x:scroll;"), None);
    }

    #[test]
    fn keeps_colons_inside_values() {
        assert_eq!(
            normalize_styles("background:url(https://x.test/a.png)"),
            Some("background:url(https://x.test/a.png);".to_string())
        );
    }

    #[test]
    fn empty_input_yields_none() {
        assert_eq!(normalize_styles(""), None);
        assert_eq!(normalize_styles(" ; ;"), None);
        assert_eq!(normalize_styles("color:"), None);
    }

    #[test]
    fn class_registry_reuses_names() {
        let mut classes = ClassRegistry::new("saniamp");

        assert_eq!(classes.class_for("color:red;"), "saniamp0");
        assert_eq!(classes.class_for("margin:0;"), "saniamp1");
        assert_eq!(classes.class_for("color:red;"), "saniamp0");
        assert_eq!(classes.len(), 2);
    }

    #[test]
    fn stylesheet_is_minified_in_insertion_order() {
        let mut classes = ClassRegistry::new("c");
        classes.class_for("margin:0;");
        classes.class_for("color:red;");

        assert_eq!(
            assemble_stylesheet(&classes),
            ".c0{margin:0;}.c1{color:red;}"
        );
        assert_eq!(assemble_stylesheet(&ClassRegistry::new("c")), "");
    }

    #[test]
    fn appends_classes() {
        let mut element = Element::new("div", vec![]);
        append_class(&mut element, "a");
        append_class(&mut element, "b");

        assert_eq!(element.get_attr("class"), Some("a b"));
    }
}
