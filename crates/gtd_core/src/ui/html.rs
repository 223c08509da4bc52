//! Markup builder that escapes text and attribute values by construction.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

const VOID_TAGS: &[&str] = &["br", "hr", "img", "input"];

/// Rendered markup. Only produced by [`Node::render`], so it never holds
/// unescaped user text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Html(String);

impl Html {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn concat<'a>(nodes: impl IntoIterator<Item = &'a Node>) -> Self {
        let mut out = String::new();
        for node in nodes {
            node.write_to(&mut out);
        }
        Self(out)
    }
}

impl Display for Html {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<Node>,
    },
    Text(String),
}

impl Node {
    pub fn el(tag: &str) -> Self {
        Self::Element {
            tag: tag.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Sets an attribute, replacing an earlier value of the same name.
    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        if let Self::Element { attrs, .. } = &mut self {
            let value = value.into();
            match attrs.iter_mut().find(|(existing, _)| existing == name) {
                Some(slot) => slot.1 = value,
                None => attrs.push((name.to_string(), value)),
            }
        }
        self
    }

    /// Appends one or more space-separated classes.
    pub fn class(self, class: &str) -> Self {
        let merged = match self.attr_value("class") {
            Some(existing) if !existing.is_empty() => format!("{existing} {class}"),
            _ => class.to_string(),
        };
        self.attr("class", merged)
    }

    /// Sets `data-<name>`; `name` is written in kebab case.
    pub fn data(self, name: &str, value: impl Into<String>) -> Self {
        self.attr(&format!("data-{name}"), value)
    }

    pub fn child(mut self, node: Node) -> Self {
        if let Self::Element { children, .. } = &mut self {
            children.push(node);
        }
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        if let Self::Element { children, .. } = &mut self {
            children.extend(nodes);
        }
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.child(Node::text(text))
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Element { tag, .. } => Some(tag),
            Self::Text(_) => None,
        }
    }

    pub fn attr_value(&self, name: &str) -> Option<&str> {
        match self {
            Self::Element { attrs, .. } => attrs
                .iter()
                .find(|(existing, _)| existing == name)
                .map(|(_, value)| value.as_str()),
            Self::Text(_) => None,
        }
    }

    pub fn classes(&self) -> Vec<String> {
        self.attr_value("class")
            .map(|value| value.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr_value("class")
            .is_some_and(|value| value.split_whitespace().any(|existing| existing == class))
    }

    /// `data-*` attributes keyed the way a browser `dataset` keys them
    /// (`data-thing-id` becomes `thingId`).
    pub fn dataset(&self) -> BTreeMap<String, String> {
        match self {
            Self::Element { attrs, .. } => attrs
                .iter()
                .filter_map(|(name, value)| {
                    name.strip_prefix("data-")
                        .map(|rest| (camel_case(rest), value.clone()))
                })
                .collect(),
            Self::Text(_) => BTreeMap::new(),
        }
    }

    pub fn child_nodes(&self) -> &[Node] {
        match self {
            Self::Element { children, .. } => children,
            Self::Text(_) => &[],
        }
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Element { children, .. } => children.iter().map(Node::text_content).collect(),
        }
    }

    /// Depth-first walk over this node and its descendants.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Node)) {
        visit(self);
        for child in self.child_nodes() {
            child.walk(visit);
        }
    }

    pub fn render(&self) -> Html {
        let mut out = String::new();
        self.write_to(&mut out);
        Html(out)
    }

    fn write_to(&self, out: &mut String) {
        match self {
            Self::Text(text) => out.push_str(&escape(text)),
            Self::Element {
                tag,
                attrs,
                children,
            } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape(value));
                    out.push('"');
                }
                out.push('>');
                if VOID_TAGS.contains(&tag.as_str()) {
                    return;
                }
                for child in children {
                    child.write_to(out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn camel_case(kebab: &str) -> String {
    let mut out = String::with_capacity(kebab.len());
    let mut upper = false;
    for ch in kebab.chars() {
        if ch == '-' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::Node;

    #[test]
    fn text_and_attributes_are_escaped() {
        let node = Node::el("h3")
            .class("item-title")
            .attr("aria-label", "\"x\" <y>")
            .with_text("<script>alert('x')</script> & co");

        assert_eq!(
            node.render().as_str(),
            "<h3 class=\"item-title\" aria-label=\"&quot;x&quot; &lt;y&gt;\">\
             &lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; co</h3>"
        );
    }

    #[test]
    fn dataset_uses_camel_case_keys() {
        let node = Node::el("button").data("thing-id", "7").data("action", "quick");
        let dataset = node.dataset();
        assert_eq!(dataset.get("thingId").map(String::as_str), Some("7"));
        assert_eq!(dataset.get("action").map(String::as_str), Some("quick"));
    }

    #[test]
    fn classes_accumulate_and_void_tags_do_not_close() {
        let node = Node::el("div")
            .class("btn")
            .class("btn-primary")
            .child(Node::el("br"));
        assert!(node.has_class("btn-primary"));
        assert_eq!(
            node.render().as_str(),
            "<div class=\"btn btn-primary\"><br></div>"
        );
    }
}
