//! Recursive markup formatting
//!
//! Walks a finished element tree read-only and concatenates opening
//! tags, escaped text and message content, and closing tags. Rendered
//! tag output comes from the element/attribute `render` contract and
//! is never escaped again; only literal text and translatable message
//! fallbacks are escaped.

use crate::element::{Child, Element};
use crate::error::Result;

/// Escape text content for placement between tags.
#[must_use]
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Render a tree to its HTML5 string form.
///
/// Children render in insertion order, followed by the inner text
/// slot. Void elements emit no closing tag and their children-free
/// contract is enforced by the element model itself.
pub fn render_tree(root: &Element) -> Result<String> {
    let mut out = String::new();
    render_into(root, &mut out)?;
    Ok(out)
}

fn render_into(element: &Element, out: &mut String) -> Result<()> {
    out.push_str(&element.generate_opening_tag()?);
    if !element.is_void() {
        for (_, child) in element.children() {
            match child {
                Child::Element(el) => render_into(el, out)?,
                Child::Text(text) => out.push_str(&escape_text(text)),
                Child::Message(message) => out.push_str(&escape_text(&message.fallback)),
            }
        }
        if let Some(text) = element.inner_text() {
            out.push_str(&escape_text(text));
        }
    }
    out.push_str(&element.generate_closing_tag()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::ElementVariant;
    use crate::types::Message;
    use pretty_assertions::assert_eq;

    fn container(name: &str) -> Element {
        let mut el = Element::new(ElementVariant::Container);
        el.set_name(name);
        el
    }

    #[test]
    fn test_render_nested_tree() {
        let mut body = container("body");
        let mut p = container("p");
        p.set_inner_text("hello").expect("container");
        body.set_child(p, None).expect("allowed");

        let mut br = Element::new(ElementVariant::Void);
        br.set_name("br");
        body.set_child(br, None).expect("allowed");

        assert_eq!(
            render_tree(&body).expect("named tree"),
            "<body><p>hello</p><br></body>"
        );
    }

    #[test]
    fn test_text_is_escaped_tags_are_not() {
        let mut p = container("p");
        p.set_custom_data("k", "v").expect("custom data should attach");
        p.add_text("1 < 2 & 3 > 2").expect("container");

        assert_eq!(
            render_tree(&p).expect("named tree"),
            "<p data-k='v'>1 &lt; 2 &amp; 3 &gt; 2</p>"
        );
    }

    #[test]
    fn test_message_fallback_is_escaped() {
        let mut label = container("span");
        label
            .add_message(Message::new("greeting", "Hallo <wereld>"))
            .expect("container");

        assert_eq!(
            render_tree(&label).expect("named tree"),
            "<span>Hallo &lt;wereld&gt;</span>"
        );
    }

    #[test]
    fn test_children_render_before_inner_text() {
        let mut div = container("div");
        div.set_child(container("span"), None).expect("allowed");
        div.set_inner_text("tail").expect("container");

        assert_eq!(
            render_tree(&div).expect("named tree"),
            "<div><span></span>tail</div>"
        );
    }

    #[test]
    fn test_nameless_tree_fails() {
        let root = Element::new(ElementVariant::Container);
        assert!(render_tree(&root).is_err());
    }
}
