//! HTML serialization of the document tree.

use std::fmt::Write;

use super::{Document, Element, Node};
use crate::utils::html::{
    escape, escape_attr, is_block_element, is_raw_text_element, is_void_element,
};

/// Serializer settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderConfig {
    /// Drop the newline emitted after block-level elements.
    pub minify: bool,
}

impl RenderConfig {
    pub const fn new(minify: bool) -> Self {
        Self { minify }
    }
}

/// Render the whole document, root element included.
pub fn render_document(doc: &Document, config: &RenderConfig) -> String {
    render_element(&doc.root, config)
}

/// Render one element and its subtree.
pub fn render_element(elem: &Element, config: &RenderConfig) -> String {
    let mut out = String::with_capacity(256);
    Renderer {
        config,
        preformatted: 0,
    }
    .element(elem, &mut out);
    out
}

struct Renderer<'a> {
    config: &'a RenderConfig,
    /// Nesting depth of `pre`; whitespace inside must be kept byte-exact.
    preformatted: usize,
}

impl Renderer<'_> {
    fn element(&mut self, elem: &Element, out: &mut String) {
        out.push('<');
        out.push_str(&elem.tag);
        for (name, value) in elem.attrs.iter() {
            // `write!` into a String cannot fail
            let _ = write!(out, " {}=\"{}\"", name, escape_attr(value));
        }
        out.push('>');

        if is_void_element(&elem.tag) {
            self.block_break(&elem.tag, out);
            return;
        }

        let is_pre = elem.is("pre");
        if is_pre {
            self.preformatted += 1;
        }

        let raw_text = is_raw_text_element(&elem.tag);
        for child in &elem.children {
            match child {
                Node::Element(child) => self.element(child, out),
                Node::Text(text) if text.raw || raw_text => out.push_str(&text.content),
                Node::Text(text) => out.push_str(&escape(&text.content)),
            }
        }

        if is_pre {
            self.preformatted -= 1;
        }

        out.push_str("</");
        out.push_str(&elem.tag);
        out.push('>');
        self.block_break(&elem.tag, out);
    }

    fn block_break(&self, tag: &str, out: &mut String) {
        if !self.config.minify && self.preformatted == 0 && is_block_element(tag) {
            out.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vdom::{Attrs, Text};

    fn minified(elem: &Element) -> String {
        render_element(elem, &RenderConfig::new(true))
    }

    #[test]
    fn test_escapes_text_and_attributes() {
        let elem = Element::new("a", Attrs::from([("title", "say \"hi\" & <go>")]))
            .with_child(Text::new("1 < 2 & 3"));
        assert_eq!(
            minified(&elem),
            "<a title=\"say &quot;hi&quot; &amp; &lt;go&gt;\">1 &lt; 2 &amp; 3</a>"
        );
    }

    #[test]
    fn test_raw_text_not_escaped() {
        let elem = Element::bare("div").with_child(Text::raw("<svg></svg>"));
        assert_eq!(minified(&elem), "<div><svg></svg></div>");

        let script = Element::bare("script").with_child(Text::new("a < b"));
        assert_eq!(minified(&script), "<script>a < b</script>");
    }

    #[test]
    fn test_void_element() {
        let elem = Element::bare("p")
            .with_child(Text::new("a"))
            .with_child(Element::bare("br"))
            .with_child(Text::new("b"));
        assert_eq!(minified(&elem), "<p>a<br>b</p>");
    }

    #[test]
    fn test_block_newlines_skip_pre_content() {
        let pre = Element::bare("pre").with_child(
            Element::bare("code").with_child(Element::bare("div").with_child(Text::new("x"))),
        );
        let root = Element::bare("article").with_child(pre);
        let html = render_element(&root, &RenderConfig::default());
        assert_eq!(
            html,
            "<article><pre><code><div>x</div></code></pre>\n</article>\n"
        );
    }
}
