//! Markdown to document tree conversion using pulldown-cmark.

use pulldown_cmark::{Alignment, CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use serde::{Deserialize, Serialize};

use crate::pipeline::transform::LANGUAGE_ATTR;
use crate::utils::html::unescape;
use crate::vdom::{Attrs, Document, Element, Node, Text};

/// Options for markdown conversion (`[markdown]` section).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownOptions {
    /// Enable tables extension
    pub tables: bool,
    /// Enable footnotes extension
    pub footnotes: bool,
    /// Enable strikethrough extension
    pub strikethrough: bool,
    /// Enable task lists extension
    pub task_lists: bool,
    /// Enable heading attributes extension (e.g., `# Heading {#custom-id}`)
    pub heading_attributes: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self::all()
    }
}

impl MarkdownOptions {
    /// Create options with all extensions enabled
    pub const fn all() -> Self {
        Self {
            tables: true,
            footnotes: true,
            strikethrough: true,
            task_lists: true,
            heading_attributes: true,
        }
    }

    /// CommonMark only
    #[cfg(test)]
    pub const fn none() -> Self {
        Self {
            tables: false,
            footnotes: false,
            strikethrough: false,
            task_lists: false,
            heading_attributes: false,
        }
    }

    fn to_pulldown_options(&self) -> Options {
        let mut opts = Options::empty();
        opts.set(Options::ENABLE_TABLES, self.tables);
        opts.set(Options::ENABLE_FOOTNOTES, self.footnotes);
        opts.set(Options::ENABLE_STRIKETHROUGH, self.strikethrough);
        opts.set(Options::ENABLE_TASKLISTS, self.task_lists);
        opts.set(Options::ENABLE_HEADING_ATTRIBUTES, self.heading_attributes);
        opts
    }
}

/// Placeholder tag for frames whose content is dropped (metadata blocks).
const DISCARD: &str = "__discard";

/// Column alignment bookkeeping while inside a table.
#[derive(Default)]
struct TableState {
    alignments: Vec<Alignment>,
    column: usize,
    in_head: bool,
}

/// Markdown to tree converter
struct MarkdownConverter {
    /// Open elements, innermost last
    stack: Vec<Element>,
    /// Children of the root, collected when the stack is empty
    root_children: Vec<Node>,
    /// HTML block being accumulated line by line
    html_block: Option<String>,
    table: TableState,
}

impl MarkdownConverter {
    fn new() -> Self {
        Self {
            stack: Vec::new(),
            root_children: Vec::new(),
            html_block: None,
            table: TableState::default(),
        }
    }

    fn convert(mut self, markdown: &str, options: &MarkdownOptions) -> Document {
        for event in Parser::new_ext(markdown, options.to_pulldown_options()) {
            self.handle_event(event);
        }

        // Unbalanced input leaves frames open; close them in order.
        while let Some(elem) = self.stack.pop() {
            self.add_node(Node::from(elem));
        }

        let mut root = Element::bare("article");
        root.children.extend(self.root_children);
        Document::new(root)
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.add_text(&text),
            Event::Code(code) => self.add_inline_code(&code),
            Event::Html(html) => {
                if let Some(buf) = self.html_block.as_mut() {
                    buf.push_str(&html);
                } else {
                    self.add_html_fragment(&html);
                }
            }
            // Inline HTML often opens and closes tags in separate events,
            // so it stays pre-rendered instead of being parsed.
            Event::InlineHtml(html) => self.add_node(Node::Text(Text::raw(html.to_string()))),
            Event::SoftBreak => self.add_text("\n"),
            Event::HardBreak => self.add_node(Node::from(Element::bare("br"))),
            Event::Rule => self.add_node(Node::from(Element::bare("hr"))),
            Event::FootnoteReference(name) => self.add_footnote_ref(&name),
            Event::TaskListMarker(checked) => self.add_task_marker(checked),
            Event::InlineMath(math) => self.add_math(&math, false),
            Event::DisplayMath(math) => self.add_math(&math, true),
        }
    }

    fn start_tag(&mut self, tag: Tag) {
        match tag {
            Tag::CodeBlock(kind) => {
                let lang = match &kind {
                    CodeBlockKind::Fenced(info) => fence_language(info),
                    CodeBlockKind::Indented => "",
                };
                if lang.is_empty() {
                    self.stack.push(Element::bare("pre"));
                    self.stack.push(Element::bare("code"));
                } else {
                    let class = format!("language-{lang}");
                    self.stack
                        .push(Element::new("pre", Attrs::from([(LANGUAGE_ATTR, lang)])));
                    self.stack
                        .push(Element::new("code", Attrs::from([("class", class.as_str())])));
                }
            }
            Tag::HtmlBlock => self.html_block = Some(String::new()),
            Tag::Table(alignments) => {
                self.table = TableState {
                    alignments,
                    ..TableState::default()
                };
                self.stack.push(Element::bare("table"));
            }
            Tag::TableHead => {
                self.table.in_head = true;
                self.table.column = 0;
                self.stack.push(Element::bare("thead"));
                self.stack.push(Element::bare("tr"));
            }
            Tag::TableRow => {
                self.table.column = 0;
                self.stack.push(Element::bare("tr"));
            }
            Tag::TableCell => {
                let tag = if self.table.in_head { "th" } else { "td" };
                let mut cell = Element::bare(tag);
                if let Some(align) = self
                    .table
                    .alignments
                    .get(self.table.column)
                    .and_then(|a| alignment_style(*a))
                {
                    cell.attrs.set("style", align);
                }
                self.table.column += 1;
                self.stack.push(cell);
            }
            other => {
                let (tag_name, attrs) = tag_to_element(&other);
                let attrs = attrs.into_iter().collect::<Attrs>();
                self.stack.push(Element::new(tag_name, attrs));
            }
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::CodeBlock => {
                self.close_frame(); // code
                self.close_frame(); // pre
            }
            TagEnd::HtmlBlock => {
                if let Some(html) = self.html_block.take() {
                    self.add_html_fragment(&html);
                }
            }
            TagEnd::TableHead => {
                self.table.in_head = false;
                self.close_frame(); // tr
                self.close_frame(); // thead
            }
            TagEnd::Image => {
                // Alt text arrives as children; move it into the attribute.
                if let Some(mut img) = self.stack.pop() {
                    let alt = img.text_content();
                    img.children.clear();
                    img.attrs.set("alt", &alt);
                    self.add_node(Node::from(img));
                }
            }
            _ => self.close_frame(),
        }
    }

    /// Pop the innermost frame into its parent.
    fn close_frame(&mut self) {
        if let Some(elem) = self.stack.pop()
            && !elem.is(DISCARD)
        {
            self.add_node(Node::from(elem));
        }
    }

    fn add_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.add_node(Node::Text(Text::new(text)));
    }

    fn add_inline_code(&mut self, code: &str) {
        self.add_node(Node::from(Element::bare("code").with_child(Text::new(code))));
    }

    /// Parse an HTML fragment with `tl` and add the resulting nodes.
    fn add_html_fragment(&mut self, html: &str) {
        let Ok(dom) = tl::parse(html, tl::ParserOptions::default()) else {
            // Keep unparseable markup verbatim
            self.add_node(Node::Text(Text::raw(html)));
            return;
        };

        let parser = dom.parser();
        for handle in dom.children() {
            if let Some(node) = tl_node_to_vdom(*handle, parser, false) {
                self.add_node(node);
            }
        }
    }

    fn add_footnote_ref(&mut self, name: &str) {
        let href = format!("#fn-{name}");
        let id = format!("fnref-{name}");
        let link = Element::new("a", Attrs::from([("href", href.as_str()), ("id", id.as_str())]))
            .with_child(Text::new(format!("[{name}]")));
        let sup = Element::new("sup", Attrs::from([("class", "footnote-ref")])).with_child(link);
        self.add_node(Node::from(sup));
    }

    fn add_task_marker(&mut self, checked: bool) {
        let mut attrs = Attrs::from([("type", "checkbox"), ("disabled", "")]);
        if checked {
            attrs.set("checked", "");
        }
        self.add_node(Node::from(Element::new("input", attrs)));
    }

    fn add_math(&mut self, formula: &str, display: bool) {
        let (tag, class) = if display {
            ("div", "math math-display")
        } else {
            ("span", "math math-inline")
        };
        let elem = Element::new(tag, Attrs::from([("class", class)])).with_child(Text::new(formula));
        self.add_node(Node::from(elem));
    }

    /// Add a node to the innermost open element, or the root.
    fn add_node(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(parent) => parent.push(node),
            None => self.root_children.push(node),
        }
    }
}

/// Convert a tl node handle to a tree node.
fn tl_node_to_vdom(handle: tl::NodeHandle, parser: &tl::Parser, in_pre: bool) -> Option<Node> {
    match handle.get(parser)? {
        tl::Node::Tag(tag) => {
            let tag_name = tag.name().as_utf8_str().to_lowercase();

            let mut attrs = Attrs::new();
            for (key, value) in tag.attributes().iter() {
                let value = value.map(|v| unescape(&v).into_owned()).unwrap_or_default();
                attrs.set(&key, &value);
            }

            let in_pre = in_pre || tag_name == "pre";
            let mut elem = Element::new(tag_name, attrs);
            for child in tag.children().top().iter() {
                if let Some(node) = tl_node_to_vdom(*child, parser, in_pre) {
                    elem.push(node);
                }
            }
            Some(Node::from(elem))
        }
        tl::Node::Raw(bytes) => {
            let text = bytes.as_utf8_str();
            // Formatting whitespace between tags, except where it is content
            if !in_pre && text.trim().is_empty() {
                return None;
            }
            Some(Node::Text(Text::new(unescape(&text).into_owned())))
        }
        tl::Node::Comment(_) => None,
    }
}

/// Language token of a fence info string: "rust,ignore" / "py {1,3}" -> "rust" / "py".
fn fence_language(info: &str) -> &str {
    info.trim()
        .split(|c: char| c.is_whitespace() || c == ',' || c == '{')
        .next()
        .unwrap_or_default()
}

fn alignment_style(align: Alignment) -> Option<&'static str> {
    match align {
        Alignment::None => None,
        Alignment::Left => Some("text-align: left"),
        Alignment::Center => Some("text-align: center"),
        Alignment::Right => Some("text-align: right"),
    }
}

/// Convert pulldown-cmark Tag to (tag_name, attributes)
fn tag_to_element(tag: &Tag) -> (&'static str, Vec<(String, String)>) {
    match tag {
        Tag::Paragraph => ("p", vec![]),
        Tag::Heading {
            level, id, classes, ..
        } => {
            let mut attrs = Vec::new();
            if let Some(id) = id {
                attrs.push(("id".to_string(), id.to_string()));
            }
            if !classes.is_empty() {
                let class = classes.iter().map(|c| c.to_string()).collect::<Vec<_>>();
                attrs.push(("class".to_string(), class.join(" ")));
            }
            (heading_level_to_tag(*level), attrs)
        }
        Tag::BlockQuote(_) => ("blockquote", vec![]),
        Tag::List(Some(start)) if *start != 1 => {
            ("ol", vec![("start".to_string(), start.to_string())])
        }
        Tag::List(Some(_)) => ("ol", vec![]),
        Tag::List(None) => ("ul", vec![]),
        Tag::Item => ("li", vec![]),
        Tag::FootnoteDefinition(name) => (
            "div",
            vec![
                ("class".to_string(), "footnote".to_string()),
                ("id".to_string(), format!("fn-{name}")),
            ],
        ),

        Tag::Emphasis => ("em", vec![]),
        Tag::Strong => ("strong", vec![]),
        Tag::Strikethrough => ("del", vec![]),
        Tag::Superscript => ("sup", vec![]),
        Tag::Subscript => ("sub", vec![]),
        Tag::Link {
            dest_url, title, ..
        } => {
            let mut attrs = vec![("href".to_string(), dest_url.to_string())];
            if !title.is_empty() {
                attrs.push(("title".to_string(), title.to_string()));
            }
            ("a", attrs)
        }
        Tag::Image {
            dest_url, title, ..
        } => {
            let mut attrs = vec![("src".to_string(), dest_url.to_string())];
            if !title.is_empty() {
                attrs.push(("title".to_string(), title.to_string()));
            }
            ("img", attrs)
        }

        Tag::DefinitionList => ("dl", vec![]),
        Tag::DefinitionListTitle => ("dt", vec![]),
        Tag::DefinitionListDefinition => ("dd", vec![]),

        // Frontmatter is stripped before conversion
        Tag::MetadataBlock(_) => (DISCARD, vec![]),

        // Handled in `start_tag`
        Tag::CodeBlock(_)
        | Tag::HtmlBlock
        | Tag::Table(_)
        | Tag::TableHead
        | Tag::TableRow
        | Tag::TableCell => (DISCARD, vec![]),
    }
}

fn heading_level_to_tag(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}

/// Convert markdown to a document rooted at `<article>`.
pub fn from_markdown(markdown: &str, options: &MarkdownOptions) -> Document {
    MarkdownConverter::new().convert(markdown, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vdom::{RenderConfig, render_document};

    fn convert(md: &str) -> Document {
        from_markdown(md, &MarkdownOptions::all())
    }

    fn first(doc: &Document) -> &Element {
        doc.root.children[0].as_element().expect("element")
    }

    fn html(md: &str) -> String {
        render_document(&convert(md), &RenderConfig::new(true))
    }

    #[test]
    fn test_basic_paragraph() {
        let doc = convert("Hello world");
        assert_eq!(doc.root.tag, "article");
        assert_eq!(doc.root.children.len(), 1);
        assert_eq!(first(&doc).tag, "p");
    }

    #[test]
    fn test_heading_with_id() {
        let doc = convert("# Title {#intro}");
        let h1 = first(&doc);
        assert_eq!(h1.tag, "h1");
        assert_eq!(h1.attr("id"), Some("intro"));
        assert_eq!(h1.text_content(), "Title");
    }

    #[test]
    fn test_link() {
        assert_eq!(
            html("[Link](https://example.com \"t\")"),
            "<article><p><a href=\"https://example.com\" title=\"t\">Link</a></p></article>"
        );
    }

    #[test]
    fn test_fenced_code_block() {
        let doc = convert("```rust\nfn main() {}\n```\n");
        let pre = first(&doc);
        assert_eq!(pre.tag, "pre");
        assert_eq!(pre.attr(LANGUAGE_ATTR), Some("rust"));

        let code = pre.children[0].as_element().unwrap();
        assert_eq!(code.tag, "code");
        assert_eq!(code.attr("class"), Some("language-rust"));
        assert_eq!(code.text_content(), "fn main() {}\n");
    }

    #[test]
    fn test_fence_info_extra_tokens() {
        assert_eq!(fence_language("rust,ignore"), "rust");
        assert_eq!(fence_language("py {1,3}"), "py");
        assert_eq!(fence_language(" shell_script title=x"), "shell_script");
        assert_eq!(fence_language(""), "");
    }

    #[test]
    fn test_unlabelled_and_indented_code() {
        let doc = convert("```\nplain\n```\n\n    indented\n");
        for node in &doc.root.children {
            let pre = node.as_element().unwrap();
            assert_eq!(pre.tag, "pre");
            assert!(pre.attrs.is_empty());
            assert!(pre.children[0].is_element("code"));
        }
        assert_eq!(doc.root.children.len(), 2);
    }

    #[test]
    fn test_code_text_is_escaped_on_render() {
        assert_eq!(
            html("```html\n<b>\n```"),
            "<article><pre data-language=\"html\"><code class=\"language-html\">&lt;b&gt;\n</code></pre></article>"
        );
    }

    #[test]
    fn test_nested_list() {
        let doc = convert("- Item 1\n  - Nested\n- Item 2");
        let ul = first(&doc);
        assert_eq!(ul.tag, "ul");
        assert_eq!(ul.children.len(), 2);
    }

    #[test]
    fn test_ordered_list_start() {
        let doc = convert("3. three\n4. four");
        assert_eq!(first(&doc).attr("start"), Some("3"));
    }

    #[test]
    fn test_image_alt() {
        assert_eq!(
            html("![a *cat*](cat.png)"),
            "<article><p><img src=\"cat.png\" alt=\"a cat\"></p></article>"
        );
    }

    #[test]
    fn test_table_head_and_alignment() {
        let doc = convert("| a | b |\n|:--|--:|\n| 1 | 2 |\n");
        let table = first(&doc);
        assert_eq!(table.tag, "table");

        let thead = table.children[0].as_element().unwrap();
        assert_eq!(thead.tag, "thead");
        let head_row = thead.children[0].as_element().unwrap();
        let th: Vec<_> = head_row.child_elements().collect();
        assert_eq!(th[0].tag, "th");
        assert_eq!(th[0].attr("style"), Some("text-align: left"));
        assert_eq!(th[1].attr("style"), Some("text-align: right"));

        let body_row = table.children[1].as_element().unwrap();
        let td: Vec<_> = body_row.child_elements().collect();
        assert_eq!(td[0].tag, "td");
        assert_eq!(td[1].text_content(), "2");
    }

    #[test]
    fn test_html_block_is_parsed() {
        let doc = convert("<div class=\"note\">\n<pre><code>x &amp; y</code></pre>\n</div>\n");
        let div = first(&doc);
        assert_eq!(div.tag, "div");
        assert_eq!(div.attr("class"), Some("note"));

        let pre = div.child_elements().next().unwrap();
        assert_eq!(pre.tag, "pre");
        assert_eq!(pre.text_content(), "x & y");
    }

    #[test]
    fn test_inline_html_is_raw() {
        assert_eq!(
            html("press <kbd>Ctrl</kbd>"),
            "<article><p>press <kbd>Ctrl</kbd></p></article>"
        );
    }

    #[test]
    fn test_task_list() {
        let doc = convert("- [x] done");
        let li = first(&doc).children[0].as_element().unwrap();
        let input = li.children[0].as_element().unwrap();
        assert_eq!(input.tag, "input");
        assert!(input.attrs.contains("checked"));
    }

    #[test]
    fn test_extensions_off() {
        let doc = from_markdown("~~x~~", &MarkdownOptions::none());
        let p = first(&doc);
        assert!(p.child_elements().next().is_none());
    }
}
