//! Owned document tree for rendered pages.
//!
//! A page fragment is an [`Element`] root whose children are [`Node`]s.
//! Every node is owned by exactly one parent, so transforms rewrite the tree
//! by replacing child slots in place.
//!
//! ```text
//! Document
//! └── Element "article"
//!     ├── Element "p"  ── Text "hello"
//!     └── Element "pre" ── Element "code" ── Text "fn main() {}"
//! ```

mod attrs;
pub mod render;
pub mod walk;

pub use attrs::Attrs;
pub use render::{RenderConfig, render_document, render_element};
pub use walk::{Flow, Visit, Walk, visit_slots_mut};

use smallvec::SmallVec;

/// Child list of an element. Most elements have only a few children.
pub type Children = SmallVec<[Node; 4]>;

// =============================================================================
// Node
// =============================================================================

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Box<Element>),
    Text(Text),
}

impl Node {
    /// Borrow the element if this node is one.
    #[inline]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(elem) => Some(elem),
            Self::Text(_) => None,
        }
    }

    /// True if this node is an element with the given tag.
    #[inline]
    pub fn is_element(&self, tag: &str) -> bool {
        self.as_element().is_some_and(|e| e.is(tag))
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        match self {
            Self::Element(elem) => elem.text_content(),
            Self::Text(text) => text.content.clone(),
        }
    }
}

impl From<Element> for Node {
    fn from(elem: Element) -> Self {
        Self::Element(Box::new(elem))
    }
}

impl From<Text> for Node {
    fn from(text: Text) -> Self {
        Self::Text(text)
    }
}

// =============================================================================
// Element
// =============================================================================

/// A tagged node with attributes and owned children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercase tag name.
    pub tag: String,
    pub attrs: Attrs,
    pub children: Children,
}

impl Element {
    pub fn new(tag: impl Into<String>, attrs: Attrs) -> Self {
        Self {
            tag: tag.into(),
            attrs,
            children: Children::new(),
        }
    }

    /// Element with no attributes.
    pub fn bare(tag: impl Into<String>) -> Self {
        Self::new(tag, Attrs::new())
    }

    /// Builder-style child append.
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    #[inline]
    pub fn is(&self, tag: &str) -> bool {
        self.tag == tag
    }

    #[inline]
    pub fn push(&mut self, node: Node) {
        self.children.push(node);
    }

    #[inline]
    pub fn first_child(&self) -> Option<&Node> {
        self.children.first()
    }

    /// Look up an attribute value.
    #[inline]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name)
    }

    /// Iterate over element children, skipping text.
    #[cfg(test)]
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Concatenated text of all descendant text nodes, in document order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for visit in Walk::new(self) {
            if let Node::Text(text) = visit.node {
                out.push_str(&text.content);
            }
        }
        out
    }
}

// =============================================================================
// Text
// =============================================================================

/// A literal text leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    pub content: String,
    /// Pre-rendered HTML, emitted without escaping.
    pub raw: bool,
}

impl Text {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            raw: false,
        }
    }

    pub fn raw(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            raw: true,
        }
    }
}

// =============================================================================
// Document
// =============================================================================

/// A rendered page fragment owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub root: Element,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    /// Iterate over every node in document order.
    pub fn walk(&self) -> Walk<'_> {
        Walk::new(&self.root)
    }
}
