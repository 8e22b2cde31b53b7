//! Document processing pipeline.
//!
//! Threads a [`Document`] through a chain of transforms before it is
//! serialized. The pipeline is format-agnostic: markdown conversion happens
//! before it, HTML rendering after it.
//!
//! ```text
//! markdown ──> Document ──> CodeWrapper ──> ... ──> render ──> HTML
//! ```

pub mod transform;

use crate::vdom::Document;

pub use transform::{CodeWrapper, CodeWrapperConfig, LanguageLabels};

/// A pass over a document.
///
/// Transforms take ownership and hand the document back, so a pass may
/// rewrite it in place or rebuild it.
pub trait Transform {
    fn transform(self, doc: Document) -> Document;
}

/// Chains transforms over a document.
///
/// ```ignore
/// let doc = Pipeline::new(doc)
///     .pipe(CodeWrapper::new(&config.markdown.code))
///     .into_inner();
/// ```
pub struct Pipeline {
    doc: Document,
}

impl Pipeline {
    pub fn new(doc: Document) -> Self {
        Self { doc }
    }

    /// Run a transform.
    pub fn pipe<T: Transform>(self, transform: T) -> Self {
        Self {
            doc: transform.transform(self.doc),
        }
    }

    /// Observe the document between passes.
    pub fn inspect(self, f: impl FnOnce(&Document)) -> Self {
        f(&self.doc);
        self
    }

    pub fn into_inner(self) -> Document {
        self.doc
    }
}
