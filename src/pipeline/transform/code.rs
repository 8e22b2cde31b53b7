//! Code block wrapper.
//!
//! Rewrites every `<pre><code>` block into a widget with a copy button and a
//! language label:
//!
//! ```text
//! <pre data-language="rust"><code>…</code></pre>
//!
//!   becomes
//!
//! <div class="language-rust bg-gray-100">
//!   <button title="Copy code" class="text-gray-500"></button>
//!   <span class="lang">rust</span>
//!   <pre data-language="rust"><code>…</code></pre>
//! </div>
//! ```
//!
//! The original `pre` is moved into the wrapper untouched.

use std::borrow::Cow;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::pipeline::Transform;
use crate::vdom::{Attrs, Document, Element, Flow, Node, Text, visit_slots_mut};

/// Attribute on `pre` carrying the source language.
pub const LANGUAGE_ATTR: &str = "data-language";

/// Language used when a block has none.
pub const PLAINTEXT: &str = "plaintext";

/// Class of the label span. Also used to recognize existing wrappers.
const LABEL_CLASS: &str = "lang";

// =============================================================================
// Configuration
// =============================================================================

/// `[markdown.code]` options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeWrapperConfig {
    /// Tooltip of the copy button.
    pub copy_button_title: String,

    /// Display labels keyed by language identifier (case-insensitive).
    pub language_label: LanguageLabels,

    /// Extra classes after the `language-<lang>` token of the wrapper.
    pub wrapper_class: String,

    /// Classes of the copy button.
    pub button_class: String,
}

impl Default for CodeWrapperConfig {
    fn default() -> Self {
        Self {
            copy_button_title: "Copy code".into(),
            language_label: LanguageLabels::default(),
            wrapper_class: "bg-gray-100".into(),
            button_class: "text-gray-500".into(),
        }
    }
}

/// Case-insensitive language label table.
///
/// Keys are lowercased once on construction, so lookups only lowercase the
/// query. When keys differ only in case the last one wins, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "toml::Table", into = "FxHashMap<String, String>")]
pub struct LanguageLabels {
    labels: FxHashMap<String, String>,
    /// Lowercased keys that were given more than once.
    shadowed: Vec<String>,
}

impl LanguageLabels {
    /// Display label for `lang`.
    ///
    /// Falls back to `lang` with underscores turned into spaces, keeping the
    /// original casing. Empty table values count as missing.
    pub fn resolve<'a>(&'a self, lang: &'a str) -> Cow<'a, str> {
        match self.labels.get(&lang.to_lowercase()) {
            Some(label) if !label.is_empty() => Cow::Borrowed(label),
            _ if lang.contains('_') => Cow::Owned(lang.replace('_', " ")),
            _ => Cow::Borrowed(lang),
        }
    }

    /// Lowercased language keys.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.labels.keys().map(String::as_str)
    }

    /// Keys that collided with another key differing only in case.
    pub fn shadowed(&self) -> &[String] {
        &self.shadowed
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl TryFrom<toml::Table> for LanguageLabels {
    type Error = String;

    fn try_from(table: toml::Table) -> Result<Self, Self::Error> {
        table
            .into_iter()
            .map(|(lang, value)| match value {
                toml::Value::String(label) => Ok((lang, label)),
                other => Err(format!(
                    "label of `{lang}` must be a string, found {}",
                    other.type_str()
                )),
            })
            .collect()
    }
}

impl From<LanguageLabels> for FxHashMap<String, String> {
    fn from(labels: LanguageLabels) -> Self {
        labels.labels
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for LanguageLabels {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::default();
        for (lang, label) in iter {
            let key = lang.as_ref().to_lowercase();
            if table.labels.insert(key.clone(), label.into()).is_some()
                && !table.shadowed.contains(&key)
            {
                table.shadowed.push(key);
            }
        }
        table
    }
}

// =============================================================================
// Transform
// =============================================================================

/// Wraps code blocks (Document -> Document).
pub struct CodeWrapper<'a> {
    config: &'a CodeWrapperConfig,
}

impl<'a> CodeWrapper<'a> {
    pub fn new(config: &'a CodeWrapperConfig) -> Self {
        Self { config }
    }
}

impl Transform for CodeWrapper<'_> {
    fn transform(self, mut doc: Document) -> Document {
        wrap_code_blocks(&mut doc.root, self.config);
        doc
    }
}

/// Wrap every `pre > code` block below `root`, in place.
///
/// The root itself is never replaced. Wrapped blocks are not descended
/// into, and wrappers from an earlier pass are left alone.
pub fn wrap_code_blocks(root: &mut Element, config: &CodeWrapperConfig) {
    visit_slots_mut(root, |slot, _| {
        let Some(elem) = slot.as_element() else {
            return Flow::Continue;
        };
        if is_wrapper(elem) {
            return Flow::Skip;
        }
        if !is_code_block(elem) {
            return Flow::Continue;
        }

        let pre = std::mem::replace(slot, Node::Text(Text::new(String::new())));
        *slot = Node::from(build_wrapper(pre, config));
        Flow::Skip
    });
}

/// `pre` whose first child is a `code` element.
fn is_code_block(elem: &Element) -> bool {
    elem.is("pre") && elem.first_child().is_some_and(|c| c.is_element("code"))
}

/// Output of [`build_wrapper`]: `div.language-<lang> > [button[title],
/// span.lang, pre > code]`, where `<lang>` is the `pre`'s language.
fn is_wrapper(elem: &Element) -> bool {
    let [button, label, pre] = elem.children.as_slice() else {
        return false;
    };
    let Some(pre) = pre.as_element().filter(|pre| is_code_block(pre)) else {
        return false;
    };
    let class = format!("language-{}", block_language(pre));

    elem.is("div")
        && elem
            .attr("class")
            .and_then(|c| c.split_ascii_whitespace().next())
            == Some(class.as_str())
        && button
            .as_element()
            .is_some_and(|b| b.is("button") && b.attr("title").is_some())
        && label
            .as_element()
            .is_some_and(|l| l.is("span") && l.attr("class") == Some(LABEL_CLASS))
}

/// Source language of a code block, `plaintext` when absent or empty.
fn block_language(pre: &Element) -> &str {
    pre.attr(LANGUAGE_ATTR)
        .filter(|lang| !lang.is_empty())
        .unwrap_or(PLAINTEXT)
}

fn build_wrapper(pre: Node, config: &CodeWrapperConfig) -> Element {
    let (class, label) = {
        let lang = pre.as_element().map_or(PLAINTEXT, block_language);
        let class = if config.wrapper_class.is_empty() {
            format!("language-{lang}")
        } else {
            format!("language-{lang} {}", config.wrapper_class)
        };
        (class, config.language_label.resolve(lang).into_owned())
    };

    let mut button_attrs = Attrs::from([("title", config.copy_button_title.as_str())]);
    if !config.button_class.is_empty() {
        button_attrs.set("class", &config.button_class);
    }

    let label_span =
        Element::new("span", Attrs::from([("class", LABEL_CLASS)])).with_child(Text::new(label));

    Element::new("div", Attrs::from([("class", class.as_str())]))
        .with_child(Element::new("button", button_attrs))
        .with_child(label_span)
        .with_child(pre)
}
