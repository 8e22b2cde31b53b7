//! `[site]` configuration.
//!
//! Site identity, the navigation menu, social links and products.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Site metadata and navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSectionConfig {
    pub title: String,
    pub description: String,
    /// Canonical site URL (e.g., "https://example.com").
    pub url: String,
    pub og_image: OgImage,
    pub menu: MenuConfig,
    pub social: Vec<SocialLink>,
    pub products: Vec<Product>,
}

impl Default for SiteSectionConfig {
    fn default() -> Self {
        Self {
            title: "E9's Space".into(),
            description: "A internet space for @ec50n9.".into(),
            url: "https://sanju.sh".into(),
            og_image: OgImage::default(),
            menu: MenuConfig::default(),
            social: vec![
                SocialLink::new("email", "mailto:shelloworld@qq.com"),
                SocialLink::new("github", "https://github.com/ec50n9"),
                SocialLink::new("linkedin", "https://www.linkedin.com/in/ec50n9"),
            ],
            products: Vec::new(),
        }
    }
}

/// `[site.og_image]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OgImage {
    pub src: String,
    pub alt: String,
}

impl Default for OgImage {
    fn default() -> Self {
        Self {
            src: "/images/ogimage.png".into(),
            alt: "Ec50n9's Space".into(),
        }
    }
}

/// `[site.menu]`
///
/// Every entry carries the same number of label variants; `variant` picks
/// one column for the whole menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    pub variant: usize,
    pub items: Vec<MenuEntry>,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            variant: 1,
            items: vec![
                MenuEntry::new("/", ["此间", "栖心", "归处", "一", "一方"]),
                MenuEntry::new("/writings", ["松叶", "青简", "耕笔", "迹", "墨痕"]),
                MenuEntry::new("/thoughts", ["想法", "灵羽", "星屑", "光", "思绪"]),
                MenuEntry::new("/ships", ["项目", "心匠", "栽种", "造物", "心舟"]),
                MenuEntry::new("/abouts", ["关于", "我执", "见我", "己", "自我"]),
            ],
        }
    }
}

/// `[[site.menu.items]]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuEntry {
    pub url: String,
    pub labels: Vec<String>,
}

impl MenuEntry {
    pub fn new<const N: usize>(url: &str, labels: [&str; N]) -> Self {
        Self {
            url: url.into(),
            labels: labels.into_iter().map(String::from).collect(),
        }
    }
}

/// `[[site.social]]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLink {
    pub label: String,
    pub url: String,
}

impl SocialLink {
    pub fn new(label: &str, url: &str) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }
}

/// `[[site.products]]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl SiteSectionConfig {
    pub const TITLE: FieldPath = FieldPath::new("site.title");
    pub const URL: FieldPath = FieldPath::new("site.url");
    pub const MENU_VARIANT: FieldPath = FieldPath::new("site.menu.variant");
    pub const MENU_ITEMS: FieldPath = FieldPath::new("site.menu.items");
    pub const SOCIAL: FieldPath = FieldPath::new("site.social");
    pub const PRODUCTS: FieldPath = FieldPath::new("site.products");

    /// Validate site configuration.
    ///
    /// # Checks
    /// - `url` is an http(s) URL with a host
    /// - every menu entry has a label at `menu.variant` and a rooted url
    /// - social and product links parse as URLs
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.title.trim().is_empty() {
            diag.warn(Self::TITLE, "site title is empty");
        }

        self.validate_url(diag);
        self.validate_menu(diag);

        for link in &self.social {
            if let Err(e) = url::Url::parse(&link.url) {
                diag.error(
                    Self::SOCIAL,
                    format!("`{}` has an invalid url `{}`: {e}", link.label, link.url),
                );
            }
        }

        for product in &self.products {
            if let Err(e) = url::Url::parse(&product.url) {
                diag.error(
                    Self::PRODUCTS,
                    format!("`{}` has an invalid url `{}`: {e}", product.name, product.url),
                );
            }
        }
    }

    fn validate_url(&self, diag: &mut ConfigDiagnostics) {
        const HINT: &str = "use format like https://example.com";

        match url::Url::parse(&self.url) {
            Ok(parsed) => {
                if !matches!(parsed.scheme(), "http" | "https") {
                    diag.error_with_hint(
                        Self::URL,
                        format!(
                            "scheme '{}' not supported, must be http or https",
                            parsed.scheme()
                        ),
                        HINT,
                    );
                }
                if parsed.host_str().is_none() {
                    diag.error_with_hint(Self::URL, "URL must have a valid host", HINT);
                }
            }
            Err(e) => diag.error_with_hint(Self::URL, format!("invalid URL: {e}"), HINT),
        }
    }

    fn validate_menu(&self, diag: &mut ConfigDiagnostics) {
        let variant = self.menu.variant;

        for entry in &self.menu.items {
            if !entry.url.starts_with('/') {
                diag.error_with_hint(
                    Self::MENU_ITEMS,
                    format!("menu url `{}` is not site-relative", entry.url),
                    format!("write it as `/{}`", entry.url.trim_start_matches('/')),
                );
            }
            if variant >= entry.labels.len() {
                diag.error_with_hint(
                    Self::MENU_VARIANT,
                    format!(
                        "variant {variant} is out of range for `{}` ({} labels)",
                        entry.url,
                        entry.labels.len()
                    ),
                    "variants are counted from 0",
                );
            }
        }
    }
}
