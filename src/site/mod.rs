//! Site data shared by every page: identity, menu, social links, products.

use serde::Serialize;

use crate::config::{MenuConfig, OgImage, Product, SiteConfig, SocialLink};

/// A resolved menu link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub label: String,
    pub url: String,
}

/// Everything the page templates read about the site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub url: String,
    pub og_image: OgImage,
    pub menu: Vec<MenuItem>,
    pub social: Vec<SocialLink>,
    pub products: Vec<Product>,
}

impl SiteData {
    pub fn from_config(config: &SiteConfig) -> Self {
        let site = &config.site;
        Self {
            title: site.title.clone(),
            description: site.description.clone(),
            url: site.url.clone(),
            og_image: site.og_image.clone(),
            menu: menu_items(&site.menu),
            social: site.social.clone(),
            products: site.products.clone(),
        }
    }
}

/// Pick label `menu.variant` of every entry.
///
/// Entries without that variant are left out; config validation reports
/// them before this runs.
pub fn menu_items(menu: &MenuConfig) -> Vec<MenuItem> {
    menu.items
        .iter()
        .filter_map(|entry| {
            entry.labels.get(menu.variant).map(|label| MenuItem {
                label: label.clone(),
                url: entry.url.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MenuEntry;

    #[test]
    fn test_default_menu_uses_second_variant() {
        let items = menu_items(&MenuConfig::default());
        let labels: Vec<_> = items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, ["栖心", "青简", "灵羽", "心匠", "我执"]);
        assert_eq!(items[4].url, "/abouts");
    }

    #[test]
    fn test_variant_selection() {
        let menu = MenuConfig {
            variant: 4,
            ..Default::default()
        };
        let items = menu_items(&menu);
        assert_eq!(items[0].label, "一方");
        assert_eq!(items[3].label, "心舟");
    }

    #[test]
    fn test_short_entries_are_skipped() {
        let menu = MenuConfig {
            variant: 2,
            items: vec![
                MenuEntry::new("/", ["a", "b", "c"]),
                MenuEntry::new("/x", ["only"]),
            ],
        };
        assert_eq!(
            menu_items(&menu),
            vec![MenuItem {
                label: "c".into(),
                url: "/".into()
            }]
        );
    }

    #[test]
    fn test_site_data_json() {
        let data = SiteData::from_config(&SiteConfig::default());
        let json = serde_json::to_value(&data).unwrap();

        assert_eq!(json["title"], "E9's Space");
        assert_eq!(json["og_image"]["src"], "/images/ogimage.png");
        assert_eq!(json["menu"][0]["label"], "栖心");
        assert_eq!(json["social"][1]["url"], "https://github.com/ec50n9");
        assert_eq!(json["products"], serde_json::json!([]));
    }
}
