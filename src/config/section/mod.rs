//! Configuration sections of `sprig.toml`.

mod build;
mod markdown;
mod site;

pub use build::BuildSectionConfig;
pub use markdown::MarkdownSectionConfig;
pub use site::{MenuConfig, MenuEntry, OgImage, Product, SiteSectionConfig, SocialLink};
