//! Print site data as JSON.

use crate::{config::SiteConfig, site::SiteData};
use anyhow::Result;

/// Print [`SiteData`] to stdout.
pub fn print_site(config: &SiteConfig, pretty: bool) -> Result<()> {
    println!("{}", site_json(config, pretty)?);
    Ok(())
}

fn site_json(config: &SiteConfig, pretty: bool) -> Result<String> {
    let data = SiteData::from_config(config);
    let json = if pretty {
        serde_json::to_string_pretty(&data)?
    } else {
        serde_json::to_string(&data)?
    };
    Ok(json)
}
