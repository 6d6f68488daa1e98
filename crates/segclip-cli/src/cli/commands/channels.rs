//! `segclip channels` – list catalog entries.

use anyhow::Result;
use segclip_core::catalog::{SourceCatalog, StaticCatalog};
use segclip_core::config::ClipConfig;

pub fn run_channels(cfg: &ClipConfig, urls: bool) -> Result<()> {
    let catalog = StaticCatalog::with_overrides(&cfg.channels);
    for name in catalog.channels() {
        match (urls, catalog.prefix(name)) {
            (true, Some(prefix)) => println!("{:<50} {}", name, prefix),
            _ => println!("{}", name),
        }
    }
    Ok(())
}
