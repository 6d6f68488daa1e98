//! `segclip range` – preview the segment indices of a window.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use segclip_core::catalog::{SourceCatalog, StaticCatalog};
use segclip_core::config::ClipConfig;
use segclip_core::segmenter::compute_range;
use segclip_core::url_model::{clip_file_name, segment_url, SegmentSlot, TrackKind};

pub fn run_range(
    cfg: &ClipConfig,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    channel: Option<&str>,
) -> Result<()> {
    let range = compute_range(start.timestamp(), end.timestamp());
    println!("start     {} ({})", start.to_rfc3339(), start.timestamp());
    println!("end       {} ({})", end.to_rfc3339(), end.timestamp());
    println!("indices   {}..={}", range.first_index, range.last_index);
    println!("segments  {} per track, {} fetches", range.len(), 2 + 2 * range.len());

    if let Some(channel) = channel {
        let catalog = StaticCatalog::with_overrides(&cfg.channels);
        let prefix = catalog
            .prefix(channel)
            .with_context(|| format!("unknown channel: {}", channel))?;
        println!("file      {}", clip_file_name(channel, start.timestamp(), end.timestamp()));
        for track in TrackKind::ALL {
            println!(
                "{:<9} {}",
                track.as_str(),
                segment_url(prefix, track, SegmentSlot::Index(range.first_index))
            );
            println!(
                "{:<9} {}",
                "",
                segment_url(prefix, track, SegmentSlot::Index(range.last_index))
            );
        }
    }
    Ok(())
}
