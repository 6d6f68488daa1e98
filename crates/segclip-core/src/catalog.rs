//! Channel catalog: human-readable channel name -> CDN URL prefix.
//!
//! The clip engine only depends on the `SourceCatalog` trait. `StaticCatalog`
//! carries the built-in channel table and accepts extra entries from config.

use std::collections::BTreeMap;

/// Read-only channel lookup.
pub trait SourceCatalog {
    /// URL prefix for `channel`, ending with `/`.
    fn prefix(&self, channel: &str) -> Option<&str>;
    /// All channel names, sorted.
    fn channels(&self) -> Vec<&str>;
}

const BUILTIN_CHANNELS: &[(&str, &str)] = &[
    ("BBC News (United Kingdom)", "https://vs-cmaf-push-ww-live.akamaized.net/x=4/i=urn:bbc:pips:service:bbc_news_channel_hd/"),
    ("BBC News (North America) [US Only]", "https://vs-cmaf-pushb-ntham-gcomm-live.akamaized.net/x=4/i=urn:bbc:pips:service:bbc_world_news_north_america/"),
    ("BBC Arabic", "https://vs-cmaf-pushb-ww-live.akamaized.net/x=4/i=urn:bbc:pips:service:bbc_arabic_tv/"),
    ("BBC Persian", "https://vs-cmaf-pushb-ww-live.akamaized.net/x=4/i=urn:bbc:pips:service:bbc_persian_tv/"),
    ("BBC One London [UK Only]", "https://vs-cmaf-push-uk.live.cf.md.bbci.co.uk/x=4/i=urn:bbc:pips:service:bbc_one_london/"),
    ("BBC One Wales [UK Only]", "https://vs-cmaf-pushb-uk.live.cf.md.bbci.co.uk/x=4/i=urn:bbc:pips:service:bbc_one_wales_hd/"),
    ("BBC One Scotland [UK Only]", "https://vs-cmaf-pushb-uk.live.cf.md.bbci.co.uk/x=4/i=urn:bbc:pips:service:bbc_one_scotland_hd/"),
    ("BBC One Northern Ireland [UK Only]", "https://vs-cmaf-pushb-uk.live.cf.md.bbci.co.uk/x=4/i=urn:bbc:pips:service:bbc_one_northern_ireland_hd/"),
    ("BBC One Channel Islands [UK Only]", "https://vs-cmaf-pushb-uk.live.cf.md.bbci.co.uk/x=4/i=urn:bbc:pips:service:bbc_one_channel_islands/"),
    ("BBC One East [UK Only]", "https://vs-cmaf-pushb-uk.live.cf.md.bbci.co.uk/x=4/i=urn:bbc:pips:service:bbc_one_east/"),
    ("BBC One East Midlands [UK Only]", "https://vs-cmaf-pushb-uk.live.cf.md.bbci.co.uk/x=4/i=urn:bbc:pips:service:bbc_one_east_midlands/"),
    ("BBC One East Yorkshire & Lincolnshire [UK Only]", "https://vs-cmaf-pushb-uk.live.cf.md.bbci.co.uk/x=4/i=urn:bbc:pips:service:bbc_one_east_yorkshire/"),
    ("BBC One North East [UK Only]", "https://vs-cmaf-pushb-uk.live.fastly.md.bbci.co.uk/x=4/i=urn:bbc:pips:service:bbc_one_north_east/"),
    ("BBC One North West [UK Only]", "https://vs-cmaf-pushb-uk.live.fastly.md.bbci.co.uk/x=4/i=urn:bbc:pips:service:bbc_one_north_west/"),
    ("BBC One South [UK Only]", "https://vs-cmaf-pushb-uk.live.cf.md.bbci.co.uk/x=4/i=urn:bbc:pips:service:bbc_one_south/"),
    ("BBC One South East [UK Only]", "https://pub-c2-b4-thdow-bbc.live.bidi.net.uk/vs-cmaf-pushb-uk/x=4/i=urn:bbc:pips:service:bbc_one_south_east/"),
    ("BBC One South West [UK Only]", "https://vs-cmaf-pushb-uk.live.cf.md.bbci.co.uk/x=4/i=urn:bbc:pips:service:bbc_one_south_west/"),
    ("BBC One West [UK Only]", "https://vs-cmaf-pushb-uk.live.cf.md.bbci.co.uk/x=4/i=urn:bbc:pips:service:bbc_one_west/"),
    ("BBC One West Midlands [UK Only]", "https://vs-cmaf-pushb-uk.live.fastly.md.bbci.co.uk/x=4/i=urn:bbc:pips:service:bbc_one_west_midlands/"),
    ("BBC One Yorkshire [UK Only]", "https://vs-cmaf-pushb-uk.live.cf.md.bbci.co.uk/x=4/i=urn:bbc:pips:service:bbc_one_yorks/"),
    ("BBC Two England [UK Only]", "https://vs-cmaf-push-uk.live.cf.md.bbci.co.uk/x=4/i=urn:bbc:pips:service:bbc_two_hd/"),
    ("BBC Two Northern Ireland [UK Only]", "https://pub-c4-b7-thdow-bbc.live.bidi.net.uk/vs-cmaf-pushb-uk/x=4/i=urn:bbc:pips:service:bbc_two_northern_ireland_hd/"),
    ("BBC Two Wales [UK Only]", "https://vs-cmaf-pushb-uk.live.cf.md.bbci.co.uk/x=4/i=urn:bbc:pips:service:bbc_two_wales_digital/"),
    ("BBC THREE [UK Only]", "https://vs-cmaf-pushb-uk.live.fastly.md.bbci.co.uk/x=4/i=urn:bbc:pips:service:bbc_three_hd/"),
    ("BBC Four [UK Only]", "https://vs-cmaf-pushb-uk.live.cf.md.bbci.co.uk/x=4/i=urn:bbc:pips:service:bbc_four_hd/"),
    ("CBBC [UK Only]", "https://vs-cmaf-pushb-uk.live.fastly.md.bbci.co.uk/x=4/i=urn:bbc:pips:service:cbbc_hd/"),
    ("CBEEBIES [UK Only]", "https://vs-cmaf-pushb-uk.live.fastly.md.bbci.co.uk/x=4/i=urn:bbc:pips:service:cbeebies_hd/"),
    ("BBC Scotland [UK Only]", "https://vs-cmaf-pushb-uk.live.cf.md.bbci.co.uk/x=4/i=urn:bbc:pips:service:bbc_scotland_hd/"),
    ("BBC Parliament [UK Only]", "https://pub-c3-b7-eqsl-bbc.live.bidi.net.uk/vs-cmaf-pushb-uk/x=4/i=urn:bbc:pips:service:bbc_parliament/"),
    ("BBC ALBA [UK Only]", "https://pub-c2-b6-rbsov-bbc.live.bidi.net.uk/vs-cmaf-pushb-uk/x=4/i=urn:bbc:pips:service:bbc_alba/"),
    ("S4C [UK Only]", "https://vs-cmaf-pushb-uk.live.fastly.md.bbci.co.uk/x=4/i=urn:bbc:pips:service:s4cpbs/"),
    ("BBC STREAM 51", "https://ve-cmaf-pushb-uk.live.cf.md.bbci.co.uk/x=4/i=urn:bbc:pips:service:ww_bbc_stream_051/"),
    ("BBC STREAM 52", "https://ve-cmaf-pushb-uk.live.fastly.md.bbci.co.uk/x=4/i=urn:bbc:pips:service:uk_bbc_stream_052/"),
];

/// In-memory channel table.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    entries: BTreeMap<String, String>,
}

impl StaticCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in channel table.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for (name, prefix) in BUILTIN_CHANNELS {
            catalog.insert(name, prefix);
        }
        catalog
    }

    /// Built-in table plus (overriding) entries from config.
    pub fn with_overrides(extra: &BTreeMap<String, String>) -> Self {
        let mut catalog = Self::builtin();
        for (name, prefix) in extra {
            catalog.insert(name, prefix);
        }
        catalog
    }

    /// Add or replace an entry. Names are trimmed; a missing trailing `/`
    /// on the prefix is added.
    pub fn insert(&mut self, name: &str, prefix: &str) {
        let mut prefix = prefix.trim().to_string();
        if !prefix.ends_with('/') {
            prefix.push('/');
        }
        self.entries.insert(name.trim().to_string(), prefix);
    }
}

impl SourceCatalog for StaticCatalog {
    /// Exact name first, then a trimmed, case-insensitive match.
    fn prefix(&self, channel: &str) -> Option<&str> {
        if let Some(p) = self.entries.get(channel) {
            return Some(p.as_str());
        }
        let wanted = channel.trim();
        self.entries
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
            .map(|(_, p)| p.as_str())
    }

    fn channels(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lookup() {
        let c = StaticCatalog::builtin();
        assert_eq!(
            c.prefix("BBC Arabic"),
            Some("https://vs-cmaf-pushb-ww-live.akamaized.net/x=4/i=urn:bbc:pips:service:bbc_arabic_tv/")
        );
        assert_eq!(c.channels().len(), BUILTIN_CHANNELS.len());
    }

    #[test]
    fn lookup_tolerates_case_and_padding() {
        let c = StaticCatalog::builtin();
        assert_eq!(
            c.prefix("  bbc one london [uk only] "),
            c.prefix("BBC One London [UK Only]")
        );
        assert!(c.prefix("BBC One London").is_none());
    }

    #[test]
    fn unknown_channel_is_none() {
        assert!(StaticCatalog::builtin().prefix("Channel 404").is_none());
    }

    #[test]
    fn overrides_replace_and_extend() {
        let mut extra = BTreeMap::new();
        extra.insert("BBC Arabic".to_string(), "http://mirror.local/arabic".to_string());
        extra.insert("Local Test".to_string(), "http://127.0.0.1:9000/live/".to_string());
        let c = StaticCatalog::with_overrides(&extra);
        assert_eq!(c.prefix("BBC Arabic"), Some("http://mirror.local/arabic/"));
        assert_eq!(c.prefix("Local Test"), Some("http://127.0.0.1:9000/live/"));
        assert_eq!(c.channels().len(), BUILTIN_CHANNELS.len() + 1);
    }

    #[test]
    fn every_builtin_prefix_ends_with_slash() {
        for (_, prefix) in BUILTIN_CHANNELS {
            assert!(prefix.ends_with('/'));
            assert!(url::Url::parse(prefix).is_ok());
        }
    }
}
