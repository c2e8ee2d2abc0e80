use crate::conf::types::DiscoveryConfig;
use regex::{Regex, RegexBuilder};

/// Matches per-map directory names such as `world_0`, `world1` or `WORLD-2`.
#[derive(Debug, Clone)]
pub struct MapDirPattern {
    regex: Regex,
}

impl MapDirPattern {
    pub fn new(prefix: &str, min: u8, max: u8) -> Result<Self, regex::Error> {
        let pattern = format!(r"^{}[-_]?[{}-{}]$", regex::escape(prefix), min, max);
        let regex = RegexBuilder::new(&pattern).case_insensitive(true).build()?;
        Ok(Self { regex })
    }

    pub fn from_config(config: &DiscoveryConfig) -> Result<Self, regex::Error> {
        Self::new(&config.map_prefix, config.map_min, config.map_max)
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}
