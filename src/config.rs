use std::collections::HashMap;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use pnet::util::MacAddr;
use serde::{Deserialize, Deserializer};

use crate::layer2::FrameSource;

pub const DEFAULT_CONFIG_PATH: &str = "~/.config/wol-send/config.yml";

/// Deserializes an optional string field through its `FromStr` implementation.
pub fn deserialize_opt_from_str<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    T: FromStr,
    T::Err: Display,
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Interface used when none is given on the command line.
    #[serde(default)]
    pub interface: Option<String>,

    #[serde(default, deserialize_with = "deserialize_opt_from_str")]
    pub source: Option<FrameSource>,

    /// Host aliases, name to hardware address.
    #[serde(default)]
    pub hosts: HashMap<String, String>,
}

impl Config {
    pub fn from_yaml(s: &str) -> Result<Self> {
        let cfg: Config = serde_yml::from_str(s).context("malformed configuration")?;
        for (name, mac) in cfg.hosts.iter() {
            mac.parse::<MacAddr>()
                .map_err(|e| anyhow!("host '{}' has invalid hardware address '{}': {}", name, mac, e))?;
        }
        Ok(cfg)
    }

    /// Loads the file at `path` after shell expansion. A missing file yields the defaults.
    pub fn load(path: &str) -> Result<Self> {
        let expanded = shellexpand::full(path)
            .with_context(|| format!("cannot expand config path '{}'", path))?;
        let path = Path::new(&*expanded);

        if !path.exists() {
            log::debug!("no config file at '{}', using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file '{}'", path.display()))?;
        let cfg = Self::from_yaml(&content)
            .with_context(|| format!("in config file '{}'", path.display()))?;
        log::debug!("loaded config from '{}'", path.display());
        Ok(cfg)
    }

    /// Resolves a command line target: a hardware address or a host alias.
    pub fn resolve_target(&self, target: &str) -> Result<MacAddr> {
        if let Ok(mac) = target.parse::<MacAddr>() {
            return Ok(mac);
        }
        match self.hosts.get(target) {
            Some(mac) => mac.parse::<MacAddr>()
                .map_err(|e| anyhow!("host '{}' has invalid hardware address '{}': {}", target, mac, e)),
            None => Err(anyhow!("'{}' is neither a hardware address nor a known host", target)),
        }
    }
}
