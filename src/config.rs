use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, IoResultExt, Result};

/// default sidecar key holding the asset identifier
pub const DEFAULT_IDENTIFIER_KEY: &str = "guid";

/// default gzip level, matches `Compression::best()`
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 9;

/// build configuration, usually read from assetpack.toml
///
/// resolved once at startup and passed explicitly to the walker and writer.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// directory whose contents are packed
    pub asset_root: PathBuf,
    /// path the asset root is mounted at inside the consumer project
    pub mount_prefix: String,
    /// sidecar key carrying the identifier
    #[serde(default = "default_identifier_key")]
    pub identifier_key: String,
    /// gzip compression level (0-9)
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,
    /// glob patterns, relative to the asset root, that are never packed
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_identifier_key() -> String {
    DEFAULT_IDENTIFIER_KEY.to_string()
}

fn default_compression_level() -> u32 {
    DEFAULT_COMPRESSION_LEVEL
}

impl Config {
    /// create a config with default key, level and no excludes
    pub fn new(asset_root: impl Into<PathBuf>, mount_prefix: impl Into<String>) -> Self {
        Self {
            asset_root: asset_root.into(),
            mount_prefix: mount_prefix.into(),
            identifier_key: default_identifier_key(),
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            exclude: vec![],
        }
    }

    /// load config from file
    ///
    /// a relative `asset_root` is resolved against the config file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_path(path)?;
        let mut config: Config = toml::from_str(&content)?;
        if config.asset_root.is_relative() {
            if let Some(base) = path.parent() {
                config.asset_root = base.join(&config.asset_root);
            }
        }
        Ok(config)
    }

    /// mount prefix without trailing separators
    pub fn mount_prefix(&self) -> &str {
        self.mount_prefix.trim_end_matches('/')
    }

    /// compression level clamped to the range gzip accepts
    pub fn compression_level(&self) -> u32 {
        self.compression_level.min(9)
    }

    /// check the prefix, key and exclude patterns before any work starts
    pub fn validate(&self) -> Result<()> {
        let prefix = self.mount_prefix();
        if prefix.is_empty() {
            return Err(Error::InvalidMountPrefix("empty prefix".to_string()));
        }
        if prefix.contains('\\') {
            return Err(Error::InvalidMountPrefix(format!(
                "backslash in prefix: {}",
                self.mount_prefix
            )));
        }
        if prefix
            .split('/')
            .any(|seg| seg.is_empty() || seg == "." || seg == "..")
        {
            return Err(Error::InvalidMountPrefix(format!(
                "empty or relative segment in prefix: {}",
                self.mount_prefix
            )));
        }

        if self.identifier_key.is_empty() || self.identifier_key.contains(['\n', ':']) {
            return Err(Error::InvalidIdentifierKey {
                key: self.identifier_key.clone(),
                message: "key must be non-empty and contain no ':' or newline".to_string(),
            });
        }

        self.exclude_patterns()?;
        Ok(())
    }

    /// compile the exclude globs
    pub fn exclude_patterns(&self) -> Result<Vec<glob::Pattern>> {
        self.exclude
            .iter()
            .map(|p| {
                glob::Pattern::new(p).map_err(|e| Error::InvalidPattern {
                    pattern: p.clone(),
                    message: e.msg.to_string(),
                })
            })
            .collect()
    }
}
