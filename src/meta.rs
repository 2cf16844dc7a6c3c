//! identifier extraction from `.meta` sidecars

use std::path::Path;

use regex::bytes::Regex;

use crate::error::{Error, Result};

/// sidecar file extension, without the dot
pub const META_EXTENSION: &str = "meta";

/// compiled matcher for `<key>: <token>` lines
#[derive(Clone, Debug)]
pub struct IdentifierParser {
    re: Regex,
}

impl IdentifierParser {
    /// build a parser for the given key (e.g. `guid`)
    pub fn new(key: &str) -> Result<Self> {
        let pattern = format!(r"(?m)^{}:[ \t]*([0-9A-Za-z]+)", regex::escape(key));
        let re = Regex::new(&pattern).map_err(|e| Error::InvalidIdentifierKey {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { re })
    }

    /// return the identifier declared in `content`
    ///
    /// `path` is only used for the error diagnostic.
    pub fn parse(&self, content: &[u8], path: &Path) -> Result<String> {
        self.re
            .captures(content)
            .and_then(|caps| caps.get(1))
            .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned())
            .ok_or_else(|| Error::MalformedSidecar {
                path: path.to_path_buf(),
            })
    }
}

/// parse the `guid:` identifier out of sidecar content
pub fn parse_identifier(content: &[u8], path: &Path) -> Result<String> {
    IdentifierParser::new(crate::config::DEFAULT_IDENTIFIER_KEY)?.parse(content, path)
}

/// sidecar path for an asset or directory: `<path>.meta`
pub fn sidecar_path(asset: &Path) -> Option<std::path::PathBuf> {
    let name = asset.file_name()?;
    let mut sidecar = name.to_os_string();
    sidecar.push(".");
    sidecar.push(META_EXTENSION);
    Some(asset.with_file_name(sidecar))
}

/// whether a file name is itself a sidecar
pub fn is_sidecar(name: &std::ffi::OsStr) -> bool {
    name.as_encoded_bytes().ends_with(b".meta")
}
