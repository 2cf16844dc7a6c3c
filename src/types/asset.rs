use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// what an asset node stands for on disk
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssetKind {
    /// a tracked directory; never carries content
    Directory,
    /// a regular file with its full content
    File { content: Vec<u8> },
}

impl AssetKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            AssetKind::Directory => "directory",
            AssetKind::File { .. } => "file",
        }
    }
}

/// one asset found by the walker, paired with its sidecar
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetNode {
    /// path under the asset root (empty for the root itself)
    pub relative_path: PathBuf,
    /// identifier parsed from the sidecar
    pub identifier: String,
    /// raw sidecar content
    pub meta_bytes: Vec<u8>,
    pub kind: AssetKind,
}

impl AssetNode {
    pub fn directory(
        relative_path: impl Into<PathBuf>,
        identifier: impl Into<String>,
        meta_bytes: Vec<u8>,
    ) -> Self {
        Self {
            relative_path: relative_path.into(),
            identifier: identifier.into(),
            meta_bytes,
            kind: AssetKind::Directory,
        }
    }

    pub fn file(
        relative_path: impl Into<PathBuf>,
        identifier: impl Into<String>,
        meta_bytes: Vec<u8>,
        content: Vec<u8>,
    ) -> Self {
        Self {
            relative_path: relative_path.into(),
            identifier: identifier.into(),
            meta_bytes,
            kind: AssetKind::File { content },
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.kind, AssetKind::Directory)
    }

    /// file content, `None` for directories
    pub fn content_bytes(&self) -> Option<&[u8]> {
        match &self.kind {
            AssetKind::File { content } => Some(content),
            AssetKind::Directory => None,
        }
    }

    /// convert into the archive form, mounting the node under `mount_prefix`
    pub fn into_entry(self, mount_prefix: &str) -> Result<ArchiveEntry> {
        let virtual_path = virtual_path(mount_prefix, &self.relative_path)?;
        let content_bytes = match self.kind {
            AssetKind::File { content } => Some(content),
            AssetKind::Directory => None,
        };
        Ok(ArchiveEntry {
            identifier: self.identifier,
            virtual_path,
            meta_bytes: self.meta_bytes,
            content_bytes,
        })
    }
}

/// one identifier namespace inside a package
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub identifier: String,
    /// mount-relative path exposed to the consumer
    pub virtual_path: String,
    pub meta_bytes: Vec<u8>,
    /// present only for files
    pub content_bytes: Option<Vec<u8>>,
}

impl ArchiveEntry {
    pub fn is_dir(&self) -> bool {
        self.content_bytes.is_none()
    }
}

/// join `mount_prefix` and a root-relative path with forward slashes
///
/// the asset root itself (an empty relative path) maps to the prefix alone.
pub fn virtual_path(mount_prefix: &str, relative: &Path) -> Result<String> {
    let mut out = mount_prefix.trim_end_matches('/').to_string();
    for component in relative.components() {
        if let Component::Normal(name) = component {
            let name = name
                .to_str()
                .ok_or_else(|| Error::NonUtf8Path(relative.to_path_buf()))?;
            out.push('/');
            out.push_str(name);
        }
    }
    Ok(out)
}
