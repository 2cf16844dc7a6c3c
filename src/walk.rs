//! deterministic traversal of an asset root
//!
//! every level is visited files first, then subdirectories, each group in
//! byte-wise name order. a directory node is emitted only when its
//! `<name>.meta` sidecar exists next to it in the parent directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::Config;
use crate::error::{Error, IoResultExt, Result};
use crate::meta::{is_sidecar, sidecar_path, IdentifierParser};
use crate::types::AssetNode;

/// iterator over the asset nodes of a tree, in archive order
pub struct AssetWalker {
    root: PathBuf,
    iter: walkdir::IntoIter,
    parser: IdentifierParser,
    exclude: Vec<glob::Pattern>,
    /// canonical paths never reported, e.g. the package being written
    ignored: Vec<PathBuf>,
    skipped: Vec<PathBuf>,
}

impl AssetWalker {
    /// start a walk over `config.asset_root`
    ///
    /// fails with `RootMissing` if the root is not a directory.
    pub fn new(config: &Config) -> Result<Self> {
        let root = config.asset_root.as_path();
        if !root.is_dir() {
            return Err(Error::RootMissing(root.to_path_buf()));
        }

        // "." and friends have no name to look up a sidecar by
        let root = if root.file_name().is_none() {
            fs::canonicalize(root).with_path(root)?
        } else {
            root.to_path_buf()
        };

        let iter = WalkDir::new(&root)
            .follow_links(false)
            .sort_by(|a, b| {
                a.file_type()
                    .is_dir()
                    .cmp(&b.file_type().is_dir())
                    .then_with(|| a.file_name().cmp(b.file_name()))
            })
            .into_iter();

        Ok(Self {
            root,
            iter,
            parser: IdentifierParser::new(&config.identifier_key)?,
            exclude: config.exclude_patterns()?,
            ignored: Vec::new(),
            skipped: Vec::new(),
        })
    }

    /// silently pass over `path` if the walk reaches it
    ///
    /// `path` need not exist yet, but its parent directory must.
    pub fn ignore_file(mut self, path: &Path) -> Result<Self> {
        self.ignored.push(canonical_file_path(path)?);
        Ok(self)
    }

    /// files left out because they have no sidecar
    pub fn skipped(&self) -> &[PathBuf] {
        &self.skipped
    }

    pub fn into_skipped(self) -> Vec<PathBuf> {
        self.skipped
    }

    fn is_excluded(&self, relative: &Path) -> bool {
        !relative.as_os_str().is_empty() && self.exclude.iter().any(|p| p.matches_path(relative))
    }

    fn is_ignored(&self, path: &Path) -> Result<bool> {
        let name = path.file_name();
        if !self.ignored.iter().any(|p| p.file_name() == name) {
            return Ok(false);
        }
        let canonical = canonical_file_path(path)?;
        Ok(self.ignored.contains(&canonical))
    }

    /// handle one walkdir entry, returning a node if it produces one
    fn visit(&mut self, entry: DirEntry) -> Result<Option<AssetNode>> {
        let path = entry.path();
        let relative = path
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_default();

        if self.is_excluded(&relative) {
            debug!(path = %path.display(), "excluded");
            if entry.file_type().is_dir() {
                self.iter.skip_current_dir();
            }
            return Ok(None);
        }

        if entry.file_type().is_dir() {
            return self.visit_dir(path, relative);
        }

        if entry.file_type().is_symlink() && path.is_dir() {
            debug!(path = %path.display(), "not following directory symlink");
            return Ok(None);
        }

        if is_sidecar(entry.file_name()) {
            return Ok(None);
        }

        if self.is_ignored(path)? {
            debug!(path = %path.display(), "ignored");
            return Ok(None);
        }

        self.visit_file(path, relative)
    }

    fn visit_dir(&self, path: &Path, relative: PathBuf) -> Result<Option<AssetNode>> {
        let Some(sidecar) = sidecar_path(path).filter(|s| s.is_file()) else {
            debug!(path = %path.display(), "untracked directory");
            return Ok(None);
        };

        let meta_bytes = fs::read(&sidecar).with_path(&sidecar)?;
        let identifier = self.parser.parse(&meta_bytes, &sidecar)?;
        debug!(path = %path.display(), %identifier, "directory");
        Ok(Some(AssetNode::directory(relative, identifier, meta_bytes)))
    }

    fn visit_file(&mut self, path: &Path, relative: PathBuf) -> Result<Option<AssetNode>> {
        let Some(sidecar) = sidecar_path(path).filter(|s| s.is_file()) else {
            warn!(path = %path.display(), "no .meta sidecar, skipping");
            self.skipped.push(path.to_path_buf());
            return Ok(None);
        };

        let meta_bytes = fs::read(&sidecar).with_path(&sidecar)?;
        let identifier = self.parser.parse(&meta_bytes, &sidecar)?;
        let content = fs::read(path).with_path(path)?;
        debug!(path = %path.display(), %identifier, size = content.len(), "file");
        Ok(Some(AssetNode::file(relative, identifier, meta_bytes, content)))
    }
}

/// canonical parent joined with the file name, without resolving the file itself
fn canonical_file_path(path: &Path) -> Result<PathBuf> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let name = path
        .file_name()
        .ok_or_else(|| Error::Walk {
            path: path.to_path_buf(),
            message: "path has no file name".to_string(),
        })?;
    Ok(fs::canonicalize(parent).with_path(parent)?.join(name))
}

impl Iterator for AssetWalker {
    type Item = Result<AssetNode>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.iter.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(e.into())),
            };
            match self.visit(entry) {
                Ok(Some(node)) => return Some(Ok(node)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
