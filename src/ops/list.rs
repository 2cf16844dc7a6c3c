use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{IoResultExt, Result};
use crate::package::read_package;
use crate::types::ArchiveEntry;

/// one package entry, summarized for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub identifier: String,
    pub virtual_path: String,
    pub is_dir: bool,
    /// content size, `None` for directories
    pub size: Option<u64>,
}

impl From<&ArchiveEntry> for ListEntry {
    fn from(entry: &ArchiveEntry) -> Self {
        Self {
            identifier: entry.identifier.clone(),
            virtual_path: entry.virtual_path.clone(),
            is_dir: entry.is_dir(),
            size: entry.content_bytes.as_ref().map(|c| c.len() as u64),
        }
    }
}

impl std::fmt::Display for ListEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = if self.is_dir { "dir " } else { "file" };
        write!(f, "{} {} {}", self.identifier, kind, self.virtual_path)
    }
}

/// list the entries of a package file, in archive order
pub fn list(package: &Path) -> Result<Vec<ListEntry>> {
    let file = File::open(package).with_path(package)?;
    let entries = read_package(BufReader::new(file))?;
    Ok(entries.iter().map(ListEntry::from).collect())
}
