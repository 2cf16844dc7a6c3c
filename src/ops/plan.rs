use std::path::PathBuf;

use crate::config::Config;
use crate::error::Result;
use crate::ops::build::UniqueIds;
use crate::types::ArchiveEntry;
use crate::walk::AssetWalker;

/// what a build would pack, without writing anything
#[derive(Debug, Clone)]
pub struct Plan {
    /// entries in archive order
    pub entries: Vec<ArchiveEntry>,
    /// files that would be left out for lack of a sidecar
    pub skipped: Vec<PathBuf>,
}

/// walk the asset root and resolve every entry, applying the same checks as
/// `build` (sidecars, identifier uniqueness) but producing no package
pub fn plan(config: &Config) -> Result<Plan> {
    config.validate()?;
    let mut walker = AssetWalker::new(config)?;
    let mut ids = UniqueIds::default();
    let mut entries = Vec::new();

    for node in walker.by_ref() {
        let node = node?;
        ids.insert(config, &node)?;
        entries.push(node.into_entry(config.mount_prefix())?);
    }

    Ok(Plan {
        entries,
        skipped: walker.into_skipped(),
    })
}
