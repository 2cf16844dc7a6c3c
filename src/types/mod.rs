mod asset;

pub use asset::{virtual_path, ArchiveEntry, AssetKind, AssetNode};
