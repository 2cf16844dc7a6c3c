//! assetpack - reproducible unitypackage builder
//!
//! packs a directory of assets, each paired with a `.meta` sidecar carrying a
//! stable identifier, into a single `.unitypackage` archive. building the same
//! tree twice yields byte-identical output.
//!
//! # Package layout
//!
//! a gzip-compressed tar stream; each asset is a top-level directory named
//! after its identifier holding:
//!
//! - `pathname`: the virtual path (`<mount prefix>/<relative path>`)
//! - `asset.meta`: the sidecar, verbatim
//! - `asset`: the file content (files only, never directories)
//!
//! # Traversal
//!
//! each directory level is visited files first, then subdirectories, both in
//! byte-wise name order. a directory is packed only if `<name>.meta` sits next
//! to it; a file without a sidecar is skipped with a warning. a sidecar with
//! no identifier line aborts the build and leaves no output.
//!
//! # Example usage
//!
//! ```no_run
//! use assetpack::{ops, Config};
//! use std::path::Path;
//!
//! let config = Config::new("Editor", "Assets/MyTool/Editor");
//! let report = ops::build(&config, Path::new("MyTool.unitypackage")).unwrap();
//! println!("{} entries, {} skipped", report.entries, report.skipped.len());
//! ```

mod config;
mod error;
mod meta;
mod walk;

pub mod fs;
pub mod ops;
pub mod package;
pub mod types;

pub use config::{Config, DEFAULT_COMPRESSION_LEVEL, DEFAULT_IDENTIFIER_KEY};
pub use error::{Error, Result};
pub use meta::{is_sidecar, parse_identifier, sidecar_path, IdentifierParser, META_EXTENSION};
pub use package::{read_package, ArchiveWriter};
pub use types::{virtual_path, ArchiveEntry, AssetKind, AssetNode};
pub use walk::AssetWalker;
