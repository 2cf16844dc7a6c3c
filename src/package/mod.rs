//! the unitypackage container: a gzip-compressed tar stream where every
//! asset lives in a top-level directory named after its identifier

mod reader;
mod writer;

pub use reader::read_package;
pub use writer::ArchiveWriter;

/// member holding the asset's virtual path
pub const MEMBER_PATHNAME: &str = "pathname";
/// member holding the verbatim sidecar
pub const MEMBER_META: &str = "asset.meta";
/// member holding the file content (files only)
pub const MEMBER_ASSET: &str = "asset";

/// tar member name for `member` inside the `identifier` namespace
pub fn member_name(identifier: &str, member: &str) -> String {
    format!("{}/{}", identifier, member)
}
