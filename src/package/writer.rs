use std::io::Write;

use flate2::write::GzEncoder;
use flate2::{Compression, GzBuilder};
use tar::{Builder, Header};

use crate::error::{Error, Result};
use crate::package::{member_name, MEMBER_ASSET, MEMBER_META, MEMBER_PATHNAME};
use crate::types::ArchiveEntry;

/// gzip OS byte for "unknown", keeps output identical across hosts
const GZIP_OS_UNKNOWN: u8 = 255;

/// serializes archive entries into a single gzip-compressed tar stream
///
/// headers carry no timestamps, owners or host modes, and the gzip header has
/// mtime 0, so the same entries always produce the same bytes.
pub struct ArchiveWriter<W: Write> {
    tar: Builder<GzEncoder<W>>,
    entries: usize,
}

impl<W: Write> ArchiveWriter<W> {
    /// wrap `writer` using gzip `level` (0-9)
    pub fn new(writer: W, level: u32) -> Self {
        let encoder = GzBuilder::new()
            .mtime(0)
            .operating_system(GZIP_OS_UNKNOWN)
            .write(writer, Compression::new(level.min(9)));

        Self {
            tar: Builder::new(encoder),
            entries: 0,
        }
    }

    /// append the `pathname`, `asset.meta` and (files only) `asset` members
    pub fn append(&mut self, entry: &ArchiveEntry) -> Result<()> {
        let id = &entry.identifier;
        self.write_member(&member_name(id, MEMBER_PATHNAME), entry.virtual_path.as_bytes())?;
        self.write_member(&member_name(id, MEMBER_META), &entry.meta_bytes)?;
        if let Some(content) = &entry.content_bytes {
            self.write_member(&member_name(id, MEMBER_ASSET), content)?;
        }
        self.entries += 1;
        Ok(())
    }

    /// number of entries appended so far
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// write the tar trailer, flush the gzip stream and return the sink
    pub fn finish(self) -> Result<W> {
        let encoder = self.tar.into_inner().map_err(|source| Error::Archive {
            member: "tar trailer".to_string(),
            source,
        })?;
        encoder.finish().map_err(|source| Error::Archive {
            member: "gzip trailer".to_string(),
            source,
        })
    }

    fn write_member(&mut self, name: &str, data: &[u8]) -> Result<()> {
        let mut header = Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_uid(0);
        header.set_gid(0);
        header.set_mtime(0);
        header.set_entry_type(tar::EntryType::Regular);

        self.tar
            .append_data(&mut header, name, data)
            .map_err(|source| Error::Archive {
                member: name.to_string(),
                source,
            })
    }
}
