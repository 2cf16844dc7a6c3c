use std::collections::HashMap;
use std::io::Read;

use flate2::read::GzDecoder;
use tracing::debug;

use crate::error::{Error, Result};
use crate::package::{MEMBER_ASSET, MEMBER_META, MEMBER_PATHNAME};
use crate::types::ArchiveEntry;

/// the members a namespace may hold
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Member {
    Pathname,
    Meta,
    Asset,
}

impl Member {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            MEMBER_PATHNAME => Some(Member::Pathname),
            MEMBER_META => Some(Member::Meta),
            MEMBER_ASSET => Some(Member::Asset),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Member::Pathname => MEMBER_PATHNAME,
            Member::Meta => MEMBER_META,
            Member::Asset => MEMBER_ASSET,
        }
    }
}

/// members collected for one identifier while reading
#[derive(Default)]
struct Pending {
    identifier: String,
    pathname: Option<Vec<u8>>,
    meta: Option<Vec<u8>>,
    asset: Option<Vec<u8>>,
}

impl Pending {
    fn set(&mut self, member: Member, data: Vec<u8>) -> Result<()> {
        let slot = match member {
            Member::Pathname => &mut self.pathname,
            Member::Meta => &mut self.meta,
            Member::Asset => &mut self.asset,
        };
        if slot.is_some() {
            return Err(Error::CorruptPackage(format!(
                "duplicate member {}/{}",
                self.identifier,
                member.name()
            )));
        }
        *slot = Some(data);
        Ok(())
    }

    fn into_entry(self) -> Result<ArchiveEntry> {
        let pathname = self.pathname.ok_or_else(|| {
            Error::CorruptPackage(format!("{} has no {}", self.identifier, MEMBER_PATHNAME))
        })?;
        let virtual_path = String::from_utf8(pathname).map_err(|_| {
            Error::CorruptPackage(format!("{} has a non utf-8 pathname", self.identifier))
        })?;
        let meta_bytes = self.meta.ok_or_else(|| {
            Error::CorruptPackage(format!("{} has no {}", self.identifier, MEMBER_META))
        })?;

        Ok(ArchiveEntry {
            identifier: self.identifier,
            virtual_path,
            meta_bytes,
            content_bytes: self.asset,
        })
    }
}

/// decode a package into its entries, in order of first appearance
///
/// directory-typed tar members and members other than `pathname`,
/// `asset.meta` and `asset` (e.g. `preview.png`) are ignored. every other
/// member must be named `<identifier>/<member>`.
pub fn read_package<R: Read>(reader: R) -> Result<Vec<ArchiveEntry>> {
    let mut archive = tar::Archive::new(GzDecoder::new(reader));
    let mut pending: Vec<Pending> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    let entries = archive.entries().map_err(corrupt)?;
    for entry in entries {
        let mut entry = entry.map_err(corrupt)?;
        if entry.header().entry_type().is_dir() {
            continue;
        }

        let name = entry.path().map_err(corrupt)?.to_string_lossy().into_owned();
        let (identifier, member) = name
            .split_once('/')
            .filter(|(id, member)| !id.is_empty() && !member.contains('/'))
            .ok_or_else(|| Error::CorruptPackage(format!("unexpected member {}", name)))?;

        let Some(member) = Member::from_name(member) else {
            debug!(member = %name, "ignoring unknown member");
            continue;
        };

        let idx = *index.entry(identifier.to_string()).or_insert_with(|| {
            pending.push(Pending {
                identifier: identifier.to_string(),
                ..Default::default()
            });
            pending.len() - 1
        });

        let mut data = Vec::new();
        entry.read_to_end(&mut data).map_err(corrupt)?;
        pending[idx].set(member, data)?;
    }

    pending.into_iter().map(Pending::into_entry).collect()
}

fn corrupt(err: std::io::Error) -> Error {
    Error::CorruptPackage(err.to_string())
}
