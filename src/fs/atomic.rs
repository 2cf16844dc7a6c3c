use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{IoResultExt, Result};

/// output file written under a temporary name and renamed into place
///
/// dropping it without `commit` removes the temporary file, so an aborted
/// build never leaves a truncated package at the destination.
pub struct AtomicFile {
    file: File,
    tmp_path: PathBuf,
    dest: PathBuf,
    committed: bool,
}

impl AtomicFile {
    /// create a temp file next to `dest` (same filesystem, so rename is atomic)
    pub fn create(dest: &Path) -> Result<Self> {
        let dir = parent_dir(dest);
        let name = dest
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tmp_path = dir.join(format!(".{}.{}.tmp", name, uuid::Uuid::new_v4()));

        let file = File::create(&tmp_path).with_path(&tmp_path)?;
        Ok(Self {
            file,
            tmp_path,
            dest: dest.to_path_buf(),
            committed: false,
        })
    }

    pub fn tmp_path(&self) -> &Path {
        &self.tmp_path
    }

    /// fsync, rename onto the destination and fsync the parent directory
    pub fn commit(mut self) -> Result<()> {
        self.file.flush().with_path(&self.tmp_path)?;
        self.file.sync_all().with_path(&self.tmp_path)?;
        fs::rename(&self.tmp_path, &self.dest).with_path(&self.dest)?;
        self.committed = true;
        fsync_dir(parent_dir(&self.dest))?;
        Ok(())
    }
}

impl Write for AtomicFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl Drop for AtomicFile {
    fn drop(&mut self) {
        if !self.committed {
            debug!(path = %self.tmp_path.display(), "removing partial output");
            let _ = fs::remove_file(&self.tmp_path);
        }
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// sync a directory to disk
#[cfg(unix)]
pub fn fsync_dir(path: &Path) -> Result<()> {
    let dir = File::open(path).with_path(path)?;
    dir.sync_all().with_path(path)?;
    Ok(())
}

#[cfg(not(unix))]
pub fn fsync_dir(_path: &Path) -> Result<()> {
    Ok(())
}
