use std::collections::hash_map::{Entry, HashMap};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::Config;
use crate::error::{Error, IoResultExt, Result};
use crate::fs::AtomicFile;
use crate::package::ArchiveWriter;
use crate::types::AssetNode;
use crate::walk::AssetWalker;

/// summary of one package build
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// identifier namespaces written
    pub entries: usize,
    pub directories: usize,
    pub files: usize,
    /// files left out for lack of a sidecar
    pub skipped: Vec<PathBuf>,
    /// compressed size of the package
    pub bytes_written: u64,
}

/// build a package from `config.asset_root` and write it to `output`
///
/// the package is written to a temporary file and renamed into place only
/// once complete; on any error `output` is left as it was.
pub fn build(config: &Config, output: &Path) -> Result<BuildReport> {
    config.validate()?;
    let walker = AssetWalker::new(config)?;

    // the output may live under the asset root; never pack it or warn about it
    let out = AtomicFile::create(output)?;
    let walker = walker.ignore_file(output)?.ignore_file(out.tmp_path())?;
    let (sink, report) = pack(config, walker, BufWriter::new(out))?;
    let out = sink
        .into_inner()
        .map_err(|e| e.into_error())
        .with_path(output)?;
    out.commit()?;

    info!(
        output = %output.display(),
        entries = report.entries,
        skipped = report.skipped.len(),
        bytes = report.bytes_written,
        "package built"
    );
    Ok(report)
}

/// build a package into an arbitrary sink, returning it with the report
pub fn build_to_writer<W: Write>(config: &Config, writer: W) -> Result<(W, BuildReport)> {
    config.validate()?;
    let walker = AssetWalker::new(config)?;
    pack(config, walker, writer)
}

fn pack<W: Write>(config: &Config, mut walker: AssetWalker, writer: W) -> Result<(W, BuildReport)> {
    let mut archive = ArchiveWriter::new(CountingWriter::new(writer), config.compression_level());
    let mut ids = UniqueIds::default();
    let mut report = BuildReport::default();

    for node in walker.by_ref() {
        let node = node?;
        ids.insert(config, &node)?;

        if node.is_dir() {
            report.directories += 1;
        } else {
            report.files += 1;
        }
        archive.append(&node.into_entry(config.mount_prefix())?)?;
    }

    report.entries = archive.entries();
    report.skipped = walker.into_skipped();

    let counted = archive.finish()?;
    report.bytes_written = counted.count;
    Ok((counted.inner, report))
}

/// identifiers seen so far in one run, with the path that claimed each
#[derive(Default)]
pub(crate) struct UniqueIds {
    seen: HashMap<String, PathBuf>,
}

impl UniqueIds {
    pub(crate) fn insert(&mut self, config: &Config, node: &AssetNode) -> Result<()> {
        let source = config.asset_root.join(&node.relative_path);
        match self.seen.entry(node.identifier.clone()) {
            Entry::Occupied(first) => Err(Error::DuplicateIdentifier {
                identifier: node.identifier.clone(),
                first: first.get().clone(),
                second: source,
            }),
            Entry::Vacant(slot) => {
                slot.insert(source);
                Ok(())
            }
        }
    }
}

struct CountingWriter<W> {
    inner: W,
    count: u64,
}

impl<W> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, count: 0 }
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::read_package;
    use std::fs;
    use tempfile::tempdir;

    const PREFIX: &str = "Assets/MochiTool";

    fn meta(id: &str) -> String {
        format!("fileFormatVersion: 2\nguid: {}\n", id)
    }

    /// `<tmp>/root` with `root.meta` next to it and `foo.txt` inside
    fn sample_tree() -> (tempfile::TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let root = dir.path().join("root");
        fs::create_dir(&root).unwrap();
        fs::write(dir.path().join("root.meta"), meta("root1")).unwrap();
        fs::write(root.join("foo.txt"), "foo content").unwrap();
        fs::write(root.join("foo.txt.meta"), meta("abc123")).unwrap();
        (dir, root)
    }

    #[test]
    fn test_build_root_and_file_scenario() {
        let (dir, root) = sample_tree();
        let output = dir.path().join("out.unitypackage");

        let report = build(&Config::new(&root, PREFIX), &output).unwrap();
        assert_eq!(report.entries, 2);
        assert_eq!(report.directories, 1);
        assert_eq!(report.files, 1);
        assert!(report.skipped.is_empty());
        assert_eq!(report.bytes_written, fs::metadata(&output).unwrap().len());

        let entries = read_package(fs::File::open(&output).unwrap()).unwrap();
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].identifier, "root1");
        assert_eq!(entries[0].virtual_path, PREFIX);
        assert_eq!(entries[0].meta_bytes, meta("root1").into_bytes());
        assert!(entries[0].content_bytes.is_none());

        assert_eq!(entries[1].identifier, "abc123");
        assert_eq!(entries[1].virtual_path, format!("{}/foo.txt", PREFIX));
        assert_eq!(entries[1].meta_bytes, meta("abc123").into_bytes());
        assert_eq!(entries[1].content_bytes.as_deref(), Some(&b"foo content"[..]));
    }

    #[test]
    fn test_build_is_reproducible() {
        let (dir, root) = sample_tree();
        fs::create_dir_all(root.join("Core/Sub")).unwrap();
        fs::write(root.join("Core.meta"), meta("core")).unwrap();
        for (file, id) in [("Core/b.cs", "b"), ("Core/a.cs", "a"), ("Core/Sub/c.cs", "c")] {
            fs::write(root.join(file), format!("// {id}")).unwrap();
            fs::write(root.join(format!("{file}.meta")), meta(id)).unwrap();
        }

        let first = dir.path().join("first.unitypackage");
        let second = dir.path().join("second.unitypackage");
        let config = Config::new(&root, PREFIX);
        build(&config, &first).unwrap();
        build(&config, &second).unwrap();

        assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());

        let (bytes, _) = build_to_writer(&config, Vec::new()).unwrap();
        assert_eq!(bytes, fs::read(&first).unwrap());
    }

    #[test]
    fn test_build_nested_paths_use_forward_slashes() {
        let (_dir, root) = sample_tree();
        fs::create_dir_all(root.join("Core/Deep")).unwrap();
        fs::write(root.join("Core/Deep/x.cs"), "x").unwrap();
        fs::write(root.join("Core/Deep/x.cs.meta"), meta("x1")).unwrap();

        let (bytes, _) = build_to_writer(&Config::new(&root, PREFIX), Vec::new()).unwrap();
        let entries = read_package(&bytes[..]).unwrap();
        let paths: Vec<_> = entries.iter().map(|e| e.virtual_path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                PREFIX.to_string(),
                format!("{}/foo.txt", PREFIX),
                format!("{}/Core/Deep/x.cs", PREFIX),
            ]
        );
    }

    #[test]
    fn test_build_output_inside_asset_root() {
        let (_dir, root) = sample_tree();
        let output = root.join("pkg.unitypackage");
        let config = Config::new(&root, PREFIX);

        let first = build(&config, &output).unwrap();
        assert!(first.skipped.is_empty(), "{:?}", first.skipped);
        let first_bytes = fs::read(&output).unwrap();

        let second = build(&config, &output).unwrap();
        assert!(second.skipped.is_empty(), "{:?}", second.skipped);
        assert_eq!(second.entries, 2);
        assert_eq!(fs::read(&output).unwrap(), first_bytes);
    }

    #[test]
    fn test_build_pairing_invariant() {
        let (dir, root) = sample_tree();
        fs::create_dir(root.join("Sub")).unwrap();
        fs::write(root.join("Sub.meta"), meta("sub")).unwrap();

        let output = dir.path().join("out.unitypackage");
        build(&Config::new(&root, PREFIX), &output).unwrap();

        for entry in read_package(fs::File::open(&output).unwrap()).unwrap() {
            let is_dir = entry.identifier == "root1" || entry.identifier == "sub";
            assert_eq!(entry.content_bytes.is_none(), is_dir, "{}", entry.identifier);
        }
    }

    #[test]
    fn test_build_skips_file_without_sidecar() {
        let (dir, root) = sample_tree();
        fs::write(root.join("orphan.txt"), "orphan").unwrap();

        let output = dir.path().join("out.unitypackage");
        let report = build(&Config::new(&root, PREFIX), &output).unwrap();

        assert_eq!(report.skipped, vec![root.join("orphan.txt")]);
        let entries = read_package(fs::File::open(&output).unwrap()).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| !e.virtual_path.ends_with("orphan.txt")));
    }

    #[test]
    fn test_malformed_sidecar_leaves_no_output() {
        let (dir, root) = sample_tree();
        fs::write(root.join("zzz.txt"), "late").unwrap();
        fs::write(root.join("zzz.txt.meta"), "fileFormatVersion: 2\n").unwrap();

        let output = dir.path().join("out.unitypackage");
        let err = build(&Config::new(&root, PREFIX), &output).unwrap_err();
        assert!(matches!(err, Error::MalformedSidecar { ref path } if path == &root.join("zzz.txt.meta")));
        assert!(!output.exists());

        // only the tree and root.meta remain, no temp files
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "{leftovers:?}");
    }

    #[test]
    fn test_missing_root_creates_nothing() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.unitypackage");
        let err = build(&Config::new(dir.path().join("absent"), PREFIX), &output).unwrap_err();
        assert!(matches!(err, Error::RootMissing(_)));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_duplicate_identifier_aborts() {
        let (dir, root) = sample_tree();
        fs::write(root.join("twin.txt"), "twin").unwrap();
        fs::write(root.join("twin.txt.meta"), meta("abc123")).unwrap();

        let output = dir.path().join("out.unitypackage");
        match build(&Config::new(&root, PREFIX), &output).unwrap_err() {
            Error::DuplicateIdentifier {
                identifier,
                first,
                second,
            } => {
                assert_eq!(identifier, "abc123");
                assert_eq!(first, root.join("foo.txt"));
                assert_eq!(second, root.join("twin.txt"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!output.exists());
    }

    #[test]
    fn test_invalid_prefix_rejected_before_walk() {
        let (dir, root) = sample_tree();
        let output = dir.path().join("out.unitypackage");
        assert!(matches!(
            build(&Config::new(&root, ""), &output),
            Err(Error::InvalidMountPrefix(_))
        ));
        assert!(!output.exists());
    }

    #[test]
    fn test_compression_level_changes_only_size() {
        let (_dir, root) = sample_tree();
        let mut config = Config::new(&root, PREFIX);
        config.compression_level = 0;
        let (stored, _) = build_to_writer(&config, Vec::new()).unwrap();
        config.compression_level = 9;
        let (best, _) = build_to_writer(&config, Vec::new()).unwrap();

        assert!(stored.len() > best.len());
        assert_eq!(
            read_package(&stored[..]).unwrap(),
            read_package(&best[..]).unwrap()
        );
    }
}
