use std::path::PathBuf;

/// error type for assetpack operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("asset root not found: {0}")]
    RootMissing(PathBuf),

    #[error("no identifier found in sidecar {path}")]
    MalformedSidecar { path: PathBuf },

    #[error("duplicate identifier {identifier}: {first} and {second}")]
    DuplicateIdentifier {
        identifier: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("path is not valid utf-8: {0}")]
    NonUtf8Path(PathBuf),

    #[error("invalid mount prefix: {0}")]
    InvalidMountPrefix(String),

    #[error("invalid identifier key {key:?}: {message}")]
    InvalidIdentifierKey { key: String, message: String },

    #[error("invalid exclude pattern {pattern}: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write package member {member}: {source}")]
    Archive {
        member: String,
        #[source]
        source: std::io::Error,
    },

    #[error("traversal failed at {path}: {message}")]
    Walk { path: PathBuf, message: String },

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("corrupt package: {0}")]
    CorruptPackage(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// helper to wrap io errors with path context
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.into(),
            source,
        })
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(PathBuf::from).unwrap_or_default();
        match err.into_io_error() {
            Some(source) => Error::Io { path, source },
            None => Error::Walk {
                path,
                message: "filesystem loop detected".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_path_attaches_context() {
        let res: std::io::Result<()> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "gone",
        ));
        let err = res.with_path("/some/file").unwrap_err();
        match &err {
            Error::Io { path, .. } => assert_eq!(path, &PathBuf::from("/some/file")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("/some/file"));
    }

    #[test]
    fn test_diagnostics_name_the_path() {
        let err = Error::MalformedSidecar {
            path: PathBuf::from("Editor/foo.cs.meta"),
        };
        assert_eq!(
            err.to_string(),
            "no identifier found in sidecar Editor/foo.cs.meta"
        );
    }
}
