mod atomic;

pub use atomic::{fsync_dir, AtomicFile};
