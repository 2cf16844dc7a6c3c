//! high-level operations: building, planning and listing packages

mod build;
mod list;
mod plan;

pub use build::{build, build_to_writer, BuildReport};
pub use list::{list, ListEntry};
pub use plan::{plan, Plan};
