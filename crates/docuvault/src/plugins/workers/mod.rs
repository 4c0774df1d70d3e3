//! Built-in reference workers.
//!
//! - [`FileTypeValidator`] — content sniffing against an allow-list
//! - [`ContentHashWorker`] — SHA-256 digest annotation
//! - [`StorageWriter`] — the persistence write
//! - [`TagWorker`] — tag application after a successful store

mod filetype;
mod hash;
mod storage;
mod tags;

pub use filetype::FileTypeValidator;
pub use hash::ContentHashWorker;
pub use storage::StorageWriter;
pub use tags::TagWorker;
