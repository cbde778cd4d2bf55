//! quizbox-store: Append-only store for submitted quiz results
//!
//! Keeps every submission, in arrival order, as one JSON array in a
//! single backing file. Appends are serialized through one writer lock
//! and land on disk through write-fsync-rename, so readers always see
//! the last complete version of the collection.

pub mod error;
pub mod record;
pub mod store;

pub use error::StoreError;
pub use record::ResultRecord;
pub use store::{DEFAULT_FILE_NAME, ResultStore};
