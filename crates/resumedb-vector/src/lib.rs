//! LanceDB-backed storage and similarity search for resume chunks.
pub mod inspect;
pub mod schema;
pub mod store;
pub mod table;

pub use inspect::{dump_records, list_collections, StoredRecord};
pub use store::ResumeStore;
pub use table::open_db;
