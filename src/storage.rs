pub mod blob;
mod seed;
pub mod store;

pub use blob::{BlobError, BlobStore, FileStore, MemoryStore};
pub use store::{REQUESTS_KEY, SOLDIERS_KEY, Store, StoreError};
