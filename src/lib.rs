//! Soldier roster and base-visit request tracking
//!
//! Soldiers and requests are kept in two JSON collections in a key-value blob
//! store. Requests are rendered into Hebrew text messages that are sent to the
//! base being visited.

pub mod domain;
pub use domain::{
    Config, NewSoldier, Request, RequestDraft, RequestFilter, RequestKind, RequestStatus,
    RequestView, Soldier, SoldierId, ValidationError, generate_message,
};

/// Blob stores and the record store built on them.
pub mod storage;
pub use storage::{FileStore, MemoryStore, Store, StoreError};
