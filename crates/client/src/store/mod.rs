//! [`RemoteStore`](sitecfg_core::RemoteStore) implementations.

pub mod firestore;
pub mod memory;

pub use firestore::{FirestoreConfig, FirestoreError, FirestoreStore};
pub use memory::MemoryStore;
