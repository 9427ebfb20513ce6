//! Persistence abstraction and JSON codec.

/// JSON file sink with atomic replace.
pub mod json_file;
/// Shared in-memory sink.
pub mod memory;

use crate::{contact::Contact, core::store::StoreError};

/// Errors raised while reading, writing, or decoding persisted contacts.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// The underlying byte source failed.
    #[error("contact file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// The bytes were not a valid contact array.
    #[error("contact JSON is invalid: {0}")]
    Serde(#[from] serde_json::Error),
    /// The decoded contacts could not form a store.
    #[error("persisted contacts rejected: {0}")]
    Store(#[from] StoreError),
}

/// Result alias for persistence operations.
pub type PersistResult<T> = Result<T, PersistError>;

/// Byte source and destination for the persisted contact array.
pub trait ContactSink: Send {
    /// Reads the persisted bytes, or `None` when nothing has been saved yet.
    fn read_bytes(&self) -> PersistResult<Option<Vec<u8>>>;

    /// Replaces the persisted bytes.
    fn write_bytes(&mut self, bytes: &[u8]) -> PersistResult<()>;
}

/// Encodes contacts as a pretty-printed JSON array.
pub fn encode_contacts(contacts: &[Contact]) -> PersistResult<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(contacts)?)
}

/// Decodes a JSON array of contacts. Any bad element fails the whole array.
pub fn decode_contacts(bytes: &[u8]) -> PersistResult<Vec<Contact>> {
    Ok(serde_json::from_slice(bytes)?)
}
