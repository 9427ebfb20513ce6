//! Runtime event stream payloads.

use crate::types::ContactId;

/// Events emitted from the single-writer runtime loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactEvent {
    /// A new contact was inserted.
    Inserted {
        /// Inserted contact id.
        id: ContactId,
        /// Sorted position it landed at.
        index: usize,
    },
    /// An existing contact was replaced or patched.
    Updated {
        /// Updated contact id.
        id: ContactId,
        /// Sorted position after the change.
        index: usize,
    },
    /// One or more contacts were removed.
    Removed {
        /// Removed ids, in their former order.
        ids: Vec<ContactId>,
    },
    /// The full contact list was written to the sink.
    Saved {
        /// Number of contacts written.
        count: usize,
    },
    /// Writing to the sink failed; the in-memory store is unchanged.
    SaveFailed {
        /// Rendered error.
        message: String,
    },
}
