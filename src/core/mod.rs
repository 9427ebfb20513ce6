//! In-memory authoritative store and ordering helpers.

/// Sorted-insertion helpers.
pub mod sorted;
/// Keep-sorted contact store.
pub mod store;
