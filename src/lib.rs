//! Keep-sorted in-memory contact store with JSON persistence.
//!
//! # Examples
//!
//! In-memory usage with [`core::store::ContactStore`]:
//! ```
//! use contactbook::{contact::Contact, core::store::ContactStore};
//!
//! let mut store = ContactStore::new();
//! store.insert(Contact::new("Jane", "Smith", "614-555-3456", "jsmith@devnull.com")).expect("insert");
//! store.insert(Contact::new("George", "Jones", "614-555-1234", "gjones@devnull.com")).expect("insert");
//! let index = store.insert(Contact::new(" Kim ", "Wilson", "", "")).expect("insert");
//! assert_eq!(index, 2);
//!
//! let names: Vec<_> = store.iter().map(|c| c.full_name()).collect();
//! assert_eq!(names, ["George Jones", "Jane Smith", "Kim Wilson"]);
//! ```
//!
//! Runtime usage with a JSON file, saved on shutdown:
//! ```no_run
//! use contactbook::{
//!     contact::Contact,
//!     core::store::ContactStore,
//!     persist::json_file::JsonFileSink,
//!     runtime::handle::{spawn_contact_book, RuntimeConfig},
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let sink = JsonFileSink::default_location();
//! let store = ContactStore::load(&sink);
//! let handle = spawn_contact_book(store, Some(Box::new(sink)), RuntimeConfig::default());
//! handle.add(Contact::new("Jane", "Smith", "", "")).await.expect("add");
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```
#![deny(missing_docs)]

/// Contact record and patch types.
pub mod contact;
/// Core in-memory store and ordering helpers.
pub mod core;
/// Draft-based editing of a single contact.
pub mod edit;
/// Persistence abstraction, JSON codec, and sinks.
pub mod persist;
/// Single-writer runtime handle and events.
pub mod runtime;
/// Shared primitive types.
pub mod types;
