//! In-memory storage backend.
//!
//! Always compiled; used by tests and by the `memory` store option of the CLI.

mod store;

pub use store::InMemoryStore;
