//! SQLite backend for the saved-results store.

mod factory;
mod store;

pub use factory::SqliteStoreFactory;
pub use store::SqliteStore;
