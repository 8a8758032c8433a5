//! Persistence of saved results.
//!
//! Backends implement [`KeyValueStore`] and are created through a
//! [`StoreRegistry`] from a [`StoreConfig`]. [`ResultHistory`] layers the
//! saved-results lists on top of any backend.

mod factory;
mod history;
mod key_value;
mod memory;

pub use factory::{StoreConfig, StoreFactory, StoreRegistry};
pub use history::{HistoryError, ResultHistory};
pub use key_value::{KeyValueStore, StoreError};
pub use memory::{MemoryStore, MemoryStoreFactory};
