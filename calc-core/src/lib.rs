pub mod calculations;
pub mod calculators;
pub mod export;
pub mod format;
pub mod models;
pub mod session;
pub mod store;

pub use calculators::Calculator;
pub use format::Locale;
pub use models::*;
pub use session::{CalculatorSession, SessionError};
pub use store::{HistoryError, KeyValueStore, ResultHistory, StoreError};
