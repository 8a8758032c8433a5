mod chart;
mod condition;
mod definition;
mod field;
mod output;
mod saved_result;
mod state;
mod value;

pub use chart::{ChartDefinition, ChartError, ChartKind, ChartPoint, ChartRenderer, ChartSpec};
pub use condition::Condition;
pub use definition::{CalculatorDefinition, HistoryPolicy};
pub use field::{FieldKind, InputField, SelectOption};
pub use output::{OutputField, OutputUnit, OutputValue, OutputValues};
pub use saved_result::SavedResult;
pub use state::InputState;
pub use value::{InputValue, parse_optional_decimal};
