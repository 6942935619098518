pub mod error;
pub mod path;
pub mod types;
pub mod value;

pub use error::{SyncError, Result};
pub use types::{PropertyType, TypeHint};
pub use value::{PropertyValue, Value, ValueEntry};
