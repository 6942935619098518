//! Request parameter parsing
//!
//! - `params.rs` - ordered parameter multimap
//! - `classifier.rs` - parameter name to `(path, suffix)` classification
//! - `property.rs` - one pending mutation (`RequestProperty`)
//! - `tree.rs` - the folded mutation descriptor (`RequestPropertyTree`)

pub mod classifier;
mod params;
mod property;
mod tree;

pub use classifier::{ClassifiedName, Suffix, classify};
pub use params::RequestParameters;
pub use property::{JCR_MIXIN_TYPES, JCR_PRIMARY_TYPE, RequestProperty};
pub use tree::RequestPropertyTree;
