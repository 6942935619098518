//! Principal name generation
//!
//! Generators and filters are pluggable services kept in ranked registries.
//! The highest-ranked entry is consulted first; the lowest-ranked generator
//! acts as the default.

mod filter;
mod generator;
mod registry;
mod resolver;

pub use filter::{DefaultPrincipalNameFilter, PrincipalNameFilter};
pub use generator::{
    DefaultPrincipalNameGenerator, NAME_HINT_PARAM, NAME_PARAM, NameInfo, PrincipalNameGenerator,
    VALUE_FROM_SUFFIX, parameter_value,
};
pub use registry::{Ranked, RankedRegistry, RegistrationId};
pub use resolver::{PrincipalNameResolver, next_candidate};
