// ============================================================================
// authsync Library
// ============================================================================
//
// Synchronizes request parameters onto user and group entities stored in a
// hierarchical repository.
//
// ============================================================================

pub mod core;
pub mod config;
pub mod coercion;
pub mod request;
pub mod change;
pub mod store;
pub mod sync;
pub mod naming;
pub mod service;

// Re-export main types for convenience
pub use crate::core::{PropertyType, PropertyValue, Result, SyncError, TypeHint, Value, ValueEntry};
pub use config::SyncConfig;
pub use change::{Change, ChangeKind, ChangeLog};
pub use request::{RequestParameters, RequestPropertyTree};

// Re-export repository API
pub use store::{
    AuthorizableKind,
    AuthorizableRef,
    AuthorizableStore,
    MemoryRepository,
    NodeStore,
    NodeTypeDef,
};

// Re-export engine and naming API
pub use sync::PropertySync;
pub use naming::{
    NameInfo,
    PrincipalNameFilter,
    PrincipalNameGenerator,
    PrincipalNameResolver,
};
pub use service::AuthorizableService;
