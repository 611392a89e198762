pub mod api;
pub mod auto_refresh;
pub mod consistency;
pub mod loader;
pub mod normalizer;
pub mod source;

pub use auto_refresh::AutoRefresh;
pub use loader::{FetchState, LoadError, ViewDataLoader};
pub use normalizer::{normalize, SchemaError};
pub use source::{source_for, StatsSource, UnifiedSource};
