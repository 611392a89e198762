pub mod api;
pub mod source;

pub use source::LegacySource;
