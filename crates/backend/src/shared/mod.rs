pub mod config;
pub mod fixtures;

pub use fixtures::{AppState, FixtureResponse, Fixtures, RecordedRequest};
