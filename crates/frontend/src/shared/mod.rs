pub mod api_utils;
pub mod cancel;
pub mod config;
pub mod date_utils;

pub use api_utils::{ApiClient, ApiError};
pub use cancel::CancelToken;
pub use config::{ApiMode, Config};
