//! Data layer of the complaints admin dashboard.
//!
//! Views get their state from a [`ViewDataLoader`]: it fetches statistics
//! from the complaints API, normalizes them into the page's view model and
//! guarantees that only the latest request of a view commits.
//!
//! ```ignore
//! let config = shared::config::load_config()?;
//! let loader = ViewDataLoader::from_config(PageType::Dashboard, &config)?;
//! let _auto = AutoRefresh::enable(loader.clone(), config.refresh_interval());
//! loader.mount().await;
//! let state = loader.snapshot();
//! ```

pub mod dashboards;
pub mod shared;

pub use contracts::dashboards::d400_unified_stats::PageType;
pub use dashboards::{AutoRefresh, FetchState, ViewDataLoader};
