//! DTOs shared by the dashboard data layer and the stub complaints API.

pub mod dashboards;
pub mod shared;
