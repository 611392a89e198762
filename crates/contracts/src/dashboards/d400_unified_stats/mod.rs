pub mod consistency;
pub mod dto;
pub mod view_model;

pub use consistency::*;
pub use dto::*;
pub use view_model::*;
