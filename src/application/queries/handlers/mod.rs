//! Query Handlers 实现

mod catalog_handlers;
mod status_handlers;

pub use catalog_handlers::*;
pub use status_handlers::*;
