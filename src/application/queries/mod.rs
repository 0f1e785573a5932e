//! 应用层 - 查询（读操作）
//!
//! 不占用流水线许可的只读请求

mod catalog_queries;
mod status_queries;

pub mod handlers;

pub use catalog_queries::*;
pub use status_queries::*;
