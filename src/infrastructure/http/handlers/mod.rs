//! HTTP Handlers

mod align;
mod catalog;
mod speech;
mod status;

pub use align::*;
pub use catalog::*;
pub use speech::*;
pub use status::*;
