//! Posts, comments and likes.
mod model;
mod service;
mod view;

pub use model::*;
pub use service::*;
pub use view::*;
