//! Data models for the upload pipeline
//!
//! Every value here is created for a single upload call and dropped when the
//! call returns.

mod entity;
mod request;
mod result;
mod transform;

pub use entity::*;
pub use request::*;
pub use result::*;
pub use transform::*;
