//! Data models

mod audit;

pub use audit::*;
