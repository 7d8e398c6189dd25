//! Data models

pub mod dataset;
pub mod detection;

pub use dataset::*;
pub use detection::*;
