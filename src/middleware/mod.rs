//! Request middleware and extractors

pub mod session;
