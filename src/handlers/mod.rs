//! HTTP handlers

pub mod health;
pub mod pages;
pub mod dataset;
pub mod files;
pub mod detect;
