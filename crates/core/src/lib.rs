//! Core business logic for roboclub.

pub mod services;

pub use services::*;
