//! Core business logic for ladle.

pub mod services;

pub use services::*;
