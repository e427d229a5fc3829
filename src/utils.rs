//! General-use utility functions.

pub mod errors;
pub mod files;
pub mod log;
pub mod user;
