pub mod commands;
pub mod error;
pub mod local;
pub mod name;
pub mod session;
pub mod store;

pub use error::{Error, Result};
