//! Session route handlers

pub mod logout;
pub mod refresh;

pub use logout::logout;
pub use refresh::refresh;
