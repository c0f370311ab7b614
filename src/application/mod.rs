//! # Application Layer
//!
//! Use cases and the client seam coordinating domain and connector layers.

pub mod interfaces;
pub mod use_cases;

pub use interfaces::*;
pub use use_cases::*;
