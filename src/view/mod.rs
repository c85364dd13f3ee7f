//! Presentation layer: table rows and the details panel

pub mod rows;
pub mod details;

pub use rows::*;
pub use details::*;
