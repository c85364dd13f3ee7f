// Core data models for Xbito
// These structs represent the domain entities

pub mod task;
pub mod raw;
pub mod feedback;

pub use task::*;
pub use raw::*;
pub use feedback::*;
