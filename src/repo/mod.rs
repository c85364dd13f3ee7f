pub mod feedback;

pub use feedback::*;
