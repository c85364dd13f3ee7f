pub mod parser;
pub mod evaluator;

pub use parser::*;
pub use evaluator::*;
