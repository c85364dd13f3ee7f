pub mod motivation;
pub mod recorder;
pub mod timer;

pub use motivation::random_phrase;
pub use recorder::*;
pub use timer::*;
