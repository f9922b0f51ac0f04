pub mod algorithm;
pub mod round;

pub use algorithm::*;
pub use round::*;
