mod common;
pub mod convert;
pub mod ratio;
pub mod tensor;

pub use convert::*;
pub use ratio::*;
pub use tensor::*;
