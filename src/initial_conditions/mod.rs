mod gaussian;

pub use gaussian::*;
