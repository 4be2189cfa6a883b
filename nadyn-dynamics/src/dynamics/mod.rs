pub use ehrenfest::*;
pub use electronic::*;
pub use reordering::*;

pub mod ehrenfest;
pub mod electronic;
pub mod reordering;
pub mod utils;
