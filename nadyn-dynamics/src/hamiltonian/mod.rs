pub use ensemble::*;
pub use vibronic::*;

pub mod ensemble;
pub mod vibronic;
