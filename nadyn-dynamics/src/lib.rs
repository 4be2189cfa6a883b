pub mod constants;
pub mod defaults;
pub mod dynamics;
pub mod ensemble;
pub mod error;
pub mod hamiltonian;
pub mod initialization;
pub mod interface;
pub mod linalg;
pub mod output;

pub use error::{DynamicsError, Result};

/// Complex double precision number used for amplitudes and all complex matrices
#[allow(non_camel_case_types)]
pub type c64 = num_complex::Complex<f64>;
