// femtoseconds to atomic units of time
pub const FS_TO_AU: f64 = 41.341374575751;
// atomic units of time to femtoseconds
pub const AU_TO_FS: f64 = 1.0 / FS_TO_AU;
// atomic mass unit in units of the electron mass
pub const AMU_TO_AU: f64 = 1822.888486209;
