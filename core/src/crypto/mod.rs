pub mod types;
pub mod kdf;
pub mod envelope;
pub mod cbc;

pub use types::*;
pub use kdf::*;
pub use envelope::*;
pub use cbc::*;
