//! Transaction module split into types and integrity for better modularity

pub mod integrity;
pub mod types;

pub use types::*;
// integrity functions are addressed through the module, mirroring how
// callers invoke them: integrity::sign, integrity::validate_signatures
