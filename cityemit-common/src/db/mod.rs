//! Database initialization and emission queries

pub mod emissions;
pub mod init;

pub use emissions::*;
pub use init::*;
