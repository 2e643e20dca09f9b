//! Command implementations for the CryptoPAn CLI.

pub mod scrub;

pub use scrub::scrub_file;
