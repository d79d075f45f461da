//! Shared building blocks for the catalog crates: wire types that are not
//! tied to the product domain and process-wide logging setup.

pub mod types;
pub mod utils;
