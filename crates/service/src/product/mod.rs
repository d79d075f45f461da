//! Product contracts: what a client may send and the two views it gets back.

pub mod domain;

pub use domain::{CreateProductInput, ProductDetail, ProductSummary, SearchFilter};
