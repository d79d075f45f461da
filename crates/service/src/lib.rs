//! Service layer for the product catalog.
//! - `product::domain` holds the input/output contracts and their validation.
//! - `db` holds the data-access operations, each run against a `Session`.
//! - `session` hands out one scoped unit-of-work per request.

pub mod errors;
pub mod session;
pub mod product;
pub mod db;
#[cfg(test)]
pub mod test_support;
