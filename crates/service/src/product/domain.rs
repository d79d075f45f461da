use std::borrow::Cow;

use models::product::{self, PRICE_PRECISION, PRICE_SCALE};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Create input. `price` accepts a JSON number or a numeric string; numbers
/// are read from their literal digits, never through `f64`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateProductInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,
    #[validate(length(min = 1, max = 50))]
    pub category: String,
    #[validate(length(max = 100))]
    pub sizes: Option<String>,
}

impl CreateProductInput {
    /// Price at the column's fixed scale, e.g. `100` becomes `100.00`.
    pub fn normalized_price(&self) -> Decimal { fixed_scale(self.price) }
}

/// Listing view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: i32,
    pub name: String,
    pub price: Decimal,
    pub category: String,
}

/// Full view, returned on create and on lookup by id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetail {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category: String,
    pub sizes: Option<String>,
}

impl From<product::Model> for ProductSummary {
    fn from(m: product::Model) -> Self {
        Self { id: m.id, name: m.name, price: fixed_scale(m.price), category: m.category }
    }
}

impl From<product::Model> for ProductDetail {
    fn from(m: product::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            price: fixed_scale(m.price),
            category: m.category,
            sizes: m.sizes,
        }
    }
}

/// Search criteria. A filter that is absent or empty matches nothing on its
/// own and is left out of the query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    pub name: Option<String>,
    pub category: Option<String>,
}

impl SearchFilter {
    pub fn new(name: Option<String>, category: Option<String>) -> Self { Self { name, category } }

    pub fn name(&self) -> Option<&str> { self.name.as_deref().filter(|s| !s.is_empty()) }

    pub fn category(&self) -> Option<&str> { self.category.as_deref().filter(|s| !s.is_empty()) }

    /// True when no filter narrows the result, i.e. a search equals a full listing.
    pub fn is_unfiltered(&self) -> bool { self.name().is_none() && self.category().is_none() }
}

fn fixed_scale(price: Decimal) -> Decimal {
    let mut p = price;
    p.rescale(PRICE_SCALE);
    p
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price <= Decimal::ZERO {
        return Err(price_error("range", "price must be greater than 0"));
    }
    if price.normalize().scale() > PRICE_SCALE {
        return Err(price_error("decimal_places", "price must have at most 2 decimal places"));
    }
    // DECIMAL(10, 2) leaves 8 digits before the point
    let limit = Decimal::from(10i64.pow(PRICE_PRECISION - PRICE_SCALE));
    if price.trunc() >= limit {
        return Err(price_error("max_digits", "price must be below 100000000"));
    }
    Ok(())
}

fn price_error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}
