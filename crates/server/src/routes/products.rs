use axum::{http::StatusCode, Json};
use serde::Deserialize;
use service::db::product_service;
use service::product::{CreateProductInput, ProductDetail, ProductSummary, SearchFilter};
use tracing::{error, info};

use crate::errors::JsonApiError;
use crate::extract::{ApiPath, ApiQuery, DbSession, ValidatedJson};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    /// Search by category (substring, case-insensitive)
    pub category: Option<String>,
    /// Search by product name (substring, case-insensitive)
    pub name: Option<String>,
}

fn product_not_found(id: i32) -> JsonApiError {
    JsonApiError::not_found(format!("Product with ID {id} not found."))
}

#[utoipa::path(
    post, path = "/api/v1/products", tag = "products",
    request_body = crate::openapi::CreateProductInputDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::ProductDetailDoc),
        (status = 422, description = "Validation Error", body = crate::openapi::ErrorBodyDoc),
        (status = 500, description = "Create Failed", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn create(
    DbSession(session): DbSession,
    ValidatedJson(input): ValidatedJson<CreateProductInput>,
) -> Result<(StatusCode, Json<ProductDetail>), JsonApiError> {
    info!(name = %input.name, category = %input.category, "product_create_request");
    match product_service::create_product(&session, input).await {
        Ok(m) => Ok((StatusCode::CREATED, Json(ProductDetail::from(m)))),
        Err(e) => {
            error!(err = %e, "create product failed");
            Err(JsonApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Create Failed",
                Some("product could not be stored".into()),
            ))
        }
    }
}

/// Any query parameter present, even empty, switches to search; an empty
/// result is reported as 404 rather than an empty list.
#[utoipa::path(
    get, path = "/api/v1/products", tag = "products",
    params(ProductQuery),
    responses(
        (status = 200, description = "Products", body = [crate::openapi::ProductSummaryDoc]),
        (status = 404, description = "Products not found", body = crate::openapi::ErrorBodyDoc),
        (status = 422, description = "Malformed query string", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn list(
    DbSession(session): DbSession,
    ApiQuery(q): ApiQuery<ProductQuery>,
) -> Result<Json<Vec<ProductSummary>>, JsonApiError> {
    let rows = if q.category.is_some() || q.name.is_some() {
        let filter = SearchFilter::new(q.name, q.category);
        product_service::search_products(&session, &filter).await?
    } else {
        product_service::list_products(&session).await?
    };
    if rows.is_empty() {
        return Err(JsonApiError::not_found("Products not found."));
    }
    info!(count = rows.len(), "list products");
    Ok(Json(rows.into_iter().map(ProductSummary::from).collect()))
}

#[utoipa::path(
    get, path = "/api/v1/products/{id}", tag = "products",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::ProductDetailDoc),
        (status = 404, description = "Product not found", body = crate::openapi::ErrorBodyDoc),
        (status = 422, description = "ID is not an integer", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn get(
    DbSession(session): DbSession,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<ProductDetail>, JsonApiError> {
    match product_service::get_product(&session, id).await? {
        Some(m) => Ok(Json(ProductDetail::from(m))),
        None => Err(product_not_found(id)),
    }
}

#[utoipa::path(
    delete, path = "/api/v1/products/{id}", tag = "products",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Product successfully deleted"),
        (status = 404, description = "Product not found", body = crate::openapi::ErrorBodyDoc),
        (status = 422, description = "ID is not an integer", body = crate::openapi::ErrorBodyDoc),
        (status = 500, description = "Storage failure", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn delete(
    DbSession(session): DbSession,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, JsonApiError> {
    if product_service::delete_product(&session, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(product_not_found(id))
    }
}
