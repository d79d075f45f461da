use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct CreateProductInputDoc {
    #[schema(example = "Test", min_length = 1, max_length = 100)]
    pub name: String,
    #[schema(example = "Test description", max_length = 500)]
    pub description: Option<String>,
    /// Greater than 0, at most 2 decimal places. Number or numeric string.
    #[schema(example = "100.00")]
    pub price: String,
    #[schema(example = "Test category", min_length = 1, max_length = 50)]
    pub category: String,
    #[schema(example = "S,M,L", max_length = 100)]
    pub sizes: Option<String>,
}

#[derive(ToSchema)]
pub struct ProductSummaryDoc {
    pub id: i32,
    pub name: String,
    #[schema(example = "100.00")]
    pub price: String,
    pub category: String,
}

#[derive(ToSchema)]
pub struct ProductDetailDoc {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    #[schema(example = "100.00")]
    pub price: String,
    pub category: String,
    pub sizes: Option<String>,
}

#[derive(ToSchema)]
pub struct ErrorBodyDoc {
    #[schema(example = "Not Found")]
    pub error: String,
    /// Message, or a map of field name to errors for validation failures.
    #[schema(value_type = Object)]
    pub detail: Option<serde_json::Value>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::products::create,
        crate::routes::products::list,
        crate::routes::products::get,
        crate::routes::products::delete,
    ),
    components(
        schemas(
            HealthResponse,
            CreateProductInputDoc,
            ProductSummaryDoc,
            ProductDetailDoc,
            ErrorBodyDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "products")
    )
)]
pub struct ApiDoc;
