use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use metrics::{counter, histogram};
use tracing::{error, info, warn};

use product_catalog_core::{CreateProductRequest, FieldErrors, ProductDto};

use crate::problem::ProblemResponse;
use crate::router::AppState;
use crate::service::CreateProductError;

pub const DUPLICATE_NAME: &str = "A product with this name already exists";
pub const CREATE_FAILED: &str = "An unexpected error occurred while creating the product";
pub const LIST_FAILED: &str = "An unexpected error occurred while listing products";

/// `POST /products`
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<Response, ProblemResponse> {
    let start = Instant::now();
    let result = create_product(&state, payload).await;
    histogram!("product_create_seconds").record(start.elapsed().as_secs_f64());
    result
}

async fn create_product(
    state: &AppState,
    payload: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<Response, ProblemResponse> {
    let Json(request) = payload.map_err(|rejection| {
        counter!("product_create_rejected_total", "reason" => "invalid_body").increment(1);
        warn!(stage = "api", error = %rejection, "rejected unreadable create request body");
        ProblemResponse::validation(FieldErrors::single("body", rejection.body_text()))
    })?;

    let new_product = request.into_new_product().map_err(|errors| {
        counter!("product_create_rejected_total", "reason" => "validation").increment(1);
        ProblemResponse::validation(errors)
    })?;

    match state.products().create_product(new_product).await {
        Ok(product) => {
            counter!("products_created_total", "type" => product.product_type.as_str())
                .increment(1);
            info!(stage = "api", id = product.id, name = %product.name, "product created");
            let location = format!("/products/{}", product.id);
            Ok((
                StatusCode::CREATED,
                [(header::LOCATION, location)],
                Json(ProductDto::from(product)),
            )
                .into_response())
        }
        Err(CreateProductError::DuplicateName) => {
            counter!("product_create_rejected_total", "reason" => "duplicate_name").increment(1);
            warn!(stage = "api", "rejected product with duplicate name");
            Err(ProblemResponse::field("name", DUPLICATE_NAME))
        }
        Err(err @ CreateProductError::Storage(_)) => {
            counter!("product_create_rejected_total", "reason" => "storage").increment(1);
            error!(stage = "api", error = %err, "failed to create product");
            Err(ProblemResponse::internal(CREATE_FAILED))
        }
    }
}

/// `GET /products`
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ProductDto>>, ProblemResponse> {
    let products = state.products().list_products().await.map_err(|err| {
        error!(stage = "api", error = %err, "failed to list products");
        ProblemResponse::internal(LIST_FAILED)
    })?;

    Ok(Json(products.into_iter().map(ProductDto::from).collect()))
}
