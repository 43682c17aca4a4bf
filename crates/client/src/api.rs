use product_catalog_core::{ApiErrorBody, CreateProductRequest, ProductDto};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

pub const GENERIC_ERROR: &str = "An unexpected error occurred";

/// Client for the catalog HTTP API.
#[derive(Clone)]
pub struct CatalogClient {
    http: Client,
    base_url: Url,
}

impl CatalogClient {
    /// Creates a client rooted at `base_url`; a trailing slash is added when missing
    /// so relative joins keep any path prefix.
    pub fn new(mut base_url: Url, http: Client) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { http, base_url }
    }

    /// Issues `POST /products`.
    pub async fn create_product(
        &self,
        request: &CreateProductRequest,
    ) -> Result<ProductDto, ClientError> {
        let url = self.base_url.join("products")?;
        let response = self.http.post(url).json(request).send().await?;
        parse_json(response).await
    }

    /// Issues `GET /products`.
    pub async fn list_products(&self) -> Result<Vec<ProductDto>, ClientError> {
        let url = self.base_url.join("products")?;
        let response = self.http.get(url).send().await?;
        parse_json(response).await
    }
}

/// Errors produced by the catalog client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to build url: {0}")]
    Url(#[from] url::ParseError),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("api rejected request with status {status}: {}", .body.message)]
    Api {
        status: StatusCode,
        body: ApiErrorBody,
    },
}

impl ClientError {
    /// Text suitable for showing to the person filling in the form.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { body, .. } if !body.display_message().is_empty() => {
                body.display_message().to_string()
            }
            _ => GENERIC_ERROR.to_string(),
        }
    }

    /// Field-scoped messages reported by the server, if any.
    pub fn field_errors(&self) -> Option<&product_catalog_core::FieldErrors> {
        match self {
            Self::Api { body, .. } => body.errors.as_ref(),
            _ => None,
        }
    }
}

async fn parse_json<T>(response: Response) -> Result<T, ClientError>
where
    T: DeserializeOwned,
{
    let status = response.status();
    if !status.is_success() {
        let body = response
            .json::<ApiErrorBody>()
            .await
            .unwrap_or_else(|_| ApiErrorBody::new(GENERIC_ERROR));
        return Err(ClientError::Api { status, body });
    }

    Ok(response.json().await?)
}
