//! State behind the "create product" form.
//!
//! Each field moves from untouched to touched on its first blur (or on a
//! submit attempt) and is then either valid or invalid. Messages for
//! untouched fields are tracked but not shown.
use std::collections::{BTreeMap, BTreeSet};

use product_catalog_core::validation;
use product_catalog_core::{CreateProductRequest, ProductDto};
use thiserror::Error;

use crate::api::{CatalogClient, ClientError};

/// Route shown after a successful submission.
pub const LANDING_PATH: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Name,
    Description,
    Type,
}

impl Field {
    pub const ALL: [Field; 3] = [Self::Name, Self::Description, Self::Type];

    /// Wire name used by the API for this field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
            Self::Type => "type",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState {
    Untouched,
    Valid,
    Invalid,
}

/// Reasons a submit attempt never reached the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitBlocked {
    #[error("a submission is already in flight")]
    InFlight,
    #[error("the form has invalid fields")]
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(ProductDto),
    Failed(String),
}

impl SubmitOutcome {
    /// Where to navigate next, if anywhere.
    pub fn redirect(&self) -> Option<&'static str> {
        match self {
            Self::Created(_) => Some(LANDING_PATH),
            Self::Failed(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    name: String,
    description: String,
    product_type: String,
    errors: BTreeMap<Field, &'static str>,
    touched: BTreeSet<Field>,
    in_flight: bool,
    banner: Option<String>,
}

impl ProductForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Description => &self.description,
            Field::Type => &self.product_type,
        }
    }

    /// Updates a field; touched fields are re-validated immediately.
    pub fn change(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Name => self.name = value,
            Field::Description => self.description = value,
            Field::Type => self.product_type = value,
        }

        if self.touched.contains(&field) {
            self.revalidate(field);
        }
    }

    pub fn blur(&mut self, field: Field) {
        self.touched.insert(field);
        self.revalidate(field);
    }

    /// Touches and checks every field, returning `true` when all pass.
    pub fn validate_all(&mut self) -> bool {
        for field in Field::ALL {
            self.touched.insert(field);
            self.revalidate(field);
        }
        self.errors.is_empty()
    }

    fn revalidate(&mut self, field: Field) {
        let value = self.value(field);
        let violation = match field {
            Field::Name => validation::name_violation(value),
            Field::Description => validation::description_violation(value),
            Field::Type => validation::type_violation(Some(value)),
        };

        match violation {
            Some(message) => {
                self.errors.insert(field, message);
            }
            None => {
                self.errors.remove(&field);
            }
        }
    }

    /// Message to display under `field`, shown only once the field is touched.
    pub fn error(&self, field: Field) -> Option<&'static str> {
        if !self.touched.contains(&field) {
            return None;
        }
        self.errors.get(&field).copied()
    }

    pub fn field_state(&self, field: Field) -> FieldState {
        if !self.touched.contains(&field) {
            FieldState::Untouched
        } else if self.errors.contains_key(&field) {
            FieldState::Invalid
        } else {
            FieldState::Valid
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight
    }

    /// Whether the submit control should be enabled.
    pub fn can_submit(&self) -> bool {
        !self.in_flight && self.errors.is_empty()
    }

    /// Error banner left by the last failed submission.
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    /// Re-validates everything and, if the form may be sent, marks it in flight
    /// and returns the request body to dispatch.
    pub fn begin_submit(&mut self) -> Result<CreateProductRequest, SubmitBlocked> {
        if self.in_flight {
            return Err(SubmitBlocked::InFlight);
        }
        if !self.validate_all() {
            return Err(SubmitBlocked::Invalid);
        }

        self.in_flight = true;
        self.banner = None;
        Ok(self.request())
    }

    /// Records the server's answer for the in-flight submission.
    pub fn finish_submit(&mut self, result: Result<ProductDto, ClientError>) -> SubmitOutcome {
        self.in_flight = false;
        match result {
            Ok(product) => SubmitOutcome::Created(product),
            Err(err) => {
                let message = err.user_message();
                self.banner = Some(message.clone());
                SubmitOutcome::Failed(message)
            }
        }
    }

    /// Runs a whole submission against the API.
    pub async fn submit(&mut self, client: &CatalogClient) -> Result<SubmitOutcome, SubmitBlocked> {
        let request = self.begin_submit()?;
        let result = client.create_product(&request).await;
        Ok(self.finish_submit(result))
    }

    fn request(&self) -> CreateProductRequest {
        let product_type = match self.product_type.trim() {
            "" => None,
            value => Some(value.to_string()),
        };

        CreateProductRequest {
            name: Some(self.name.trim().to_string()),
            description: Some(self.description.trim().to_string()),
            product_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use product_catalog_core::validation::{NAME_REQUIRED, NAME_TOO_LONG, TYPE_REQUIRED};
    use product_catalog_core::{ApiErrorBody, FieldErrors, ProductType};
    use reqwest::{Client, StatusCode};
    use serde_json::json;
    use url::Url;

    fn filled_form() -> ProductForm {
        let mut form = ProductForm::new();
        form.change(Field::Name, "  Espresso ");
        form.change(Field::Description, "Strong coffee\n");
        form.change(Field::Type, "Drink");
        form
    }

    fn rejection(body: ApiErrorBody) -> ClientError {
        ClientError::Api {
            status: StatusCode::BAD_REQUEST,
            body,
        }
    }

    #[test]
    fn untouched_fields_hide_errors() {
        let mut form = ProductForm::new();
        form.change(Field::Name, "");

        assert_eq!(form.error(Field::Name), None);
        assert_eq!(form.field_state(Field::Name), FieldState::Untouched);
    }

    #[test]
    fn blur_marks_touched_and_validates() {
        let mut form = ProductForm::new();
        form.blur(Field::Name);

        assert_eq!(form.error(Field::Name), Some(NAME_REQUIRED));
        assert_eq!(form.field_state(Field::Name), FieldState::Invalid);
        assert!(!form.can_submit());
    }

    #[test]
    fn change_after_touch_revalidates() {
        let mut form = ProductForm::new();
        form.blur(Field::Name);

        form.change(Field::Name, "Tea");
        assert_eq!(form.field_state(Field::Name), FieldState::Valid);

        form.change(Field::Name, "t".repeat(201));
        assert_eq!(form.error(Field::Name), Some(NAME_TOO_LONG));
    }

    #[test]
    fn invalid_form_blocks_submission_and_touches_everything() {
        let mut form = ProductForm::new();
        form.change(Field::Name, "Tea");

        assert_eq!(form.begin_submit(), Err(SubmitBlocked::Invalid));
        assert!(!form.is_submitting());
        assert_eq!(form.field_state(Field::Name), FieldState::Valid);
        assert_eq!(form.error(Field::Type), Some(TYPE_REQUIRED));
        assert!(Field::ALL
            .into_iter()
            .all(|field| form.field_state(field) != FieldState::Untouched));
    }

    #[test]
    fn valid_form_dispatches_trimmed_request_once() {
        let mut form = filled_form();

        let request = form.begin_submit().expect("valid form");
        assert_eq!(request.name.as_deref(), Some("Espresso"));
        assert_eq!(request.description.as_deref(), Some("Strong coffee"));
        assert_eq!(request.product_type.as_deref(), Some("Drink"));
        assert!(form.is_submitting());
        assert!(!form.can_submit());

        assert_eq!(form.begin_submit(), Err(SubmitBlocked::InFlight));
    }

    #[test]
    fn rejection_surfaces_first_field_error() {
        let mut form = filled_form();
        form.begin_submit().expect("valid form");

        let mut errors = FieldErrors::single("name", "A product with this name already exists");
        errors.push("type", "ignored");
        let outcome = form.finish_submit(Err(rejection(ApiErrorBody::with_errors(
            "Validation failed",
            errors,
        ))));

        assert_eq!(
            outcome,
            SubmitOutcome::Failed("A product with this name already exists".to_string())
        );
        assert_eq!(outcome.redirect(), None);
        assert_eq!(form.banner(), Some("A product with this name already exists"));
        assert!(!form.is_submitting());
        assert!(form.can_submit());

        form.dismiss_banner();
        assert_eq!(form.banner(), None);
    }

    #[test]
    fn rejection_without_field_errors_uses_message() {
        let mut form = filled_form();
        form.begin_submit().expect("valid form");

        let outcome = form.finish_submit(Err(rejection(ApiErrorBody::new(
            "An unexpected error occurred while creating the product",
        ))));

        assert_eq!(
            outcome,
            SubmitOutcome::Failed("An unexpected error occurred while creating the product".to_string())
        );
    }

    #[tokio::test]
    async fn submit_navigates_to_landing_on_success() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/products").json_body(json!({
                    "name": "Espresso",
                    "description": "Strong coffee",
                    "type": "Drink"
                }));
                then.status(201).json_body(json!({
                    "id": 9,
                    "name": "Espresso",
                    "description": "Strong coffee",
                    "type": "Drink",
                    "createdAt": "2024-01-01T00:00:00Z"
                }));
            })
            .await;
        let client = CatalogClient::new(
            Url::parse(&server.base_url()).expect("url"),
            Client::builder().build().expect("client"),
        );

        let mut form = filled_form();
        let outcome = form.submit(&client).await.expect("submission dispatched");
        mock.assert_async().await;

        assert_eq!(outcome.redirect(), Some(LANDING_PATH));
        match outcome {
            SubmitOutcome::Created(product) => {
                assert_eq!(product.id, 9);
                assert_eq!(product.product_type, ProductType::Drink);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(!form.is_submitting());
    }

    #[tokio::test]
    async fn submit_never_dispatches_invalid_form() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/products");
                then.status(201);
            })
            .await;
        let client = CatalogClient::new(
            Url::parse(&server.base_url()).expect("url"),
            Client::builder().build().expect("client"),
        );

        let mut form = ProductForm::new();
        let blocked = form.submit(&client).await.expect_err("invalid form");

        assert_eq!(blocked, SubmitBlocked::Invalid);
        mock.assert_hits_async(0).await;
    }
}
