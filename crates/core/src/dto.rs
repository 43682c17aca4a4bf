use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::types::{NewProduct, Product, ProductType};
use crate::validation::{self, FieldErrors};

/// Body accepted by `POST /products`.
///
/// Every field is optional on the wire so that absent or `null` values
/// surface as per-field messages instead of a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[serde(default)]
    #[validate(
        required(message = "Product name is required"),
        custom(function = "check_name")
    )]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(
        required(message = "Product description is required"),
        custom(function = "check_description")
    )]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub product_type: Option<String>,
}

/// Order in which field errors are reported for a create request.
const REQUEST_FIELDS: [&str; 3] = ["name", "description", "type"];

impl CreateProductRequest {
    /// Runs the field rules and converts the body into a [`NewProduct`].
    pub fn into_new_product(self) -> Result<NewProduct, FieldErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::default(),
            Err(err) => FieldErrors::from_validation(err, &REQUEST_FIELDS),
        };

        let product_type = match validation::type_violation(self.product_type.as_deref()) {
            Some(message) => {
                errors.push("type", message);
                None
            }
            None => self
                .product_type
                .as_deref()
                .and_then(|raw| raw.parse::<ProductType>().ok()),
        };

        match (self.name, self.description, product_type) {
            (Some(name), Some(description), Some(product_type)) if errors.is_empty() => {
                NewProduct::new(name, description, product_type)
            }
            _ => Err(errors),
        }
    }
}

fn check_name(value: &str) -> Result<(), ValidationError> {
    rule_outcome(validation::name_violation(value))
}

fn check_description(value: &str) -> Result<(), ValidationError> {
    rule_outcome(validation::description_violation(value))
}

fn rule_outcome(violation: Option<&'static str>) -> Result<(), ValidationError> {
    match violation {
        None => Ok(()),
        Some(message) => Err(ValidationError::new("invalid").with_message(Cow::Borrowed(message))),
    }
}

/// Product representation returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub created_at: DateTime<Utc>,
}

impl From<Product> for ProductDto {
    fn from(value: Product) -> Self {
        Self {
            id: value.id,
            name: value.name,
            description: value.description,
            product_type: value.product_type,
            created_at: value.created_at,
        }
    }
}

/// Error payload shared by every non-2xx API response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl ApiErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: None,
        }
    }

    pub fn with_errors(message: impl Into<String>, errors: FieldErrors) -> Self {
        Self {
            message: message.into(),
            errors: Some(errors),
        }
    }

    /// Message a user should see: the first field message, else the summary.
    pub fn display_message(&self) -> &str {
        self.errors
            .as_ref()
            .and_then(FieldErrors::first_message)
            .unwrap_or(&self.message)
    }
}
