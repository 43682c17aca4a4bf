use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::{self, FieldErrors};

/// Kind of product offered by the catalog.
///
/// The textual names are persisted as-is, so new variants must be appended
/// and existing names must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductType {
    Drink,
    Food,
}

impl ProductType {
    pub const ALL: [ProductType; 2] = [Self::Drink, Self::Food];

    /// Returns the canonical text stored in the database and sent over the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Drink => "Drink",
            Self::Food => "Food",
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductType {
    type Err = UnknownProductType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|variant| variant.as_str() == value)
            .ok_or_else(|| UnknownProductType(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown product type '{0}'")]
pub struct UnknownProductType(pub String);

/// Persisted catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub product_type: ProductType,
    pub created_at: DateTime<Utc>,
}

/// Input for the create operation that already satisfies the field rules.
///
/// The only way to obtain one is through [`NewProduct::new`], so anything
/// holding a `NewProduct` may be persisted without re-checking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    name: String,
    description: String,
    product_type: ProductType,
}

impl NewProduct {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        product_type: ProductType,
    ) -> Result<Self, FieldErrors> {
        let name = name.into();
        let description = description.into();

        let mut errors = FieldErrors::default();
        if let Some(message) = validation::name_violation(&name) {
            errors.push("name", message);
        }
        if let Some(message) = validation::description_violation(&description) {
            errors.push("description", message);
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self {
            name,
            description,
            product_type,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn product_type(&self) -> ProductType {
        self.product_type
    }

    /// Attaches the storage-assigned identity and creation time.
    pub fn into_product(self, id: i64, created_at: DateTime<Utc>) -> Product {
        Product {
            id,
            name: self.name,
            description: self.description,
            product_type: self.product_type,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{DESCRIPTION_REQUIRED, NAME_TOO_LONG};

    #[test]
    fn product_type_text_mapping_is_stable() {
        assert_eq!(ProductType::Drink.as_str(), "Drink");
        assert_eq!(ProductType::Food.as_str(), "Food");
        assert_eq!("Food".parse::<ProductType>(), Ok(ProductType::Food));
        assert_eq!(
            "FOOD".parse::<ProductType>(),
            Err(UnknownProductType("FOOD".to_string()))
        );
    }

    #[test]
    fn product_type_serializes_as_text() {
        let value = serde_json::to_value(ProductType::Drink).expect("serialize");
        assert_eq!(value, serde_json::json!("Drink"));
    }

    #[test]
    fn new_product_collects_every_field_error() {
        let errors = NewProduct::new("n".repeat(201), "  ", ProductType::Food)
            .expect_err("invalid input should fail");

        assert_eq!(errors.get("name"), Some(&[NAME_TOO_LONG.to_string()][..]));
        assert_eq!(
            errors.get("description"),
            Some(&[DESCRIPTION_REQUIRED.to_string()][..])
        );
    }

    #[test]
    fn new_product_keeps_input_verbatim() {
        let product = NewProduct::new(" Latte ", "Milky", ProductType::Drink).expect("valid");
        assert_eq!(product.name(), " Latte ");
        assert_eq!(product.description(), "Milky");
        assert_eq!(product.product_type(), ProductType::Drink);
    }
}
