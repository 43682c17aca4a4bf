//! Domain types shared by the catalog server and its clients.
//!
//! The field rules in [`validation`] are the single source for both the
//! authoritative server-side checks and the client form's local checks.
pub mod dto;
pub mod types;
pub mod validation;

pub use dto::{ApiErrorBody, CreateProductRequest, ProductDto};
pub use types::{NewProduct, Product, ProductType, UnknownProductType};
pub use validation::FieldErrors;
