pub mod api;
pub mod form;

pub use api::{CatalogClient, ClientError, GENERIC_ERROR};
pub use form::{Field, FieldState, ProductForm, SubmitBlocked, SubmitOutcome, LANDING_PATH};
