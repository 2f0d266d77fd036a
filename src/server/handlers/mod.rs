pub mod health;
pub mod index;
pub mod question;
pub mod upload;

use crate::core::errors::ApiError;

pub async fn post_only() -> ApiError {
    ApiError::MethodNotAllowed("Only POST requests are supported".to_string())
}
