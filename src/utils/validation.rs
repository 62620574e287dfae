use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::services::ServiceError;

/// JSON extractor that rejects through the service error taxonomy, so a
/// malformed body and a field-level validation failure both surface as the
/// same 400 shape as every other input error.
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ServiceError::Validation(format!("Malformed JSON body: {}", e)))?;

        value
            .validate()
            .map_err(|e| ServiceError::Validation(format!("Validation error: {}", e)))?;

        Ok(ValidatedJson(value))
    }
}
