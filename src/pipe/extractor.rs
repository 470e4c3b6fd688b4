use crate::error::FailureCondition;
use crate::pipe::ValidationPipe;
use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// Axum extractor for validated JSON bodies
///
/// Deserializes like [`Json`] and then runs the body's `validator` rules.
/// A malformed body is rejected as `InvalidArgument`, a well-formed body that
/// breaks its rules as `ValidationFailed`.
///
/// # Example
/// ```
/// use bankapp_problem::pipe::ValidatedJson;
/// use bankapp_problem::error::Result;
/// use axum::Json;
/// use serde::Deserialize;
/// use validator::Validate;
///
/// #[derive(Deserialize, Validate)]
/// struct OpenAccount {
///     #[validate(length(min = 1, message = "must not be blank"))]
///     owner: String,
/// }
///
/// async fn open(ValidatedJson(req): ValidatedJson<OpenAccount>) -> Result<Json<String>> {
///     Ok(Json(req.owner))
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = FailureCondition;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        ValidationPipe::default().check(value).map(ValidatedJson)
    }
}

impl<T> std::ops::Deref for ValidatedJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
