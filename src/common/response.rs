use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::FieldErrors;

/// Media type of every rendered [`ProblemResponse`].
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

/// Extension property carrying per-field validation messages.
pub const ERRORS_PROPERTY: &str = "errors";

/// Members owned by [`ProblemResponse`] itself; never accepted as extension properties.
pub const RESERVED_MEMBERS: [&str; 5] = ["status", "title", "detail", "timestamp", "instance"];

/// Structured error payload returned to clients
///
/// `status`, `title`, `detail` and `timestamp` are always present. Anything
/// else lives in the open `properties` map and is flattened into the JSON body.
///
/// # Example
/// ```
/// use bankapp_problem::common::response::ProblemResponse;
/// use axum::http::StatusCode;
///
/// let problem = ProblemResponse::new(
///     StatusCode::NOT_FOUND,
///     "Account Error",
///     "Account 42 does not exist",
///     chrono::Utc::now(),
/// );
/// assert_eq!(problem.status, 404);
/// assert!(problem.errors().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemResponse {
    pub status: u16,
    pub title: String,
    pub detail: String,
    pub timestamp: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,

    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl ProblemResponse {
    pub fn new(
        status: StatusCode,
        title: impl Into<String>,
        detail: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            status: status.as_u16(),
            title: title.into(),
            detail: detail.into(),
            timestamp,
            instance: None,
            properties: Map::new(),
        }
    }

    /// Attach the field error map under the `errors` property.
    pub fn with_errors(self, errors: &FieldErrors) -> Self {
        let errors = errors
            .iter()
            .map(|(field, message)| (field.clone(), Value::String(message.clone())))
            .collect();
        self.with_property(ERRORS_PROPERTY, Value::Object(errors))
    }

    /// Add an extension member. Names of core members are ignored so the
    /// body never carries a second `status`, `title` and so on.
    pub fn with_property(mut self, name: impl Into<String>, value: Value) -> Self {
        let name = name.into();
        if RESERVED_MEMBERS.contains(&name.as_str()) {
            tracing::warn!("Ignoring extension property {:?}: name is reserved", name);
            return self;
        }
        self.properties.insert(name, value);
        self
    }

    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    pub fn errors(&self) -> Option<&Map<String, Value>> {
        self.properties.get(ERRORS_PROPERTY).and_then(Value::as_object)
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ProblemResponse {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut response = (status, Json(self)).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(APPLICATION_PROBLEM_JSON),
        );
        response
    }
}
