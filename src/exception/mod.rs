use axum::{
    BoxError,
    response::{IntoResponse, Response},
};

use crate::common::ProblemResponse;
use crate::error::FailureCondition;

pub mod http;

/// Context for exception handling
///
/// Carries what the host knows about the request that failed.
#[derive(Debug, Clone, Default)]
pub struct ArgumentsHost {
    path: Option<String>,
}

impl ArgumentsHost {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }
}

/// A failure a handler already turned into a response
///
/// `IntoResponse for FailureCondition` attaches this extension so an
/// [`InterceptorLayer`](crate::interceptor::InterceptorLayer) further out can
/// re-render the failure through its own, configured filter.
#[derive(Debug, Clone)]
pub struct RaisedFailure(pub FailureCondition);

/// The ExceptionFilter trait
///
/// Filters turn failures raised during request processing into responses.
/// They must always produce a well-formed answer; nothing escapes unmapped.
pub trait ExceptionFilter: Send + Sync + 'static {
    /// Map a typed failure to its problem payload
    fn respond(&self, condition: FailureCondition) -> ProblemResponse;

    /// Render a typed failure for the request described by `host`
    fn handle(&self, condition: FailureCondition, host: &ArgumentsHost) -> Response {
        let mut problem = self.respond(condition);
        if let Some(path) = host.path() {
            problem = problem.with_instance(path);
        }
        problem.into_response()
    }

    /// Catch a type-erased error and return a response
    fn catch(&self, error: BoxError, host: &ArgumentsHost) -> Response {
        self.handle(classify(error), host)
    }
}

/// Recover the typed failure behind a boxed error.
///
/// Errors of known shapes map to their dedicated condition; everything else
/// becomes [`FailureCondition::Unknown`] with the error text kept as the
/// internal cause.
pub fn classify(error: BoxError) -> FailureCondition {
    let error = match error.downcast::<FailureCondition>() {
        Ok(condition) => return *condition,
        Err(other) => other,
    };
    let error = match error.downcast::<validator::ValidationErrors>() {
        Ok(errors) => return FailureCondition::from(*errors),
        Err(other) => other,
    };
    match error.downcast::<std::num::ParseIntError>() {
        Ok(err) => FailureCondition::from(*err),
        Err(other) => FailureCondition::unexpected(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    #[test]
    fn test_classify_recovers_condition() {
        let boxed: BoxError = Box::new(FailureCondition::account_not_found("Account 7 not found"));
        assert_eq!(
            classify(boxed),
            FailureCondition::account_not_found("Account 7 not found")
        );
    }

    #[test]
    fn test_classify_parse_error_is_invalid_argument() {
        let boxed: BoxError = Box::new("x1".parse::<u64>().unwrap_err());
        assert_eq!(classify(boxed).kind(), FailureKind::InvalidArgument);
    }

    #[test]
    fn test_classify_anything_else_is_unknown() {
        let boxed: BoxError = Box::new(std::io::Error::other("disk on fire"));
        assert_eq!(classify(boxed), FailureCondition::unexpected("disk on fire"));
    }
}
