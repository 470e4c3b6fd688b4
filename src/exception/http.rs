use crate::common::{Clock, ProblemResponse, SystemClock};
use crate::config::ResponderConfig;
use crate::error::FailureCondition;
use crate::exception::{ArgumentsHost, ExceptionFilter, RaisedFailure};
use axum::response::{IntoResponse, Response};
use std::sync::{Arc, LazyLock};

/// Detail sent for every validation failure.
pub const VALIDATION_DETAIL: &str = "Invalid request data";
/// Detail sent for every unclassified failure.
pub const UNEXPECTED_DETAIL: &str = "Unexpected error occurred";

static DEFAULT_FILTER: LazyLock<ProblemExceptionFilter> =
    LazyLock::new(ProblemExceptionFilter::default);

/// The default exception filter: one exhaustive table from failure to problem
///
/// | condition | status | title |
/// |---|---|---|
/// | `AccountNotFound` | 404 | Account Error |
/// | `EmployeeNotFound` | 404 | Employee Error |
/// | `DuplicateUsername` | 409 | Duplicate Resource |
/// | `InsufficientBalance` | 400 | Transaction Error |
/// | `GenericBusiness` | 400 | Business Error |
/// | `InvalidArgument` | 400 | Invalid Argument |
/// | `ValidationFailed` | 400 | Validation Failed |
/// | `Unknown` | 500 | Server Error |
///
/// Message-carrying conditions pass their message through untouched as the
/// detail. Callers must keep sensitive text out of those messages.
#[derive(Clone)]
pub struct ProblemExceptionFilter {
    clock: Arc<dyn Clock>,
    config: ResponderConfig,
}

impl Default for ProblemExceptionFilter {
    fn default() -> Self {
        Self::new(ResponderConfig::default())
    }
}

impl ProblemExceptionFilter {
    pub fn new(config: ResponderConfig) -> Self {
        Self {
            clock: Arc::new(SystemClock),
            config,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn config(&self) -> ResponderConfig {
        self.config
    }
}

impl ProblemExceptionFilter {
    /// Build the problem body without any logging.
    pub fn render(&self, condition: FailureCondition) -> ProblemResponse {
        let kind = condition.kind();
        let problem =
            |detail: String| ProblemResponse::new(kind.status(), kind.title(), detail, self.clock.now());

        match condition {
            FailureCondition::AccountNotFound { message }
            | FailureCondition::EmployeeNotFound { message }
            | FailureCondition::DuplicateUsername { message }
            | FailureCondition::InsufficientBalance { message }
            | FailureCondition::GenericBusiness { message }
            | FailureCondition::InvalidArgument { message } => problem(message),
            FailureCondition::ValidationFailed { field_errors } => {
                problem(VALIDATION_DETAIL.to_string()).with_errors(&field_errors)
            }
            FailureCondition::Unknown { .. } => problem(UNEXPECTED_DETAIL.to_string()),
        }
    }
}

impl ExceptionFilter for ProblemExceptionFilter {
    fn respond(&self, condition: FailureCondition) -> ProblemResponse {
        match &condition {
            FailureCondition::ValidationFailed { field_errors } => {
                tracing::debug!("Rejected request with {} invalid field(s)", field_errors.len());
            }
            FailureCondition::Unknown { cause } => {
                if self.config.log_unexpected {
                    tracing::error!(
                        "Unexpected failure while handling request: {}",
                        cause.as_deref().unwrap_or("<no cause recorded>")
                    );
                }
            }
            other => {
                let kind_name: &'static str = other.kind().into();
                tracing::debug!("Client failure {}: {}", kind_name, other);
            }
        }
        self.render(condition)
    }

    fn handle(&self, condition: FailureCondition, host: &ArgumentsHost) -> Response {
        let mut problem = self.respond(condition);
        if self.config.include_instance {
            if let Some(path) = host.path() {
                problem = problem.with_instance(path);
            }
        }
        problem.into_response()
    }
}

/// Lets handlers return `Result<T, FailureCondition>` directly.
///
/// The body is rendered by the default filter without logging, and the
/// condition rides along as a [`RaisedFailure`] extension. An enclosing
/// [`InterceptorLayer`](crate::interceptor::InterceptorLayer) replaces that
/// response with one from its configured filter, which also does the logging.
impl IntoResponse for FailureCondition {
    fn into_response(self) -> Response {
        let mut response = DEFAULT_FILTER.render(self.clone()).into_response();
        response.extensions_mut().insert(RaisedFailure(self));
        response
    }
}
