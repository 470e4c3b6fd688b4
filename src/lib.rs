//! # bankapp-problem
//!
//! Centralized translation of request-handling failures into uniform
//! problem responses for axum services.
//!
//! Every failure raised while serving a request is a [`FailureCondition`].
//! One exception filter owns the only mapping from condition to HTTP status,
//! title and detail, so clients always receive the same body shape:
//!
//! ```text
//! { "status": 404, "title": "Account Error", "detail": "...",
//!   "timestamp": "2024-05-01T12:30:00Z", "errors": { ... }? }
//! ```
//!
//! ## Features
//!
//! - **Exhaustive mapping**: one `match` over the condition tag, no handler resolution order
//! - **Opaque server errors**: unexpected failures are logged, never echoed
//! - **Validation**: `validator` rules folded into a per-field `errors` map
//! - **Interceptors**: a tower layer that routes any raised error through the filter
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bankapp_problem::prelude::*;
//! use serde::Deserialize;
//! use validator::Validate;
//!
//! #[derive(Deserialize, Validate)]
//! struct Withdraw {
//!     #[validate(range(min = 1, message = "must be positive"))]
//!     amount: i64,
//! }
//!
//! async fn withdraw(
//!     Path(id): Path<String>,
//!     ValidatedJson(req): ValidatedJson<Withdraw>,
//! ) -> Result<Json<i64>, FailureCondition> {
//!     if id != "ACC-1" {
//!         return Err(FailureCondition::account_not_found(format!("Account {id} not found")));
//!     }
//!     if req.amount > 100 {
//!         return Err(FailureCondition::insufficient_balance("Balance too low"));
//!     }
//!     Ok(Json(100 - req.amount))
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new()
//!         .route("/accounts/{id}/withdraw", axum::routing::post(withdraw))
//!         .layer(InterceptorLayer::new(vec![Box::new(LoggingInterceptor)]));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

pub mod common;
pub mod config;
pub mod error;
pub mod exception;
pub mod interceptor;
pub mod pipe;

// Re-export core types
pub use common::{ProblemResponse, APPLICATION_PROBLEM_JSON};
pub use error::{FailureCondition, FailureKind, FieldViolation, Result};
pub use exception::http::ProblemExceptionFilter;

// Re-export commonly used types from dependencies
pub use async_trait::async_trait;
pub use axum;

/// Prelude module for convenient imports
///
/// ```
/// use bankapp_problem::prelude::*;
/// ```
pub mod prelude {
    pub use crate::common::{Clock, FixedClock, ProblemResponse, SystemClock};
    pub use crate::config::{ConfigService, ResponderConfig};
    pub use crate::error::{FailureCondition, FailureKind, FieldErrors, FieldViolation};
    pub use crate::exception::http::ProblemExceptionFilter;
    pub use crate::exception::{ArgumentsHost, ExceptionFilter};
    pub use crate::interceptor::{
        Interceptor, InterceptorLayer, InterceptorResult, LoggingInterceptor, Next,
    };
    pub use crate::pipe::{ParseIntPipe, Pipe, PipeResult, ValidatedJson, ValidationPipe};
    pub use async_trait::async_trait;
    pub use axum::{
        Json, Router,
        extract::{Path, Query, State},
        http::StatusCode,
        response::{IntoResponse, Response},
    };
    pub use std::sync::Arc;
}
