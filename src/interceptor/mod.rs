use async_trait::async_trait;
use axum::{BoxError, body::Body, http::Request, response::Response};
use std::future::Future;
use std::pin::Pin;

pub mod layer;
pub mod logging;

pub use layer::{InterceptorLayer, InterceptorMiddleware};
pub use logging::LoggingInterceptor;

/// standard return type for Interceptors
pub type InterceptorResult = Result<Response, InterceptorError>;

/// A type-erased error for interceptors
///
/// Return a boxed [`FailureCondition`](crate::error::FailureCondition) to pick
/// the exact problem the client receives. Anything else is answered as an
/// unexpected failure.
pub type InterceptorError = BoxError;

type BoxedHandler =
    Box<dyn FnOnce(Request<Body>) -> Pin<Box<dyn Future<Output = InterceptorResult> + Send>> + Send>;

/// Represents the next handler in the chain
pub struct Next {
    pub(crate) run: BoxedHandler,
}

impl Next {
    /// Create a new Next handler
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(Request<Body>) -> Pin<Box<dyn Future<Output = InterceptorResult> + Send>>
            + Send
            + 'static,
    {
        Self { run: Box::new(f) }
    }

    /// Execute the next handler
    pub async fn run(self, request: Request<Body>) -> InterceptorResult {
        (self.run)(request).await
    }
}

/// The Interceptor trait
///
/// Interceptors can inspect/modify the request before it reaches the handler,
/// and inspect/modify the response after the handler returns. Any error they
/// return is turned into a problem response by the layer's exception filter.
///
/// # Example
/// ```
/// use bankapp_problem::error::FailureCondition;
/// use bankapp_problem::interceptor::{Interceptor, InterceptorResult, Next};
/// use async_trait::async_trait;
/// use axum::{body::Body, http::Request};
///
/// struct BranchOpenInterceptor;
///
/// #[async_trait]
/// impl Interceptor for BranchOpenInterceptor {
///     async fn intercept(&self, req: Request<Body>, next: Next) -> InterceptorResult {
///         if req.headers().contains_key("x-branch-closed") {
///             return Err(FailureCondition::business("Branch is closed").into());
///         }
///         next.run(req).await
///     }
/// }
/// ```
#[async_trait]
pub trait Interceptor: Send + Sync + 'static {
    async fn intercept(&self, request: Request<Body>, next: Next) -> InterceptorResult;
}
