use crate::exception::http::ProblemExceptionFilter;
use crate::exception::{ArgumentsHost, ExceptionFilter, RaisedFailure};
use crate::interceptor::{Interceptor, InterceptorResult, Next};
use axum::{body::Body, http::Request, response::Response};
use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Tower Layer for invoking a chain of Interceptors
///
/// Whatever error the chain produces is handed to the exception filter, so
/// the wrapped service never fails and composes with `axum::Router::layer`.
/// Failures a handler already returned as a response are rendered again by
/// the same filter, so its config applies to every failure under this layer.
///
/// # Example
/// ```
/// use bankapp_problem::interceptor::{InterceptorLayer, LoggingInterceptor};
/// use axum::{Router, routing::get};
///
/// let app: Router = Router::new()
///     .route("/health", get(|| async { "ok" }))
///     .layer(InterceptorLayer::new(vec![Box::new(LoggingInterceptor)]));
/// ```
#[derive(Clone)]
pub struct InterceptorLayer {
    interceptors: Arc<Vec<Box<dyn Interceptor>>>,
    filter: Arc<dyn ExceptionFilter>,
}

impl InterceptorLayer {
    /// Uses the default [`ProblemExceptionFilter`].
    pub fn new(interceptors: Vec<Box<dyn Interceptor>>) -> Self {
        Self::with_filter(interceptors, ProblemExceptionFilter::default())
    }

    pub fn with_filter(interceptors: Vec<Box<dyn Interceptor>>, filter: impl ExceptionFilter) -> Self {
        Self {
            interceptors: Arc::new(interceptors),
            filter: Arc::new(filter),
        }
    }
}

impl<S> Layer<S> for InterceptorLayer {
    type Service = InterceptorMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        InterceptorMiddleware {
            inner,
            interceptors: Arc::clone(&self.interceptors),
            filter: Arc::clone(&self.filter),
        }
    }
}

#[derive(Clone)]
pub struct InterceptorMiddleware<S> {
    inner: S,
    interceptors: Arc<Vec<Box<dyn Interceptor>>>,
    filter: Arc<dyn ExceptionFilter>,
}

impl<S> Service<Request<Body>> for InterceptorMiddleware<S>
where
    S: Service<Request<Body>, Response = Response, Error = Infallible> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let interceptors = Arc::clone(&self.interceptors);
        let filter = Arc::clone(&self.filter);

        // The instance that was polled ready serves this call.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let host = ArgumentsHost::new(request.uri().path());

        Box::pin(async move {
            let mut chain = Next::new(move |req| {
                Box::pin(async move {
                    let response = inner.call(req).await.unwrap_or_else(|never| match never {});
                    InterceptorResult::Ok(response)
                })
            });

            // interceptors[0] ends up outermost.
            for i in (0..interceptors.len()).rev() {
                let interceptors = Arc::clone(&interceptors);
                let next = chain;
                chain = Next::new(move |req| {
                    Box::pin(async move { interceptors[i].intercept(req, next).await })
                });
            }

            match chain.run(request).await {
                Ok(mut response) => match response.extensions_mut().remove::<RaisedFailure>() {
                    Some(RaisedFailure(condition)) => Ok(filter.handle(condition, &host)),
                    None => Ok(response),
                },
                Err(error) => Ok(filter.catch(error, &host)),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ProblemResponse;
    use crate::config::ResponderConfig;
    use crate::error::FailureCondition;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use std::sync::Mutex;
    use tower::{ServiceExt, service_fn};

    struct Recording {
        label: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl Interceptor for Recording {
        async fn intercept(&self, request: Request<Body>, next: Next) -> InterceptorResult {
            self.log.lock().unwrap().push(self.label);
            next.run(request).await
        }
    }

    struct Reject;

    #[async_trait]
    impl Interceptor for Reject {
        async fn intercept(&self, _request: Request<Body>, _next: Next) -> InterceptorResult {
            Err(FailureCondition::business("Branch is closed").into())
        }
    }

    async fn ok(_req: Request<Body>) -> Result<Response, Infallible> {
        Ok(Response::new(Body::empty()))
    }

    async fn missing_account(_req: Request<Body>) -> Result<Response, Infallible> {
        Ok(FailureCondition::account_not_found("Account 7 not found").into_response())
    }

    async fn run_with(config: ResponderConfig, uri: &str) -> (Response, ProblemResponse) {
        let layer = InterceptorLayer::with_filter(vec![], ProblemExceptionFilter::new(config));
        let response = layer
            .layer(service_fn(missing_account))
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let (parts, body) = response.into_parts();
        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        let problem = serde_json::from_slice(&bytes).unwrap();
        (Response::from_parts(parts, Body::empty()), problem)
    }

    #[tokio::test]
    async fn test_interceptors_run_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let layer = InterceptorLayer::new(vec![
            Box::new(Recording {
                label: "first",
                log: Arc::clone(&log),
            }),
            Box::new(Recording {
                label: "second",
                log: Arc::clone(&log),
            }),
        ]);

        let response = layer
            .layer(service_fn(ok))
            .oneshot(Request::new(Body::empty()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_raised_condition_becomes_problem() {
        let layer = InterceptorLayer::new(vec![Box::new(Reject)]);

        let response = layer
            .layer(service_fn(ok))
            .oneshot(Request::builder().uri("/transfers").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_handler_failure_goes_through_configured_filter() {
        let config = ResponderConfig {
            log_unexpected: true,
            include_instance: true,
        };
        let (response, problem) = run_with(config, "/accounts/7").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.extensions().get::<RaisedFailure>().is_none());
        assert_eq!(problem.title, "Account Error");
        assert_eq!(problem.detail, "Account 7 not found");
        assert_eq!(problem.instance.as_deref(), Some("/accounts/7"));
    }

    #[tokio::test]
    async fn test_handler_failure_respects_disabled_instance() {
        let config = ResponderConfig {
            log_unexpected: true,
            include_instance: false,
        };
        let (response, problem) = run_with(config, "/accounts/7").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(problem.instance, None);
    }

    #[tokio::test]
    async fn test_plain_responses_are_untouched() {
        let layer = InterceptorLayer::with_filter(vec![], ProblemExceptionFilter::default());
        let response = layer
            .layer(service_fn(ok))
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(body.is_empty());
    }
}
