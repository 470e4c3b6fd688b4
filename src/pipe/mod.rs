use crate::error::FailureCondition;
use async_trait::async_trait;

pub mod builtins;
pub mod extractor;

pub use builtins::{ParseIntPipe, ValidationPipe};
pub use extractor::ValidatedJson;

/// Pipes fail with the same conditions handlers raise, so a rejected input
/// reaches the client through the exception filter like any other failure.
pub type PipeResult<T> = Result<T, FailureCondition>;

/// The Pipe trait for transformation and validation
#[async_trait]
pub trait Pipe: Send + Sync + 'static {
    type Input: Send + 'static;
    type Output: Send + 'static;

    async fn transform(&self, input: Self::Input) -> PipeResult<Self::Output>;
}
