use crate::error::FailureCondition;
use crate::pipe::{Pipe, PipeResult};
use async_trait::async_trait;
use std::marker::PhantomData;
use validator::Validate;

/// A pipe that parses a string into an integer
#[derive(Default)]
pub struct ParseIntPipe;

#[async_trait]
impl Pipe for ParseIntPipe {
    type Input = String;
    type Output = i64;

    async fn transform(&self, input: String) -> PipeResult<i64> {
        input
            .trim()
            .parse::<i64>()
            .map_err(|_| FailureCondition::invalid_argument(format!("Invalid integer: {input}")))
    }
}

/// A pipe that runs the `validator` rules declared on its input
///
/// Every violated field ends up in the `errors` map of the rendered problem.
pub struct ValidationPipe<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> Default for ValidationPipe<T> {
    fn default() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T: Validate> ValidationPipe<T> {
    pub fn check(&self, input: T) -> PipeResult<T> {
        input.validate()?;
        Ok(input)
    }
}

#[async_trait]
impl<T> Pipe for ValidationPipe<T>
where
    T: Validate + Send + 'static,
{
    type Input = T;
    type Output = T;

    async fn transform(&self, input: T) -> PipeResult<T> {
        self.check(input)
    }
}
