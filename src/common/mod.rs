pub mod clock;
pub mod response;

pub use clock::{Clock, FixedClock, SystemClock};
pub use response::{APPLICATION_PROBLEM_JSON, ProblemResponse};
