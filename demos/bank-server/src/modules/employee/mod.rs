pub mod controller;
pub mod model;
pub mod service;

pub use controller::router;
pub use service::EmployeeService;
