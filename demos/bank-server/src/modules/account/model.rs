use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub number: String,
    pub owner: String,
    pub balance: i64,
    pub frozen: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct OpenAccountRequest {
    #[validate(length(min = 1, message = "must not be blank"))]
    pub owner: String,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub initial_deposit: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct WithdrawRequest {
    #[validate(range(min = 1, message = "must be positive"))]
    pub amount: i64,
}
