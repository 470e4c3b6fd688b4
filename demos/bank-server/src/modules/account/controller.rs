use super::model::{Account, OpenAccountRequest, WithdrawRequest};
use crate::AppState;
use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use bankapp_problem::Result;
use bankapp_problem::pipe::ValidatedJson;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(open))
        .route("/{number}", get(get_one))
        .route("/{number}/freeze", post(freeze))
        .route("/{number}/withdraw", post(withdraw))
        .route("/{number}/statement", get(statement))
}

async fn open(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<OpenAccountRequest>,
) -> Json<Account> {
    Json(state.accounts.open(req))
}

async fn get_one(State(state): State<AppState>, Path(number): Path<String>) -> Result<Json<Account>> {
    state.accounts.get(&number).map(Json)
}

async fn freeze(State(state): State<AppState>, Path(number): Path<String>) -> Result<Json<Account>> {
    state.accounts.freeze(&number).map(Json)
}

async fn withdraw(
    State(state): State<AppState>,
    Path(number): Path<String>,
    ValidatedJson(req): ValidatedJson<WithdrawRequest>,
) -> Result<Json<Account>> {
    state.accounts.withdraw(&number, req.amount).map(Json)
}

async fn statement(State(state): State<AppState>, Path(number): Path<String>) -> Result<String> {
    state.accounts.statement(&number)
}
